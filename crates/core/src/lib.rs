// Copyright 2025 Irreducible Inc.

//! Multi-channel 2D convolution of 8-bit images, expressed as an im2col transform followed by a
//! single tiled matrix product.
//!
//! An image of `IC` channels is convolved with an `H x W x IC x OC` filter with stride 1 and zero
//! "same" padding, producing `OC` single-channel images of the source size.

mod batch;
mod codec;
mod convolver;
mod dispatch;
mod error;
mod filter;
mod image_buffer;

pub use batch::*;
pub use codec::*;
pub use convolver::*;
pub use dispatch::*;
pub use error::*;
pub use filter::*;
pub use image_buffer::*;

/// Sample type of source and result images.
pub type Pixel = u8;

/// Accumulator type of the matrix product. Narrower than the worst case sum of products, overflows
/// are detected and reported.
pub type Accumulator = u16;
