// Copyright 2025 Irreducible Inc.

//! Dense integer matrix kernels used to express 2D convolution as a single matrix product.
//!
//! This crate provides:
//!
//! * Storage order tags ([`RowMajor`], [`ColumnMajor`]) and the canonical [`address`] function
//! * A [`Matrix`] container whose storage order is part of its type
//! * Out-of-place transposition between the two storage orders
//! * The reference [`gemm`] and the tiled [`TiledMultiplier`], which models a fixed width
//!   hardware multiplier, both with optional overflow detection

mod element;
mod error;
mod gemm;
mod matrix;
mod matrix_transpose;
mod mult;
mod order;

pub use element::*;
pub use error::*;
pub use gemm::{checked_gemm, gemm};
pub use matrix::*;
pub use matrix_transpose::*;
pub use mult::*;
pub use order::*;
