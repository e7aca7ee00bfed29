// Copyright 2025 Irreducible Inc.

use std::path::PathBuf;

use crate::convolver::ConvolverState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(
		"invalid filter dimensions {height}x{width}x{input_channels}x{output_channels}: {reason}"
	)]
	InvalidDimensions {
		height: usize,
		width: usize,
		input_channels: usize,
		output_channels: usize,
		reason: &'static str,
	},
	#[error("buffer has {actual} elements, its dimensions require {expected}")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("{kind} channel index {index} is out of range for {count} channels")]
	ChannelIndexOutOfRange {
		kind: &'static str,
		index: usize,
		count: usize,
	},
	#[error("image has {actual} channels, the filter expects {expected}")]
	ChannelCountMismatch { expected: usize, actual: usize },
	#[error("image file {} not found", .0.display())]
	FileNotFound(PathBuf),
	#[error("image buffer is empty")]
	EmptyImage,
	#[error("image of {width}x{height} pixels exceeds the codec limits")]
	ImageTooLarge { width: usize, height: usize },
	#[error("alignment must be non-zero")]
	InvalidAlignment,
	#[error("unsupported tile width {0}")]
	UnsupportedTileWidth(usize),
	#[error("accumulator overflow while convolving {}", .path.display())]
	ArithmeticOverflow { path: PathBuf },
	#[error("convolver is in state {actual:?}, the operation requires {expected:?}")]
	InvalidState {
		expected: ConvolverState,
		actual: ConvolverState,
	},
	#[error("codec error: {0}")]
	Codec(#[from] image::ImageError),
	#[error("math error: {0}")]
	Math(#[from] colconv_math::Error),
}
