// Copyright 2025 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("argument {arg} does not have expected length {expected}")]
	IncorrectArgumentLength { arg: String, expected: usize },
	#[error("operand shapes do not compose: c is {c:?}, a is {a:?}, b is {b:?}")]
	DimensionMismatch {
		c: (usize, usize),
		a: (usize, usize),
		b: (usize, usize),
	},
	#[error("matrix dimensions MxNxK = {m}x{n}x{k} are not aligned with tile width {tile_width}")]
	TilingMismatch {
		m: usize,
		n: usize,
		k: usize,
		tile_width: usize,
	},
	#[error("arithmetic overflow during multiply-accumulate")]
	ArithmeticOverflow,
	#[error("block {start}..{end} is out of range for an extent of {extent}")]
	BlockOutOfRange {
		start: usize,
		end: usize,
		extent: usize,
	},
}
