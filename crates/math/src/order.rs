// Copyright 2025 Irreducible Inc.

use std::fmt::Debug;

/// Storage order of a dense matrix.
///
/// Orders are zero-sized tags so that a buffer's layout is part of its type; passing a row-major
/// buffer where a column-major one is expected is a compile error rather than a silent
/// misinterpretation of the data.
pub trait MatrixOrder: Debug + Default + Copy + Eq + Send + Sync + 'static {
	/// The opposite storage order.
	type Transposed: MatrixOrder<Transposed = Self>;

	const IS_ROW_MAJOR: bool;

	/// Offset of element `(m, n)` of a `rows x cols` matrix stored in this order.
	fn address(rows: usize, cols: usize, m: usize, n: usize) -> usize;

	/// Width and height of the row-major array the elements physically form.
	fn storage_extent(rows: usize, cols: usize) -> (usize, usize);
}

/// Elements of a row are contiguous.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowMajor;

/// Elements of a column are contiguous.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnMajor;

impl MatrixOrder for RowMajor {
	type Transposed = ColumnMajor;

	const IS_ROW_MAJOR: bool = true;

	#[inline(always)]
	fn address(_rows: usize, cols: usize, m: usize, n: usize) -> usize {
		m * cols + n
	}

	fn storage_extent(rows: usize, cols: usize) -> (usize, usize) {
		(cols, rows)
	}
}

impl MatrixOrder for ColumnMajor {
	type Transposed = RowMajor;

	const IS_ROW_MAJOR: bool = false;

	#[inline(always)]
	fn address(rows: usize, _cols: usize, m: usize, n: usize) -> usize {
		n * rows + m
	}

	fn storage_extent(rows: usize, cols: usize) -> (usize, usize) {
		(rows, cols)
	}
}

/// Address of element `(m, n)` in an `rows x cols` matrix stored in order `O`.
///
/// This is the single definition of matrix order used by every kernel in the workspace.
#[inline(always)]
pub fn address<O: MatrixOrder>(rows: usize, cols: usize, m: usize, n: usize) -> usize {
	O::address(rows, cols, m, n)
}
