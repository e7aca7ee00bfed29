// Copyright 2025 Irreducible Inc.

use std::{
	marker::PhantomData,
	ops::{Deref, DerefMut, Index, IndexMut},
};

use bytemuck::{zeroed_vec, Zeroable};
use colconv_utils::{bail, ensure};

use crate::{
	element::Scalar,
	error::Error,
	matrix_transpose::transpose_into,
	order::{ColumnMajor, MatrixOrder, RowMajor},
};

/// A dense `rows x cols` matrix whose storage order `O` is part of its type.
///
/// `Data` is the backing storage: an owned `Vec<T>` by default, or a borrowed slice for views into
/// a larger buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T, O, Data: Deref<Target = [T]> = Vec<T>> {
	data: Data,
	rows: usize,
	cols: usize,
	_order: PhantomData<O>,
}

/// Read-only view into a matrix.
pub type MatrixView<'a, T, O> = Matrix<T, O, &'a [T]>;

/// Mutable view into a matrix.
pub type MatrixViewMut<'a, T, O> = Matrix<T, O, &'a mut [T]>;

impl<T, O: MatrixOrder, Data: Deref<Target = [T]>> Matrix<T, O, Data> {
	/// Wraps `data` as a `rows x cols` matrix in order `O`.
	pub fn new(rows: usize, cols: usize, data: Data) -> Result<Self, Error> {
		ensure!(
			data.len() == rows * cols,
			Error::IncorrectArgumentLength {
				arg: "data".into(),
				expected: rows * cols,
			}
		);

		Ok(Self {
			data,
			rows,
			cols,
			_order: PhantomData,
		})
	}

	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn cols(&self) -> usize {
		self.cols
	}

	pub fn dim(&self) -> (usize, usize) {
		(self.rows, self.cols)
	}

	/// The elements in storage order.
	pub fn elements(&self) -> &[T] {
		&self.data
	}

	pub fn get(&self, m: usize, n: usize) -> Option<&T> {
		if m < self.rows && n < self.cols {
			self.data.get(O::address(self.rows, self.cols, m, n))
		} else {
			None
		}
	}

	pub fn view(&self) -> MatrixView<'_, T, O> {
		Matrix {
			data: &*self.data,
			rows: self.rows,
			cols: self.cols,
			_order: PhantomData,
		}
	}
}

impl<T, O: MatrixOrder, Data: DerefMut<Target = [T]>> Matrix<T, O, Data> {
	pub fn elements_mut(&mut self) -> &mut [T] {
		&mut self.data
	}

	pub fn view_mut(&mut self) -> MatrixViewMut<'_, T, O> {
		Matrix {
			data: &mut *self.data,
			rows: self.rows,
			cols: self.cols,
			_order: PhantomData,
		}
	}

	pub fn fill(&mut self, value: T)
	where
		T: Copy,
	{
		self.data.fill(value);
	}
}

impl<T: Zeroable + Copy, O: MatrixOrder> Matrix<T, O> {
	pub fn zeros(rows: usize, cols: usize) -> Self {
		Self {
			data: zeroed_vec(rows * cols),
			rows,
			cols,
			_order: PhantomData,
		}
	}

	/// Builds a matrix from its logical contents, `f(m, n)` is the element in row `m`, column `n`.
	pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
		let mut out = Self::zeros(rows, cols);
		for m in 0..rows {
			for n in 0..cols {
				out[(m, n)] = f(m, n);
			}
		}
		out
	}

	/// The same logical matrix stored in the opposite order.
	pub fn into_transposed_order(self) -> Matrix<T, O::Transposed> {
		let mut data = zeroed_vec(self.data.len());
		transpose_into::<T, O>(self.rows, self.cols, &self.data, &mut data)
			.expect("source and destination lengths both equal rows * cols");

		Matrix {
			data,
			rows: self.rows,
			cols: self.cols,
			_order: PhantomData,
		}
	}

	/// Converts to storage order `Target`, transposing only if the orders differ.
	pub fn into_order<Target: MatrixOrder>(self) -> Matrix<T, Target> {
		let (rows, cols) = self.dim();
		let data = if O::IS_ROW_MAJOR == Target::IS_ROW_MAJOR {
			self.data
		} else {
			self.into_transposed_order().data
		};

		Matrix {
			data,
			rows,
			cols,
			_order: PhantomData,
		}
	}

	pub fn into_elements(self) -> Vec<T> {
		self.data
	}
}

impl<T: Scalar, O: MatrixOrder> Matrix<T, O> {
	pub fn identity(n: usize) -> Self {
		let mut out = Self::zeros(n, n);
		for i in 0..n {
			out[(i, i)] = T::ONE;
		}
		out
	}
}

fn check_block(start: usize, count: usize, extent: usize) -> Result<(), Error> {
	if start + count > extent {
		bail!(Error::BlockOutOfRange {
			start,
			end: start + count,
			extent,
		});
	}
	Ok(())
}

impl<T, Data: Deref<Target = [T]>> Matrix<T, ColumnMajor, Data> {
	/// The contiguous block of `count` columns starting at column `start`.
	pub fn column_block(
		&self,
		start: usize,
		count: usize,
	) -> Result<MatrixView<'_, T, ColumnMajor>, Error> {
		check_block(start, count, self.cols)?;
		Ok(Matrix {
			data: &self.data[start * self.rows..(start + count) * self.rows],
			rows: self.rows,
			cols: count,
			_order: PhantomData,
		})
	}
}

impl<T, Data: DerefMut<Target = [T]>> Matrix<T, ColumnMajor, Data> {
	pub fn column_block_mut(
		&mut self,
		start: usize,
		count: usize,
	) -> Result<MatrixViewMut<'_, T, ColumnMajor>, Error> {
		check_block(start, count, self.cols)?;
		let rows = self.rows;
		Ok(Matrix {
			data: &mut self.data[start * rows..(start + count) * rows],
			rows,
			cols: count,
			_order: PhantomData,
		})
	}
}

impl<T, Data: Deref<Target = [T]>> Matrix<T, RowMajor, Data> {
	/// The contiguous block of `count` rows starting at row `start`.
	pub fn row_block(
		&self,
		start: usize,
		count: usize,
	) -> Result<MatrixView<'_, T, RowMajor>, Error> {
		check_block(start, count, self.rows)?;
		Ok(Matrix {
			data: &self.data[start * self.cols..(start + count) * self.cols],
			rows: count,
			cols: self.cols,
			_order: PhantomData,
		})
	}

	/// Row `m` as a slice.
	pub fn row(&self, m: usize) -> &[T] {
		&self.data[m * self.cols..(m + 1) * self.cols]
	}
}

impl<T, O: MatrixOrder, Data: Deref<Target = [T]>> Index<(usize, usize)> for Matrix<T, O, Data> {
	type Output = T;

	fn index(&self, (m, n): (usize, usize)) -> &Self::Output {
		assert!(m < self.rows);
		assert!(n < self.cols);
		&self.data[O::address(self.rows, self.cols, m, n)]
	}
}

impl<T, O: MatrixOrder, Data: DerefMut<Target = [T]>> IndexMut<(usize, usize)>
	for Matrix<T, O, Data>
{
	fn index_mut(&mut self, (m, n): (usize, usize)) -> &mut Self::Output {
		assert!(m < self.rows);
		assert!(n < self.cols);
		&mut self.data[O::address(self.rows, self.cols, m, n)]
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn test_new_checks_length() {
		assert_matches!(
			Matrix::<u8, RowMajor>::new(2, 3, vec![0; 5]),
			Err(Error::IncorrectArgumentLength { expected: 6, .. })
		);
		assert!(Matrix::<u8, RowMajor>::new(2, 3, vec![0; 6]).is_ok());
	}

	#[test]
	fn test_index_follows_order() {
		let row = Matrix::<u8, RowMajor>::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
		let col = Matrix::<u8, ColumnMajor>::new(2, 3, vec![1, 4, 2, 5, 3, 6]).unwrap();
		for m in 0..2 {
			for n in 0..3 {
				assert_eq!(row[(m, n)], col[(m, n)]);
			}
		}
		assert_eq!(row[(1, 0)], 4);
		assert_eq!(row.get(2, 0), None);
		assert_eq!(col.get(1, 2), Some(&6));
	}

	#[test]
	fn test_into_transposed_order_keeps_logical_contents() {
		let row = Matrix::<u16, RowMajor>::from_fn(3, 4, |m, n| (10 * m + n) as u16);
		let col = row.clone().into_transposed_order();
		assert_eq!(col.elements(), &[0, 10, 20, 1, 11, 21, 2, 12, 22, 3, 13, 23]);
		for m in 0..3 {
			for n in 0..4 {
				assert_eq!(row[(m, n)], col[(m, n)]);
			}
		}
		assert_eq!(col.into_order::<RowMajor>(), row);
	}

	#[test]
	fn test_into_same_order_is_noop() {
		let row = Matrix::<u8, RowMajor>::from_fn(2, 5, |m, n| (m * 5 + n) as u8);
		assert_eq!(row.clone().into_order::<RowMajor>(), row);
	}

	#[test]
	fn test_column_block() {
		let mut col = Matrix::<u8, ColumnMajor>::from_fn(2, 4, |m, n| (m + 2 * n) as u8);
		let block = col.column_block(1, 2).unwrap();
		assert_eq!(block.dim(), (2, 2));
		assert_eq!(block[(0, 0)], 2);
		assert_eq!(block[(1, 1)], 5);

		col.column_block_mut(3, 1).unwrap().fill(0);
		assert_eq!(col[(0, 3)], 0);
		assert_eq!(col[(1, 3)], 0);
		assert_eq!(col[(1, 2)], 5);

		assert_matches!(col.column_block(3, 2), Err(Error::BlockOutOfRange { end: 5, .. }));
	}

	#[test]
	fn test_row_block() {
		let row = Matrix::<u8, RowMajor>::from_fn(4, 3, |m, n| (m * 3 + n) as u8);
		let block = row.row_block(2, 2).unwrap();
		assert_eq!(block.elements(), &[6, 7, 8, 9, 10, 11]);
		assert_eq!(row.row(1), &[3, 4, 5]);
		assert!(row.row_block(3, 2).is_err());
	}

	#[test]
	fn test_identity() {
		let id = Matrix::<u8, ColumnMajor>::identity(3);
		assert_eq!(id.elements(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);
	}
}
