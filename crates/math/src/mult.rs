// Copyright 2025 Irreducible Inc.

use std::ops::{Deref, DerefMut};

use bytemuck::{zeroed_vec, Zeroable};
use colconv_utils::{bail, checked_arithmetics::is_aligned, ensure};
use tracing::instrument;

use crate::{
	element::{Arithmetic, Checked, Scalar, Wrapping},
	error::Error,
	gemm::gemm_with,
	matrix::{Matrix, MatrixView},
	matrix_transpose::transpose_into,
	order::{ColumnMajor, RowMajor},
};

/// Emulation of a hardware matrix multiplier with a fixed inner width `P`.
///
/// The modelled unit computes `M x P x P` products with both operands in column-major order. A
/// general `M x N x K` product is decomposed into `(N / P) * (K / P)` invocations of the unit, the
/// partial products accumulating in `c`. The arithmetic is identical to [`crate::gemm`], which makes
/// the reference CPU kernel usable to validate an accelerator's output tile by tile.
///
/// Operand layouts are fixed by the unit: `a` and `c` are column-major, `b` is row-major.
#[derive(Debug, Clone, Copy)]
pub struct TiledMultiplier<const P: usize>;

impl<const P: usize> Default for TiledMultiplier<P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<const P: usize> TiledMultiplier<P> {
	/// Inner dimension of the modelled multiplier.
	pub const TILE_WIDTH: usize = P;

	const NON_ZERO_WIDTH: () = assert!(P != 0, "tile width must be non-zero");

	pub const fn new() -> Self {
		#[allow(clippy::let_unit_value)]
		let () = Self::NON_ZERO_WIDTH;
		Self
	}

	/// Computes `c += a * b`, wrapping on overflow.
	///
	/// ## Throws
	///
	/// * [`Error::DimensionMismatch`] if the operand shapes do not compose
	/// * [`Error::TilingMismatch`] if `N` or `K` is not a multiple of `P`
	pub fn mult<R, T, DC, DA, DB>(
		&self,
		c: &mut Matrix<R, ColumnMajor, DC>,
		a: &Matrix<T, ColumnMajor, DA>,
		b: &Matrix<T, RowMajor, DB>,
	) -> Result<(), Error>
	where
		R: Scalar + From<T>,
		T: Copy + Zeroable,
		DC: DerefMut<Target = [R]>,
		DA: Deref<Target = [T]>,
		DB: Deref<Target = [T]>,
	{
		self.mult_with::<Wrapping, _, _, _, _, _>(c, a, b)
	}

	/// Computes `c += a * b` with overflow detection.
	///
	/// An overflowing tile does not interrupt the decomposition: every tile is still multiplied and
	/// the overflow is reported once all of them ran. As with [`crate::checked_gemm`], the contents
	/// of `c` are unspecified after an overflow.
	///
	/// ## Throws
	///
	/// * [`Error::DimensionMismatch`] if the operand shapes do not compose
	/// * [`Error::TilingMismatch`] if `N` or `K` is not a multiple of `P`
	/// * [`Error::ArithmeticOverflow`] if any tile overflowed the accumulator type
	pub fn checked_mult<R, T, DC, DA, DB>(
		&self,
		c: &mut Matrix<R, ColumnMajor, DC>,
		a: &Matrix<T, ColumnMajor, DA>,
		b: &Matrix<T, RowMajor, DB>,
	) -> Result<(), Error>
	where
		R: Scalar + From<T>,
		T: Copy + Zeroable,
		DC: DerefMut<Target = [R]>,
		DA: Deref<Target = [T]>,
		DB: Deref<Target = [T]>,
	{
		self.mult_with::<Checked, _, _, _, _, _>(c, a, b)
	}

	#[instrument(
		"TiledMultiplier::mult",
		skip_all,
		level = "debug",
		fields(tile_width = P, overflow_checks = A::DETECTS_OVERFLOW)
	)]
	fn mult_with<A, R, T, DC, DA, DB>(
		&self,
		c: &mut Matrix<R, ColumnMajor, DC>,
		a: &Matrix<T, ColumnMajor, DA>,
		b: &Matrix<T, RowMajor, DB>,
	) -> Result<(), Error>
	where
		A: Arithmetic,
		R: Scalar + From<T>,
		T: Copy + Zeroable,
		DC: DerefMut<Target = [R]>,
		DA: Deref<Target = [T]>,
		DB: Deref<Target = [T]>,
	{
		let (m, k) = a.dim();
		let n = b.cols();
		ensure!(
			b.rows() == k && c.dim() == (m, n),
			Error::DimensionMismatch {
				c: c.dim(),
				a: a.dim(),
				b: b.dim(),
			}
		);

		ensure!(
			is_aligned(n, P) && is_aligned(k, P),
			Error::TilingMismatch {
				m,
				n,
				k,
				tile_width: P,
			},
			m,
			n,
			k,
			tile_width = P,
			"matrix dimensions not aligned with the tile width"
		);

		// P rows of b, restaged column-major for the unit
		let mut slab = zeroed_vec::<T>(P * n);
		let mut overflowed = false;

		for p in (0..k).step_by(P) {
			transpose_into::<T, RowMajor>(P, n, b.row_block(p, P)?.elements(), &mut slab)?;
			let slab = MatrixView::<T, ColumnMajor>::new(P, n, &slab)?;
			let a_block = a.column_block(p, P)?;

			for q in (0..n).step_by(P) {
				let b_tile = slab.column_block(q, P)?;
				let mut c_block = c.column_block_mut(q, P)?;

				match gemm_with::<A, _, _, _, _, _, _, _, _>(&mut c_block, &a_block, &b_tile) {
					Ok(()) => {}
					Err(Error::ArithmeticOverflow) => overflowed = true,
					Err(err) => return Err(err),
				}
			}
		}

		if overflowed {
			bail!(Error::ArithmeticOverflow);
		}

		Ok(())
	}
}
