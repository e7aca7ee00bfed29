// Copyright 2025 Irreducible Inc.

use std::ops::{Deref, DerefMut};

use colconv_utils::ensure;

use crate::{
	element::{Arithmetic, Checked, Scalar, Wrapping},
	error::Error,
	matrix::Matrix,
	order::MatrixOrder,
};

/// General matrix multiply-accumulate, `c += a * b`.
///
/// `a` is `M x K`, `b` is `K x N` and `c` is `M x N`; each operand may use either storage order.
/// Elements of `a` and `b` are promoted to the accumulator type `R` on read. The result is added
/// to the existing contents of `c`, so callers wanting a fresh product must zero `c` first.
///
/// Overflow wraps around. See [`checked_gemm`] for the detecting variant.
///
/// ## Throws
///
/// * [`Error::DimensionMismatch`] if the operand shapes do not compose
pub fn gemm<R, T, OC, OA, OB, DC, DA, DB>(
	c: &mut Matrix<R, OC, DC>,
	a: &Matrix<T, OA, DA>,
	b: &Matrix<T, OB, DB>,
) -> Result<(), Error>
where
	R: Scalar + From<T>,
	T: Copy,
	OC: MatrixOrder,
	OA: MatrixOrder,
	OB: MatrixOrder,
	DC: DerefMut<Target = [R]>,
	DA: Deref<Target = [T]>,
	DB: Deref<Target = [T]>,
{
	gemm_with::<Wrapping, _, _, _, _, _, _, _, _>(c, a, b)
}

/// General matrix multiply-accumulate with overflow detection, `c += a * b`.
///
/// Every product and every addition, including the final addition into `c`, is checked. The
/// function returns at the first overflow; how much of `c` was already updated at that point is
/// unspecified, so `c` must be treated as garbage on failure.
///
/// ## Throws
///
/// * [`Error::DimensionMismatch`] if the operand shapes do not compose
/// * [`Error::ArithmeticOverflow`] if the accumulator type cannot hold an intermediate value
pub fn checked_gemm<R, T, OC, OA, OB, DC, DA, DB>(
	c: &mut Matrix<R, OC, DC>,
	a: &Matrix<T, OA, DA>,
	b: &Matrix<T, OB, DB>,
) -> Result<(), Error>
where
	R: Scalar + From<T>,
	T: Copy,
	OC: MatrixOrder,
	OA: MatrixOrder,
	OB: MatrixOrder,
	DC: DerefMut<Target = [R]>,
	DA: Deref<Target = [T]>,
	DB: Deref<Target = [T]>,
{
	gemm_with::<Checked, _, _, _, _, _, _, _, _>(c, a, b)
}

pub(crate) fn gemm_with<A, R, T, OC, OA, OB, DC, DA, DB>(
	c: &mut Matrix<R, OC, DC>,
	a: &Matrix<T, OA, DA>,
	b: &Matrix<T, OB, DB>,
) -> Result<(), Error>
where
	A: Arithmetic,
	R: Scalar + From<T>,
	T: Copy,
	OC: MatrixOrder,
	OA: MatrixOrder,
	OB: MatrixOrder,
	DC: DerefMut<Target = [R]>,
	DA: Deref<Target = [T]>,
	DB: Deref<Target = [T]>,
{
	let (m_dim, k_dim) = a.dim();
	let n_dim = b.cols();
	ensure!(
		b.rows() == k_dim && c.dim() == (m_dim, n_dim),
		Error::DimensionMismatch {
			c: c.dim(),
			a: a.dim(),
			b: b.dim(),
		}
	);

	let a = a.elements();
	let b = b.elements();
	let c = c.elements_mut();

	for m in 0..m_dim {
		for n in 0..n_dim {
			let mut sum = R::ZERO;
			for k in 0..k_dim {
				let a_mk = R::from(a[OA::address(m_dim, k_dim, m, k)]);
				let b_kn = R::from(b[OB::address(k_dim, n_dim, k, n)]);
				let product = A::mul(a_mk, b_kn).ok_or(Error::ArithmeticOverflow)?;
				sum = A::add(sum, product).ok_or(Error::ArithmeticOverflow)?;
			}

			let c_mn = &mut c[OC::address(m_dim, n_dim, m, n)];
			*c_mn = A::add(*c_mn, sum).ok_or(Error::ArithmeticOverflow)?;
		}
	}

	Ok(())
}
