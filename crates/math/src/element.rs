// Copyright 2025 Irreducible Inc.

use std::fmt::Debug;

use bytemuck::Zeroable;

/// Integer element type of a matrix or accumulator.
pub trait Scalar: Copy + Debug + PartialEq + Eq + Zeroable + Send + Sync + 'static {
	const ZERO: Self;
	const ONE: Self;
	const MAX: Self;

	fn checked_mul(self, rhs: Self) -> Option<Self>;
	fn checked_add(self, rhs: Self) -> Option<Self>;
	fn wrapping_mul(self, rhs: Self) -> Self;
	fn wrapping_add(self, rhs: Self) -> Self;
}

macro_rules! impl_scalar {
	($($ty:ty),* $(,)?) => {
		$(
			impl Scalar for $ty {
				const ZERO: Self = 0;
				const ONE: Self = 1;
				const MAX: Self = <$ty>::MAX;

				#[inline(always)]
				fn checked_mul(self, rhs: Self) -> Option<Self> {
					<$ty>::checked_mul(self, rhs)
				}

				#[inline(always)]
				fn checked_add(self, rhs: Self) -> Option<Self> {
					<$ty>::checked_add(self, rhs)
				}

				#[inline(always)]
				fn wrapping_mul(self, rhs: Self) -> Self {
					<$ty>::wrapping_mul(self, rhs)
				}

				#[inline(always)]
				fn wrapping_add(self, rhs: Self) -> Self {
					<$ty>::wrapping_add(self, rhs)
				}
			}
		)*
	};
}

impl_scalar!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

/// Multiply-accumulate policy of the matrix kernels.
///
/// `None` signals an overflow.
pub trait Arithmetic {
	const DETECTS_OVERFLOW: bool;

	fn mul<R: Scalar>(lhs: R, rhs: R) -> Option<R>;
	fn add<R: Scalar>(lhs: R, rhs: R) -> Option<R>;
}

/// Two's complement wrap-around, never reports an overflow.
#[derive(Debug, Default, Clone, Copy)]
pub struct Wrapping;

/// Every product and every partial sum is checked.
#[derive(Debug, Default, Clone, Copy)]
pub struct Checked;

impl Arithmetic for Wrapping {
	const DETECTS_OVERFLOW: bool = false;

	#[inline(always)]
	fn mul<R: Scalar>(lhs: R, rhs: R) -> Option<R> {
		Some(lhs.wrapping_mul(rhs))
	}

	#[inline(always)]
	fn add<R: Scalar>(lhs: R, rhs: R) -> Option<R> {
		Some(lhs.wrapping_add(rhs))
	}
}

impl Arithmetic for Checked {
	const DETECTS_OVERFLOW: bool = true;

	#[inline(always)]
	fn mul<R: Scalar>(lhs: R, rhs: R) -> Option<R> {
		lhs.checked_mul(rhs)
	}

	#[inline(always)]
	fn add<R: Scalar>(lhs: R, rhs: R) -> Option<R> {
		lhs.checked_add(rhs)
	}
}
