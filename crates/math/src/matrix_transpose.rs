// Copyright 2025 Irreducible Inc.

use bytemuck::{zeroed_vec, Zeroable};
use colconv_utils::ensure;

use crate::{error::Error, order::MatrixOrder};

/// Writes the `rows x cols` matrix stored in order `O` in `src` into `dst` in the opposite order.
///
/// The logical matrix is unchanged, only its storage order flips. The copy is cache blocked.
pub fn transpose_into<T: Copy, O: MatrixOrder>(
	rows: usize,
	cols: usize,
	src: &[T],
	dst: &mut [T],
) -> Result<(), Error> {
	let len = rows * cols;
	ensure!(
		src.len() == len,
		Error::IncorrectArgumentLength {
			arg: "src".into(),
			expected: len,
		}
	);
	ensure!(
		dst.len() == len,
		Error::IncorrectArgumentLength {
			arg: "dst".into(),
			expected: len,
		}
	);

	if len == 0 {
		return Ok(());
	}

	let (width, height) = O::storage_extent(rows, cols);
	::transpose::transpose(src, dst, width, height);
	Ok(())
}

/// Flips the storage order of the `rows x cols` matrix in `data`, which is stored in order `O`.
///
/// The result is staged in `buffer`, which must hold at least `rows * cols` elements, and copied
/// back over `data`. Without a buffer a scratch allocation is made.
pub fn transpose<T: Copy + Zeroable, O: MatrixOrder>(
	rows: usize,
	cols: usize,
	data: &mut [T],
	buffer: Option<&mut [T]>,
) -> Result<(), Error> {
	let len = rows * cols;

	let mut scratch;
	let buffer = match buffer {
		Some(buffer) => {
			ensure!(
				buffer.len() >= len,
				Error::IncorrectArgumentLength {
					arg: "buffer".into(),
					expected: len,
				}
			);
			&mut buffer[..len]
		}
		None => {
			scratch = zeroed_vec(len);
			scratch.as_mut_slice()
		}
	};

	transpose_into::<T, O>(rows, cols, data, buffer)?;
	data.copy_from_slice(buffer);
	Ok(())
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use proptest::prelude::*;

	use super::*;
	use crate::order::{address, ColumnMajor, RowMajor};

	fn check_transpose_into<O: MatrixOrder>(rows: usize, cols: usize) {
		let src = (0..rows * cols).map(|i| i as u32).collect::<Vec<_>>();
		let mut dst = vec![0u32; rows * cols];
		transpose_into::<_, O>(rows, cols, &src, &mut dst).unwrap();

		for m in 0..rows {
			for n in 0..cols {
				assert_eq!(
					dst[address::<O::Transposed>(rows, cols, m, n)],
					src[address::<O>(rows, cols, m, n)]
				);
			}
		}
	}

	#[test]
	fn test_transpose_into_remaps_every_element() {
		for (rows, cols) in [(1, 1), (1, 7), (7, 1), (3, 5), (13, 17), (64, 3)] {
			check_transpose_into::<RowMajor>(rows, cols);
			check_transpose_into::<ColumnMajor>(rows, cols);
		}
	}

	#[test]
	fn test_transpose_small_example() {
		// 2x3 row-major
		let mut data = vec![1u8, 2, 3, 4, 5, 6];
		transpose::<_, RowMajor>(2, 3, &mut data, None).unwrap();
		assert_eq!(data, vec![1, 4, 2, 5, 3, 6]);
	}

	#[test]
	fn test_transpose_with_supplied_buffer() {
		let mut data = vec![1u8, 4, 2, 5, 3, 6];
		let mut buffer = vec![0u8; 10];
		transpose::<_, ColumnMajor>(2, 3, &mut data, Some(&mut buffer)).unwrap();
		assert_eq!(data, vec![1, 2, 3, 4, 5, 6]);
	}

	#[test]
	fn test_transpose_rejects_short_buffer() {
		let mut data = vec![0u8; 6];
		let mut buffer = vec![0u8; 5];
		assert_matches!(
			transpose::<_, RowMajor>(2, 3, &mut data, Some(&mut buffer)),
			Err(Error::IncorrectArgumentLength { expected: 6, .. })
		);
	}

	#[test]
	fn test_transpose_empty() {
		let mut data: Vec<u8> = vec![];
		transpose::<_, RowMajor>(0, 5, &mut data, None).unwrap();
	}

	proptest! {
		#[test]
		fn test_transpose_involution(rows in 0..24usize, cols in 0..24usize, seed in any::<u64>()) {
			let original = (0..rows * cols)
				.map(|i| (seed.wrapping_mul(i as u64 + 1) >> 7) as u16)
				.collect::<Vec<_>>();

			let mut data = original.clone();
			transpose::<_, RowMajor>(rows, cols, &mut data, None).unwrap();
			transpose::<_, ColumnMajor>(rows, cols, &mut data, None).unwrap();
			prop_assert_eq!(&data, &original);

			transpose::<_, ColumnMajor>(rows, cols, &mut data, None).unwrap();
			transpose::<_, RowMajor>(rows, cols, &mut data, None).unwrap();
			prop_assert_eq!(&data, &original);
		}
	}
}
