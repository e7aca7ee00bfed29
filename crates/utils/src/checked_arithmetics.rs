// Copyright 2025 Irreducible Inc.

/// Rounds `size` up to the next multiple of `alignment`.
///
/// An alignment of 1 leaves the size untouched. Panics when `alignment` is zero.
pub const fn aligned_size(size: usize, alignment: usize) -> usize {
	assert!(alignment != 0);

	match size % alignment {
		0 => size,
		rem => size + (alignment - rem),
	}
}

/// Returns true if `size` is a multiple of `alignment`.
pub const fn is_aligned(size: usize, alignment: usize) -> bool {
	alignment != 0 && size % alignment == 0
}
