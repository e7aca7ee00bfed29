// Copyright 2025 Irreducible Inc.

/// Tile widths a multiplier can be instantiated with at runtime.
pub const SUPPORTED_TILE_WIDTHS: [usize; 6] = [1, 2, 4, 8, 16, 32];

/// Calls `$func::<P>($args)` with the const generic `P` equal to the runtime `$tile_width`.
///
/// The call must evaluate to a `Result` whose error type converts from [`crate::Error`]; an
/// unsupported width evaluates to [`crate::Error::UnsupportedTileWidth`].
#[macro_export]
macro_rules! each_tile_width {
	($tile_width:expr, $func:ident ( $($args:expr),* $(,)? )) => {
		match $tile_width {
			1 => $func::<1>($($args),*),
			2 => $func::<2>($($args),*),
			4 => $func::<4>($($args),*),
			8 => $func::<8>($($args),*),
			16 => $func::<16>($($args),*),
			32 => $func::<32>($($args),*),
			width => Err($crate::Error::UnsupportedTileWidth(width).into()),
		}
	};
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use colconv_math::TiledMultiplier;

	use super::*;
	use crate::Error;

	fn tile_width<const P: usize>(offset: usize) -> Result<usize, Error> {
		Ok(TiledMultiplier::<P>::TILE_WIDTH + offset)
	}

	#[test]
	fn test_dispatch_supported_widths() {
		for width in SUPPORTED_TILE_WIDTHS {
			assert_eq!(each_tile_width!(width, tile_width(100)).unwrap(), width + 100);
		}
	}

	#[test]
	fn test_dispatch_unsupported_width() {
		let result: Result<usize, Error> = each_tile_width!(3, tile_width(0));
		assert_matches!(result, Err(Error::UnsupportedTileWidth(3)));
	}
}
