// Copyright 2025 Irreducible Inc.

//! Early-return helpers for functions returning `Result`.
//!
//! Both macros accept optional trailing `tracing` arguments, which are logged at error level
//! before returning. With the `bail_panic` feature the macros panic instead of returning, which
//! gives a backtrace at the point of failure.

#[cfg(feature = "bail_panic")]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		panic!("{}", $err);
	};
	($err:expr, $($log:tt)+) => {{
		::tracing::error!($($log)+);
		panic!("{}", $err);
	}};
}

#[cfg(not(feature = "bail_panic"))]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		return Err($err.into());
	};
	($err:expr, $($log:tt)+) => {{
		::tracing::error!($($log)+);
		return Err($err.into());
	}};
}

#[macro_export]
macro_rules! ensure {
	($cond:expr, $err:expr) => {
		if !$cond {
			$crate::bail!($err);
		}
	};
	($cond:expr, $err:expr, $($log:tt)+) => {
		if !$cond {
			$crate::bail!($err, $($log)+);
		}
	};
}

#[cfg(all(test, not(feature = "bail_panic")))]
mod tests {
	#[derive(Debug, PartialEq, Eq)]
	struct Rejected(usize);

	fn checked_half(value: usize) -> Result<usize, Rejected> {
		ensure!(value % 2 == 0, Rejected(value));
		Ok(value / 2)
	}

	fn logged_half(value: usize) -> Result<usize, Rejected> {
		ensure!(value % 2 == 0, Rejected(value), value, "odd value");
		Ok(value / 2)
	}

	fn always_fails() -> Result<(), Rejected> {
		bail!(Rejected(0), "failing on purpose");
	}

	#[test]
	fn test_ensure() {
		assert_eq!(checked_half(4), Ok(2));
		assert_eq!(checked_half(5), Err(Rejected(5)));
		assert_eq!(logged_half(6), Ok(3));
		assert_eq!(logged_half(7), Err(Rejected(7)));
	}

	#[test]
	fn test_bail_with_log() {
		assert_eq!(always_fails(), Err(Rejected(0)));
	}
}
