// Copyright 2025 Irreducible Inc.

use std::{env, sync::OnceLock};

use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};

/// Environment variable rayon reads the global pool size from.
pub const NUM_THREADS_VAR: &str = "RAYON_NUM_THREADS";

/// Configures the global rayon pool that batch convolutions run on.
///
/// `threads` takes precedence over `RAYON_NUM_THREADS`. A single thread builds a pool that uses
/// the calling thread, so images are convolved in input order and logs stay sequential. Without
/// either setting the pool is left to rayon's defaults.
///
/// The global pool can be built only once, so the outcome of the first call is cached and
/// returned by every later call. A reference is returned because `ThreadPoolBuildError` is not
/// `Clone`. Call this at the top of `main`, before anything touches the global pool.
pub fn adjust_thread_pool(threads: Option<usize>) -> &'static Result<(), ThreadPoolBuildError> {
	static POOL: OnceLock<Result<(), ThreadPoolBuildError>> = OnceLock::new();

	POOL.get_or_init(|| {
		let threads = threads.or_else(|| env::var(NUM_THREADS_VAR).ok()?.parse().ok());
		match threads {
			None => Ok(()),
			Some(1) => ThreadPoolBuilder::new()
				.num_threads(1)
				.use_current_thread()
				.build_global(),
			Some(n) => ThreadPoolBuilder::new().num_threads(n).build_global(),
		}
	})
}
