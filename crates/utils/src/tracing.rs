// Copyright 2025 Irreducible Inc.

use tracing_subscriber::{
	fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::env::boolean_env_flag_set;

/// Environment flag that turns on span close events, which carry the busy/idle time of every
/// instrumented call.
pub const PROFILE_SPANS_FLAG: &str = "COLCONV_PROFILE_SPANS";

/// Installs the global tracing subscriber.
///
/// The log filter is taken from `RUST_LOG` and defaults to `info`. Calling this more than once is
/// harmless, later calls return an error which callers are free to ignore.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	let span_events = if boolean_env_flag_set(PROFILE_SPANS_FLAG) {
		FmtSpan::CLOSE
	} else {
		FmtSpan::NONE
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_span_events(span_events))
		.try_init()
}
