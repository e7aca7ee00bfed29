// Copyright 2025 Irreducible Inc.

const TRUTHY: [&str; 7] = ["1", "on", "ON", "true", "TRUE", "yes", "YES"];

/// Returns true if the environment variable `flag` holds one of the accepted truthy spellings.
///
/// Unset, empty and unrecognised values all read as false.
pub fn boolean_env_flag_set(flag: &str) -> bool {
	std::env::var(flag).is_ok_and(|val| is_truthy(&val))
}

fn is_truthy(val: &str) -> bool {
	TRUTHY.contains(&val)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truthy_spellings() {
		for val in TRUTHY {
			assert!(is_truthy(val));
		}
		assert!(!is_truthy(""));
		assert!(!is_truthy("0"));
		assert!(!is_truthy("off"));
		assert!(!is_truthy("True"));
	}

	#[test]
	fn test_unset_flag() {
		assert!(!boolean_env_flag_set("COLCONV_FLAG_THAT_IS_NEVER_SET"));
	}
}
