use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	static ref VALID_ID_REGEX: Regex = Regex::new(r"^[a-zA-Z_][0-9a-zA-Z_$]*$").unwrap();
}

/// Checks if given name can be used as a signal or module identifier
pub(crate) fn is_name_valid(name: &str) -> bool {
	VALID_ID_REGEX.is_match(name)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_valid_names() {
		assert!(is_name_valid("bus_in"));
		assert!(is_name_valid("ccc_bit2"));
		assert!(is_name_valid("_tmp__7"));
		assert!(is_name_valid("data$0"));
	}

	#[test]
	fn test_invalid_names() {
		assert!(!is_name_valid("$display"));
		assert!(!is_name_valid("1horse"));
		assert!(!is_name_valid("bus[3]"));
		assert!(!is_name_valid("a b"));
		assert!(!is_name_valid(""));
	}
}
