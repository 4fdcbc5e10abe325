use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;

lazy_static! {
	// Email regex: https://stackoverflow.com/a/201378
	static ref EMAIL_REGEX: Regex = Regex::new("^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|\"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*\")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\\[(?:(?:(2(5[0-5]|[0-4][0-9])|1[0-9][0-9]|[1-9]?[0-9]))\\.){3}(?:(2(5[0-5]|[0-4][0-9])|1[0-9][0-9]|[1-9]?[0-9])|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\\])$").unwrap();
	// Between 7 and 15 digits, with no country code prefix
	static ref PHONE_NUMBER_REGEX: Regex = Regex::new("^[0-9]{7,15}$").unwrap();
}

/// Emails are compared case-insensitively, so they are always stored and
/// looked up in this form
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

pub fn is_email_valid(email: &str) -> bool {
	email.len() <= 320 && EMAIL_REGEX.is_match(email)
}

pub fn is_password_valid(password: &str) -> bool {
	password.chars().count() >= constants::MIN_PASSWORD_LENGTH
}

pub fn is_phone_number_valid(phone_number: &str) -> bool {
	PHONE_NUMBER_REGEX.is_match(phone_number)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn emails() {
		assert!(is_email_valid("john@patr.cloud"));
		assert!(is_email_valid(&normalize_email("  John.Doe@Example.COM ")));
		assert!(!is_email_valid("john"));
		assert!(!is_email_valid("john@"));
		assert!(!is_email_valid("@patr.cloud"));
	}

	#[test]
	fn passwords_need_six_characters() {
		assert!(!is_password_valid("12345"));
		assert!(is_password_valid("123456"));
		assert!(is_password_valid("pässwö"));
	}

	#[test]
	fn phone_numbers_are_digits_only() {
		assert!(is_phone_number_valid("9876543210"));
		assert!(!is_phone_number_valid("+919876543210"));
		assert!(!is_phone_number_valid("98765"));
		assert!(!is_phone_number_valid("98765abcde"));
	}
}
