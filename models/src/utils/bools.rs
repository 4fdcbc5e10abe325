use std::ops::Deref;

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

/// Declares a unit struct that always (de)serializes as the given boolean.
/// Deserializing the opposite value is an error, which is what lets the
/// untagged response envelope tell success and error bodies apart.
macro_rules! constant_bool {
	($(#[$meta:meta])* $name:ident => $value:literal) => {
		$(#[$meta])*
		#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name;

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: Deserializer<'de>,
			{
				if bool::deserialize(deserializer)? == $value {
					Ok($name)
				} else {
					Err(D::Error::custom(concat!("bool is not ", stringify!($value))))
				}
			}
		}

		impl Serialize for $name {
			fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
			where
				S: Serializer,
			{
				serializer.serialize_bool($value)
			}
		}

		impl From<$name> for bool {
			fn from(_: $name) -> Self {
				$value
			}
		}

		impl Deref for $name {
			type Target = bool;

			fn deref(&self) -> &Self::Target {
				&$value
			}
		}
	};
}

constant_bool!(
	/// A type that can be used to represent a constant `true` boolean.
	True => true
);

constant_bool!(
	/// A type that can be used to represent a constant `false` boolean.
	False => false
);

#[cfg(test)]
mod tests {
	use serde_test::{assert_de_tokens_error, assert_tokens, Token};

	use super::{False, True};

	#[test]
	fn assert_true_types() {
		assert_tokens(&True, &[Token::Bool(true)]);
	}

	#[test]
	fn assert_false_types() {
		assert_tokens(&False, &[Token::Bool(false)]);
	}

	#[test]
	fn opposite_value_is_rejected() {
		assert_de_tokens_error::<True>(&[Token::Bool(false)], "bool is not true");
		assert_de_tokens_error::<False>(&[Token::Bool(true)], "bool is not false");
	}
}
