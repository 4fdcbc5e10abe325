use std::{borrow::Cow, fmt::Display};

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

/// A wrapper around [`uuid::Uuid`] that implements [`serde::Serialize`] and
/// [`serde::Deserialize`], but specifically only in the form of a hex string.
///
/// Any other format will be rejected. In API requests and responses, as well as
/// inside token claims, this should be used instead of [`uuid::Uuid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Uuid(uuid::Uuid);

impl Uuid {
	/// Creates a new v4 (randomly generated) [`Uuid`]
	pub fn new_v4() -> Self {
		Self(uuid::Uuid::new_v4())
	}

	/// Parses a [`Uuid`] from a string of hexadecimal digits with optional
	/// hyphens.
	pub fn parse_str(input: &str) -> Result<Self, uuid::Error> {
		uuid::Uuid::try_parse(input).map(Self)
	}
}

impl Display for Uuid {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0.simple())
	}
}

impl Serialize for Uuid {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Uuid {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let mut buffer = [0u8; 16];
		let string: Cow<'de, str> = Deserialize::deserialize(deserializer)?;
		hex::decode_to_slice(string.as_ref(), &mut buffer).map_err(Error::custom)?;
		Ok(Self(uuid::Uuid::from_bytes(buffer)))
	}
}

// Stored as the same simple hex string it serializes to
#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Sqlite> for Uuid {
	fn type_info() -> <sqlx::Sqlite as sqlx::Database>::TypeInfo {
		<String as sqlx::Type<sqlx::Sqlite>>::type_info()
	}
}

#[cfg(feature = "sqlx")]
impl<'a> sqlx::Encode<'a, sqlx::Sqlite> for Uuid {
	fn encode_by_ref(
		&self,
		buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'a>,
	) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
		<String as sqlx::Encode<'a, sqlx::Sqlite>>::encode(self.to_string(), buf)
	}
}

#[cfg(feature = "sqlx")]
impl<'a> sqlx::Decode<'a, sqlx::Sqlite> for Uuid {
	fn decode(
		value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'a>,
	) -> Result<Self, sqlx::error::BoxDynError> {
		let text = <&str as sqlx::Decode<'a, sqlx::Sqlite>>::decode(value)?;
		Ok(Self::parse_str(text)?)
	}
}
