use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// The role of a user. Roles are coarse: an admin can see and manage every
/// account, a standard user only their own.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
	/// A regular account
	#[default]
	Standard,
	/// An administrator
	Admin,
}

impl UserRole {
	/// The string representation of the role, as stored and serialized
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Standard => "standard",
			Self::Admin => "admin",
		}
	}
}

impl Display for UserRole {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for UserRole {
	type Err = ErrorType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"standard" => Ok(Self::Standard),
			"admin" => Ok(Self::Admin),
			unknown => Err(ErrorType::server_error(format!("unknown role `{unknown}`"))),
		}
	}
}

// Stored as the same string it serializes to
#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Sqlite> for UserRole {
	fn type_info() -> <sqlx::Sqlite as sqlx::Database>::TypeInfo {
		<String as sqlx::Type<sqlx::Sqlite>>::type_info()
	}
}

#[cfg(feature = "sqlx")]
impl<'a> sqlx::Encode<'a, sqlx::Sqlite> for UserRole {
	fn encode_by_ref(
		&self,
		buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'a>,
	) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
		<&str as sqlx::Encode<'a, sqlx::Sqlite>>::encode(self.as_str(), buf)
	}
}

#[cfg(feature = "sqlx")]
impl<'a> sqlx::Decode<'a, sqlx::Sqlite> for UserRole {
	fn decode(
		value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'a>,
	) -> Result<Self, sqlx::error::BoxDynError> {
		let role = <&str as sqlx::Decode<'a, sqlx::Sqlite>>::decode(value)?;
		role.parse()
			.map_err(|_| format!("unknown role `{role}`").into())
	}
}

/// The publicly visible summary of a user, returned on login and by the user
/// endpoints. It never contains the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicUserInfo {
	/// The id of the user
	pub id: Uuid,
	/// The email address of the user
	pub email: String,
	/// The display name of the user
	pub name: String,
	/// The phone number of the user, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// The role of the user
	pub role: UserRole,
}

/// The full profile of a user, as seen by the user themselves or an admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// The basic info of the user
	#[serde(flatten)]
	pub basic: BasicUserInfo,
	/// A URL to the avatar of the user
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
	/// The postal address of the user
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	/// Whether the account can sign in with a password, or only through an
	/// external identity provider
	pub has_password: bool,
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};

	use super::{BasicUserInfo, UserRole};
	use crate::utils::Uuid;

	#[test]
	fn assert_role_types() {
		assert_tokens(&UserRole::Standard, &[Token::UnitVariant {
			name: "UserRole",
			variant: "standard",
		}]);
		assert_tokens(&UserRole::Admin, &[Token::UnitVariant {
			name: "UserRole",
			variant: "admin",
		}]);
	}

	#[test]
	fn role_round_trips_through_its_stored_form() {
		for role in [UserRole::Standard, UserRole::Admin] {
			assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
		}
		assert!("superuser".parse::<UserRole>().is_err());
	}

	#[test]
	fn assert_basic_user_info_types() {
		assert_tokens(
			&BasicUserInfo {
				id: Uuid::parse_str("2aef7e0e8b3c4a3b9a1c5d2e6f708192").unwrap(),
				email: "john@patr.cloud".to_string(),
				name: "John".to_string(),
				phone: None,
				role: UserRole::Standard,
			},
			&[
				Token::Struct {
					name: "BasicUserInfo",
					len: 4,
				},
				Token::Str("id"),
				Token::Str("2aef7e0e8b3c4a3b9a1c5d2e6f708192"),
				Token::Str("email"),
				Token::Str("john@patr.cloud"),
				Token::Str("name"),
				Token::Str("John"),
				Token::Str("role"),
				Token::UnitVariant {
					name: "UserRole",
					variant: "standard",
				},
				Token::StructEnd,
			],
		);
	}
}
