use serde::{Deserialize, Serialize};

use super::UpdateProfileRequest;
use crate::{UserProfile, UserRole};

/// An account created by an admin on behalf of someone else
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
	pub email: String,
	/// Without a password the account can only be signed into through an
	/// external identity provider
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// Defaults to a standard user
	#[serde(default)]
	pub role: UserRole,
}

/// The profile of the user that was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
	pub user: UserProfile,
}

/// A partial update of any user, made by an admin. On top of the fields a
/// user can change on their own profile, this can change the role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
	#[serde(flatten)]
	pub profile: UpdateProfileRequest,
	/// The new role
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<UserRole>,
}

/// The profile of the user after the update was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserResponse {
	pub user: UserProfile,
}

/// Every user, oldest first. Only available to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
	/// The profiles of all users
	pub users: Vec<UserProfile>,
}

/// A single user, fetched by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserResponse {
	/// The profile of the requested user
	pub user: UserProfile,
}

/// The response to deleting a user. Nothing is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUserResponse {}

#[cfg(test)]
mod tests {
	use super::{CreateUserRequest, UpdateUserRequest};
	use crate::UserRole;

	#[test]
	fn created_users_default_to_standard() {
		let request: CreateUserRequest =
			serde_json::from_str(r#"{ "email": "jane@patr.cloud" }"#).unwrap();
		assert_eq!(request.role, UserRole::Standard);
		assert!(request.password.is_none());
	}

	#[test]
	fn user_update_carries_profile_fields_next_to_the_role() {
		let request: UpdateUserRequest =
			serde_json::from_str(r#"{ "name": "Jane", "role": "admin" }"#).unwrap();
		assert_eq!(request.profile.name.as_deref(), Some("Jane"));
		assert!(request.profile.email.is_none());
		assert_eq!(request.role, Some(UserRole::Admin));

		let request: UpdateUserRequest = serde_json::from_str("{}").unwrap();
		assert!(request.profile.is_empty());
		assert!(request.role.is_none());
	}
}
