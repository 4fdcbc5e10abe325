use serde::{Deserialize, Serialize};

use crate::UserProfile;

/// The response when fetching the profile of the logged in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileResponse {
	/// The profile of the logged in user
	pub user: UserProfile,
}

/// A partial update of the logged in user's own profile. Fields that are not
/// present are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
	/// The new display name
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// The new email address. Must not be used by another account
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// The new phone number. Must not be used by another account
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// The new avatar URL
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
	/// The new postal address
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}

impl UpdateProfileRequest {
	/// Whether the request would change anything at all
	pub fn is_empty(&self) -> bool {
		self.name.is_none() &&
			self.email.is_none() &&
			self.phone.is_none() &&
			self.avatar.is_none() &&
			self.address.is_none()
	}
}

/// The response to a profile update, carrying the updated profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
	/// The profile after the update was applied
	pub user: UserProfile,
}
