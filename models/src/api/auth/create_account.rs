use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// The body of a registration request for a password account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
	/// The email address to register with. Must be unique
	pub email: String,
	/// The password of the new account
	pub password: String,
	/// The display name of the user
	#[serde(default)]
	pub name: Option<String>,
	/// The phone number of the user. Must be unique if given
	#[serde(default)]
	pub phone: Option<String>,
}

/// The response to a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
	/// The account that was created
	pub user: BasicUserInfo,
}
