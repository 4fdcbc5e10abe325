use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// The body of a login request. Both fields are optional on the wire so that
/// a missing field is reported as [`ErrorType::MissingFields`] rather than as
/// an unparseable body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
	/// The email address of the account
	#[serde(default)]
	pub email: Option<String>,
	/// The password of the account
	#[serde(default)]
	pub password: Option<String>,
}

/// The response to a successful login. The refresh token is not part of the
/// body; it is handed out as an HTTP-only cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	/// The short lived access token, to be sent as a bearer token
	pub access_token: String,
	/// A summary of the user that logged in
	pub user: BasicUserInfo,
}
