use serde::{Deserialize, Serialize};

/// The optional body of a token renewal request. Browsers send the refresh
/// token in the `refreshToken` cookie instead, which takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewAccessTokenRequest {
	/// The refresh token that was handed out on login
	#[serde(default)]
	pub refresh_token: Option<String>,
}

/// The response to a successful renewal. Only a new access token is issued;
/// the refresh token stays as it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewAccessTokenResponse {
	/// The new access token which will be used for authentication by the user
	pub access_token: String,
}
