use serde::{Deserialize, Serialize};

/// The optional body of a logout request. As with renewal, the cookie is
/// preferred when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
	/// The refresh token of the session to end
	#[serde(default)]
	pub refresh_token: Option<String>,
}

/// Logout always succeeds, so there is nothing to report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {}
