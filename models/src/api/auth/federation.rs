use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The marker placed in the `error` query parameter when a federated login
/// could not be completed. The frontend reads it off the redirect URL.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FederationError {
	/// The identity provider did not hand over a verified principal
	AuthFailed,
	/// The principal was verified, but the server failed to sign the user in
	ServerError,
}

impl FederationError {
	/// The value used in the redirect query string
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::AuthFailed => "auth_failed",
			Self::ServerError => "server_error",
		}
	}
}

impl Display for FederationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};

	use super::FederationError;

	#[test]
	fn query_markers_match_serialized_form() {
		for (error, marker) in [
			(FederationError::AuthFailed, "auth_failed"),
			(FederationError::ServerError, "server_error"),
		] {
			assert_eq!(error.as_str(), marker);
			assert_tokens(&error, &[Token::UnitVariant {
				name: "FederationError",
				variant: marker,
			}]);
		}
	}
}
