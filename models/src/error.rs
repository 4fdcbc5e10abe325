use std::{
	error::Error as StdError,
	fmt::{Display, Formatter},
	mem,
};

use http::StatusCode;
use serde::{de::Error, Deserialize, Serialize};

/// A list of all the possible errors that can be returned by the API
#[derive(Debug)]
pub enum ErrorType {
	/// The parameters sent with the request could not be parsed. This would
	/// ideally not happen unless there is a bug in the client
	WrongParameters,
	/// A field that is required for this request was not provided
	MissingFields,
	/// The email provided is not a valid email address
	InvalidEmail,
	/// The password provided does not meet the minimum requirements
	PasswordTooWeak,
	/// The phone number provided is not a valid phone number
	InvalidPhoneNumber,
	/// The email and password combination does not match any account
	InvalidCredentials,
	/// The account exists but has no password set. It can only be accessed
	/// through an external identity provider
	FederationOnlyAccount,
	/// No token was provided with a request that requires one. The client
	/// should prompt the user to login again
	TokenRequired,
	/// The token provided has expired. On the refresh path this is terminal
	/// and the user must login again
	TokenExpired,
	/// The token provided failed signature or structural verification. The
	/// client should discard its cached credential
	TokenInvalid,
	/// The refresh token is correctly signed, but it has been revoked
	RefreshTokenNotFound,
	/// The user referenced by the request does not exist
	UserNotFound,
	/// The authenticated user is not allowed to perform the requested action
	Unauthorized,
	/// The email provided is not available. It is being used by another account
	EmailUnavailable,
	/// The phone number provided is not available. It is being used by another
	/// account
	PhoneUnavailable,
	/// An internal server error occurred. This should not happen unless there
	/// is a bug in the server
	InternalServerError(anyhow::Error),
}

impl ErrorType {
	/// Returns the status code that should be used for this error. Note that
	/// this is only the default status code and specific endpoints can override
	/// this if needed
	pub fn default_status_code(&self) -> StatusCode {
		match self {
			Self::WrongParameters => StatusCode::BAD_REQUEST,
			Self::MissingFields => StatusCode::BAD_REQUEST,
			Self::InvalidEmail => StatusCode::BAD_REQUEST,
			Self::PasswordTooWeak => StatusCode::BAD_REQUEST,
			Self::InvalidPhoneNumber => StatusCode::BAD_REQUEST,
			Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
			Self::FederationOnlyAccount => StatusCode::UNAUTHORIZED,
			Self::TokenRequired => StatusCode::UNAUTHORIZED,
			Self::TokenExpired => StatusCode::UNAUTHORIZED,
			Self::TokenInvalid => StatusCode::FORBIDDEN,
			Self::RefreshTokenNotFound => StatusCode::FORBIDDEN,
			Self::UserNotFound => StatusCode::FORBIDDEN,
			Self::Unauthorized => StatusCode::FORBIDDEN,
			Self::EmailUnavailable => StatusCode::BAD_REQUEST,
			Self::PhoneUnavailable => StatusCode::BAD_REQUEST,
			Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Returns the message that should be used for this error. This is the
	/// message that is user-friendly and can be shown to the user
	pub fn message(&self) -> impl Into<String> {
		match self {
			Self::WrongParameters => "The parameters sent with that request is invalid",
			Self::MissingFields => "Email and password are required",
			Self::InvalidEmail => "Invalid email",
			Self::PasswordTooWeak => "Your password must be at least 6 characters long",
			Self::InvalidPhoneNumber => "Your phone number seems to be incorrect",
			Self::InvalidCredentials => "Invalid credentials",
			Self::FederationOnlyAccount => {
				"This account is linked to an external login. Please sign in with that provider"
			}
			Self::TokenRequired => "Refresh token required",
			Self::TokenExpired => "Your token has expired. Please login again",
			Self::TokenInvalid => "Your token is invalid. Please login again",
			Self::RefreshTokenNotFound => "Refresh token not found",
			Self::UserNotFound => "User not found",
			Self::Unauthorized => "You are not authorized to perform that action",
			Self::EmailUnavailable => "Email already in use",
			Self::PhoneUnavailable => "Phone number already in use",
			Self::InternalServerError(_) => "Server error",
		}
	}

	/// Creates an [`ErrorType::InternalServerError`] with the given message
	pub fn server_error(message: impl Display) -> Self {
		Self::InternalServerError(anyhow::anyhow!(message.to_string()))
	}

	/// Whether this error is an unexpected fault on the server, as opposed to
	/// a failure the client can act on
	pub fn is_server_error(&self) -> bool {
		matches!(self, Self::InternalServerError(_))
	}
}

impl PartialEq for ErrorType {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::InternalServerError(_), Self::InternalServerError(_)) => true,
			_ => mem::discriminant(self) == mem::discriminant(other),
		}
	}
}

impl Eq for ErrorType {}

impl<Error> From<Error> for ErrorType
where
	Error: StdError + Send + Sync + 'static,
{
	fn from(error: Error) -> Self {
		Self::InternalServerError(error.into())
	}
}

impl Clone for ErrorType {
	fn clone(&self) -> Self {
		match self {
			Self::WrongParameters => Self::WrongParameters,
			Self::MissingFields => Self::MissingFields,
			Self::InvalidEmail => Self::InvalidEmail,
			Self::PasswordTooWeak => Self::PasswordTooWeak,
			Self::InvalidPhoneNumber => Self::InvalidPhoneNumber,
			Self::InvalidCredentials => Self::InvalidCredentials,
			Self::FederationOnlyAccount => Self::FederationOnlyAccount,
			Self::TokenRequired => Self::TokenRequired,
			Self::TokenExpired => Self::TokenExpired,
			Self::TokenInvalid => Self::TokenInvalid,
			Self::RefreshTokenNotFound => Self::RefreshTokenNotFound,
			Self::UserNotFound => Self::UserNotFound,
			Self::Unauthorized => Self::Unauthorized,
			Self::EmailUnavailable => Self::EmailUnavailable,
			Self::PhoneUnavailable => Self::PhoneUnavailable,
			Self::InternalServerError(arg0) => {
				Self::InternalServerError(anyhow::anyhow!(arg0.to_string()))
			}
		}
	}
}

impl Display for ErrorType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message().into())
	}
}

impl Serialize for ErrorType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(match self {
			Self::WrongParameters => "wrongParameters",
			Self::MissingFields => "missingFields",
			Self::InvalidEmail => "invalidEmail",
			Self::PasswordTooWeak => "passwordTooWeak",
			Self::InvalidPhoneNumber => "invalidPhoneNumber",
			Self::InvalidCredentials => "invalidCredentials",
			Self::FederationOnlyAccount => "federationOnlyAccount",
			Self::TokenRequired => "tokenRequired",
			Self::TokenExpired => "tokenExpired",
			Self::TokenInvalid => "tokenInvalid",
			Self::RefreshTokenNotFound => "refreshTokenNotFound",
			Self::UserNotFound => "userNotFound",
			Self::Unauthorized => "unauthorized",
			Self::EmailUnavailable => "emailUnavailable",
			Self::PhoneUnavailable => "phoneUnavailable",
			Self::InternalServerError(_) => "internalServerError",
		})
	}
}

impl<'de> Deserialize<'de> for ErrorType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let string = String::deserialize(deserializer)?;
		Ok(match string.as_str() {
			"wrongParameters" => Self::WrongParameters,
			"missingFields" => Self::MissingFields,
			"invalidEmail" => Self::InvalidEmail,
			"passwordTooWeak" => Self::PasswordTooWeak,
			"invalidPhoneNumber" => Self::InvalidPhoneNumber,
			"invalidCredentials" => Self::InvalidCredentials,
			"federationOnlyAccount" => Self::FederationOnlyAccount,
			"tokenRequired" => Self::TokenRequired,
			"tokenExpired" => Self::TokenExpired,
			"tokenInvalid" => Self::TokenInvalid,
			"refreshTokenNotFound" => Self::RefreshTokenNotFound,
			"userNotFound" => Self::UserNotFound,
			"unauthorized" => Self::Unauthorized,
			"emailUnavailable" => Self::EmailUnavailable,
			"phoneUnavailable" => Self::PhoneUnavailable,
			"internalServerError" => {
				Self::InternalServerError(anyhow::anyhow!("Internal Server Error"))
			}
			unknown => return Err(Error::custom(format!("unknown variant: {unknown}"))),
		})
	}
}

#[cfg(test)]
mod tests {
	use http::StatusCode;
	use serde_test::{assert_tokens, Token};

	use super::ErrorType;

	#[test]
	fn token_failures_have_distinct_wire_names() {
		assert_tokens(&ErrorType::TokenRequired, &[Token::Str("tokenRequired")]);
		assert_tokens(&ErrorType::TokenExpired, &[Token::Str("tokenExpired")]);
		assert_tokens(&ErrorType::TokenInvalid, &[Token::Str("tokenInvalid")]);
		assert_tokens(
			&ErrorType::RefreshTokenNotFound,
			&[Token::Str("refreshTokenNotFound")],
		);
	}

	#[test]
	fn federation_only_is_not_invalid_credentials() {
		assert_ne!(
			ErrorType::FederationOnlyAccount,
			ErrorType::InvalidCredentials
		);
		assert_eq!(
			ErrorType::FederationOnlyAccount.default_status_code(),
			StatusCode::UNAUTHORIZED
		);
		let federation_only: String = ErrorType::FederationOnlyAccount.message().into();
		let invalid: String = ErrorType::InvalidCredentials.message().into();
		assert_ne!(federation_only, invalid);
	}

	#[test]
	fn server_errors_compare_equal_regardless_of_cause() {
		assert_eq!(
			ErrorType::server_error("database went away"),
			ErrorType::server_error("signing key missing")
		);
		assert!(ErrorType::server_error("boom").is_server_error());
		assert_eq!(
			ErrorType::server_error("boom").to_string(),
			"Server error"
		);
	}

	#[test]
	fn unknown_variant_is_rejected() {
		let result = serde_json::from_str::<ErrorType>("\"somethingElse\"");
		assert!(result.is_err());
	}
}
