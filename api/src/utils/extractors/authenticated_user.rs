use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
	headers::{authorization::Bearer, Authorization},
	typed_header::TypedHeaderRejectionReason,
	TypedHeader,
};

use crate::{app::AppState, prelude::*, service::AccessTokenData};

/// Extractor for the user making the request, authenticated by the access
/// token in the `Authorization: Bearer` header. The rejection tells apart a
/// missing token, an expired one and one that is invalid, since the client
/// handles each of them differently.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(
	/// The claims of the verified access token
	pub AccessTokenData,
);

impl AuthenticatedUser {
	/// Rejects the request unless the user is an admin
	pub fn require_admin(&self) -> Result<(), ErrorType> {
		if self.0.role == UserRole::Admin {
			Ok(())
		} else {
			info!("User `{}` is not an admin", self.0.user_id);
			Err(ErrorType::Unauthorized)
		}
	}

	/// Rejects the request unless the user is the given user, or an admin
	pub fn require_self_or_admin(&self, user_id: &Uuid) -> Result<(), ErrorType> {
		if &self.0.user_id == user_id {
			Ok(())
		} else {
			self.require_admin()
		}
	}
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
	type Rejection = ApiErrorResponse;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
		{
			Ok(TypedHeader(Authorization(bearer))) => Some(bearer),
			Err(rejection) if matches!(rejection.reason(), TypedHeaderRejectionReason::Missing) => {
				None
			}
			Err(rejection) => {
				debug!("Unable to parse authorization header: {}", rejection);
				return Err(ErrorType::TokenInvalid.into());
			}
		};

		state
			.sessions
			.authenticate(token.as_ref().map(Bearer::token))
			.map(Self)
			.map_err(|err| match err {
				ErrorType::TokenRequired => {
					ApiErrorResponse::error_with_message(err, "Access token required")
				}
				err => err.into(),
			})
	}
}
