use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use models::{api::auth::*, utils::constants::REFRESH_TOKEN_COOKIE};

use super::refresh_token_from;
use crate::{app::AppState, prelude::*};

/// Mints a new access token for the refresh token in the cookie, or in the
/// body if there is no cookie. The refresh token itself is not rotated.
pub async fn renew_access_token(
	State(state): State<AppState>,
	jar: CookieJar,
	body: Option<Json<RenewAccessTokenRequest>>,
) -> Result<ApiSuccessResponse<RenewAccessTokenResponse>, ApiErrorResponse> {
	let refresh_token = refresh_token_from(
		jar.get(REFRESH_TOKEN_COOKIE),
		body.and_then(|Json(body)| body.refresh_token),
	);

	let access_token = state
		.sessions
		.refresh(refresh_token.as_deref())
		.await
		.map_err(|err| match err {
			ErrorType::TokenExpired => {
				ApiErrorResponse::error_with_message(err, "Refresh token expired")
			}
			ErrorType::TokenInvalid => {
				ApiErrorResponse::error_with_message(err, "Invalid refresh token")
			}
			err => ApiErrorResponse::error(err),
		})?;

	Ok(ApiSuccessResponse::ok(RenewAccessTokenResponse {
		access_token,
	}))
}
