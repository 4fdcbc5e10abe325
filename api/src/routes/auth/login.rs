use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use models::api::auth::*;

use super::refresh_token_cookie;
use crate::{app::AppState, prelude::*};

/// Logs a user in with their email and password. The access token is returned
/// in the body, the refresh token is handed out in an HTTP-only cookie. A body
/// that is missing altogether counts as missing both fields.
pub async fn login(
	State(state): State<AppState>,
	jar: CookieJar,
	body: Option<Json<LoginRequest>>,
) -> Result<(CookieJar, ApiSuccessResponse<LoginResponse>), ApiErrorResponse> {
	let LoginRequest { email, password } = body.map(|Json(body)| body).unwrap_or_default();

	let session = state
		.sessions
		.login(email.as_deref(), password.as_deref())
		.await?;

	let jar = jar.add(refresh_token_cookie(
		&state.config,
		session.refresh_token,
		session.refresh_validity,
	));

	Ok((
		jar,
		ApiSuccessResponse::ok(LoginResponse {
			access_token: session.access_token,
			user: session.user.basic_info(),
		}),
	))
}
