use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use models::{api::auth::*, utils::constants::REFRESH_TOKEN_COOKIE};

use super::{refresh_token_cookie, refresh_token_from};
use crate::{app::AppState, prelude::*};

/// Ends the session the refresh token belongs to. Logging out with a token
/// that is unknown, or with no token at all, still succeeds and clears the
/// cookie. Only a failing store is reported.
pub async fn logout(
	State(state): State<AppState>,
	jar: CookieJar,
	body: Option<Json<LogoutRequest>>,
) -> Result<(CookieJar, ApiSuccessResponse<LogoutResponse>), ApiErrorResponse> {
	let refresh_token = refresh_token_from(
		jar.get(REFRESH_TOKEN_COOKIE),
		body.and_then(|Json(body)| body.refresh_token),
	);

	state.sessions.logout(refresh_token.as_deref()).await?;

	// A removal is sent even when the request carried no cookie
	let mut removal = refresh_token_cookie(&state.config, String::new(), Default::default());
	removal.make_removal();

	Ok((jar.add(removal), ApiSuccessResponse::ok(LogoutResponse {})))
}
