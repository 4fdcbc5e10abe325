use axum::{
	routing::{get, post},
	Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use models::utils::constants::REFRESH_TOKEN_COOKIE;
use time::Duration;

mod create_account;
mod federation;
mod login;
mod logout;
mod renew_access_token;

use self::{create_account::*, federation::*, login::*, logout::*, renew_access_token::*};
use crate::{app::AppState, prelude::*};

#[instrument(skip(state))]
pub fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.route("/auth/register", post(create_account))
		.route("/auth/login", post(login))
		.route("/auth/refresh-token", post(renew_access_token))
		.route("/auth/logout", post(logout))
		.route("/auth/federation/callback", get(federation_callback))
		.with_state(state.clone())
}

/// The cookie the refresh token is handed to the browser in. It lives exactly
/// as long as the token itself and is never readable from scripts.
fn refresh_token_cookie(
	config: &AppConfig,
	refresh_token: String,
	validity: Duration,
) -> Cookie<'static> {
	Cookie::build((REFRESH_TOKEN_COOKIE, refresh_token))
		.http_only(true)
		.secure(config.is_production())
		.same_site(SameSite::Strict)
		.path("/")
		.max_age(validity)
		.build()
}

/// Reads the refresh token from its cookie, falling back to the one in the
/// request body
fn refresh_token_from(
	cookie: Option<&Cookie<'_>>,
	body_token: Option<String>,
) -> Option<String> {
	cookie
		.map(|cookie| cookie.value().to_string())
		.filter(|token| !token.is_empty())
		.or(body_token)
}
