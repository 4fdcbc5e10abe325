use axum::{
	http::StatusCode,
	routing::get,
	Router,
};
use models::api::user::UpdateProfileRequest;

mod dashboard;
mod manage_users;
mod profile;

use self::{dashboard::*, manage_users::*, profile::*};
use crate::{app::AppState, prelude::*, utils::validator};

#[instrument(skip(state))]
pub fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.route("/profile", get(get_profile).patch(update_profile))
		.route("/dashboard", get(dashboard))
		.route("/users", get(list_users).post(create_user))
		.route(
			"/users/:userId",
			get(get_user).put(update_user).delete(delete_user),
		)
		.with_state(state.clone())
}

/// A user that was looked up directly is missing. Unlike on the refresh path,
/// this is reported as a 404.
fn user_not_found() -> ApiErrorResponse {
	ApiErrorResponse::error(ErrorType::UserNotFound).with_status(StatusCode::NOT_FOUND)
}

/// Normalizes the fields of a profile update in place, rejecting an email or
/// phone number that is not valid
fn normalize_changes(changes: &mut UpdateProfileRequest) -> Result<(), ErrorType> {
	if let Some(email) = changes.email.as_mut() {
		*email = validator::normalize_email(email);
		if !validator::is_email_valid(email) {
			return Err(ErrorType::InvalidEmail);
		}
	}
	if let Some(phone) = changes.phone.as_mut() {
		*phone = phone.trim().to_string();
		if !validator::is_phone_number_valid(phone) {
			return Err(ErrorType::InvalidPhoneNumber);
		}
	}
	if let Some(name) = changes.name.as_mut() {
		*name = name.trim().to_string();
	}
	Ok(())
}
