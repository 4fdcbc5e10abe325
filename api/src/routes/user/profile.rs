use axum::{
	extract::{rejection::JsonRejection, State},
	Json,
};
use models::api::user::*;

use super::{normalize_changes, user_not_found};
use crate::{
	app::AppState,
	prelude::*,
	utils::extractors::AuthenticatedUser,
};

pub async fn get_profile(
	State(state): State<AppState>,
	AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<ApiSuccessResponse<GetProfileResponse>, ApiErrorResponse> {
	let user = state
		.users
		.find_by_id(&claims.user_id)
		.await
		.map_err(|err| err.into_error_type())?
		.ok_or_else(user_not_found)?;

	Ok(ApiSuccessResponse::ok(GetProfileResponse {
		user: user.profile(),
	}))
}

/// Updates the caller's own profile. Only the fields present in the body are
/// changed. The email is normalized before it is stored, and taking an email
/// or phone number that another account already uses is rejected.
#[instrument(skip_all, fields(user_id = %claims.user_id))]
pub async fn update_profile(
	State(state): State<AppState>,
	AuthenticatedUser(claims): AuthenticatedUser,
	body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ApiSuccessResponse<UpdateProfileResponse>, ApiErrorResponse> {
	let Json(mut changes) = body.map_err(|rejection| {
		debug!("Unable to parse profile update: {}", rejection);
		ErrorType::WrongParameters
	})?;

	normalize_changes(&mut changes)?;

	let user = if changes.is_empty() {
		debug!("Profile update has no changes");
		state.users.find_by_id(&claims.user_id).await
	} else {
		state.users.update_profile(&claims.user_id, &changes).await
	}
	.map_err(|err| err.into_error_type())?
	.ok_or_else(user_not_found)?;

	info!("Profile updated");
	Ok(ApiSuccessResponse::ok(UpdateProfileResponse {
		user: user.profile(),
	}))
}
