use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection},
		Path,
		State,
	},
	http::StatusCode,
	Json,
};
use models::api::user::*;

use super::{normalize_changes, user_not_found};
use crate::{
	app::AppState,
	prelude::*,
	utils::{extractors::AuthenticatedUser, validator},
};

/// Lists every user. Only admins can do this.
pub async fn list_users(
	State(state): State<AppState>,
	user: AuthenticatedUser,
) -> Result<ApiSuccessResponse<ListUsersResponse>, ApiErrorResponse> {
	user.require_admin()?;

	let users = state
		.users
		.list()
		.await
		.map_err(|err| err.into_error_type())?
		.iter()
		.map(|user| user.profile())
		.collect();

	Ok(ApiSuccessResponse::ok(ListUsersResponse { users }))
}

/// Creates an account on behalf of someone else, with any role. Only admins
/// can do this.
#[instrument(skip_all)]
pub async fn create_user(
	State(state): State<AppState>,
	user: AuthenticatedUser,
	body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccessResponse<CreateUserResponse>, ApiErrorResponse> {
	user.require_admin()?;
	let Json(CreateUserRequest {
		email,
		password,
		name,
		phone,
		role,
	}) = body.map_err(|rejection| {
		debug!("Unable to parse create user request: {}", rejection);
		ErrorType::WrongParameters
	})?;

	if !validator::is_email_valid(&validator::normalize_email(&email)) {
		return Err(ErrorType::InvalidEmail.into());
	}
	if password
		.as_deref()
		.is_some_and(|password| !validator::is_password_valid(password))
	{
		return Err(ErrorType::PasswordTooWeak.into());
	}
	let phone = phone
		.as_deref()
		.map(str::trim)
		.filter(|phone| !phone.is_empty());
	if phone.is_some_and(|phone| !validator::is_phone_number_valid(phone)) {
		return Err(ErrorType::InvalidPhoneNumber.into());
	}

	let created = state
		.sessions
		.identity()
		.create_account(&email, password.as_deref(), name.as_deref(), phone, role)
		.await
		.map_err(|err| err.into_error_type())?;

	info!("User `{}` created by `{}`", created.id, user.0.user_id);
	Ok(ApiSuccessResponse::with_status(
		StatusCode::CREATED,
		CreateUserResponse {
			user: created.profile(),
		},
	))
}

/// Fetches a single user. Users can fetch themselves, admins can fetch anyone.
/// The permission is checked before the lookup, so that a standard user
/// cannot find out which ids exist.
pub async fn get_user(
	State(state): State<AppState>,
	user: AuthenticatedUser,
	user_id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiSuccessResponse<GetUserResponse>, ApiErrorResponse> {
	let Path(user_id) = user_id.map_err(|rejection| {
		debug!("Invalid user id in path: {}", rejection);
		ErrorType::WrongParameters
	})?;
	user.require_self_or_admin(&user_id)?;

	let found = state
		.users
		.find_by_id(&user_id)
		.await
		.map_err(|err| err.into_error_type())?
		.ok_or_else(user_not_found)?;

	Ok(ApiSuccessResponse::ok(GetUserResponse {
		user: found.profile(),
	}))
}

/// Updates any user, including their role. Only admins can do this. Only the
/// fields present in the body are changed.
#[instrument(skip_all)]
pub async fn update_user(
	State(state): State<AppState>,
	user: AuthenticatedUser,
	user_id: Result<Path<Uuid>, PathRejection>,
	body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccessResponse<UpdateUserResponse>, ApiErrorResponse> {
	let Path(user_id) = user_id.map_err(|rejection| {
		debug!("Invalid user id in path: {}", rejection);
		ErrorType::WrongParameters
	})?;
	user.require_admin()?;
	let Json(UpdateUserRequest { mut profile, role }) = body.map_err(|rejection| {
		debug!("Unable to parse user update: {}", rejection);
		ErrorType::WrongParameters
	})?;

	normalize_changes(&mut profile)?;

	let updated = if profile.is_empty() && role.is_none() {
		debug!("User update has no changes");
		state.users.find_by_id(&user_id).await
	} else {
		state.users.update_user(&user_id, &profile, role).await
	}
	.map_err(|err| err.into_error_type())?
	.ok_or_else(user_not_found)?;

	info!("User `{}` updated by `{}`", user_id, user.0.user_id);
	Ok(ApiSuccessResponse::ok(UpdateUserResponse {
		user: updated.profile(),
	}))
}

/// Deletes a user. Only admins can do this. The sessions of the user are not
/// revoked here: their refresh tokens stop working on the next refresh, since
/// the user no longer exists.
#[instrument(skip_all)]
pub async fn delete_user(
	State(state): State<AppState>,
	user: AuthenticatedUser,
	user_id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiSuccessResponse<DeleteUserResponse>, ApiErrorResponse> {
	let Path(user_id) = user_id.map_err(|rejection| {
		debug!("Invalid user id in path: {}", rejection);
		ErrorType::WrongParameters
	})?;
	user.require_admin()?;

	let deleted = state
		.users
		.delete(&user_id)
		.await
		.map_err(|err| err.into_error_type())?;
	if !deleted {
		return Err(user_not_found());
	}

	info!("User `{}` deleted by `{}`", user_id, user.0.user_id);
	Ok(ApiSuccessResponse::ok(DeleteUserResponse {}))
}
