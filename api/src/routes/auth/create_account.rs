use axum::{
	extract::{rejection::JsonRejection, State},
	http::StatusCode,
	Json,
};
use models::api::auth::*;

use crate::{app::AppState, prelude::*, utils::validator};

/// Creates an account that signs in with a password. The email is stored
/// normalized, and an empty phone number is treated as no phone number.
#[instrument(skip(state, body))]
pub async fn create_account(
	State(state): State<AppState>,
	body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<ApiSuccessResponse<CreateAccountResponse>, ApiErrorResponse> {
	let Json(CreateAccountRequest {
		email,
		password,
		name,
		phone,
	}) = body.map_err(|rejection| {
		debug!("Unable to parse create account request: {}", rejection);
		ErrorType::WrongParameters
	})?;

	if !validator::is_email_valid(&validator::normalize_email(&email)) {
		return Err(ErrorType::InvalidEmail.into());
	}
	if !validator::is_password_valid(&password) {
		return Err(ErrorType::PasswordTooWeak.into());
	}
	let phone = phone
		.as_deref()
		.map(str::trim)
		.filter(|phone| !phone.is_empty());
	if phone.is_some_and(|phone| !validator::is_phone_number_valid(phone)) {
		return Err(ErrorType::InvalidPhoneNumber.into());
	}

	let user = state
		.sessions
		.identity()
		.create_password_account(&email, &password, name.as_deref(), phone)
		.await
		.map_err(|err| err.into_error_type())?;

	Ok(ApiSuccessResponse::with_status(
		StatusCode::CREATED,
		CreateAccountResponse {
			user: user.basic_info(),
		},
	))
}
