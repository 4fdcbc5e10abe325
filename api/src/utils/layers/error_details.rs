use axum::{
	extract::State,
	response::{IntoResponse, Response},
};

use crate::{app::AppState, prelude::*};

/// Re-renders server errors with their internal cause attached, when the
/// service is configured to expose error details. Every other response is
/// passed through untouched.
pub async fn attach_error_details(State(state): State<AppState>, response: Response) -> Response {
	if !state.config.exposes_error_details() {
		return response;
	}

	match response.extensions().get::<ApiErrorResponse>() {
		Some(error) if error.body.error.is_server_error() => {
			error.clone().with_detail().into_response()
		}
		_ => response,
	}
}
