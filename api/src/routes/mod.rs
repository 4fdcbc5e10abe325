mod auth;
mod user;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::{app::AppState, prelude::*, utils::layers::attach_error_details};

/// Sets up the routes for the API, across all areas.
#[instrument(skip(state))]
pub fn setup_routes(state: &AppState) -> Router {
	Router::new()
		.merge(auth::setup_routes(state))
		.merge(user::setup_routes(state))
		.layer(middleware::map_response_with_state(
			state.clone(),
			attach_error_details,
		))
		.layer(TraceLayer::new_for_http())
}
