use axum::{
	extract::State,
	http::HeaderMap,
	response::Redirect,
	Extension,
};

use crate::{app::AppState, prelude::*, service::FederatedIdentity, utils::origin};

/// Completes a login through an external identity provider. The provider
/// handshake happens in a layer in front of this handler, which hands over
/// the verified identity as a request extension. The user is always
/// redirected back to the frontend they came from, with either the tokens
/// or an error in the query.
pub async fn federation_callback(
	State(state): State<AppState>,
	headers: HeaderMap,
	identity: Option<Extension<FederatedIdentity>>,
) -> Redirect {
	let frontend_origin = origin::origin_for_request(&headers, &state.config.frontend);
	debug!("Federated login will return to `{}`", frontend_origin);

	let redirect = state
		.sessions
		.federation_callback(
			identity.as_ref().map(|Extension(identity)| identity),
			&frontend_origin,
		)
		.await;

	Redirect::to(redirect.as_str())
}
