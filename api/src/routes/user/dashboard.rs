use models::api::user::*;

use crate::{prelude::*, utils::extractors::AuthenticatedUser};

/// Echoes who the access token says the caller is, without touching the
/// database
pub async fn dashboard(
	AuthenticatedUser(claims): AuthenticatedUser,
) -> ApiSuccessResponse<DashboardResponse> {
	ApiSuccessResponse::ok(DashboardResponse {
		user_id: claims.user_id,
		email: claims.email,
		role: claims.role,
	})
}
