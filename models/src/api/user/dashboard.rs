use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// What the access token of the caller says about them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
	/// The id of the logged in user
	pub user_id: Uuid,
	/// The email of the user, as of when the token was issued
	pub email: String,
	/// The role of the user, as of when the token was issued
	pub role: UserRole,
}
