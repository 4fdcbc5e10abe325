mod bools;
mod uuid;

pub use self::{bools::*, uuid::*};

/// All the constants used in the application.
/// Constants are used to avoid hardcoding values, since that might introduce
/// typos.
pub mod constants {
	/// Name of the cookie the refresh token is handed out in
	pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
	/// Query parameter carrying the access token on a federation redirect
	pub const FEDERATION_TOKEN_QUERY: &str = "token";
	/// Query parameter carrying the user id on a federation redirect
	pub const FEDERATION_USER_ID_QUERY: &str = "userId";
}
