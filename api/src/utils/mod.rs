/// The configuration of the service, parsed once at startup.
pub mod config;
/// The axum extractors used by the endpoints, such as the access token
/// authenticator.
pub mod extractors;
/// The middlewares mounted on the router.
pub mod layers;
/// Sets up the global `tracing` subscriber.
pub mod logger;
/// Resolves the frontend origin a redirect is allowed to point to.
pub mod origin;
/// Validation of user supplied fields, run before any of the core logic.
pub mod validator;

/// The constants module contains all the constants that are used throughout
/// the service.
pub mod constants {
	/// The issuer (iss) of every JWT minted by the service.
	pub const JWT_ISSUER: &str = concat!("urn:", env!("CARGO_PKG_NAME"));
	/// The parameters that will be used to hash, using argon2 as the hashing
	/// algorithm.
	pub const HASHING_PARAMS: argon2::Params =
		if let Ok(params) = argon2::Params::new(8192, 4, 4, None) {
			params
		} else {
			panic!("Failed to create hashing params");
		};
	/// The path on the frontend that a successful federated login is handed
	/// back to.
	pub const FEDERATION_CALLBACK_PATH: &str = "/auth/callback";
	/// The minimum number of characters a password must have
	pub const MIN_PASSWORD_LENGTH: usize = 6;
}
