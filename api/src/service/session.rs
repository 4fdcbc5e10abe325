use std::sync::Arc;

use models::{api::auth::FederationError, utils::constants::*};
use time::{Duration, OffsetDateTime};
use url::Url;

use crate::{
	db::{RefreshTokenRecord, RefreshTokenStore, User, UserStore},
	prelude::*,
	service::{
		AccessTokenData,
		FederatedIdentity,
		IdentityError,
		IdentityVerifier,
		RefreshTokenData,
		TokenCodec,
		TokenError,
	},
	utils::validator,
};

/// What a successful password login hands back to the caller
#[derive(Debug, Clone)]
pub struct LoginSession {
	/// A fresh access token
	pub access_token: String,
	/// A fresh refresh token. Its record has already been persisted
	pub refresh_token: String,
	/// How long the refresh token is valid for. The cookie carrying it should
	/// live exactly as long
	pub refresh_validity: Duration,
	/// The user that logged in
	pub user: User,
}

/// Orchestrates the lifecycle of a session. A session starts with a login
/// (password or federated), gets new access tokens through its refresh token,
/// and ends with a logout or when its refresh token stops being valid.
///
/// The manager holds no state of its own. Everything that persists lives in
/// the stores.
#[derive(Clone)]
pub struct SessionManager {
	codec: TokenCodec,
	identity: IdentityVerifier,
	users: Arc<dyn UserStore>,
	refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl SessionManager {
	pub fn new(
		config: &AppConfig,
		users: Arc<dyn UserStore>,
		refresh_tokens: Arc<dyn RefreshTokenStore>,
	) -> Self {
		Self {
			codec: TokenCodec::new(&config.auth),
			identity: IdentityVerifier::new(config.password_pepper.clone(), users.clone()),
			users,
			refresh_tokens,
		}
	}

	pub fn identity(&self) -> &IdentityVerifier {
		&self.identity
	}

	/// Logs a user in with their email and password. On success both tokens
	/// are minted and the refresh token record is persisted.
	#[instrument(skip(self, password))]
	pub async fn login(
		&self,
		email: Option<&str>,
		password: Option<&str>,
	) -> Result<LoginSession, ErrorType> {
		let (Some(email), Some(password)) = (
			email.filter(|email| !email.trim().is_empty()),
			password.filter(|password| !password.is_empty()),
		) else {
			debug!("Login attempted without an email or password");
			return Err(ErrorType::MissingFields);
		};

		let email = validator::normalize_email(email);
		let Some(user) = self
			.users
			.find_by_email(&email)
			.await
			.map_err(|err| err.into_error_type())?
		else {
			info!("Login attempted for an unknown email");
			return Err(ErrorType::InvalidCredentials);
		};

		let password_matches = self
			.identity
			.verify_password(password, &user)
			.await
			.map_err(IdentityError::into_error_type)?;
		if !password_matches {
			info!("Wrong password for user `{}`", user.id);
			return Err(ErrorType::InvalidCredentials);
		}

		let access_token = self
			.codec
			.mint_access(&user)
			.map_err(TokenError::into_error_type)?;
		let refresh_token = self
			.codec
			.mint_refresh(&user)
			.map_err(TokenError::into_error_type)?;

		self.refresh_tokens
			.insert(&RefreshTokenRecord {
				user_id: user.id,
				token: refresh_token.clone(),
				created: OffsetDateTime::now_utc(),
			})
			.await
			.map_err(|err| err.into_error_type())?;

		info!("User `{}` logged in", user.id);
		Ok(LoginSession {
			access_token,
			refresh_token,
			refresh_validity: self.codec.refresh_validity(),
			user,
		})
	}

	/// Mints a new access token from a refresh token. The refresh token must
	/// verify under the refresh secret, still have its record in the store,
	/// and still point at an existing user. The refresh token itself is left
	/// untouched.
	#[instrument(skip_all)]
	pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, ErrorType> {
		let Some(refresh_token) = refresh_token.filter(|token| !token.is_empty()) else {
			debug!("Refresh attempted without a token");
			return Err(ErrorType::TokenRequired);
		};

		let claims = match self.codec.verify::<RefreshTokenData>(refresh_token) {
			Ok(claims) => claims,
			Err(TokenError::Expired) => {
				info!("Refresh token has expired. Removing its record");
				self.revoke(refresh_token).await?;
				return Err(ErrorType::TokenExpired);
			}
			Err(err) => return Err(err.into_error_type()),
		};

		if self
			.refresh_tokens
			.find_by_token(refresh_token)
			.await
			.map_err(|err| err.into_error_type())?
			.is_none()
		{
			info!("Refresh token for user `{}` has no record", claims.user_id);
			return Err(ErrorType::RefreshTokenNotFound);
		}

		let Some(user) = self
			.users
			.find_by_id(&claims.user_id)
			.await
			.map_err(|err| err.into_error_type())?
		else {
			info!(
				"User `{}` no longer exists. Removing their refresh token",
				claims.user_id
			);
			self.revoke(refresh_token).await?;
			return Err(ErrorType::UserNotFound);
		};

		let access_token = self
			.codec
			.mint_access(&user)
			.map_err(TokenError::into_error_type)?;

		debug!("Access token renewed for user `{}`", user.id);
		Ok(access_token)
	}

	/// Ends a session. The refresh token is optional, and one that was never
	/// issued is fine: logging out always succeeds unless the store fails.
	#[instrument(skip_all)]
	pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), ErrorType> {
		match refresh_token.filter(|token| !token.is_empty()) {
			Some(refresh_token) => {
				self.revoke(refresh_token).await?;
				info!("Session logged out");
			}
			None => debug!("Logout without a refresh token"),
		}
		Ok(())
	}

	/// Hands a federated login back to the frontend. Only an access token is
	/// minted, and it travels in the redirect along with the user id. Every
	/// outcome is a redirect on `origin`, which must already be one of the
	/// allowed frontend origins.
	#[instrument(skip(self, principal))]
	pub async fn federation_callback(
		&self,
		principal: Option<&FederatedIdentity>,
		origin: &Url,
	) -> Url {
		let Some(principal) = principal else {
			info!("Federated login did not produce an identity");
			return federation_failure(origin, FederationError::AuthFailed);
		};

		let user = match self.identity.accept_federated_identity(principal).await {
			Ok(user) => user,
			Err(IdentityError::InvalidFederatedEmail) => {
				return federation_failure(origin, FederationError::AuthFailed);
			}
			Err(err) => {
				error!("Unable to accept federated identity: {}", err);
				return federation_failure(origin, FederationError::ServerError);
			}
		};
		let result = self
			.codec
			.mint_access(&user)
			.map(|access_token| (user, access_token));

		match result {
			Ok((user, access_token)) => {
				info!(
					"User `{}` logged in through `{}`",
					user.id, principal.provider
				);
				let mut redirect = origin.clone();
				redirect.set_path(constants::FEDERATION_CALLBACK_PATH);
				redirect
					.query_pairs_mut()
					.clear()
					.append_pair(FEDERATION_TOKEN_QUERY, &access_token)
					.append_pair(FEDERATION_USER_ID_QUERY, &user.id.to_string());
				redirect
			}
			Err(err) => {
				error!("Federated login failed: {:?}", err);
				federation_failure(origin, FederationError::ServerError)
			}
		}
	}

	/// Verifies an access token presented with a request
	pub fn authenticate(&self, access_token: Option<&str>) -> Result<AccessTokenData, ErrorType> {
		let Some(access_token) = access_token.filter(|token| !token.is_empty()) else {
			return Err(ErrorType::TokenRequired);
		};

		self.codec
			.verify::<AccessTokenData>(access_token)
			.map_err(TokenError::into_error_type)
	}

	/// Deletes the record of a refresh token
	async fn revoke(&self, refresh_token: &str) -> Result<(), ErrorType> {
		self.refresh_tokens
			.delete_by_token(refresh_token)
			.await
			.map_err(|err| err.into_error_type())
	}
}

/// The redirect for a federated login that did not end in a session
fn federation_failure(origin: &Url, reason: FederationError) -> Url {
	let mut redirect = origin.clone();
	redirect
		.query_pairs_mut()
		.clear()
		.append_pair("auth", "login")
		.append_pair("error", reason.as_str());
	redirect
}
