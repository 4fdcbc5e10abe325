use std::fmt::{Display, Formatter};

use jsonwebtoken::{
	errors::{Error as JwtError, ErrorKind as JwtErrorKind},
	Algorithm,
	DecodingKey,
	EncodingKey,
	Header,
	TokenData,
	Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::{db::User, prelude::*};

/// The two classes of tokens the service signs. Each class has its own secret
/// and its own lifetime, and a token of one class never verifies as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
	/// A short-lived token, sent with every request to prove who the caller is
	Access,
	/// A long-lived token, only ever used to get a new access token
	Refresh,
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Access => "access",
			Self::Refresh => "refresh",
		})
	}
}

/// Everything that can go wrong while minting or verifying a token
#[derive(Debug, Error)]
pub enum TokenError {
	/// The secret for this class of token has not been configured. This is a
	/// fault in the deployment, not in the request
	#[error("no secret is configured for {0} tokens")]
	MissingSecret(TokenKind),
	/// The configured lifetime of this class of token puts its expiry out of
	/// range
	#[error("the lifetime of {0} tokens is out of range")]
	InvalidLifetime(TokenKind),
	/// The token was correctly signed, but its expiry has passed
	#[error("the token has expired")]
	Expired,
	/// The token is malformed, was signed with a different secret, or is of
	/// the wrong class
	#[error("the token could not be verified")]
	InvalidSignature,
	/// The claims could not be signed
	#[error("unable to encode token: {0}")]
	Encoding(#[source] JwtError),
}

impl TokenError {
	/// Maps the error onto the error the API reports. A deployment fault never
	/// says more than "server error" to the client.
	pub fn into_error_type(self) -> ErrorType {
		match self {
			Self::Expired => ErrorType::TokenExpired,
			Self::InvalidSignature => ErrorType::TokenInvalid,
			Self::MissingSecret(_) => ErrorType::server_error("token signing is not configured"),
			Self::InvalidLifetime(kind) => {
				error!("The lifetime of {} tokens is out of range", kind);
				ErrorType::server_error("token lifetime is misconfigured")
			}
			Self::Encoding(err) => {
				error!("Unable to encode token: {}", err);
				ErrorType::InternalServerError(err.into())
			}
		}
	}
}

/// The claims of a token. The class of the token (and therefore the secret it
/// is signed and verified with) is part of the type, so a caller cannot
/// accidentally verify a refresh token with the access secret.
pub trait TokenClaims: Serialize + DeserializeOwned {
	/// The class of token these claims belong to
	const KIND: TokenKind;

	/// The class the token claims to be, as written in its `typ` claim
	fn claimed_kind(&self) -> TokenKind;
}

/// The data stored inside an access token. Remember, JWTs can be decoded on
/// the client side, so no sensitive data should be stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
	/// The issuer of the token. Always [`constants::JWT_ISSUER`]
	pub iss: String,
	/// The class of the token. Always [`TokenKind::Access`]
	pub typ: TokenKind,
	/// The user the token was issued to
	pub user_id: Uuid,
	/// The email of the user, at the time the token was issued
	pub email: String,
	/// The role of the user, at the time the token was issued
	pub role: UserRole,
	/// When the token was issued
	#[serde(with = "datetime_as_seconds")]
	pub iat: OffsetDateTime,
	/// When the token stops being valid
	#[serde(with = "datetime_as_seconds")]
	pub exp: OffsetDateTime,
}

impl TokenClaims for AccessTokenData {
	const KIND: TokenKind = TokenKind::Access;

	fn claimed_kind(&self) -> TokenKind {
		self.typ
	}
}

/// The data stored inside a refresh token. This only identifies the user. A
/// refresh token is also only valid while its record exists in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenData {
	/// The issuer of the token. Always [`constants::JWT_ISSUER`]
	pub iss: String,
	/// The class of the token. Always [`TokenKind::Refresh`]
	pub typ: TokenKind,
	/// The user the token was issued to
	pub user_id: Uuid,
	/// A random id, so that two tokens minted for the same user in the same
	/// second are still different strings (and therefore different records)
	pub jti: Uuid,
	/// When the token was issued
	#[serde(with = "datetime_as_seconds")]
	pub iat: OffsetDateTime,
	/// When the token stops being valid
	#[serde(with = "datetime_as_seconds")]
	pub exp: OffsetDateTime,
}

impl TokenClaims for RefreshTokenData {
	const KIND: TokenKind = TokenKind::Refresh;

	fn claimed_kind(&self) -> TokenKind {
		self.typ
	}
}

/// Signs and verifies both classes of tokens. The codec owns the secrets, and
/// nothing outside of it ever sees them.
#[derive(Clone)]
pub struct TokenCodec {
	access_secret: Option<String>,
	refresh_secret: Option<String>,
	access_validity: Duration,
	refresh_validity: Duration,
}

impl TokenCodec {
	pub fn new(config: &AuthConfig) -> Self {
		Self {
			access_secret: config.access_token_secret.clone(),
			refresh_secret: config.refresh_token_secret.clone(),
			access_validity: config.access_token_validity(),
			refresh_validity: config.refresh_token_validity(),
		}
	}

	/// How long a refresh token minted by this codec lives. The refresh cookie
	/// uses the same lifetime.
	pub fn refresh_validity(&self) -> Duration {
		self.refresh_validity
	}

	/// Mints an access token carrying the id, email and role of the user
	#[instrument(skip_all, fields(user_id = %user.id))]
	pub fn mint_access(&self, user: &User) -> Result<String, TokenError> {
		let iat = OffsetDateTime::now_utc();
		self.sign(&AccessTokenData {
			iss: constants::JWT_ISSUER.to_string(),
			typ: TokenKind::Access,
			user_id: user.id,
			email: user.email.clone(),
			role: user.role,
			iat,
			exp: iat
				.checked_add(self.access_validity)
				.ok_or(TokenError::InvalidLifetime(TokenKind::Access))?,
		})
	}

	/// Mints a refresh token for the user. The caller is responsible for
	/// persisting the record that keeps it valid.
	#[instrument(skip_all, fields(user_id = %user.id))]
	pub fn mint_refresh(&self, user: &User) -> Result<String, TokenError> {
		let iat = OffsetDateTime::now_utc();
		self.sign(&RefreshTokenData {
			iss: constants::JWT_ISSUER.to_string(),
			typ: TokenKind::Refresh,
			user_id: user.id,
			jti: Uuid::new_v4(),
			iat,
			exp: iat
				.checked_add(self.refresh_validity)
				.ok_or(TokenError::InvalidLifetime(TokenKind::Refresh))?,
		})
	}

	/// Verifies a token with the secret of the class `C` belongs to, and
	/// returns its claims. Expiry is checked with no leeway.
	#[instrument(skip_all, fields(kind = %C::KIND))]
	pub fn verify<C>(&self, token: &str) -> Result<C, TokenError>
	where
		C: TokenClaims,
	{
		let secret = self.secret(C::KIND)?;

		let mut validation = Validation::new(Algorithm::HS256);
		validation.leeway = 0;
		validation.set_issuer(&[constants::JWT_ISSUER]);

		let TokenData { header: _, claims } = jsonwebtoken::decode::<C>(
			token,
			&DecodingKey::from_secret(secret.as_bytes()),
			&validation,
		)
		.map_err(|err| match err.kind() {
			JwtErrorKind::ExpiredSignature => {
				debug!("{} token has expired", C::KIND);
				TokenError::Expired
			}
			kind => {
				debug!("{} token failed verification: {:?}", C::KIND, kind);
				TokenError::InvalidSignature
			}
		})?;

		if claims.claimed_kind() != C::KIND {
			warn!(
				"{} token presented where a {} token was expected",
				claims.claimed_kind(),
				C::KIND
			);
			return Err(TokenError::InvalidSignature);
		}

		Ok(claims)
	}

	/// Signs the claims with the secret of their class
	fn sign<C>(&self, claims: &C) -> Result<String, TokenError>
	where
		C: TokenClaims,
	{
		let secret = self.secret(C::KIND)?;
		jsonwebtoken::encode(
			&Header::new(Algorithm::HS256),
			claims,
			&EncodingKey::from_secret(secret.as_bytes()),
		)
		.map_err(TokenError::Encoding)
	}

	fn secret(&self, kind: TokenKind) -> Result<&str, TokenError> {
		match kind {
			TokenKind::Access => self.access_secret.as_deref(),
			TokenKind::Refresh => self.refresh_secret.as_deref(),
		}
		.filter(|secret| !secret.is_empty())
		.ok_or_else(|| {
			error!("The {} token secret is not configured", kind);
			TokenError::MissingSecret(kind)
		})
	}
}

/// A module to help serialize and deserialize `OffsetDateTime` as seconds
mod datetime_as_seconds {
	use serde::{de::Error, Deserialize, Deserializer, Serializer};
	use time::OffsetDateTime;

	/// Serialize an `OffsetDateTime` as seconds
	pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(value.unix_timestamp())
	}

	/// Deserialize an `OffsetDateTime` from seconds
	pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		OffsetDateTime::from_unix_timestamp(i64::deserialize(deserializer)?).map_err(Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils;

	fn codec() -> TokenCodec {
		TokenCodec::new(&test_utils::auth_config())
	}

	#[test]
	fn access_token_carries_identity_and_role() {
		let user = test_utils::user("john@patr.cloud", UserRole::Admin);
		let codec = codec();

		let claims: AccessTokenData = codec.verify(&codec.mint_access(&user).unwrap()).unwrap();
		assert_eq!(claims.user_id, user.id);
		assert_eq!(claims.email, "john@patr.cloud");
		assert_eq!(claims.role, UserRole::Admin);
		assert_eq!(claims.typ, TokenKind::Access);
		assert_eq!((claims.exp - claims.iat).whole_minutes(), 15);
	}

	#[test]
	fn refresh_token_carries_user_and_marker() {
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);
		let codec = codec();

		let claims: RefreshTokenData = codec.verify(&codec.mint_refresh(&user).unwrap()).unwrap();
		assert_eq!(claims.user_id, user.id);
		assert_eq!(claims.typ, TokenKind::Refresh);
		assert_eq!((claims.exp - claims.iat).whole_days(), 7);
	}

	#[test]
	fn refresh_tokens_are_unique_per_mint() {
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);
		let codec = codec();
		assert_ne!(
			codec.mint_refresh(&user).unwrap(),
			codec.mint_refresh(&user).unwrap()
		);
	}

	#[test]
	fn classes_never_verify_as_each_other() {
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);
		let codec = codec();

		let refresh = codec.mint_refresh(&user).unwrap();
		assert!(matches!(
			codec.verify::<AccessTokenData>(&refresh),
			Err(TokenError::InvalidSignature)
		));

		let access = codec.mint_access(&user).unwrap();
		assert!(matches!(
			codec.verify::<RefreshTokenData>(&access),
			Err(TokenError::InvalidSignature)
		));
	}

	#[test]
	fn shared_secret_still_rejects_the_wrong_class() {
		let mut config = test_utils::auth_config();
		config.refresh_token_secret = config.access_token_secret.clone();
		let codec = TokenCodec::new(&config);
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);

		// Identical claim shape, only the marker differs
		let forged = codec
			.sign(&RefreshTokenData {
				iss: constants::JWT_ISSUER.to_string(),
				typ: TokenKind::Access,
				user_id: user.id,
				jti: Uuid::new_v4(),
				iat: OffsetDateTime::now_utc(),
				exp: OffsetDateTime::now_utc() + Duration::days(1),
			})
			.unwrap();
		assert!(matches!(
			codec.verify::<RefreshTokenData>(&forged),
			Err(TokenError::InvalidSignature)
		));
	}

	#[test]
	fn expired_token_is_reported_as_expired() {
		let mut config = test_utils::auth_config();
		config.access_token_validity_minutes = -1;
		config.refresh_token_validity_days = -1;
		let codec = TokenCodec::new(&config);
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);

		assert!(matches!(
			codec.verify::<AccessTokenData>(&codec.mint_access(&user).unwrap()),
			Err(TokenError::Expired)
		));
		assert!(matches!(
			codec.verify::<RefreshTokenData>(&codec.mint_refresh(&user).unwrap()),
			Err(TokenError::Expired)
		));
	}

	#[test]
	fn out_of_range_lifetime_is_an_error_not_a_panic() {
		let mut config = test_utils::auth_config();
		config.access_token_validity_minutes = i64::MAX;
		config.refresh_token_validity_days = 10_000_000;
		let codec = TokenCodec::new(&config);
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);

		assert!(matches!(
			codec.mint_access(&user),
			Err(TokenError::InvalidLifetime(TokenKind::Access))
		));
		let err = codec.mint_refresh(&user).unwrap_err();
		assert!(matches!(err, TokenError::InvalidLifetime(TokenKind::Refresh)));
		assert!(err.into_error_type().is_server_error());
	}

	#[test]
	fn tampered_or_foreign_tokens_are_invalid() {
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);
		let codec = codec();

		let mut other = test_utils::auth_config();
		other.access_token_secret = Some("some-other-secret".to_string());
		let foreign = TokenCodec::new(&other).mint_access(&user).unwrap();
		assert!(matches!(
			codec.verify::<AccessTokenData>(&foreign),
			Err(TokenError::InvalidSignature)
		));

		assert!(matches!(
			codec.verify::<AccessTokenData>("definitely.not.ajwt"),
			Err(TokenError::InvalidSignature)
		));
	}

	#[test]
	fn missing_secret_is_a_configuration_fault() {
		let mut config = test_utils::auth_config();
		config.access_token_secret = None;
		config.refresh_token_secret = Some(String::new());
		let codec = TokenCodec::new(&config);
		let user = test_utils::user("john@patr.cloud", UserRole::Standard);

		assert!(matches!(
			codec.mint_access(&user),
			Err(TokenError::MissingSecret(TokenKind::Access))
		));
		assert!(matches!(
			codec.mint_refresh(&user),
			Err(TokenError::MissingSecret(TokenKind::Refresh))
		));
		assert!(matches!(
			codec.verify::<AccessTokenData>("a.b.c"),
			Err(TokenError::MissingSecret(TokenKind::Access))
		));
	}
}
