use std::{
	fmt::{Display, Formatter},
	net::SocketAddr,
};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use time::Duration;
use url::Url;

/// The configuration of the service. This is parsed once at startup and
/// injected into every component, so nothing reads the process environment
/// after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	/// The address to listen for connections on
	#[serde(alias = "bindaddress")]
	pub bind_address: SocketAddr,
	/// The environment the application is running in. This is set at runtime
	/// based on an environment variable and if the application is compiled with
	/// debug mode.
	pub environment: RunningEnvironment,
	/// The pepper mixed into every password hash
	#[serde(alias = "passwordpepper")]
	pub password_pepper: String,
	/// The configuration for the database to connect to
	pub database: DatabaseConfig,
	/// The secrets and lifetimes of the tokens the service hands out
	pub auth: AuthConfig,
	/// Where the frontend lives, used to build redirects
	pub frontend: FrontendConfig,
	/// Whether error responses carry the internal cause of a server error.
	/// Defaults to on in development and off in production.
	#[serde(default, alias = "exposeerrordetails")]
	pub expose_error_details: Option<bool>,
}

impl AppConfig {
	/// Get the config from the config files and the environment. Environment
	/// variables are prefixed with `APP_` and use `_` as the separator, so
	/// `APP_AUTH_ACCESSTOKENSECRET` sets `auth.accessTokenSecret`.
	pub fn parse() -> Result<Self, ConfigError> {
		let env = if cfg!(debug_assertions) {
			"dev".to_string()
		} else {
			std::env::var("APP_ENV").unwrap_or_else(|_| "prod".into())
		};

		match env.as_ref() {
			"prod" | "production" => Config::builder()
				.add_source(File::with_name("config/prod").required(false))
				.set_default("environment", "production")?,
			"dev" | "development" => Config::builder()
				.add_source(
					File::with_name(concat!(env!("CARGO_MANIFEST_DIR"), "/../config/dev"))
						.required(false),
				)
				.set_default("environment", "development")?,
			unknown => {
				return Err(ConfigError::Message(format!(
					"Unknown running environment `{unknown}`"
				)));
			}
		}
		.add_source(Environment::with_prefix("APP").separator("_"))
		.build()?
		.try_deserialize::<Self>()
		.and_then(|config| {
			config.auth.validate()?;
			Ok(config)
		})
	}

	/// Whether the internal cause of a server error should be sent to the
	/// client
	pub fn exposes_error_details(&self) -> bool {
		self.expose_error_details
			.unwrap_or(self.environment == RunningEnvironment::Development)
	}

	/// Whether cookies handed out should be marked as `Secure`
	pub fn is_production(&self) -> bool {
		self.environment == RunningEnvironment::Production
	}
}

/// The environment the application is running in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunningEnvironment {
	/// The application is running in development mode
	Development,
	/// The application is running in production mode
	Production,
}

impl Display for RunningEnvironment {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"{}",
			match self {
				RunningEnvironment::Development => "Development",
				RunningEnvironment::Production => "Production",
			}
		)
	}
}

/// The configuration for the database to connect to. This is the store for
/// both the users and the refresh token records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
	/// The location of the sqlite database file
	pub file: String,
	/// The maximum number of connections to the database
	#[serde(alias = "connectionlimit")]
	pub connection_limit: u32,
}

/// The secrets used to sign the tokens, and how long each kind of token lives.
///
/// A missing secret does not stop the service from starting. Minting or
/// verifying a token of that kind fails with a server error instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
	/// The secret access tokens are signed with
	#[serde(default, alias = "accesstokensecret")]
	pub access_token_secret: Option<String>,
	/// The secret refresh tokens are signed with. Must differ from the access
	/// token secret
	#[serde(default, alias = "refreshtokensecret")]
	pub refresh_token_secret: Option<String>,
	/// How long an access token is valid for, in minutes
	#[serde(
		default = "default_access_token_validity_minutes",
		alias = "accesstokenvalidityminutes"
	)]
	pub access_token_validity_minutes: i64,
	/// How long a refresh token (and the cookie carrying it) is valid for, in
	/// days
	#[serde(
		default = "default_refresh_token_validity_days",
		alias = "refreshtokenvaliditydays"
	)]
	pub refresh_token_validity_days: i64,
}

impl AuthConfig {
	/// The longest an access token may be configured to live, in minutes
	pub const MAX_ACCESS_TOKEN_VALIDITY_MINUTES: i64 = 24 * 60;
	/// The longest a refresh token may be configured to live, in days
	pub const MAX_REFRESH_TOKEN_VALIDITY_DAYS: i64 = 365;

	/// Checks that both lifetimes are positive and within their maximum
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(1..=Self::MAX_ACCESS_TOKEN_VALIDITY_MINUTES)
			.contains(&self.access_token_validity_minutes)
		{
			return Err(ConfigError::Message(format!(
				"auth.accessTokenValidityMinutes must be between 1 and {}, got {}",
				Self::MAX_ACCESS_TOKEN_VALIDITY_MINUTES,
				self.access_token_validity_minutes
			)));
		}
		if !(1..=Self::MAX_REFRESH_TOKEN_VALIDITY_DAYS).contains(&self.refresh_token_validity_days) {
			return Err(ConfigError::Message(format!(
				"auth.refreshTokenValidityDays must be between 1 and {}, got {}",
				Self::MAX_REFRESH_TOKEN_VALIDITY_DAYS,
				self.refresh_token_validity_days
			)));
		}
		Ok(())
	}

	/// The lifetime of an access token
	pub fn access_token_validity(&self) -> Duration {
		Duration::seconds(self.access_token_validity_minutes.saturating_mul(60))
	}

	/// The lifetime of a refresh token
	pub fn refresh_token_validity(&self) -> Duration {
		Duration::seconds(self.refresh_token_validity_days.saturating_mul(24 * 60 * 60))
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			access_token_secret: None,
			refresh_token_secret: None,
			access_token_validity_minutes: default_access_token_validity_minutes(),
			refresh_token_validity_days: default_refresh_token_validity_days(),
		}
	}
}

/// 15 minutes
fn default_access_token_validity_minutes() -> i64 {
	15
}

/// 7 days
fn default_refresh_token_validity_days() -> i64 {
	7
}

/// Where the frontend is served from. Redirects are only ever built on one of
/// these origins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
	/// The origin used when a request does not carry an allowed one
	#[serde(alias = "defaultorigin")]
	pub default_origin: Url,
	/// Every other origin the frontend may be served from
	#[serde(default, alias = "allowedorigins")]
	pub allowed_origins: Vec<Url>,
}

#[cfg(test)]
mod tests {
	use super::{AppConfig, AuthConfig, RunningEnvironment};

	#[test]
	fn lifetimes_default_to_fifteen_minutes_and_seven_days() {
		let auth: AuthConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(auth.access_token_validity().whole_seconds(), 15 * 60);
		assert_eq!(
			auth.refresh_token_validity().whole_seconds(),
			7 * 24 * 60 * 60
		);
		assert!(auth.access_token_secret.is_none());
	}

	#[test]
	fn lifetimes_must_be_positive_and_bounded() {
		assert!(AuthConfig::default().validate().is_ok());

		for minutes in [0, -1, AuthConfig::MAX_ACCESS_TOKEN_VALIDITY_MINUTES + 1, i64::MAX] {
			let auth = AuthConfig {
				access_token_validity_minutes: minutes,
				..Default::default()
			};
			assert!(auth.validate().is_err(), "{minutes} minutes was accepted");
		}
		for days in [0, -7, AuthConfig::MAX_REFRESH_TOKEN_VALIDITY_DAYS + 1, 10_000_000] {
			let auth = AuthConfig {
				refresh_token_validity_days: days,
				..Default::default()
			};
			assert!(auth.validate().is_err(), "{days} days was accepted");
		}

		let auth = AuthConfig {
			access_token_validity_minutes: AuthConfig::MAX_ACCESS_TOKEN_VALIDITY_MINUTES,
			refresh_token_validity_days: AuthConfig::MAX_REFRESH_TOKEN_VALIDITY_DAYS,
			..Default::default()
		};
		assert!(auth.validate().is_ok());
	}

	#[test]
	fn error_details_follow_the_environment_unless_set() {
		let mut config: AppConfig = serde_json::from_value(serde_json::json!({
			"bindAddress": "127.0.0.1:3000",
			"environment": "production",
			"passwordPepper": "pepper",
			"database": { "file": "users.db", "connectionLimit": 4 },
			"auth": {},
			"frontend": { "defaultOrigin": "https://app.example.com" }
		}))
		.unwrap();
		assert_eq!(config.environment, RunningEnvironment::Production);
		assert!(!config.exposes_error_details());
		assert!(config.is_production());

		config.expose_error_details = Some(true);
		assert!(config.exposes_error_details());

		config.environment = RunningEnvironment::Development;
		config.expose_error_details = None;
		assert!(config.exposes_error_details());
	}
}
