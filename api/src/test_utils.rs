//! Helpers shared by the tests of every module

use std::sync::Arc;

use async_trait::async_trait;
use models::api::user::UpdateProfileRequest;
use sqlx::{pool::PoolOptions, Pool};
use time::OffsetDateTime;
use url::Url;

use crate::{
	app::AppState,
	db::{self, RefreshTokenRecord, RefreshTokenStore, SqliteStore, StoreError, User, UserStore},
	prelude::*,
	service::IdentityVerifier,
};

pub const PEPPER: &str = "test-pepper";

pub fn auth_config() -> AuthConfig {
	AuthConfig {
		access_token_secret: Some("access-secret".to_string()),
		refresh_token_secret: Some("refresh-secret".to_string()),
		..Default::default()
	}
}

pub fn config() -> AppConfig {
	AppConfig {
		bind_address: ([127, 0, 0, 1], 0).into(),
		environment: RunningEnvironment::Production,
		password_pepper: PEPPER.to_string(),
		database: DatabaseConfig {
			file: ":memory:".to_string(),
			connection_limit: 1,
		},
		auth: auth_config(),
		frontend: FrontendConfig {
			default_origin: Url::parse("https://app.example.com").unwrap(),
			allowed_origins: vec![Url::parse("http://localhost:3000").unwrap()],
		},
		expose_error_details: None,
	}
}

/// A user that has never been persisted and has no password
pub fn user(email: &str, role: UserRole) -> User {
	User {
		id: Uuid::new_v4(),
		email: email.to_string(),
		name: String::new(),
		phone: None,
		password_hash: None,
		role,
		avatar: None,
		address: None,
		created: OffsetDateTime::now_utc(),
	}
}

/// A fresh in-memory database with all the tables created. A single
/// connection that never gets recycled, since every connection to
/// `sqlite::memory:` is its own database.
pub async fn pool() -> Pool<DatabaseType> {
	let pool = PoolOptions::<DatabaseType>::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await
		.unwrap();
	db::initialize(&pool).await.unwrap();
	pool
}

pub async fn store() -> SqliteStore {
	SqliteStore::new(pool().await)
}

pub async fn identity() -> IdentityVerifier {
	IdentityVerifier::new(PEPPER, Arc::new(store().await))
}

/// Persists a user that can log in with the given password
pub async fn password_user(
	store: &dyn UserStore,
	email: &str,
	password: &str,
	role: UserRole,
) -> User {
	let identity = IdentityVerifier::new(PEPPER, Arc::new(FailingStore));
	let mut user = user(email, role);
	user.password_hash = Some(identity.hash_password(password).await.unwrap());
	store.create(&user).await.unwrap();
	user
}

/// The state of the whole service on a fresh in-memory database, along with
/// the store behind it so tests can inspect what was persisted
pub async fn state() -> (AppState, Arc<SqliteStore>) {
	let store = Arc::new(store().await);
	(
		AppState::with_stores(config(), store.clone(), store.clone()),
		store,
	)
}

/// A store where every operation fails, to check that faults are never
/// swallowed
pub struct FailingStore;

fn fault() -> StoreError {
	StoreError::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl RefreshTokenStore for FailingStore {
	async fn insert(&self, _: &RefreshTokenRecord) -> Result<(), StoreError> {
		Err(fault())
	}

	async fn find_by_token(&self, _: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
		Err(fault())
	}

	async fn delete_by_token(&self, _: &str) -> Result<(), StoreError> {
		Err(fault())
	}
}

#[async_trait]
impl UserStore for FailingStore {
	async fn find_by_id(&self, _: &Uuid) -> Result<Option<User>, StoreError> {
		Err(fault())
	}

	async fn find_by_email(&self, _: &str) -> Result<Option<User>, StoreError> {
		Err(fault())
	}

	async fn list(&self) -> Result<Vec<User>, StoreError> {
		Err(fault())
	}

	async fn create(&self, _: &User) -> Result<(), StoreError> {
		Err(fault())
	}

	async fn update_profile(
		&self,
		_: &Uuid,
		_: &UpdateProfileRequest,
	) -> Result<Option<User>, StoreError> {
		Err(fault())
	}

	async fn update_user(
		&self,
		_: &Uuid,
		_: &UpdateProfileRequest,
		_: Option<UserRole>,
	) -> Result<Option<User>, StoreError> {
		Err(fault())
	}

	async fn delete(&self, _: &Uuid) -> Result<bool, StoreError> {
		Err(fault())
	}
}
