use std::sync::Arc;

use sqlx::Pool;

use crate::{
	db::{RefreshTokenStore, SqliteStore, UserStore},
	prelude::*,
	service::SessionManager,
};

/// The global state of the application.
/// This will contain the configuration, the stores and the session manager
/// built on top of them.
#[derive(Clone)]
pub struct AppState {
	/// The application configuration.
	pub config: Arc<AppConfig>,
	/// The user records.
	pub users: Arc<dyn UserStore>,
	/// The session lifecycle.
	pub sessions: SessionManager,
}

impl AppState {
	/// Creates the state with both stores backed by the database pool
	pub fn new(config: AppConfig, database: Pool<DatabaseType>) -> Self {
		let store = Arc::new(SqliteStore::new(database));
		Self::with_stores(config, store.clone(), store)
	}

	/// Creates the state with the given stores
	pub fn with_stores(
		config: AppConfig,
		users: Arc<dyn UserStore>,
		refresh_tokens: Arc<dyn RefreshTokenStore>,
	) -> Self {
		let sessions = SessionManager::new(&config, users.clone(), refresh_tokens);
		Self {
			config: Arc::new(config),
			users,
			sessions,
		}
	}
}
