use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use models::api::user::UpdateProfileRequest;
use sqlx::{pool::PoolOptions, Pool};
use thiserror::Error;

use crate::prelude::*;

/// The refresh token records. Write once, delete only.
mod refresh_token;
/// The user records.
mod user;

pub use self::{refresh_token::*, user::*};

/// Connects to the database based on a config. Not much to say here.
#[instrument(skip(config))]
pub async fn connect(config: &DatabaseConfig) -> Result<Pool<DatabaseType>, sqlx::Error> {
	info!("Connecting to database: `{}`", config.file);
	PoolOptions::<DatabaseType>::new()
		.max_connections(config.connection_limit)
		.connect_with(
			<DatabaseConnection as sqlx::Connection>::Options::new()
				.filename(&config.file)
				.create_if_missing(true),
		)
		.await
}

/// Creates all the tables the service needs, if they do not already exist.
#[instrument(skip(pool))]
pub async fn initialize(pool: &Pool<DatabaseType>) -> Result<(), sqlx::Error> {
	info!("Initializing database");

	let mut transaction = pool.begin().await?;

	user::initialize_user_tables(&mut transaction).await?;
	refresh_token::initialize_refresh_token_tables(&mut transaction).await?;

	transaction.commit().await?;

	info!("Database initialized");
	Ok(())
}

/// A field on the user record that no two users may share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
	/// The email address of the user
	Email,
	/// The phone number of the user
	Phone,
}

impl Display for UniqueField {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Email => "email",
			Self::Phone => "phone number",
		})
	}
}

/// The errors a store can report. Everything other than a uniqueness conflict
/// is an unexpected fault.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The write would give a user a value that another user already has
	#[error("the {0} is already used by another user")]
	UniqueViolation(UniqueField),
	/// Any other database error
	#[error(transparent)]
	Database(#[from] sqlx::Error),
}

impl StoreError {
	/// Maps the error onto the error the API reports. A conflict becomes the
	/// error for the field it is on. Anything else is logged and reported as a
	/// server error.
	pub fn into_error_type(self) -> ErrorType {
		match self {
			Self::UniqueViolation(UniqueField::Email) => ErrorType::EmailUnavailable,
			Self::UniqueViolation(UniqueField::Phone) => ErrorType::PhoneUnavailable,
			Self::Database(err) => {
				error!("Database error: {:?}", err);
				ErrorType::InternalServerError(err.into())
			}
		}
	}
}

/// Persistence of refresh token records, keyed by the token string. There is
/// no update: a record is inserted once and later deleted.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
	/// Appends a record. Never fails because a record with the same token or
	/// user already exists.
	async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

	/// Looks up the record for a token
	async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError>;

	/// Removes the record for a token. Removing a token that has no record is
	/// not an error.
	async fn delete_by_token(&self, token: &str) -> Result<(), StoreError>;
}

/// Persistence of user records
#[async_trait]
pub trait UserStore: Send + Sync {
	async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, StoreError>;

	/// Looks a user up by their (already normalized) email
	async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

	/// Every user, oldest first
	async fn list(&self) -> Result<Vec<User>, StoreError>;

	async fn create(&self, user: &User) -> Result<(), StoreError>;

	/// Applies the fields present in `changes` and returns the updated user,
	/// or `None` if there is no such user
	async fn update_profile(
		&self,
		id: &Uuid,
		changes: &UpdateProfileRequest,
	) -> Result<Option<User>, StoreError>;

	/// Applies the profile fields present in `changes` and the role, if one is
	/// given, in a single transaction. Returns the updated user, or `None` if
	/// there is no such user
	async fn update_user(
		&self,
		id: &Uuid,
		changes: &UpdateProfileRequest,
		role: Option<UserRole>,
	) -> Result<Option<User>, StoreError>;

	/// Removes a user. Returns whether the user existed.
	async fn delete(&self, id: &Uuid) -> Result<bool, StoreError>;
}

/// Both stores, backed by a single SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
	pool: Pool<DatabaseType>,
}

impl SqliteStore {
	pub fn new(pool: Pool<DatabaseType>) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl RefreshTokenStore for SqliteStore {
	async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
		let mut connection = self.pool.acquire().await?;
		insert_refresh_token(&mut connection, record).await?;
		Ok(())
	}

	async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
		let mut connection = self.pool.acquire().await?;
		Ok(get_refresh_token(&mut connection, token).await?)
	}

	async fn delete_by_token(&self, token: &str) -> Result<(), StoreError> {
		let mut connection = self.pool.acquire().await?;
		delete_refresh_token(&mut connection, token).await?;
		Ok(())
	}
}

#[async_trait]
impl UserStore for SqliteStore {
	async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
		let mut connection = self.pool.acquire().await?;
		Ok(get_user_by_id(&mut connection, id).await?)
	}

	async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		let mut connection = self.pool.acquire().await?;
		Ok(get_user_by_email(&mut connection, email).await?)
	}

	async fn list(&self) -> Result<Vec<User>, StoreError> {
		let mut connection = self.pool.acquire().await?;
		Ok(get_all_users(&mut connection).await?)
	}

	async fn create(&self, user: &User) -> Result<(), StoreError> {
		let mut connection = self.pool.acquire().await?;
		create_user(&mut connection, user)
			.await
			.map_err(unique_violation_to_field)
	}

	async fn update_profile(
		&self,
		id: &Uuid,
		changes: &UpdateProfileRequest,
	) -> Result<Option<User>, StoreError> {
		let mut connection = self.pool.acquire().await?;
		update_user_profile(&mut connection, id, changes)
			.await
			.map_err(unique_violation_to_field)?;
		Ok(get_user_by_id(&mut connection, id).await?)
	}

	async fn update_user(
		&self,
		id: &Uuid,
		changes: &UpdateProfileRequest,
		role: Option<UserRole>,
	) -> Result<Option<User>, StoreError> {
		let mut transaction = self.pool.begin().await?;
		update_user_profile(&mut transaction, id, changes)
			.await
			.map_err(unique_violation_to_field)?;
		if let Some(role) = role {
			update_user_role(&mut transaction, id, role).await?;
		}
		let user = get_user_by_id(&mut transaction, id).await?;
		transaction.commit().await?;

		Ok(user)
	}

	async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
		let mut connection = self.pool.acquire().await?;
		Ok(delete_user(&mut connection, id).await?)
	}
}

/// Which unique column a violation message refers to. SQLite reports these as
/// `UNIQUE constraint failed: <table>.<column>`.
const UNIQUE_COLUMNS: [(&str, UniqueField); 2] = [
	("user.email", UniqueField::Email),
	("user.phone", UniqueField::Phone),
];

/// Turns a uniqueness violation on a known column into a
/// [`StoreError::UniqueViolation`]. Everything else stays a database error.
fn unique_violation_to_field(error: sqlx::Error) -> StoreError {
	let field = error
		.as_database_error()
		.filter(|db_error| db_error.is_unique_violation())
		.and_then(|db_error| {
			let message = db_error.message();
			UNIQUE_COLUMNS
				.iter()
				.find(|(column, _)| message.contains(column))
				.map(|(_, field)| *field)
		});

	match field {
		Some(field) => StoreError::UniqueViolation(field),
		None => StoreError::Database(error),
	}
}
