use models::{api::user::UpdateProfileRequest, UserProfile};
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;

use crate::prelude::*;

/// A user, as stored. Unlike [`BasicUserInfo`] this carries the password hash,
/// so it must never be sent over the wire directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
	pub id: Uuid,
	/// Always stored normalized (trimmed and lowercased)
	pub email: String,
	pub name: String,
	pub phone: Option<String>,
	/// The argon2 PHC string of the password. `None` for accounts that can only
	/// be signed into through an external identity provider
	pub password_hash: Option<String>,
	pub role: UserRole,
	pub avatar: Option<String>,
	pub address: Option<String>,
	pub created: OffsetDateTime,
}

impl User {
	/// The summary of the user that is safe to send to anyone allowed to see
	/// the user
	pub fn basic_info(&self) -> BasicUserInfo {
		BasicUserInfo {
			id: self.id,
			email: self.email.clone(),
			name: self.name.clone(),
			phone: self.phone.clone(),
			role: self.role,
		}
	}

	/// The full profile of the user, without the password hash
	pub fn profile(&self) -> UserProfile {
		UserProfile {
			basic: self.basic_info(),
			avatar: self.avatar.clone(),
			address: self.address.clone(),
			has_password: self.password_hash.is_some(),
		}
	}
}

impl TryFrom<SqliteRow> for User {
	type Error = sqlx::Error;

	fn try_from(row: SqliteRow) -> Result<Self, Self::Error> {
		Ok(Self {
			id: row.try_get("id")?,
			email: row.try_get("email")?,
			name: row.try_get("name")?,
			phone: row.try_get("phone")?,
			password_hash: row.try_get("password_hash")?,
			role: row.try_get("role")?,
			avatar: row.try_get("avatar")?,
			address: row.try_get("address")?,
			created: row.try_get("created")?,
		})
	}
}

/// Initializes the user tables
#[instrument(skip(connection))]
pub async fn initialize_user_tables(connection: &mut DatabaseConnection) -> Result<(), sqlx::Error> {
	info!("Setting up user tables");

	query(
		r#"
		CREATE TABLE IF NOT EXISTS "user"(
			id TEXT NOT NULL PRIMARY KEY,
			email TEXT NOT NULL UNIQUE,
			name TEXT NOT NULL DEFAULT '',
			phone TEXT UNIQUE,
			password_hash TEXT,
			role TEXT NOT NULL DEFAULT 'standard',
			avatar TEXT,
			address TEXT,
			created TEXT NOT NULL,

			CHECK (email = LOWER(TRIM(email))),
			CHECK (role IN ('standard', 'admin'))
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

#[instrument(skip(connection))]
pub async fn get_user_by_id(
	connection: &mut DatabaseConnection,
	id: &Uuid,
) -> Result<Option<User>, sqlx::Error> {
	query(
		r#"
		SELECT
			*
		FROM
			"user"
		WHERE
			id = $1;
		"#,
	)
	.bind(id)
	.fetch_optional(&mut *connection)
	.await?
	.map(User::try_from)
	.transpose()
}

#[instrument(skip(connection))]
pub async fn get_user_by_email(
	connection: &mut DatabaseConnection,
	email: &str,
) -> Result<Option<User>, sqlx::Error> {
	query(
		r#"
		SELECT
			*
		FROM
			"user"
		WHERE
			email = $1;
		"#,
	)
	.bind(email)
	.fetch_optional(&mut *connection)
	.await?
	.map(User::try_from)
	.transpose()
}

#[instrument(skip(connection))]
pub async fn get_all_users(connection: &mut DatabaseConnection) -> Result<Vec<User>, sqlx::Error> {
	query(
		r#"
		SELECT
			*
		FROM
			"user"
		ORDER BY
			created,
			rowid;
		"#,
	)
	.fetch_all(&mut *connection)
	.await?
	.into_iter()
	.map(User::try_from)
	.collect()
}

#[instrument(skip(connection, user), fields(user_id = %user.id))]
pub async fn create_user(connection: &mut DatabaseConnection, user: &User) -> Result<(), sqlx::Error> {
	query(
		r#"
		INSERT INTO
			"user"(
				id,
				email,
				name,
				phone,
				password_hash,
				role,
				avatar,
				address,
				created
			)
		VALUES
			($1, $2, $3, $4, $5, $6, $7, $8, $9);
		"#,
	)
	.bind(user.id)
	.bind(&user.email)
	.bind(&user.name)
	.bind(&user.phone)
	.bind(&user.password_hash)
	.bind(user.role)
	.bind(&user.avatar)
	.bind(&user.address)
	.bind(user.created)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

/// Sets every field present in `changes`, leaving the rest as they are
#[instrument(skip(connection, changes))]
pub async fn update_user_profile(
	connection: &mut DatabaseConnection,
	id: &Uuid,
	changes: &UpdateProfileRequest,
) -> Result<(), sqlx::Error> {
	query(
		r#"
		UPDATE
			"user"
		SET
			name = COALESCE($1, name),
			email = COALESCE($2, email),
			phone = COALESCE($3, phone),
			avatar = COALESCE($4, avatar),
			address = COALESCE($5, address)
		WHERE
			id = $6;
		"#,
	)
	.bind(&changes.name)
	.bind(&changes.email)
	.bind(&changes.phone)
	.bind(&changes.avatar)
	.bind(&changes.address)
	.bind(id)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

/// Sets the role of the user
#[instrument(skip(connection))]
pub async fn update_user_role(
	connection: &mut DatabaseConnection,
	id: &Uuid,
	role: UserRole,
) -> Result<(), sqlx::Error> {
	query(
		r#"
		UPDATE
			"user"
		SET
			role = $1
		WHERE
			id = $2;
		"#,
	)
	.bind(role)
	.bind(id)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

/// Deletes the user, returning whether they existed
#[instrument(skip(connection))]
pub async fn delete_user(connection: &mut DatabaseConnection, id: &Uuid) -> Result<bool, sqlx::Error> {
	let result = query(
		r#"
		DELETE FROM
			"user"
		WHERE
			id = $1;
		"#,
	)
	.bind(id)
	.execute(&mut *connection)
	.await?;

	Ok(result.rows_affected() > 0)
}
