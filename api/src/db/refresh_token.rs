use time::OffsetDateTime;

use crate::prelude::*;

/// A persisted refresh token. A refresh token is only valid while its record
/// exists, on top of its signature and expiry checking out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
	/// The user the token was issued to
	pub user_id: Uuid,
	/// The token itself, exactly as handed out
	pub token: String,
	/// When the token was issued
	pub created: OffsetDateTime,
}

/// Initializes the refresh token tables. A user may have any number of
/// records (one per device they're logged in on), so nothing here is unique.
#[instrument(skip(connection))]
pub async fn initialize_refresh_token_tables(
	connection: &mut DatabaseConnection,
) -> Result<(), sqlx::Error> {
	info!("Setting up refresh token tables");

	query(
		r#"
		CREATE TABLE IF NOT EXISTS refresh_token(
			token TEXT NOT NULL,
			user_id TEXT NOT NULL,
			created TEXT NOT NULL
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE INDEX IF NOT EXISTS
			refresh_token_idx_token
		ON
			refresh_token(token);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE INDEX IF NOT EXISTS
			refresh_token_idx_user_id
		ON
			refresh_token(user_id);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

#[instrument(skip(connection, record), fields(user_id = %record.user_id))]
pub async fn insert_refresh_token(
	connection: &mut DatabaseConnection,
	record: &RefreshTokenRecord,
) -> Result<(), sqlx::Error> {
	trace!("Persisting refresh token");

	query(
		r#"
		INSERT INTO
			refresh_token(
				token,
				user_id,
				created
			)
		VALUES
			($1, $2, $3);
		"#,
	)
	.bind(&record.token)
	.bind(record.user_id)
	.bind(record.created)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

#[instrument(skip_all)]
pub async fn get_refresh_token(
	connection: &mut DatabaseConnection,
	token: &str,
) -> Result<Option<RefreshTokenRecord>, sqlx::Error> {
	query(
		r#"
		SELECT
			token,
			user_id,
			created
		FROM
			refresh_token
		WHERE
			token = $1
		LIMIT 1;
		"#,
	)
	.bind(token)
	.fetch_optional(&mut *connection)
	.await?
	.map(|row| -> Result<_, sqlx::Error> {
		Ok(RefreshTokenRecord {
			token: row.try_get("token")?,
			user_id: row.try_get("user_id")?,
			created: row.try_get("created")?,
		})
	})
	.transpose()
}

/// Deletes every record for the token. Deleting a token with no records is not
/// an error.
#[instrument(skip_all)]
pub async fn delete_refresh_token(
	connection: &mut DatabaseConnection,
	token: &str,
) -> Result<(), sqlx::Error> {
	let result = query(
		r#"
		DELETE FROM
			refresh_token
		WHERE
			token = $1;
		"#,
	)
	.bind(token)
	.execute(&mut *connection)
	.await?;

	trace!("Deleted {} refresh token record(s)", result.rows_affected());
	Ok(())
}
