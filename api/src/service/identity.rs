use std::sync::Arc;

use argon2::{
	password_hash::SaltString,
	Algorithm,
	Argon2,
	PasswordHash,
	PasswordHasher,
	PasswordVerifier,
	Version,
};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::task;

use crate::{
	db::{StoreError, UniqueField, User, UserStore},
	prelude::*,
	utils::validator,
};

/// An identity that an external provider has already authenticated. The
/// federation handshake itself happens before the service ever sees this.
///
/// Accounts are linked by the verified email alone: a federated login signs
/// into whichever local account has that email, including one created with a
/// password. The provider and subject are not persisted and only show up in
/// the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
	/// The provider that vouched for the identity, such as `google`
	pub provider: String,
	/// The id of the user at the provider
	pub subject: String,
	/// The email the provider has verified for the user
	pub email: String,
	pub display_name: Option<String>,
	pub avatar: Option<String>,
}

/// Everything that can go wrong while establishing who a user is
#[derive(Debug, Error)]
pub enum IdentityError {
	/// The account has no password set. It can only be signed into through an
	/// external identity provider
	#[error("the account can only be signed into through an external identity provider")]
	FederationOnlyAccount,
	/// The provider vouched for an identity without a usable email, so there
	/// is no account it can be matched to
	#[error("the federated identity carries no valid email")]
	InvalidFederatedEmail,
	/// The password could not be hashed, or the stored hash could not be read
	#[error("password hashing failed: {0}")]
	Hashing(String),
	/// The user store failed
	#[error(transparent)]
	Store(#[from] StoreError),
}

impl IdentityError {
	/// Maps the error onto the error the API reports
	pub fn into_error_type(self) -> ErrorType {
		match self {
			Self::FederationOnlyAccount => ErrorType::FederationOnlyAccount,
			Self::InvalidFederatedEmail => ErrorType::InvalidEmail,
			Self::Hashing(reason) => {
				error!("Password hashing failed: {}", reason);
				ErrorType::server_error(reason)
			}
			Self::Store(err) => err.into_error_type(),
		}
	}
}

/// Confirms the identity of users, either by their password or by accepting an
/// identity an external provider has vouched for.
#[derive(Clone)]
pub struct IdentityVerifier {
	pepper: String,
	users: Arc<dyn UserStore>,
}

impl IdentityVerifier {
	pub fn new(pepper: impl Into<String>, users: Arc<dyn UserStore>) -> Self {
		Self {
			pepper: pepper.into(),
			users,
		}
	}

	/// Hashes a password into an argon2 PHC string, with a fresh salt. The
	/// hashing runs on the blocking pool.
	pub async fn hash_password(&self, password: &str) -> Result<String, IdentityError> {
		let pepper = self.pepper.clone();
		let password = password.to_string();

		task::spawn_blocking(move || -> Result<String, IdentityError> {
			Ok(hasher(&pepper)?
				.hash_password(
					password.as_bytes(),
					SaltString::generate(&mut rand::thread_rng()).as_salt(),
				)
				.map_err(|err| IdentityError::Hashing(err.to_string()))?
				.to_string())
		})
		.await
		.map_err(|err| IdentityError::Hashing(err.to_string()))?
	}

	/// Checks the password against the hash stored for the user. A wrong
	/// password is `Ok(false)`, not an error. A user without any password is
	/// [`IdentityError::FederationOnlyAccount`], so that the caller can tell
	/// them to use their external provider instead.
	#[instrument(skip_all, fields(user_id = %user.id))]
	pub async fn verify_password(
		&self,
		password: &str,
		user: &User,
	) -> Result<bool, IdentityError> {
		let Some(password_hash) = user.password_hash.clone() else {
			info!("User has no password set");
			return Err(IdentityError::FederationOnlyAccount);
		};
		let pepper = self.pepper.clone();
		let password = password.to_string();

		task::spawn_blocking(move || -> Result<bool, IdentityError> {
			let password_hash = PasswordHash::new(&password_hash).map_err(|err| {
				error!("Unable to parse stored password hash: {}", err);
				IdentityError::Hashing(err.to_string())
			})?;

			Ok(hasher(&pepper)?
				.verify_password(password.as_bytes(), &password_hash)
				.is_ok())
		})
		.await
		.map_err(|err| IdentityError::Hashing(err.to_string()))?
	}

	/// Creates an account that signs in with a password
	pub async fn create_password_account(
		&self,
		email: &str,
		password: &str,
		name: Option<&str>,
		phone: Option<&str>,
	) -> Result<User, IdentityError> {
		self.create_account(email, Some(password), name, phone, UserRole::Standard)
			.await
	}

	/// Creates an account with the given role. Without a password the account
	/// can only be signed into through an external identity provider.
	#[instrument(skip(self, password))]
	pub async fn create_account(
		&self,
		email: &str,
		password: Option<&str>,
		name: Option<&str>,
		phone: Option<&str>,
		role: UserRole,
	) -> Result<User, IdentityError> {
		let password_hash = match password {
			Some(password) => Some(self.hash_password(password).await?),
			None => None,
		};

		let user = User {
			id: Uuid::new_v4(),
			email: validator::normalize_email(email),
			name: name.map(str::trim).unwrap_or_default().to_string(),
			phone: phone
				.map(str::trim)
				.filter(|phone| !phone.is_empty())
				.map(String::from),
			password_hash,
			role,
			avatar: None,
			address: None,
			created: OffsetDateTime::now_utc(),
		};

		self.users.create(&user).await?;
		info!("Created {} user `{}`", user.role, user.id);

		Ok(user)
	}

	/// Returns the local user for an identity an external provider has
	/// vouched for, matched by email. A user is provisioned, without a
	/// password, if there is none yet.
	#[instrument(skip(self))]
	pub async fn accept_federated_identity(
		&self,
		identity: &FederatedIdentity,
	) -> Result<User, IdentityError> {
		let email = validator::normalize_email(&identity.email);
		if !validator::is_email_valid(&email) {
			warn!(
				"`{}` identity `{}` has no valid email",
				identity.provider, identity.subject
			);
			return Err(IdentityError::InvalidFederatedEmail);
		}

		if let Some(user) = self.users.find_by_email(&email).await? {
			debug!("Federated identity matched existing user `{}`", user.id);
			return Ok(user);
		}

		let user = User {
			id: Uuid::new_v4(),
			email,
			name: identity.display_name.clone().unwrap_or_default(),
			phone: None,
			password_hash: None,
			role: UserRole::Standard,
			avatar: identity.avatar.clone(),
			address: None,
			created: OffsetDateTime::now_utc(),
		};

		match self.users.create(&user).await {
			Ok(()) => {
				info!(
					"Provisioned user `{}` for a `{}` identity",
					user.id, identity.provider
				);
				Ok(user)
			}
			// Someone else provisioned the same email in the meantime
			Err(StoreError::UniqueViolation(UniqueField::Email)) => self
				.users
				.find_by_email(&user.email)
				.await?
				.ok_or_else(|| IdentityError::Store(StoreError::UniqueViolation(UniqueField::Email))),
			Err(err) => Err(err.into()),
		}
	}

}

fn hasher(pepper: &str) -> Result<Argon2<'_>, IdentityError> {
	Argon2::new_with_secret(
		pepper.as_bytes(),
		Algorithm::Argon2id,
		Version::V0x13,
		constants::HASHING_PARAMS,
	)
	.map_err(|err| {
		error!("Error creating Argon2: `{}`", err);
		IdentityError::Hashing(err.to_string())
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils;

	#[tokio::test]
	async fn password_matches_only_its_own_hash() {
		let identity = test_utils::identity().await;
		let mut user = test_utils::user("john@patr.cloud", UserRole::Standard);
		user.password_hash = Some(identity.hash_password("hunter22").await.unwrap());

		assert!(identity.verify_password("hunter22", &user).await.unwrap());
		assert!(!identity.verify_password("hunter23", &user).await.unwrap());
		assert!(!identity.verify_password("", &user).await.unwrap());
	}

	#[tokio::test]
	async fn pepper_is_part_of_the_hash() {
		let identity = test_utils::identity().await;
		let other = IdentityVerifier::new("another-pepper", Arc::new(test_utils::store().await));
		let mut user = test_utils::user("john@patr.cloud", UserRole::Standard);
		user.password_hash = Some(identity.hash_password("hunter22").await.unwrap());

		assert!(!other.verify_password("hunter22", &user).await.unwrap());
	}

	#[tokio::test]
	async fn passwordless_account_is_federation_only() {
		let identity = test_utils::identity().await;
		let mut user = test_utils::user("john@patr.cloud", UserRole::Standard);
		user.password_hash = None;

		assert!(matches!(
			identity.verify_password("anything", &user).await,
			Err(IdentityError::FederationOnlyAccount)
		));
		assert_eq!(
			identity
				.verify_password("anything", &user)
				.await
				.unwrap_err()
				.into_error_type(),
			ErrorType::FederationOnlyAccount
		);
	}

	#[tokio::test]
	async fn corrupt_hash_is_a_server_fault() {
		let identity = test_utils::identity().await;
		let mut user = test_utils::user("john@patr.cloud", UserRole::Standard);
		user.password_hash = Some("not-a-phc-string".to_string());

		let err = identity
			.verify_password("hunter22", &user)
			.await
			.unwrap_err();
		assert!(matches!(err, IdentityError::Hashing(_)));
		assert!(err.into_error_type().is_server_error());
	}

	#[tokio::test]
	async fn federated_identity_reuses_or_provisions_a_user() {
		let store = Arc::new(test_utils::store().await);
		let identity = IdentityVerifier::new(test_utils::PEPPER, store.clone());

		let existing = test_utils::user("john@patr.cloud", UserRole::Admin);
		store.create(&existing).await.unwrap();

		let accepted = identity
			.accept_federated_identity(&FederatedIdentity {
				provider: "google".to_string(),
				subject: "1234".to_string(),
				email: "John@Patr.cloud".to_string(),
				display_name: Some("John".to_string()),
				avatar: None,
			})
			.await
			.unwrap();
		assert_eq!(accepted.id, existing.id);
		assert_eq!(accepted.role, UserRole::Admin);

		let provisioned = identity
			.accept_federated_identity(&FederatedIdentity {
				provider: "google".to_string(),
				subject: "5678".to_string(),
				email: "jane@patr.cloud".to_string(),
				display_name: Some("Jane".to_string()),
				avatar: Some("https://cdn.example.com/jane.png".to_string()),
			})
			.await
			.unwrap();
		assert_eq!(provisioned.email, "jane@patr.cloud");
		assert_eq!(provisioned.name, "Jane");
		assert_eq!(provisioned.role, UserRole::Standard);
		assert!(provisioned.password_hash.is_none());
		assert_eq!(
			store.find_by_email("jane@patr.cloud").await.unwrap().unwrap().id,
			provisioned.id
		);
	}

	#[tokio::test]
	async fn federated_identity_without_an_email_is_refused() {
		let store = Arc::new(test_utils::store().await);
		let identity = IdentityVerifier::new(test_utils::PEPPER, store.clone());

		for (subject, email) in [("1", ""), ("2", "   "), ("3", "not-an-email")] {
			let err = identity
				.accept_federated_identity(&FederatedIdentity {
					provider: "google".to_string(),
					subject: subject.to_string(),
					email: email.to_string(),
					display_name: None,
					avatar: None,
				})
				.await
				.unwrap_err();
			assert!(matches!(err, IdentityError::InvalidFederatedEmail));
		}
		assert!(store.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn password_accounts_are_normalized_and_conflict_on_email() {
		let identity = test_utils::identity().await;

		let user = identity
			.create_password_account(" John@Patr.cloud ", "hunter22", Some("John"), Some(""))
			.await
			.unwrap();
		assert_eq!(user.email, "john@patr.cloud");
		assert_eq!(user.phone, None);
		assert!(identity.verify_password("hunter22", &user).await.unwrap());

		let err = identity
			.create_password_account("john@patr.cloud", "hunter22", None, None)
			.await
			.unwrap_err();
		assert_eq!(err.into_error_type(), ErrorType::EmailUnavailable);
	}
}
