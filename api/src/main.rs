//! The credential and session service. Authenticates users with a password or
//! through an external identity provider, hands out short-lived access tokens
//! and long-lived refresh tokens, and guards the user endpoints with them.

/// The global state of the application, shared by every request handler.
mod app;
/// All the persistence of the service: the refresh token records and the user
/// records, along with the traits the rest of the service talks to them
/// through.
mod db;
/// All the endpoints of the service, mounted on an axum [`Router`][1].
///
/// [1]: axum::Router
mod routes;
/// The core logic of the service. The token codec, identity verification and
/// the session lifecycle built on top of them.
mod service;
/// Utilities used across the service, such as the config parser, the logger,
/// the validators and the axum extractors.
mod utils;

#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;

use tokio::{net::TcpListener, signal};

use crate::{app::AppState, prelude::*};

/// The prelude module contains all the things most modules need to import to
/// get started.
pub mod prelude {
	pub use models::prelude::*;
	pub use sqlx::{query, Row};
	pub use tracing::{debug, error, info, instrument, trace, warn};

	pub use crate::utils::{config::*, constants};

	/// The type of the database connection. A mutable reference to this should
	/// be used as the parameter for database functions, since it accepts both a
	/// connection and a transaction.
	pub type DatabaseConnection = <DatabaseType as sqlx::Database>::Connection;

	/// The type of the database. This is currently set to [`sqlx::Sqlite`].
	/// A type alias is used here so that it can be referenced everywhere easily
	pub type DatabaseType = sqlx::Sqlite;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = AppConfig::parse()?;

	utils::logger::initialize(&config)?;
	debug!("Logger initialized");
	info!(
		"Configuration read. Running environment set to {}",
		config.environment
	);

	let database = db::connect(&config.database).await?;
	debug!("Database connection pool established");

	db::initialize(&database).await?;
	debug!("Database initialized");

	let state = AppState::new(config, database);

	let tcp_listener = TcpListener::bind(state.config.bind_address).await?;
	info!(
		"Listening for connections on {}",
		tcp_listener.local_addr()?
	);

	axum::serve(
		tcp_listener,
		routes::setup_routes(&state).into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(exit_signal())
	.await?;

	info!("Server stopped");
	Ok(())
}

/// Resolves once the process is asked to stop, either through Ctrl+C or a
/// SIGTERM on unix platforms
async fn exit_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			error!("Unable to listen for Ctrl+C: {}", err);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(err) => {
				error!("Unable to listen for SIGTERM: {}", err);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
	warn!("Exit signal received. Shutting down");
}
