use tracing::{dispatcher::SetGlobalDefaultError, level_filters::LevelFilter, Dispatch, Level};
use tracing_subscriber::{
	filter::Targets,
	fmt::{format::FmtSpan, Layer as FmtLayer},
	layer::SubscriberExt,
	Layer,
};

use crate::prelude::*;

/// Installs the global `tracing` subscriber. Only events from this crate, the
/// shared models and the HTTP trace layer are printed, at TRACE in development
/// and DEBUG in production.
pub fn initialize(config: &AppConfig) -> Result<(), SetGlobalDefaultError> {
	tracing::dispatcher::set_global_default(Dispatch::new(
		tracing_subscriber::registry().with(
			FmtLayer::new()
				.with_span_events(FmtSpan::NONE)
				.event_format(
					tracing_subscriber::fmt::format()
						.with_ansi(config.environment == RunningEnvironment::Development)
						.with_file(false)
						.without_time()
						.compact(),
				)
				.with_filter(
					Targets::new()
						.with_target(env!("CARGO_CRATE_NAME"), LevelFilter::TRACE)
						.with_target("models", LevelFilter::TRACE)
						.with_target("tower_http", LevelFilter::DEBUG),
				)
				.with_filter(LevelFilter::from_level(
					if config.environment == RunningEnvironment::Development {
						Level::TRACE
					} else {
						Level::DEBUG
					},
				)),
		),
	))
}
