#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Types shared between the credential service and its clients: the error
//! taxonomy, the JSON envelope every endpoint responds with, and the request
//! and response bodies of each endpoint.

/// The request and response bodies of every endpoint, grouped by area.
pub mod api;
/// Small serde helpers and wrappers used across the API types.
pub mod utils;

/// Everything most consumers of this crate need in one import.
pub mod prelude {
	pub use crate::{
		utils::{False, True, Uuid},
		ApiErrorResponse,
		ApiErrorResponseBody,
		ApiSuccessResponse,
		ApiSuccessResponseBody,
		BasicUserInfo,
		ErrorType,
		UserRole,
	};
}

mod error;
mod response;
mod user_data;

pub use self::{error::*, response::*, user_data::*};
