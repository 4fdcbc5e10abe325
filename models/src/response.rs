use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
	utils::{False, True},
	ErrorType,
};

/// This struct represents a successful response from the API. It contains the
/// status code and body.
#[derive(Debug)]
pub struct ApiSuccessResponse<T> {
	/// The status code of the success response. Ideally in the 2xx range.
	pub status_code: StatusCode,
	/// The body of the success response. This is the actual data that will be
	/// sent to the client, flattened into the success envelope.
	pub body: T,
}

impl<T> ApiSuccessResponse<T> {
	/// Creates a `200 OK` response with the given body
	pub fn ok(body: T) -> Self {
		Self {
			status_code: StatusCode::OK,
			body,
		}
	}

	/// Creates a response with the given status code and body
	pub fn with_status(status_code: StatusCode, body: T) -> Self {
		Self { status_code, body }
	}
}

#[cfg(feature = "axum")]
impl<T> axum::response::IntoResponse for ApiSuccessResponse<T>
where
	T: Serialize,
{
	fn into_response(self) -> axum::response::Response {
		(
			self.status_code,
			axum::Json(ApiSuccessResponseBody {
				success: True,
				response: self.body,
			}),
		)
			.into_response()
	}
}

/// This struct represents the JSON body of successful response from the API.
/// This is mostly used internally and would ideally not need to be constructed
/// manually.
///
/// Use [`ApiSuccessResponse`] to create a success response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiSuccessResponseBody<T> {
	/// Whether the request was successful or not. This is always true.
	pub success: True,
	/// The JSON body of the response. This is flattened so that the fields of
	/// the body are at the top level.
	#[serde(flatten)]
	pub response: T,
}

/// This struct represents an error response from the API. It contains the
/// status code and the body of the response.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
	/// The status code of the error response. Ideally in the 4xx or 5xx range.
	pub status_code: StatusCode,
	/// The body of the error response. This is a JSON object that contains the
	/// error message.
	pub body: ApiErrorResponseBody,
}

impl ApiErrorResponse {
	/// Creates a new [`ApiErrorResponse`] with the given [`ErrorType`], using
	/// the default status code.
	pub fn error(error: ErrorType) -> Self {
		Self {
			status_code: error.default_status_code(),
			body: ApiErrorResponseBody {
				success: False,
				message: error.message().into(),
				detail: None,
				error,
			},
		}
	}

	/// Creates a new [`ApiErrorResponse`] with the given [`ErrorType`] and the
	/// given message, using the default status code.
	pub fn error_with_message(error: ErrorType, message: impl Into<String>) -> Self {
		Self {
			status_code: error.default_status_code(),
			body: ApiErrorResponseBody {
				success: False,
				error,
				message: message.into(),
				detail: None,
			},
		}
	}

	/// Overrides the default status code of the error. Used by endpoints where
	/// the same error means something different, such as a missing user being
	/// a 404 on lookups but a 403 on the refresh path.
	pub fn with_status(mut self, status_code: StatusCode) -> Self {
		self.status_code = status_code;
		self
	}

	/// Attaches the internal cause of an [`ErrorType::InternalServerError`] to
	/// the body. Only meant for diagnostic deployments, never production.
	pub fn with_detail(mut self) -> Self {
		if let ErrorType::InternalServerError(cause) = &self.body.error {
			self.body.detail = Some(cause.to_string());
		}
		self
	}
}

impl From<ErrorType> for ApiErrorResponse {
	fn from(error: ErrorType) -> Self {
		Self::error(error)
	}
}

/// The rendered error is also stored in the response extensions, so that a
/// layer further out can inspect or re-render it (for example, to attach the
/// internal cause of a server error in diagnostic deployments).
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiErrorResponse {
	fn into_response(self) -> axum::response::Response {
		let mut response = (self.status_code, axum::Json(self.body.clone())).into_response();
		response.extensions_mut().insert(self);
		response
	}
}

/// This struct represents the JSON body of an error response from the API.
/// This is mostly used internally and would ideally not need to be constructed
/// manually.
///
/// Use [`ApiErrorResponse`] to create an error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponseBody {
	/// Whether the request was successful or not. This is always false.
	pub success: False,
	/// The error type of the response.
	pub error: ErrorType,
	/// A user-friendly message describing the error.
	pub message: String,
	/// The internal cause of a server error, present only when the server runs
	/// with error details exposed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
}

/// This struct represents the JSON body of a response from the API. It can be
/// either a success or an error response. This is used to parse the response
/// from the API and determine whether it was successful or not.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ApiResponseBody<T> {
	/// Success response, with the given body.
	Success(ApiSuccessResponseBody<T>),
	/// Error response
	Error(ApiErrorResponseBody),
}
