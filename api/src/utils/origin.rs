use axum::http::{header, HeaderMap};
use url::Url;

use crate::prelude::*;

/// Picks the origin a redirect is allowed to point to. The candidate (usually
/// taken from a request header) is only ever compared against the configured
/// origins by scheme, host and port. It is never trusted on its own: if it
/// does not match any of them, or cannot be parsed at all, the default origin
/// is used.
pub fn resolve_origin(candidate: Option<&str>, allowed: &[Url], default: &Url) -> Url {
	candidate
		.and_then(|candidate| find_permitted(candidate, allowed, default))
		.unwrap_or(default)
		.clone()
}

/// Resolves the frontend origin for a request. The `Referer` header is the
/// candidate if it is permitted, otherwise the `Origin` header is tried.
pub fn origin_for_request(headers: &HeaderMap, frontend: &FrontendConfig) -> Url {
	let candidate = [header::REFERER, header::ORIGIN]
		.into_iter()
		.filter_map(|name| headers.get(name)?.to_str().ok())
		.find(|candidate| {
			find_permitted(
				candidate,
				&frontend.allowed_origins,
				&frontend.default_origin,
			)
			.is_some()
		});

	resolve_origin(
		candidate,
		&frontend.allowed_origins,
		&frontend.default_origin,
	)
}

/// The configured origin the candidate belongs to, if any
fn find_permitted<'a>(candidate: &str, allowed: &'a [Url], default: &'a Url) -> Option<&'a Url> {
	let candidate = Url::parse(candidate.trim()).ok()?.origin();
	std::iter::once(default)
		.chain(allowed)
		.find(|permitted| permitted.origin() == candidate)
}

#[cfg(test)]
mod tests {
	use axum::http::{header, HeaderMap, HeaderValue};
	use url::Url;

	use super::{origin_for_request, resolve_origin};
	use crate::prelude::*;

	fn frontend() -> FrontendConfig {
		FrontendConfig {
			default_origin: Url::parse("https://app.example.com").unwrap(),
			allowed_origins: vec![
				Url::parse("http://localhost:3000").unwrap(),
				Url::parse("https://staging.example.com").unwrap(),
			],
		}
	}

	#[test]
	fn allowed_candidate_is_returned() {
		let frontend = frontend();
		let origin = resolve_origin(
			Some("http://localhost:3000/login?next=/dashboard"),
			&frontend.allowed_origins,
			&frontend.default_origin,
		);
		assert_eq!(origin.as_str(), "http://localhost:3000/");
	}

	#[test]
	fn unknown_or_garbage_candidate_falls_back_to_default() {
		let frontend = frontend();
		for candidate in [
			Some("https://evil.example.net"),
			Some("http://localhost:3001"),
			Some("https://staging.example.com.evil.net"),
			Some("not a url"),
			None,
		] {
			assert_eq!(
				resolve_origin(
					candidate,
					&frontend.allowed_origins,
					&frontend.default_origin
				),
				frontend.default_origin,
				"{candidate:?} should not be trusted"
			);
		}
	}

	#[test]
	fn scheme_must_match() {
		let frontend = frontend();
		let origin = resolve_origin(
			Some("http://staging.example.com"),
			&frontend.allowed_origins,
			&frontend.default_origin,
		);
		assert_eq!(origin, frontend.default_origin);
	}

	#[test]
	fn referer_is_preferred_over_origin_header() {
		let frontend = frontend();
		let mut headers = HeaderMap::new();
		headers.insert(
			header::REFERER,
			HeaderValue::from_static("https://staging.example.com/settings"),
		);
		headers.insert(
			header::ORIGIN,
			HeaderValue::from_static("http://localhost:3000"),
		);
		assert_eq!(
			origin_for_request(&headers, &frontend).as_str(),
			"https://staging.example.com/"
		);

		headers.insert(
			header::REFERER,
			HeaderValue::from_static("https://evil.example.net/"),
		);
		assert_eq!(
			origin_for_request(&headers, &frontend).as_str(),
			"http://localhost:3000/"
		);

		assert_eq!(
			origin_for_request(&HeaderMap::new(), &frontend),
			frontend.default_origin
		);
	}
}
