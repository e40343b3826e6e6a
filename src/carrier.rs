//! Rate provider capability, carrier registry, and the carrier adapters.
//!
//! Every adapter shares the same outbound discipline: send with the cached token, force one token
//! refresh on 401/403 and resend, then classify whatever the final response is.

pub mod id;
pub mod registry;
pub mod ups;

pub use id::*;
pub use registry::*;
pub use ups::UpsRateProvider;

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenProvider, ClientCredentialsAuth, Clock, TokenSecret, TokenStore},
	config::ConfigSource,
	http::{HttpClient, HttpRequest, HttpResponse, ResponseBody},
	rates::{RateQuote, RateRequest},
};

/// Boxed future returned by [`RateProvider::get_rates`].
pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<RateQuote>>> + 'a + Send>>;

/// Per-carrier capability translating a neutral request into that carrier's quotes.
pub trait RateProvider
where
	Self: Send + Sync,
{
	/// Registry key of the carrier.
	fn carrier_id(&self) -> &CarrierId;

	/// Quotes `request`, failing with a classified [`CarrierError`].
	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> ProviderFuture<'a>;
}

/// Sends the request built by `build`, reissuing it once with a force-refreshed token when the
/// first response is 401 or 403.
///
/// The second response is returned whatever its status.
pub async fn send_with_reauth<F>(
	http: &dyn HttpClient,
	auth: &dyn AccessTokenProvider,
	build: F,
) -> Result<HttpResponse>
where
	F: Fn(&TokenSecret) -> HttpRequest,
{
	let token = auth.access_token(false).await?;
	let response = http.request(build(&token)).await?;

	if !is_unauthorized(response.status) {
		return Ok(response);
	}

	let token = auth.access_token(true).await?;

	http.request(build(&token)).await
}

/// Returns the JSON body of a 2xx response, or classifies the failure.
///
/// `label` names the carrier in error messages. Non-2xx failures carry the upstream status and,
/// when the body is JSON, `{ "response": body }` as details. A 2xx body that is not JSON fails
/// `MALFORMED_RESPONSE` without a status.
pub fn classify_response(label: &str, response: HttpResponse) -> Result<Value> {
	let status = response.status;

	if response.is_success() {
		return match response.body {
			ResponseBody::Json(value) => Ok(value),
			_ => Err(CarrierError::new(
				ErrorCode::MalformedResponse,
				format!("{label} response body is not JSON"),
			)),
		};
	}

	let (code, message) = match status {
		429 => (ErrorCode::RateLimit, format!("{label} rate limit exceeded")),
		s if is_unauthorized(s) => (ErrorCode::AuthError, format!("{label} authorization failed")),
		400..=499 => (ErrorCode::ValidationError, format!("{label} rejected the request")),
		_ => (ErrorCode::UpstreamError, format!("{label} rating failed")),
	};
	let error = CarrierError::new(code, message).with_status(status);

	Err(match response.body {
		ResponseBody::Json(body) => error.with_details(json!({ "response": body })),
		_ => error,
	})
}

/// Registry holding every built-in adapter, sharing `http`, `config`, the token `store`, and
/// `clock`.
pub fn default_registry(
	http: Arc<dyn HttpClient>,
	config: Arc<dyn ConfigSource>,
	store: Arc<dyn TokenStore>,
	clock: Arc<dyn Clock>,
) -> CarrierRegistry {
	let ups_auth = ClientCredentialsAuth::new(
		UpsRateProvider::CACHE_KEY,
		UpsRateProvider::CREDENTIALS,
		http.clone(),
		config.clone(),
	)
	.with_store(store)
	.with_clock(clock);

	CarrierRegistry::default().with(UpsRateProvider::new(http, config, Arc::new(ups_auth)))
}

fn is_unauthorized(status: u16) -> bool {
	matches!(status, 401 | 403)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::AuthFuture, http::StubHttpClient};

	struct CountingAuth {
		forced: Mutex<u32>,
	}
	impl AccessTokenProvider for CountingAuth {
		fn access_token(&self, force_refresh: bool) -> AuthFuture<'_> {
			let token = if force_refresh {
				*self.forced.lock() += 1;

				"fresh"
			} else {
				"stale"
			};

			Box::pin(async move { Ok(TokenSecret::new(token)) })
		}
	}

	const URL: &str = "https://api.ups.example/rating/v1/Rate";

	fn rate_request(token: &TokenSecret) -> HttpRequest {
		HttpRequest::post(URL).header("authorization", token.bearer()).json(json!({ "n": 1 }))
	}

	#[tokio::test]
	async fn unauthorized_responses_trigger_exactly_one_forced_refresh() {
		let stub = StubHttpClient::default();
		let auth = CountingAuth { forced: Mutex::new(0) };
		let request = rate_request(&TokenSecret::new("any"));

		stub.register(&request, HttpResponse::json(403, json!({})));
		stub.register(&request, HttpResponse::json(403, json!({ "again": true })));

		let response = send_with_reauth(&stub, &auth, rate_request)
			.await
			.expect("Second response should be returned.");
		let sent = stub.requests();

		assert_eq!(response.status, 403);
		assert_eq!(*auth.forced.lock(), 1);
		assert_eq!(sent.len(), 2);
		assert_eq!(sent[0].header_value("authorization"), Some("Bearer stale"));
		assert_eq!(sent[1].header_value("authorization"), Some("Bearer fresh"));
	}

	#[tokio::test]
	async fn authorized_responses_are_not_resent() {
		let stub = StubHttpClient::default();
		let auth = CountingAuth { forced: Mutex::new(0) };

		stub.register(&rate_request(&TokenSecret::new("any")), HttpResponse::json(500, json!({})));

		let response =
			send_with_reauth(&stub, &auth, rate_request).await.expect("Response should be returned.");

		assert_eq!(response.status, 500);
		assert_eq!(*auth.forced.lock(), 0);
	}

	#[test]
	fn statuses_map_onto_the_taxonomy() {
		let cases = [
			(429, ErrorCode::RateLimit),
			(401, ErrorCode::AuthError),
			(403, ErrorCode::AuthError),
			(400, ErrorCode::ValidationError),
			(404, ErrorCode::ValidationError),
			(500, ErrorCode::UpstreamError),
			(503, ErrorCode::UpstreamError),
			(302, ErrorCode::UpstreamError),
		];

		for (status, code) in cases {
			let body = json!({ "response": { "errors": [{ "code": "X" }] } });
			let err = classify_response("UPS", HttpResponse::json(status, body["response"].clone()))
				.expect_err("Non-2xx statuses should fail.");

			assert_eq!(err.code, code, "status {status}");
			assert_eq!(err.status, Some(status));
			assert_eq!(err.details, Some(body));
		}
	}

	#[test]
	fn unstructured_bodies_carry_no_details() {
		let err = classify_response("UPS", HttpResponse::text(502, "<html>bad gateway</html>"))
			.expect_err("502 should fail.");

		assert_eq!(err.code, ErrorCode::UpstreamError);
		assert_eq!(err.details, None);

		let err = classify_response("UPS", HttpResponse::text(200, "ok"))
			.expect_err("Non-JSON success should fail.");

		assert_eq!(err.code, ErrorCode::MalformedResponse);
		assert_eq!(err.status, None);
		assert_eq!(err.http_status(), 502);
	}
}
