// std
use std::sync::Arc;
// self
use carrier_rates::{
	aggregator::RateAggregator,
	auth::{ManualClock, MemoryTokenCache},
	carrier::{self, ups},
	config::MapConfig,
	error::ErrorCode,
	http::{HttpBody, HttpRequest, HttpResponse, StubHttpClient},
	rates::{Address, Package, RateRequest, WeightUnit},
	serde_json::{Value, json},
};
use time::Duration;

const TOKEN_URL: &str = "https://wwwcie.ups.com/security/v1/oauth/token";
const BASE_URL: &str = "https://wwwcie.ups.com/api";
const RATE_URL: &str = "https://wwwcie.ups.com/api/rating/v1/Rate";

struct Harness {
	stub: StubHttpClient,
	clock: ManualClock,
	config: MapConfig,
	aggregator: RateAggregator,
}

fn harness() -> Harness {
	let stub = StubHttpClient::default();
	let clock = ManualClock::default();
	let config = MapConfig::from_iter([
		("UPS_OAUTH_TOKEN_URL", TOKEN_URL),
		("UPS_CLIENT_ID", "client-id"),
		("UPS_CLIENT_SECRET", "client-secret"),
		("UPS_API_BASE_URL", BASE_URL),
	]);
	let registry = carrier::default_registry(
		Arc::new(stub.clone()),
		Arc::new(config.clone()),
		Arc::new(MemoryTokenCache::default()),
		Arc::new(clock.clone()),
	);

	Harness { stub, clock, config, aggregator: RateAggregator::new(registry) }
}

fn sample_request() -> RateRequest {
	let mut origin = Address::new("94103", "US");

	origin.city = Some("San Francisco".into());
	origin.state = Some("CA".into());
	origin.address_line1 = Some("123 Main St".into());
	origin.address_line2 = Some("Suite 100".into());

	let mut destination = Address::new("10001", "US");

	destination.city = Some("New York".into());
	destination.state = Some("NY".into());
	destination.address_line1 = Some("456 Market St".into());

	RateRequest::new(origin, destination, vec![Package::new(2.0, WeightUnit::Lb)])
}

fn auth_request() -> HttpRequest {
	HttpRequest::post(TOKEN_URL).form(
		[
			("grant_type", "client_credentials"),
			("client_id", "client-id"),
			("client_secret", "client-secret"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_owned(), v.to_owned()))
		.collect(),
	)
}

fn rate_request(request: &RateRequest) -> HttpRequest {
	let payload = payload_json(&ups::build_rate_payload(request));

	HttpRequest::post(RATE_URL).json(payload)
}

fn payload_json(payload: &ups::UpsRatePayload) -> Value {
	carrier_rates::serde_json::to_value(payload).expect("UPS payload should serialize.")
}

fn token(access_token: &str, expires_in: u64) -> HttpResponse {
	HttpResponse::json(
		200,
		json!({ "access_token": access_token, "token_type": "Bearer", "expires_in": expires_in }),
	)
}

fn rate_fixture() -> Value {
	json!({
		"RateResponse": {
			"RatedShipment": [{
				"Service": { "Code": "03", "Description": "UPS Ground" },
				"TotalCharges": { "MonetaryValue": "12.34", "CurrencyCode": "USD" }
			}]
		}
	})
}

#[tokio::test]
async fn successful_rate_returns_fixture_quote() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));

	let quotes = h.aggregator.get_quotes(&request).await.expect("Scenario A should succeed.");

	assert_eq!(quotes.len(), 1);
	assert_eq!(quotes[0].carrier_id, "ups");
	assert_eq!(quotes[0].service_code, "03");
	assert_eq!(quotes[0].service_name.as_deref(), Some("UPS Ground"));
	assert_eq!(quotes[0].total_charge, 12.34);
	assert_eq!(quotes[0].currency, "USD");
	assert_eq!(quotes[0].delivery_days, None);

	let sent = h.stub.requests();

	assert_eq!(sent[1].header_value("authorization"), Some("Bearer token-123"));
	assert_eq!(sent[1].timeout, Some(std::time::Duration::from_secs(15)));
}

#[tokio::test]
async fn unauthorized_rate_call_refreshes_token_once() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub.register(&auth_request(), token("token-456", 3600));
	h.stub
		.register(&rate_request(&request), HttpResponse::json(401, json!({ "error": "expired" })));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));

	let quotes = h.aggregator.get_quotes(&request).await.expect("Scenario B should succeed.");

	assert_eq!(quotes[0].service_code, "03");
	assert_eq!(h.stub.calls_to(TOKEN_URL), 2);
	assert_eq!(h.stub.calls_to(RATE_URL), 2);

	let bearer: Vec<_> = h
		.stub
		.requests()
		.into_iter()
		.filter(|sent| sent.url == RATE_URL)
		.filter_map(|sent| sent.header_value("authorization").map(str::to_owned))
		.collect();

	assert_eq!(bearer, ["Bearer token-123", "Bearer token-456"]);
}

#[tokio::test]
async fn repeated_forbidden_fails_without_further_retries() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub.register(&auth_request(), token("token-456", 3600));
	h.stub.register(&rate_request(&request), HttpResponse::json(403, json!({})));
	h.stub
		.register(&rate_request(&request), HttpResponse::json(403, json!({ "denied": true })));

	let err = h.aggregator.get_quotes(&request).await.expect_err("Scenario C should fail.");

	assert_eq!(err.code, ErrorCode::AuthError);
	assert_eq!(err.status, Some(403));
	assert_eq!(err.details, Some(json!({ "response": { "denied": true } })));
	assert_eq!(h.stub.calls_to(TOKEN_URL), 2);
	assert_eq!(h.stub.calls_to(RATE_URL), 2);
	assert_eq!(h.stub.pending(), 0);
}

#[tokio::test]
async fn throttled_rate_call_is_rate_limited() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub
		.register(&rate_request(&request), HttpResponse::json(429, json!({ "retry": "later" })));

	let err = h.aggregator.get_quotes(&request).await.expect_err("Scenario D should fail.");

	assert_eq!(err.code, ErrorCode::RateLimit);
	assert_eq!(err.status, Some(429));
	assert_eq!(err.http_status(), 429);
}

#[tokio::test]
async fn incomplete_rate_body_is_malformed() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub.register(
		&rate_request(&request),
		HttpResponse::json(200, json!({ "RateResponse": { "RatedShipment": [{ "Service": {} }] } })),
	);

	let err = h.aggregator.get_quotes(&request).await.expect_err("Scenario E should fail.");

	assert_eq!(err.code, ErrorCode::MalformedResponse);
	assert!(err.details.is_some_and(|details| details["issues"].is_array()));
}

#[tokio::test]
async fn missing_base_url_fails_before_any_call() {
	for value in [None, Some("")] {
		let h = harness();

		match value {
			Some(value) => h.config.set("UPS_API_BASE_URL", value),
			None => h.config.remove("UPS_API_BASE_URL"),
		}

		let err =
			h.aggregator.get_quotes(&sample_request()).await.expect_err("Scenario F should fail.");

		assert_eq!(err.code, ErrorCode::ConfigError);
		assert_eq!(err.details, Some(json!({ "key": "UPS_API_BASE_URL" })));
		assert!(h.stub.requests().is_empty());
	}
}

#[tokio::test]
async fn valid_token_is_reused_across_requests() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));

	h.aggregator.get_quotes(&request).await.expect("First request should succeed.");
	h.clock.advance(Duration::minutes(30));
	h.aggregator.get_quotes(&request).await.expect("Second request should succeed.");

	assert_eq!(h.stub.calls_to(TOKEN_URL), 1);
	assert_eq!(h.stub.calls_to(RATE_URL), 2);
}

#[tokio::test]
async fn expired_token_is_refreshed_exactly_once() {
	let h = harness();
	let request = sample_request();

	h.stub.register(&auth_request(), token("token-123", 1));
	h.stub.register(&auth_request(), token("token-456", 3600));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));

	h.aggregator.get_quotes(&request).await.expect("First request should succeed.");
	h.clock.advance(Duration::seconds(100));
	h.aggregator.get_quotes(&request).await.expect("Second request should succeed.");

	assert_eq!(h.stub.calls_to(TOKEN_URL), 2);

	let last = h.stub.requests().pop().expect("Requests should be recorded.");

	assert_eq!(last.header_value("authorization"), Some("Bearer token-456"));
}

#[tokio::test]
async fn client_and_server_errors_are_classified() {
	for (status, code) in [(400, ErrorCode::ValidationError), (500, ErrorCode::UpstreamError)] {
		let h = harness();
		let request = sample_request();
		let body = json!({ "response": { "errors": [{ "code": "111210", "message": "bad" }] } });

		h.stub.register(&auth_request(), token("token-123", 3600));
		h.stub.register(&rate_request(&request), HttpResponse::json(status, body.clone()));

		let err = h.aggregator.get_quotes(&request).await.expect_err("Non-2xx should fail.");

		assert_eq!(err.code, code);
		assert_eq!(err.status, Some(status));
		assert_eq!(err.details, Some(json!({ "response": body })));
		assert_eq!(err.to_body().code, code);
	}
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_errors() {
	let h = harness();

	h.stub
		.register(&auth_request(), HttpResponse::json(401, json!({ "error": "invalid_client" })));

	let err = h.aggregator.get_quotes(&sample_request()).await.expect_err("Auth should fail.");

	assert_eq!(err.code, ErrorCode::AuthError);
	assert_eq!(err.status, Some(401));
	assert_eq!(h.stub.calls_to(RATE_URL), 0);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_call() {
	let h = harness();

	h.config.remove("UPS_CLIENT_ID");

	let err = h.aggregator.get_quotes(&sample_request()).await.expect_err("Config should fail.");

	assert_eq!(err.code, ErrorCode::ConfigError);
	assert_eq!(err.details, Some(json!({ "key": "UPS_CLIENT_ID" })));
	assert!(h.stub.requests().is_empty());
}

#[tokio::test]
async fn unknown_carriers_and_invalid_requests_never_hit_the_network() {
	let h = harness();
	let unknown = sample_request().with_carrier("fedex");
	let mut invalid = sample_request();

	invalid.destination.country_code = "USA".into();

	let err = h.aggregator.get_quotes(&unknown).await.expect_err("Unknown carrier should fail.");

	assert_eq!(err.code, ErrorCode::ValidationError);
	assert_eq!(err.message, "Unsupported carrier");
	assert_eq!(err.details, Some(json!({ "carrierId": "fedex" })));

	let err = h.aggregator.get_quotes(&invalid).await.expect_err("Invalid request should fail.");

	assert_eq!(err.code, ErrorCode::ValidationError);
	assert_eq!(err.message, "Invalid request");
	assert!(h.stub.requests().is_empty());
}

#[tokio::test]
async fn carrier_filter_is_case_insensitive() {
	let h = harness();
	let request = sample_request().with_carrier("UPS").with_service_level("03");

	h.stub.register(&auth_request(), token("token-123", 3600));
	h.stub.register(&rate_request(&request), HttpResponse::json(200, rate_fixture()));

	let quotes =
		h.aggregator.get_quotes(&request).await.expect("Filtered request should succeed.");
	let sent = h.stub.requests().pop().expect("Rate call should be recorded.");
	let body = match sent.body {
		Some(HttpBody::Json(body)) => body,
		other => panic!("Rate call should carry JSON, got {other:?}."),
	};

	assert_eq!(quotes.len(), 1);
	assert_eq!(body["RateRequest"]["Request"]["RequestOption"], "Rate");
	assert_eq!(body["RateRequest"]["Shipment"]["Service"]["Code"], "03");
}

#[test]
fn request_mapping_is_deterministic() {
	let request = sample_request();
	let first = payload_json(&ups::build_rate_payload(&request));
	let second = payload_json(&ups::build_rate_payload(&request.clone()));

	assert_eq!(first, second);
	assert_eq!(first["RateRequest"]["Request"]["RequestOption"], "Shop");
	assert_eq!(
		first["RateRequest"]["Shipment"]["ShipFrom"],
		first["RateRequest"]["Shipment"]["Shipper"]
	);
}

#[tokio::test]
async fn default_wiring_uses_the_stub_transport() {
	let config = MapConfig::from_iter([
		("UPS_OAUTH_TOKEN_URL", TOKEN_URL),
		("UPS_CLIENT_ID", "client-id"),
		("UPS_CLIENT_SECRET", "client-secret"),
		("UPS_API_BASE_URL", BASE_URL),
	]);
	let aggregator =
		RateAggregator::from_config(Arc::new(config)).expect("Stub wiring should build.");
	let err = aggregator
		.get_quotes(&sample_request())
		.await
		.expect_err("An empty stub should reject the token call.");

	assert_eq!(err.code, ErrorCode::ConfigError);
	assert_eq!(err.message, "Stub response not registered");
	assert_eq!(err.http_status(), 500);
}
