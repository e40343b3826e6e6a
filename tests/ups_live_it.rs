#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use carrier_rates::{
	aggregator::RateAggregator,
	config::MapConfig,
	error::ErrorCode,
	rates::{Address, Package, RateRequest, WeightUnit},
	serde_json::json,
};

const TOKEN_PATH: &str = "/security/v1/oauth/token";
const RATE_PATH: &str = "/api/rating/v1/Rate";
const TOKEN_FORM: &str =
	"client_id=client-id&client_secret=client-secret&grant_type=client_credentials";

fn live_aggregator(server: &MockServer) -> RateAggregator {
	let config = MapConfig::from_iter([
		("HTTP_MODE", "live".to_owned()),
		("HTTP_MAX_RETRIES", "1".to_owned()),
		("HTTP_RETRY_BASE_DELAY_MS", "1".to_owned()),
		("UPS_OAUTH_TOKEN_URL", server.url(TOKEN_PATH)),
		("UPS_CLIENT_ID", "client-id".to_owned()),
		("UPS_CLIENT_SECRET", "client-secret".to_owned()),
		("UPS_API_BASE_URL", server.url("/api")),
	]);

	RateAggregator::from_config(Arc::new(config)).expect("Live wiring should build.")
}

fn request() -> RateRequest {
	RateRequest::new(
		Address::new("94103", "US"),
		Address::new("10001", "US"),
		vec![Package::new(2.0, WeightUnit::Lb)],
	)
	.with_service_level("03")
}

#[tokio::test]
async fn live_transport_quotes_end_to_end() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.body(TOKEN_FORM);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "token-123",
				"token_type": "Bearer",
				"expires_in": 3600
			}));
		})
		.await;
	let rate = server
		.mock_async(|when, then| {
			when.method(POST).path(RATE_PATH).header("authorization", "Bearer token-123");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"RateResponse": { "RatedShipment": [{
					"Service": { "Code": "03" },
					"TotalCharges": { "MonetaryValue": "12.34", "CurrencyCode": "USD" },
					"GuaranteedDelivery": { "BusinessDaysInTransit": "3" }
				}] }
			}));
		})
		.await;
	let aggregator = live_aggregator(&server);
	let first = aggregator.get_quotes(&request()).await.expect("First quote should succeed.");
	let second = aggregator.get_quotes(&request()).await.expect("Second quote should succeed.");

	assert_eq!(first, second);
	assert_eq!(first.len(), 1);
	assert_eq!(first[0].service_code, "03");
	assert_eq!(first[0].total_charge, 12.34);
	assert_eq!(first[0].delivery_days, Some(3));

	token.assert_calls_async(1).await;
	rate.assert_calls_async(2).await;
}

#[tokio::test]
async fn persistent_gateway_errors_surface_as_upstream_errors() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "token-123",
				"expires_in": 3600
			}));
		})
		.await;
	let rate = server
		.mock_async(|when, then| {
			when.method(POST).path(RATE_PATH);
			then.status(502).body("Bad Gateway");
		})
		.await;
	let err = live_aggregator(&server)
		.get_quotes(&request())
		.await
		.expect_err("Exhausted 502s should fail.");

	assert_eq!(err.code, ErrorCode::UpstreamError);
	assert_eq!(err.status, Some(502));
	assert_eq!(err.details, None);

	token.assert_calls_async(1).await;
	rate.assert_calls_async(2).await;
}
