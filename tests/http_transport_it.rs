#![cfg(feature = "reqwest")]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use carrier_rates::{
	error::ErrorCode,
	http::{
		HttpClient, HttpRequest, ReqwestExchange, ResponseBody, RetryPolicy, RetryingHttpClient,
	},
	serde_json::json,
};

fn client(max_retries: u32) -> RetryingHttpClient<ReqwestExchange> {
	RetryingHttpClient::new(
		ReqwestExchange::default(),
		RetryPolicy::new(max_retries, Duration::from_millis(1)),
	)
}

#[tokio::test]
async fn gateway_errors_are_retried_until_the_budget_runs_out() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/unavailable");
			then.status(503).body("<html>maintenance</html>");
		})
		.await;
	let response = client(2)
		.request(HttpRequest::get(server.url("/unavailable")))
		.await
		.expect("The final 503 should be handed back to the caller.");

	assert_eq!(response.status, 503);
	assert_eq!(response.body, ResponseBody::Text("<html>maintenance</html>".into()));

	mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn client_errors_are_not_retried() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/rate");
			then.status(400).header("content-type", "application/json").json_body(json!({
				"response": { "errors": [{ "code": "111210" }] }
			}));
		})
		.await;
	let response = client(3)
		.request(HttpRequest::post(server.url("/rate")).json(json!({ "n": 1 })))
		.await
		.expect("A 400 should be returned.");

	assert_eq!(response.status, 400);
	assert_eq!(
		response.body.as_json().map(|body| body["response"]["errors"][0]["code"].clone()),
		Some(json!("111210"))
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn slow_responses_become_timeouts_after_retries() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/slow");
			then.status(200).delay(Duration::from_millis(500)).json_body(json!({ "ok": true }));
		})
		.await;
	let err = client(1)
		.request(HttpRequest::get(server.url("/slow")).timeout(Duration::from_millis(50)))
		.await
		.expect_err("Every attempt should time out.");

	assert_eq!(err.code, ErrorCode::Timeout);
	assert_eq!(err.http_status(), 504);

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn headers_query_and_json_bodies_reach_the_server() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/rating/v1/Rate")
				.query_param("additionalinfo", "timeintransit")
				.header("authorization", "Bearer token-123")
				.header("content-type", "application/json")
				.json_body(json!({ "RateRequest": { "Request": { "RequestOption": "Shop" } } }));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"RateResponse": { "RatedShipment": [] }
			}));
		})
		.await;
	let request = HttpRequest::post(server.url("/rating/v1/Rate"))
		.query("additionalinfo", "timeintransit")
		.header("authorization", "Bearer token-123")
		.json(json!({ "RateRequest": { "Request": { "RequestOption": "Shop" } } }));
	let response = client(0).request(request).await.expect("Request should succeed.");

	assert!(response.is_success());
	assert_eq!(response.headers.get("content-type").map(String::as_str), Some("application/json"));
	assert_eq!(
		response.body,
		ResponseBody::Json(json!({ "RateResponse": { "RatedShipment": [] } }))
	);

	mock.assert_calls_async(1).await;
}
