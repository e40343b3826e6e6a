//! Transport primitives shared by every carrier adapter.
//!
//! [`HttpRequest`] and [`HttpResponse`] are the only values crossing the transport boundary, so no
//! carrier-specific knowledge leaks into it. Two traits split the work:
//!
//! - [`HttpExchange`] performs exactly one network call and reports raw [`TransportError`]s.
//! - [`HttpClient`] is what carrier code depends on; [`RetryingHttpClient`] implements it on top of
//!   any exchange by applying the retry policy and folding failures into [`CarrierError`].

pub mod retry;
pub mod stub;

#[cfg(feature = "reqwest")] mod live;

#[cfg(feature = "reqwest")] pub use live::*;
pub use retry::*;
pub use stub::*;

// self
use crate::{_prelude::*, config::ConfigSource, error::TransportError};

/// Boxed future returned by [`HttpClient::request`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;
/// Boxed future returned by [`HttpExchange::exchange`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// HTTP client abstraction consumed by auth providers and rate providers.
pub trait HttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request`, returning any HTTP response (including non-2xx) or a classified failure.
	fn request(&self, request: HttpRequest) -> HttpFuture<'_>;
}
impl<T> HttpClient for Arc<T>
where
	T: ?Sized + HttpClient,
{
	fn request(&self, request: HttpRequest) -> HttpFuture<'_> {
		(**self).request(request)
	}
}

/// Single network exchange with no retry semantics.
pub trait HttpExchange
where
	Self: 'static + Send + Sync,
{
	/// Performs one call.
	fn exchange(&self, request: HttpRequest) -> ExchangeFuture<'_>;
}

/// Supported request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum HttpBody {
	/// JSON document.
	Json(Value),
	/// `application/x-www-form-urlencoded` pairs, encoded in key order.
	Form(BTreeMap<String, String>),
}
impl HttpBody {
	/// Encodes the body as it goes on the wire.
	pub fn encode(&self) -> String {
		match self {
			HttpBody::Json(value) => value.to_string(),
			HttpBody::Form(pairs) =>
				url::form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish(),
		}
	}

	/// Default `content-type` for the body kind.
	pub const fn content_type(&self) -> &'static str {
		match self {
			HttpBody::Json(_) => "application/json",
			HttpBody::Form(_) => "application/x-www-form-urlencoded",
		}
	}
}

/// Outbound request description.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute URL without the query string.
	pub url: String,
	/// Header name/value pairs.
	pub headers: BTreeMap<String, String>,
	/// Query parameters.
	pub query: BTreeMap<String, String>,
	/// Optional body.
	pub body: Option<HttpBody>,
	/// Per-call timeout.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a request with no headers, query, body, or timeout.
	pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			headers: BTreeMap::new(),
			query: BTreeMap::new(),
			body: None,
			timeout: None,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: impl Into<String>) -> Self {
		Self::new(HttpMethod::Get, url)
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: impl Into<String>) -> Self {
		Self::new(HttpMethod::Post, url)
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Adds or replaces a query parameter.
	pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(name.into(), value.into());

		self
	}

	/// Sets a JSON body.
	pub fn json(mut self, body: Value) -> Self {
		self.body = Some(HttpBody::Json(body));

		self
	}

	/// Sets a form body.
	pub fn form(mut self, pairs: BTreeMap<String, String>) -> Self {
		self.body = Some(HttpBody::Form(pairs));

		self
	}

	/// Sets the per-call timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Case-insensitive header lookup.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Response body as received, decoded as far as the transport can without schema knowledge.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResponseBody {
	/// No bytes.
	#[default]
	Empty,
	/// Valid JSON.
	Json(Value),
	/// Anything else, decoded lossily as UTF-8.
	Text(String),
}
impl ResponseBody {
	/// Classifies raw body bytes.
	pub fn from_bytes(bytes: &[u8]) -> Self {
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Self::Empty;
		}

		match serde_json::from_slice(bytes) {
			Ok(value) => Self::Json(value),
			Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
		}
	}

	/// Returns the JSON document, if the body was structured.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Json(value) => Some(value),
			_ => None,
		}
	}

	/// Body as a JSON value for error details: text becomes a string, empty becomes `null`.
	pub fn to_value(&self) -> Value {
		match self {
			Self::Empty => Value::Null,
			Self::Json(value) => value.clone(),
			Self::Text(text) => Value::String(text.clone()),
		}
	}
}

/// Response received from a carrier.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body.
	pub body: ResponseBody,
	/// Lower-cased header names with their (first) values.
	pub headers: BTreeMap<String, String>,
}
impl HttpResponse {
	/// Creates a response with a JSON body and no headers.
	pub fn json(status: u16, body: Value) -> Self {
		Self { status, body: ResponseBody::Json(body), headers: BTreeMap::new() }
	}

	/// Creates a response with a text body and no headers.
	pub fn text(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: ResponseBody::Text(body.into()), headers: BTreeMap::new() }
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Transport selected by the `HTTP_MODE` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMode {
	/// Real network calls through reqwest.
	Live,
	/// Scripted responses through [`StubHttpClient`].
	Stub,
}
impl HttpMode {
	/// Configuration key selecting the mode.
	pub const KEY: &str = "HTTP_MODE";

	/// `live` (any case) selects [`HttpMode::Live`]; anything else, including absence, the stub.
	pub fn from_config(config: &dyn ConfigSource) -> Self {
		match config.get(Self::KEY) {
			Some(mode) if mode.trim().eq_ignore_ascii_case("live") => Self::Live,
			_ => Self::Stub,
		}
	}
}

/// Builds the process-wide HTTP client according to `HTTP_MODE` and the retry settings.
pub fn build_http_client(config: &dyn ConfigSource) -> Result<Arc<dyn HttpClient>> {
	match HttpMode::from_config(config) {
		HttpMode::Stub => Ok(Arc::new(StubHttpClient::default())),
		#[cfg(feature = "reqwest")]
		HttpMode::Live => {
			let policy = RetryPolicy::from_config(config);

			Ok(Arc::new(RetryingHttpClient::new(ReqwestExchange::default(), policy)))
		},
		#[cfg(not(feature = "reqwest"))]
		HttpMode::Live => Err(CarrierError::new(
			ErrorCode::ConfigError,
			"Live HTTP mode requires the `reqwest` feature",
		)
		.with_details(json!({ "key": HttpMode::KEY }))),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::MapConfig;

	#[test]
	fn form_bodies_encode_in_key_order() {
		let body = HttpBody::Form(BTreeMap::from([
			("grant_type".to_owned(), "client_credentials".to_owned()),
			("client_id".to_owned(), "client id".to_owned()),
		]));

		assert_eq!(body.encode(), "client_id=client+id&grant_type=client_credentials");
		assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
	}

	#[test]
	fn response_bodies_classify_bytes() {
		assert_eq!(ResponseBody::from_bytes(b""), ResponseBody::Empty);
		assert_eq!(ResponseBody::from_bytes(b" \n"), ResponseBody::Empty);
		assert_eq!(ResponseBody::from_bytes(b"{\"ok\":true}"), ResponseBody::Json(json!({ "ok": true })));
		assert_eq!(
			ResponseBody::from_bytes(b"<html>bad gateway</html>"),
			ResponseBody::Text("<html>bad gateway</html>".into())
		);
	}

	#[test]
	fn header_lookup_ignores_case() {
		let request = HttpRequest::post("https://api.ups.example")
			.header("Content-Type", "application/json");

		assert_eq!(request.header_value("content-type"), Some("application/json"));
		assert_eq!(request.header_value("authorization"), None);
	}

	#[test]
	fn http_mode_defaults_to_stub() {
		assert_eq!(HttpMode::from_config(&MapConfig::default()), HttpMode::Stub);
		assert_eq!(
			HttpMode::from_config(&MapConfig::default().with(HttpMode::KEY, "LIVE")),
			HttpMode::Live
		);
		assert_eq!(
			HttpMode::from_config(&MapConfig::default().with(HttpMode::KEY, "stub")),
			HttpMode::Stub
		);
	}
}
