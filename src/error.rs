//! Carrier-level error taxonomy shared by the transport, auth, and adapter layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`CarrierError`] by default.
pub type Result<T, E = CarrierError> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Closed set of failure kinds a caller can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// The request (or the carrier's view of it) is invalid.
	ValidationError,
	/// Credentials were rejected or the token endpoint failed.
	AuthError,
	/// The carrier or the network failed in a way that is not otherwise classified.
	UpstreamError,
	/// The HTTP call timed out after exhausting retries.
	Timeout,
	/// A payload failed structural validation.
	MalformedResponse,
	/// The carrier throttled the call.
	RateLimit,
	/// Required configuration is missing or unusable.
	ConfigError,
}
impl ErrorCode {
	/// Returns the stable label used in serialized error bodies.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::ValidationError => "VALIDATION_ERROR",
			ErrorCode::AuthError => "AUTH_ERROR",
			ErrorCode::UpstreamError => "UPSTREAM_ERROR",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::MalformedResponse => "MALFORMED_RESPONSE",
			ErrorCode::RateLimit => "RATE_LIMIT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
		}
	}

	/// HTTP status an inbound boundary should answer with when no upstream status is known.
	pub const fn default_http_status(self) -> u16 {
		match self {
			ErrorCode::ValidationError => 400,
			ErrorCode::AuthError => 401,
			ErrorCode::UpstreamError | ErrorCode::MalformedResponse => 502,
			ErrorCode::Timeout => 504,
			ErrorCode::RateLimit => 429,
			ErrorCode::ConfigError => 500,
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// The only error type propagated out of the crate.
///
/// Carries enough context (kind, upstream status, structured details) for a caller to pick an
/// HTTP status or a retry policy without inspecting the underlying transport failure.
#[derive(Debug, ThisError)]
#[error("{code}: {message}")]
pub struct CarrierError {
	/// Failure kind.
	pub code: ErrorCode,
	/// Human-readable summary.
	pub message: String,
	/// Upstream HTTP status, when the failure came from a carrier response.
	pub status: Option<u16>,
	/// Structured diagnostics (validation issues, raw carrier body, missing key, ...).
	pub details: Option<Value>,
	#[source]
	source: Option<BoxError>,
}
impl CarrierError {
	/// Creates an error with no status, details, or source.
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self { code, message: message.into(), status: None, details: None, source: None }
	}

	/// Attaches the upstream HTTP status.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches structured details.
	pub fn with_details(mut self, details: Value) -> Self {
		self.details = Some(details);

		self
	}

	/// Attaches the underlying cause.
	pub fn with_source(mut self, source: impl 'static + Send + Sync + StdError) -> Self {
		self.source = Some(Box::new(source));

		self
	}

	/// `CONFIG_ERROR` for a missing or empty configuration key.
	pub fn missing_config(key: &str) -> Self {
		Self::new(ErrorCode::ConfigError, "Missing configuration").with_details(json!({ "key": key }))
	}

	/// `MALFORMED_RESPONSE` carrying validation issues as details.
	pub fn malformed(message: impl Into<String>, issues: &[crate::schema::Issue]) -> Self {
		Self::new(ErrorCode::MalformedResponse, message).with_details(json!({ "issues": issues }))
	}

	/// Status an inbound HTTP boundary should use: the upstream status when known, otherwise
	/// the code's default.
	pub fn http_status(&self) -> u16 {
		self.status.unwrap_or_else(|| self.code.default_http_status())
	}

	/// Serializable `{ code, message, details }` body for an inbound HTTP boundary.
	pub fn to_body(&self) -> ErrorBody {
		ErrorBody {
			code: self.code,
			message: self.message.clone(),
			details: self.details.clone().unwrap_or(Value::Null),
		}
	}
}

/// Wire shape of a [`CarrierError`] as returned to inbound callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Failure kind.
	pub code: ErrorCode,
	/// Human-readable summary.
	pub message: String,
	/// Structured diagnostics, `null` when absent.
	pub details: Value,
}

/// Failures raised by a single network exchange, before retry policy is applied.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The call exceeded its timeout or the connection was aborted.
	#[error("HTTP request timed out.")]
	Timeout {
		/// Transport-specific cause.
		#[source]
		source: BoxError,
	},
	/// The response body could not be decoded.
	#[error("HTTP response body could not be decoded.")]
	Decode {
		/// Transport-specific cause.
		#[source]
		source: BoxError,
	},
	/// The request could not be encoded or built.
	#[error("HTTP request could not be built: {message}.")]
	Encode {
		/// Reason the request was rejected.
		message: String,
	},
	/// Any other network failure (DNS, TCP, TLS, ...).
	#[error("HTTP request failed: {source}")]
	Network {
		/// Transport-specific cause.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a timeout or connection-abort failure.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a body decoding failure.
	pub fn decode(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Decode { source: Box::new(src) }
	}

	/// Wraps a generic network failure.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Whether the retry policy may try the call again.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_decode() {
			Self::decode(e)
		} else if e.is_builder() {
			Self::Encode { message: e.to_string() }
		} else {
			Self::network(e)
		}
	}
}
impl From<TransportError> for CarrierError {
	fn from(e: TransportError) -> Self {
		match e {
			TransportError::Timeout { .. } =>
				CarrierError::new(ErrorCode::Timeout, "HTTP request timed out").with_source(e),
			TransportError::Decode { .. } =>
				CarrierError::new(ErrorCode::MalformedResponse, "HTTP response body is malformed")
					.with_details(json!({ "message": e.to_string() }))
					.with_source(e),
			_ => CarrierError::new(ErrorCode::UpstreamError, "HTTP request failed")
				.with_details(json!({ "message": e.to_string() }))
				.with_source(e),
		}
	}
}
