//! Scripted [`HttpClient`] used when `HTTP_MODE` is not `live`, and by tests.

// self
use crate::{
	_prelude::*,
	http::{HttpClient, HttpFuture, HttpRequest, HttpResponse},
};

/// Reply queued for a request key.
#[derive(Debug)]
pub enum StubReply {
	/// Return this response.
	Response(HttpResponse),
	/// Fail with this error.
	Failure(CarrierError),
}
impl From<HttpResponse> for StubReply {
	fn from(response: HttpResponse) -> Self {
		Self::Response(response)
	}
}
impl From<CarrierError> for StubReply {
	fn from(error: CarrierError) -> Self {
		Self::Failure(error)
	}
}

/// Responds from per-request FIFO queues keyed by `METHOD:url:body`.
///
/// Headers, query, and timeout do not participate in the key, so the same payload sent with a
/// refreshed bearer token consumes the same queue. Every request is recorded for later assertions.
#[derive(Clone, Debug, Default)]
pub struct StubHttpClient {
	replies: Arc<Mutex<HashMap<String, VecDeque<StubReply>>>>,
	sent: Arc<Mutex<Vec<HttpRequest>>>,
}
impl StubHttpClient {
	/// Queues `reply` for the next request matching `request`'s key.
	pub fn register(&self, request: &HttpRequest, reply: impl Into<StubReply>) {
		self.replies.lock().entry(Self::key_for(request)).or_default().push_back(reply.into());
	}

	/// Every request received so far, in order.
	pub fn requests(&self) -> Vec<HttpRequest> {
		self.sent.lock().clone()
	}

	/// Number of requests received for `url`.
	pub fn calls_to(&self, url: &str) -> usize {
		self.sent.lock().iter().filter(|request| request.url == url).count()
	}

	/// Number of queued replies not consumed yet.
	pub fn pending(&self) -> usize {
		self.replies.lock().values().map(VecDeque::len).sum()
	}

	/// Key used to match requests against queued replies.
	pub fn key_for(request: &HttpRequest) -> String {
		let body = request.body.as_ref().map(|body| body.encode()).unwrap_or_default();

		format!("{}:{}:{body}", request.method, request.url)
	}
}
impl HttpClient for StubHttpClient {
	fn request(&self, request: HttpRequest) -> HttpFuture<'_> {
		let key = Self::key_for(&request);
		let next = self.replies.lock().get_mut(&key).and_then(VecDeque::pop_front);

		self.sent.lock().push(request);

		Box::pin(async move {
			match next {
				Some(StubReply::Response(response)) => Ok(response),
				Some(StubReply::Failure(error)) => Err(error),
				None => Err(CarrierError::new(ErrorCode::ConfigError, "Stub response not registered")
					.with_details(json!({ "requestKey": key }))),
			}
		})
	}
}
