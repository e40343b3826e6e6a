// crates.io
use reqwest::{
	Client as ReqwestClient, Method,
	header::{CONTENT_TYPE, HeaderMap},
};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{ExchangeFuture, HttpExchange, HttpMethod, HttpRequest, HttpResponse, ResponseBody},
};

/// Live single-shot exchange backed by a shared [`ReqwestClient`].
///
/// Redirects follow reqwest's defaults; per-request timeouts come from [`HttpRequest::timeout`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestExchange(pub ReqwestClient);
impl HttpExchange for ReqwestExchange {
	fn exchange(&self, request: HttpRequest) -> ExchangeFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(method(request.method), request.url.as_str());

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if !request.query.is_empty() {
				builder = builder.query(&request.query);
			}
			if let Some(body) = &request.body {
				if request.header_value(CONTENT_TYPE.as_str()).is_none() {
					builder = builder.header(CONTENT_TYPE, body.content_type());
				}

				builder = builder.body(body.encode());
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = flatten_headers(response.headers());
			let bytes = response.bytes().await.map_err(TransportError::from)?;

			Ok(HttpResponse { status, body: ResponseBody::from_bytes(&bytes), headers })
		})
	}
}

fn method(method: HttpMethod) -> Method {
	match method {
		HttpMethod::Get => Method::GET,
		HttpMethod::Post => Method::POST,
	}
}

fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
	let mut flat = BTreeMap::new();

	for (name, value) in headers {
		if let Ok(value) = value.to_str() {
			flat.entry(name.as_str().to_owned()).or_insert_with(|| value.to_owned());
		}
	}

	flat
}
