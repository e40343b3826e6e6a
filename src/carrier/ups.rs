//! UPS rating adapter.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenProvider, CredentialKeys},
	carrier::{self, CarrierId, ProviderFuture, RateProvider},
	config::{self, ConfigSource},
	http::{HttpClient, HttpRequest},
	obs::{self, OperationKind},
	rates::{RateQuote, RateRequest},
};

/// [`RateProvider`] for the UPS Rating API.
pub struct UpsRateProvider {
	id: CarrierId,
	http: Arc<dyn HttpClient>,
	config: Arc<dyn ConfigSource>,
	auth: Arc<dyn AccessTokenProvider>,
}
impl UpsRateProvider {
	/// Registry key and token cache key.
	pub const CACHE_KEY: &str = "ups";
	/// Key holding the API base URL.
	pub const BASE_URL_KEY: &str = "UPS_API_BASE_URL";
	/// Keys holding the OAuth endpoint and credentials.
	pub const CREDENTIALS: CredentialKeys = CredentialKeys {
		token_url: "UPS_OAUTH_TOKEN_URL",
		client_id: "UPS_CLIENT_ID",
		client_secret: "UPS_CLIENT_SECRET",
	};
	/// Path of the rating endpoint relative to the base URL.
	pub const RATE_PATH: &str = "/rating/v1/Rate";
	/// Timeout applied to each rating call.
	pub const TIMEOUT: StdDuration = StdDuration::from_secs(15);

	const LABEL: &str = "UPS";

	/// Creates the adapter with its token source.
	pub fn new(
		http: Arc<dyn HttpClient>,
		config: Arc<dyn ConfigSource>,
		auth: Arc<dyn AccessTokenProvider>,
	) -> Self {
		Self { id: CarrierId::from_static(Self::CACHE_KEY), http, config, auth }
	}

	async fn quote(&self, request: &RateRequest) -> Result<Vec<RateQuote>> {
		let base_url = config::required_url(self.config.as_ref(), Self::BASE_URL_KEY)?;
		let url = format!("{}{}", base_url.as_str().trim_end_matches('/'), Self::RATE_PATH);
		let payload = build_rate_payload(request);

		payload.validate()?;

		let body = serde_json::to_value(&payload).map_err(|e| {
			CarrierError::new(ErrorCode::MalformedResponse, "UPS rate request invalid")
				.with_source(e)
		})?;
		let response = carrier::send_with_reauth(self.http.as_ref(), self.auth.as_ref(), |token| {
			HttpRequest::post(url.as_str())
				.header("authorization", token.bearer())
				.header("content-type", "application/json")
				.json(body.clone())
				.timeout(Self::TIMEOUT)
		})
		.await?;
		let raw = carrier::classify_response(Self::LABEL, response)?;

		map_rate_response(&raw, &self.id)
	}
}
impl Debug for UpsRateProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UpsRateProvider").field("id", &self.id).finish_non_exhaustive()
	}
}
impl RateProvider for UpsRateProvider {
	fn carrier_id(&self) -> &CarrierId {
		&self.id
	}

	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> ProviderFuture<'a> {
		Box::pin(obs::observe(OperationKind::RateQuote, &self.id, self.quote(request)))
	}
}
