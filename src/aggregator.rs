//! Sequential fan-out across resolved carriers.

// self
use crate::{
	_prelude::*,
	auth::{Clock, MemoryTokenCache, SystemClock, TokenStore},
	carrier::{self, CarrierRegistry},
	config::ConfigSource,
	http,
	obs::{self, OperationKind},
	rates::{RateQuote, RateRequest},
};

/// Entry point handing a neutral request to every matching carrier.
#[derive(Clone, Debug)]
pub struct RateAggregator {
	registry: CarrierRegistry,
}
impl RateAggregator {
	/// Wraps an existing registry.
	pub fn new(registry: CarrierRegistry) -> Self {
		Self { registry }
	}

	/// Wires the transport selected by `HTTP_MODE`, an in-memory token cache, the system clock,
	/// and every built-in carrier.
	pub fn from_config(config: Arc<dyn ConfigSource>) -> Result<Self> {
		let http = http::build_http_client(config.as_ref())?;
		let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenCache::default());
		let clock: Arc<dyn Clock> = Arc::new(SystemClock);

		Ok(Self::new(carrier::default_registry(http, config, store, clock)))
	}

	/// Registry used for resolution.
	pub fn registry(&self) -> &CarrierRegistry {
		&self.registry
	}

	/// Validates `request`, then quotes it with each resolved provider in registration order.
	///
	/// Quotes are concatenated in provider order. The first failure aborts the remaining
	/// providers and is returned unchanged.
	pub async fn get_quotes(&self, request: &RateRequest) -> Result<Vec<RateQuote>> {
		let scope = request.carrier_id.as_deref().unwrap_or("all");

		obs::observe(OperationKind::Aggregate, scope, async {
			request.validate()?;

			let providers = self.registry.resolve_providers(request.carrier_id.as_deref())?;
			let mut quotes = Vec::new();

			for provider in providers {
				quotes.extend(provider.get_rates(request).await?);
			}

			Ok(quotes)
		})
		.await
	}
}
