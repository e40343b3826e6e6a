//! Routing of a carrier identifier (or "all") to rate providers.

// self
use crate::{
	_prelude::*,
	carrier::{CarrierId, RateProvider},
};

/// Ordered set of rate providers keyed by [`CarrierId`].
#[derive(Clone, Default)]
pub struct CarrierRegistry {
	providers: Vec<Arc<dyn RateProvider>>,
}
impl CarrierRegistry {
	/// Builder-style [`CarrierRegistry::register`].
	pub fn with(mut self, provider: impl 'static + RateProvider) -> Self {
		self.register(Arc::new(provider));

		self
	}

	/// Adds `provider`; a provider already registered under the same id is replaced in place.
	pub fn register(&mut self, provider: Arc<dyn RateProvider>) {
		match self.providers.iter_mut().find(|existing| existing.carrier_id() == provider.carrier_id())
		{
			Some(existing) => *existing = provider,
			None => self.providers.push(provider),
		}
	}

	/// Registered carrier ids in registration order.
	pub fn carrier_ids(&self) -> Vec<&CarrierId> {
		self.providers.iter().map(|provider| provider.carrier_id()).collect()
	}

	/// Resolves `carrier_id` (matched case-insensitively) to its provider, or every provider in
	/// registration order when absent.
	///
	/// An unknown id fails `VALIDATION_ERROR` "Unsupported carrier" with `{ "carrierId": id }`.
	pub fn resolve_providers(&self, carrier_id: Option<&str>) -> Result<Vec<Arc<dyn RateProvider>>> {
		let Some(raw) = carrier_id.filter(|raw| !raw.is_empty()) else {
			return Ok(self.providers.clone());
		};
		let wanted = CarrierId::new(raw).ok();

		self.providers
			.iter()
			.find(|provider| Some(provider.carrier_id()) == wanted.as_ref())
			.map(|provider| vec![provider.clone()])
			.ok_or_else(|| {
				CarrierError::new(ErrorCode::ValidationError, "Unsupported carrier")
					.with_details(json!({ "carrierId": raw }))
			})
	}
}
impl Debug for CarrierRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CarrierRegistry").field("carriers", &self.carrier_ids()).finish()
	}
}
