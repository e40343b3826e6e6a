//! Carrier-neutral request and quote shapes exchanged with the aggregator.
//!
//! JSON field names are camelCase. [`RateRequest::parse`] is the inbound trust boundary: it
//! deserializes untrusted JSON and runs [`RateRequest::validate`], reporting every issue at once.

// self
use crate::{
	_prelude::*,
	schema::{self, Issue, Issues},
};

/// Postal address of a shipment endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
	/// Postal or ZIP code, at least two characters.
	pub postal_code: String,
	/// ISO 3166-1 alpha-2 country code.
	pub country_code: String,
	/// City name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	/// State or province code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	/// First street line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address_line1: Option<String>,
	/// Second street line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address_line2: Option<String>,
}
impl Address {
	/// Creates an address with only the required fields.
	pub fn new(postal_code: impl Into<String>, country_code: impl Into<String>) -> Self {
		Self {
			postal_code: postal_code.into(),
			country_code: country_code.into(),
			city: None,
			state: None,
			address_line1: None,
			address_line2: None,
		}
	}

	fn check(&self, path: &str, issues: &mut Issues) {
		issues.check(
			self.postal_code.chars().count() < 2,
			format!("{path}.postalCode"),
			"must contain at least 2 characters",
		);
		issues.check(
			!is_country_code(&self.country_code),
			format!("{path}.countryCode"),
			"must be a 2-letter code",
		);

		for (field, value) in [
			("city", &self.city),
			("state", &self.state),
			("addressLine1", &self.address_line1),
			("addressLine2", &self.address_line2),
		] {
			issues.check(
				value.as_deref().is_some_and(str::is_empty),
				format!("{path}.{field}"),
				"must not be empty",
			);
		}
	}
}

/// Weight unit of a package.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeightUnit {
	/// Pounds.
	Lb,
	/// Kilograms.
	Kg,
}

/// Package weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weight {
	/// Strictly positive amount.
	pub value: f64,
	/// Unit of `value`.
	pub unit: WeightUnit,
}

/// Dimension unit of a package.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DimensionUnit {
	/// Inches.
	In,
	/// Centimeters.
	Cm,
}

/// Package dimensions; every side strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
	/// Length.
	pub length: f64,
	/// Width.
	pub width: f64,
	/// Height.
	pub height: f64,
	/// Unit of every side.
	pub unit: DimensionUnit,
}

/// One parcel in a shipment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
	/// Package weight.
	pub weight: Weight,
	/// Optional package dimensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Dimensions>,
}
impl Package {
	/// Creates a package with no dimensions.
	pub fn new(value: f64, unit: WeightUnit) -> Self {
		Self { weight: Weight { value, unit }, dimensions: None }
	}

	/// Attaches dimensions.
	pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
		self.dimensions = Some(dimensions);

		self
	}

	fn check(&self, path: &str, issues: &mut Issues) {
		issues.check(
			!is_positive(self.weight.value),
			format!("{path}.weight.value"),
			"must be greater than 0",
		);

		if let Some(dimensions) = &self.dimensions {
			for (side, value) in [
				("length", dimensions.length),
				("width", dimensions.width),
				("height", dimensions.height),
			] {
				issues.check(
					!is_positive(value),
					format!("{path}.dimensions.{side}"),
					"must be greater than 0",
				);
			}
		}
	}
}

/// Carrier-neutral rate request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
	/// Restricts the request to one carrier; all registered carriers otherwise.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub carrier_id: Option<String>,
	/// Carrier service code to rate; every service is shopped otherwise.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_level: Option<String>,
	/// Ship-from address.
	pub origin: Address,
	/// Ship-to address.
	pub destination: Address,
	/// At least one package.
	pub packages: Vec<Package>,
}
impl RateRequest {
	/// Creates a request across all carriers and services.
	pub fn new(origin: Address, destination: Address, packages: Vec<Package>) -> Self {
		Self { carrier_id: None, service_level: None, origin, destination, packages }
	}

	/// Restricts the request to `carrier_id`.
	pub fn with_carrier(mut self, carrier_id: impl Into<String>) -> Self {
		self.carrier_id = Some(carrier_id.into());

		self
	}

	/// Rates a single service.
	pub fn with_service_level(mut self, service_level: impl Into<String>) -> Self {
		self.service_level = Some(service_level.into());

		self
	}

	/// Deserializes and validates an inbound JSON request.
	pub fn parse(value: &Value) -> Result<Self> {
		let request = schema::parse::<Self>(value).map_err(invalid_request)?;

		request.validate()?;

		Ok(request)
	}

	/// Checks every field constraint, failing `VALIDATION_ERROR` with all issues found.
	pub fn validate(&self) -> Result<()> {
		let mut issues = Issues::default();

		for (field, value) in
			[("carrierId", &self.carrier_id), ("serviceLevel", &self.service_level)]
		{
			issues.check(
				value.as_deref().is_some_and(|value| value.chars().count() < 2),
				field,
				"must contain at least 2 characters",
			);
		}

		self.origin.check("origin", &mut issues);
		self.destination.check("destination", &mut issues);
		issues.check(self.packages.is_empty(), "packages", "must contain at least 1 package");

		for (i, package) in self.packages.iter().enumerate() {
			package.check(&format!("packages[{i}]"), &mut issues);
		}

		issues.finish().map_err(invalid_request)
	}
}

/// One priced service offered by a carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
	/// Carrier that produced the quote.
	pub carrier_id: String,
	/// Carrier service code.
	pub service_code: String,
	/// Human-readable service name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_name: Option<String>,
	/// Non-negative total charge.
	pub total_charge: f64,
	/// ISO 4217 currency code.
	pub currency: String,
	/// Positive number of business days in transit, when guaranteed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivery_days: Option<u32>,
}

/// Whether `code` is exactly two ASCII letters.
pub(crate) fn is_country_code(code: &str) -> bool {
	code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_positive(value: f64) -> bool {
	value.is_finite() && value > 0.0
}

fn invalid_request(issues: Vec<Issue>) -> CarrierError {
	CarrierError::new(ErrorCode::ValidationError, "Invalid request")
		.with_details(json!({ "issues": issues }))
}
