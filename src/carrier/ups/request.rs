//! Neutral request → UPS Rating API payload.

// self
use crate::{
	_prelude::*,
	rates::{self, Address, DimensionUnit, Package, RateRequest, WeightUnit},
	schema::Issues,
};

const PACKAGING_CUSTOMER_SUPPLIED: &str = "02";

/// `RequestOption` of a UPS rate call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOption {
	/// Rate the single service named in `Shipment.Service`.
	Rate,
	/// Rate every available service.
	Shop,
}

/// Body of `POST /rating/v1/Rate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpsRatePayload {
	#[serde(rename = "RateRequest")]
	rate_request: RateEnvelope,
}
impl UpsRatePayload {
	/// Request mode carried by the payload.
	pub fn request_option(&self) -> RequestOption {
		self.rate_request.request.request_option
	}

	/// Checks the payload against the UPS wire rules, failing `MALFORMED_RESPONSE`.
	pub fn validate(&self) -> Result<()> {
		let mut issues = Issues::default();
		let envelope = &self.rate_request;
		let shipment = &envelope.shipment;

		issues.check(
			(envelope.request.request_option == RequestOption::Rate) != shipment.service.is_some(),
			"RateRequest.Request.RequestOption",
			"must be Rate exactly when a service is present",
		);

		for (party, address) in [
			("Shipper", &shipment.shipper.address),
			("ShipTo", &shipment.ship_to.address),
			("ShipFrom", &shipment.ship_from.address),
		] {
			let path = format!("RateRequest.Shipment.{party}.Address");

			issues.check(
				address.postal_code.is_empty(),
				format!("{path}.PostalCode"),
				"must not be empty",
			);
			issues.check(
				!rates::is_country_code(&address.country_code),
				format!("{path}.CountryCode"),
				"must be a 2-letter code",
			);
		}

		issues.check(shipment.package.is_empty(), "RateRequest.Shipment.Package", "must not be empty");

		for (i, package) in shipment.package.iter().enumerate() {
			let path = format!("RateRequest.Shipment.Package[{i}]");
			let weight = &package.package_weight;

			issues.check(
				!matches!(weight.unit_of_measurement.code.as_str(), "LBS" | "KGS"),
				format!("{path}.PackageWeight.UnitOfMeasurement.Code"),
				"must be LBS or KGS",
			);
			issues.check(
				!is_positive_number(&weight.weight),
				format!("{path}.PackageWeight.Weight"),
				"must be a positive number",
			);

			if let Some(dimensions) = &package.dimensions {
				issues.check(
					!matches!(dimensions.unit_of_measurement.code.as_str(), "IN" | "CM"),
					format!("{path}.Dimensions.UnitOfMeasurement.Code"),
					"must be IN or CM",
				);

				for (side, value) in [
					("Length", &dimensions.length),
					("Width", &dimensions.width),
					("Height", &dimensions.height),
				] {
					issues.check(
						!is_positive_number(value),
						format!("{path}.Dimensions.{side}"),
						"must be a positive number",
					);
				}
			}
		}

		issues
			.finish()
			.map_err(|issues| CarrierError::malformed("UPS rate request invalid", &issues))
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RateEnvelope {
	request: RequestMeta,
	shipment: Shipment,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RequestMeta {
	request_option: RequestOption,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Shipment {
	shipper: Party,
	ship_to: Party,
	ship_from: Party,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	service: Option<Code>,
	package: Vec<UpsPackage>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Party {
	address: UpsAddress,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpsAddress {
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	address_line: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	city: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	state_province_code: Option<String>,
	postal_code: String,
	country_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Code {
	code: String,
}
impl Code {
	fn new(code: impl Into<String>) -> Self {
		Self { code: code.into() }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpsPackage {
	packaging_type: Code,
	package_weight: PackageWeight,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	dimensions: Option<UpsDimensions>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PackageWeight {
	unit_of_measurement: Code,
	weight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpsDimensions {
	unit_of_measurement: Code,
	length: String,
	width: String,
	height: String,
}

/// Maps a neutral request onto the UPS payload.
///
/// Pure and total: the same request always yields the same payload. `ShipFrom` mirrors the origin.
pub fn build_rate_payload(request: &RateRequest) -> UpsRatePayload {
	let service = request.service_level.as_ref().map(Code::new);
	let request_option = if service.is_some() { RequestOption::Rate } else { RequestOption::Shop };

	UpsRatePayload {
		rate_request: RateEnvelope {
			request: RequestMeta { request_option },
			shipment: Shipment {
				shipper: party(&request.origin),
				ship_to: party(&request.destination),
				ship_from: party(&request.origin),
				service,
				package: request.packages.iter().map(package).collect(),
			},
		},
	}
}

fn party(address: &Address) -> Party {
	let address_line = [&address.address_line1, &address.address_line2]
		.into_iter()
		.flatten()
		.cloned()
		.collect();

	Party {
		address: UpsAddress {
			address_line,
			city: address.city.clone(),
			state_province_code: address.state.clone(),
			postal_code: address.postal_code.clone(),
			country_code: address.country_code.clone(),
		},
	}
}

fn package(package: &Package) -> UpsPackage {
	let weight_unit = match package.weight.unit {
		WeightUnit::Lb => "LBS",
		WeightUnit::Kg => "KGS",
	};
	let dimensions = package.dimensions.map(|dimensions| {
		let unit = match dimensions.unit {
			DimensionUnit::In => "IN",
			DimensionUnit::Cm => "CM",
		};

		UpsDimensions {
			unit_of_measurement: Code::new(unit),
			length: dimensions.length.to_string(),
			width: dimensions.width.to_string(),
			height: dimensions.height.to_string(),
		}
	});

	UpsPackage {
		packaging_type: Code::new(PACKAGING_CUSTOMER_SUPPLIED),
		package_weight: PackageWeight {
			unit_of_measurement: Code::new(weight_unit),
			weight: package.weight.value.to_string(),
		},
		dimensions,
	}
}

fn is_positive_number(raw: &str) -> bool {
	raw.parse::<f64>().is_ok_and(|value| value.is_finite() && value > 0.0)
}
