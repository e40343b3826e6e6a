//! UPS Rating API response → neutral quotes.

// self
use crate::{
	_prelude::*,
	carrier::CarrierId,
	rates::RateQuote,
	schema::{self, Issues},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpsRateResponse {
	rate_response: RateResponseBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RateResponseBody {
	rated_shipment: Vec<RatedShipment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RatedShipment {
	service: Service,
	total_charges: TotalCharges,
	#[serde(default)]
	guaranteed_delivery: Option<GuaranteedDelivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Service {
	code: String,
	#[serde(default)]
	description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TotalCharges {
	monetary_value: String,
	currency_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GuaranteedDelivery {
	#[serde(default)]
	business_days_in_transit: Option<String>,
}

/// Validates a UPS rating body and turns each rated shipment into one quote, in response order.
///
/// Any structural or value problem fails `MALFORMED_RESPONSE` with the issues as details; quotes
/// are never partially populated.
pub fn map_rate_response(body: &Value, carrier: &CarrierId) -> Result<Vec<RateQuote>> {
	let parsed = schema::parse::<UpsRateResponse>(body).map_err(invalid)?;
	let mut issues = Issues::default();
	let mut quotes = Vec::with_capacity(parsed.rate_response.rated_shipment.len());

	for (i, shipment) in parsed.rate_response.rated_shipment.into_iter().enumerate() {
		let path = format!("RateResponse.RatedShipment[{i}]");
		let charges = shipment.total_charges;
		let total_charge = charges
			.monetary_value
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|value| value.is_finite() && *value >= 0.0);
		let currency_ok = charges.currency_code.len() == 3
			&& charges.currency_code.chars().all(|c| c.is_ascii_alphabetic());

		issues.check(
			total_charge.is_none(),
			format!("{path}.TotalCharges.MonetaryValue"),
			"must be a non-negative decimal",
		);
		issues.check(
			!currency_ok,
			format!("{path}.TotalCharges.CurrencyCode"),
			"must be a 3-letter currency code",
		);

		if let Some(total_charge) = total_charge {
			quotes.push(RateQuote {
				carrier_id: carrier.to_string(),
				service_code: shipment.service.code,
				service_name: shipment.service.description,
				total_charge,
				currency: charges.currency_code,
				delivery_days: shipment
					.guaranteed_delivery
					.and_then(|delivery| delivery.business_days_in_transit)
					.as_deref()
					.and_then(transit_days),
			});
		}
	}

	issues.finish().map_err(invalid)?;

	Ok(quotes)
}

fn transit_days(raw: &str) -> Option<u32> {
	raw.trim().parse::<u32>().ok().filter(|days| *days > 0)
}

fn invalid(issues: Vec<schema::Issue>) -> CarrierError {
	CarrierError::malformed("UPS rate response invalid", &issues)
}
