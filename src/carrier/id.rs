//! Carrier identifiers, normalized to lowercase.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 64;

/// Error returned when a carrier identifier is unusable.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Carrier identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Carrier identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Carrier identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Registry key of a carrier such as `ups`.
///
/// Construction lowercases the input, so lookups are case-insensitive.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarrierId(String);
impl CarrierId {
	/// Validates and normalizes `value`.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_ascii_lowercase()))
	}

	pub(crate) fn from_static(value: &'static str) -> Self {
		Self(value.to_ascii_lowercase())
	}
}
impl Deref for CarrierId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CarrierId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CarrierId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CarrierId> for String {
	fn from(value: CarrierId) -> Self {
		value.0
	}
}
impl TryFrom<String> for CarrierId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for CarrierId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CarrierId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Carrier({})", self.0)
	}
}
impl Display for CarrierId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
