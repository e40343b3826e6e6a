//! Carrier-neutral shipping rate quotes: OAuth-backed carrier adapters, a retrying HTTP
//! transport, and a closed error taxonomy that callers can map straight onto HTTP statuses.
//!
//! The request path is [`aggregator::RateAggregator`] → [`carrier::CarrierRegistry`] →
//! [`carrier::RateProvider`] (one per carrier) → [`auth::ClientCredentialsAuth`] +
//! [`http::HttpClient`]. Every failure leaving the crate is a [`error::CarrierError`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod aggregator;
pub mod auth;
pub mod carrier;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod rates;
pub mod schema;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Value, json};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{CarrierError, ErrorCode, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
#[cfg(test)] use httpmock as _;
