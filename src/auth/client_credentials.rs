//! OAuth2 `client_credentials` token acquisition with caching and a singleflight guard.
//!
//! A cached token is returned while `now < expires_at`. Otherwise one caller at a time performs
//! the form-encoded grant; concurrent non-forced callers wait on the guard and then pick up the
//! freshly cached entry instead of issuing their own call.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessTokenProvider, AuthFuture, Clock, MemoryTokenCache, SystemClock, TokenEntry,
		TokenSecret, TokenStore,
	},
	config::{self, ConfigSource},
	http::{HttpClient, HttpRequest},
	obs::{self, OperationKind},
	schema::{self, Issue, Issues},
};

/// Configuration keys naming a carrier's token endpoint and credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CredentialKeys {
	/// Key holding the absolute token endpoint URL.
	pub token_url: &'static str,
	/// Key holding the client id.
	pub client_id: &'static str,
	/// Key holding the client secret.
	pub client_secret: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: u64,
	#[serde(default)]
	#[allow(dead_code)]
	token_type: Option<String>,
}

/// Carrier-agnostic client-credentials [`AccessTokenProvider`].
pub struct ClientCredentialsAuth {
	cache_key: String,
	keys: CredentialKeys,
	http: Arc<dyn HttpClient>,
	config: Arc<dyn ConfigSource>,
	store: Arc<dyn TokenStore>,
	clock: Arc<dyn Clock>,
	refresh: AsyncMutex<()>,
}
impl ClientCredentialsAuth {
	/// Margin subtracted from the reported token lifetime.
	pub const SAFETY_BUFFER: Duration = Duration::seconds(60);
	/// Timeout applied to each token request.
	pub const TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Creates a provider caching under `cache_key` in a private [`MemoryTokenCache`] and reading
	/// the [`SystemClock`].
	pub fn new(
		cache_key: impl Into<String>,
		keys: CredentialKeys,
		http: Arc<dyn HttpClient>,
		config: Arc<dyn ConfigSource>,
	) -> Self {
		Self {
			cache_key: cache_key.into(),
			keys,
			http,
			config,
			store: Arc::new(MemoryTokenCache::default()),
			clock: Arc::new(SystemClock),
			refresh: AsyncMutex::new(()),
		}
	}

	/// Uses a shared token store.
	pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
		self.store = store;

		self
	}

	/// Uses a custom clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Key under which this provider caches its token.
	pub fn cache_key(&self) -> &str {
		&self.cache_key
	}

	fn reusable(&self, force_refresh: bool) -> Option<TokenSecret> {
		if force_refresh {
			return None;
		}

		self.store
			.get(&self.cache_key)
			.filter(|entry| entry.is_valid_at(self.clock.now()))
			.map(|entry| entry.access_token)
	}

	async fn fetch(&self, force_refresh: bool) -> Result<TokenSecret> {
		if let Some(token) = self.reusable(force_refresh) {
			return Ok(token);
		}

		let _singleflight = self.refresh.lock().await;

		if let Some(token) = self.reusable(force_refresh) {
			return Ok(token);
		}

		let token_url = config::required_url(self.config.as_ref(), self.keys.token_url)?;
		let client_id = config::required_string(self.config.as_ref(), self.keys.client_id)?;
		let client_secret = config::required_string(self.config.as_ref(), self.keys.client_secret)?;
		let form = BTreeMap::from([
			("grant_type".to_owned(), "client_credentials".to_owned()),
			("client_id".to_owned(), client_id),
			("client_secret".to_owned(), client_secret),
		]);
		let request = HttpRequest::post(token_url.as_str())
			.header("content-type", "application/x-www-form-urlencoded")
			.form(form)
			.timeout(Self::TIMEOUT);
		let response = self.http.request(request).await?;

		if !response.is_success() {
			return Err(CarrierError::new(ErrorCode::AuthError, "Token request failed")
				.with_status(response.status)
				.with_details(json!({ "response": response.body.to_value() })));
		}

		let body = response.body.as_json().ok_or_else(|| {
			CarrierError::malformed(
				"Invalid token response",
				&[Issue::new(".", "expected a JSON object")],
			)
		})?;
		let parsed = schema::parse::<TokenResponse>(body)
			.map_err(|issues| CarrierError::malformed("Invalid token response", &issues))?;
		let issued_at = self.clock.now();
		let expires_at = Self::expiry(issued_at, &parsed)
			.map_err(|issues| CarrierError::malformed("Invalid token response", &issues))?;
		let token = TokenSecret::new(parsed.access_token);

		self.store.set(&self.cache_key, TokenEntry::new(token.clone(), expires_at));

		Ok(token)
	}

	fn expiry(
		issued_at: OffsetDateTime,
		parsed: &TokenResponse,
	) -> Result<OffsetDateTime, Vec<Issue>> {
		let mut issues = Issues::default();

		issues.check(parsed.access_token.is_empty(), "access_token", "must not be empty");
		issues.check(parsed.expires_in == 0, "expires_in", "must be a positive integer");
		issues.finish()?;

		i64::try_from(parsed.expires_in)
			.ok()
			.and_then(|secs| issued_at.checked_add(Duration::seconds(secs) - Self::SAFETY_BUFFER))
			.ok_or_else(|| vec![Issue::new("expires_in", "is out of range")])
	}
}
impl Debug for ClientCredentialsAuth {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsAuth")
			.field("cache_key", &self.cache_key)
			.field("keys", &self.keys)
			.finish_non_exhaustive()
	}
}
impl AccessTokenProvider for ClientCredentialsAuth {
	fn access_token(&self, force_refresh: bool) -> AuthFuture<'_> {
		Box::pin(obs::observe(
			OperationKind::TokenFetch,
			&self.cache_key,
			self.fetch(force_refresh),
		))
	}
}
