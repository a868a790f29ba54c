//! Client-credentials token provider with a per-resource cache.
//!
//! [`TokenProvider::access_token`] serves a cached bearer token while its buffered expiry lies
//! in the future and otherwise performs one form-encoded POST against the tenant-scoped token
//! endpoint. Concurrent callers that observe a cold or stale cache each fetch independently and
//! the cache keeps whichever response is written last; de-duplicating those fetches is
//! deliberately left to callers that need it.

// self
use crate::{
	_prelude::*,
	error::{AuthError, TransportError},
	http::{FormResponse, TokenTransport},
	obs::{self, FetchSpan},
	token::{CachedToken, TokenSecret},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Token endpoint base used when none is supplied explicitly.
pub const DEFAULT_ENDPOINT_BASE: &str = "https://login.microsoftonline.com";

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport.
pub type ReqwestTokenProvider = TokenProvider<ReqwestTransport>;

/// Obtains and caches OAuth 2.0 access tokens via the client-credentials grant.
///
/// Credentials are fixed at construction and never mutated. The cache maps each requested
/// resource identifier to one [`CachedToken`]; it starts empty, grows by one entry per distinct
/// resource, and lives as long as the provider instance. Nothing is shared across instances, so
/// separate providers stay independently testable.
pub struct TokenProvider<T>
where
	T: ?Sized + TokenTransport,
{
	transport: Arc<T>,
	endpoint_base: Url,
	tenant: String,
	client_id: String,
	client_secret: TokenSecret,
	cache: RwLock<HashMap<String, CachedToken>>,
}
impl<T> TokenProvider<T>
where
	T: ?Sized + TokenTransport,
{
	/// Creates a provider that reuses the caller-provided transport.
	///
	/// The tenant, client identifier, and client secret are treated as opaque strings; no
	/// validation is performed here.
	pub fn with_transport(
		tenant: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			endpoint_base: Url::parse(DEFAULT_ENDPOINT_BASE)
				.expect("Default endpoint base must parse."),
			tenant: tenant.into(),
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			cache: RwLock::new(HashMap::new()),
		}
	}

	/// Replaces the token endpoint base ([`DEFAULT_ENDPOINT_BASE`] unless overridden).
	pub fn with_endpoint_base(mut self, base: Url) -> Self {
		self.endpoint_base = base;

		self
	}

	/// Returns a bearer token scoped to `resource`, fetching a fresh one when no cached token is
	/// usable.
	///
	/// The cache-hit path completes without suspending. A token is never returned within
	/// [`EXPIRY_BUFFER`](crate::token::EXPIRY_BUFFER) of its server-reported expiry, judged by
	/// the local clock. Fetch errors propagate unchanged and leave the cache untouched; the
	/// provider performs no retries.
	pub async fn access_token(&self, resource: &str) -> Result<String> {
		if let Some(cached) = self.cached(resource, OffsetDateTime::now_utc()) {
			obs::record_cache_lookup(resource, true);

			return Ok(cached);
		}

		obs::record_cache_lookup(resource, false);

		let span = FetchSpan::new(resource);

		span.instrument(self.request_access_token(resource)).await
	}

	fn cached(&self, resource: &str, now: OffsetDateTime) -> Option<String> {
		self.cache
			.read()
			.get(resource)
			.filter(|token| token.is_fresh_at(now))
			.map(|token| token.secret.expose().to_owned())
	}

	/// Performs the client-credentials exchange and replaces the cache entry for `resource`.
	async fn request_access_token(&self, resource: &str) -> Result<String> {
		let endpoint = self.token_endpoint()?;
		let form = vec![
			("grant_type".to_owned(), "client_credentials".to_owned()),
			("client_id".to_owned(), self.client_id.clone()),
			("client_secret".to_owned(), self.client_secret.expose().to_owned()),
			("resource".to_owned(), resource.to_owned()),
		];
		let response = self.transport.post_form(&endpoint, form).await?;
		let issued_at = OffsetDateTime::now_utc();
		let (secret, expires_in) = parse_token_response(response)?;
		let token = CachedToken::issued(secret, issued_at, expires_in)
			.ok_or(TransportError::ExpiresInOutOfRange)?;
		let value = token.secret.expose().to_owned();

		// Last write wins under concurrent fetches for the same resource.
		self.cache.write().insert(resource.to_owned(), token);

		Ok(value)
	}

	/// Derives `{base}/{tenant}/oauth2/token` from the configured endpoint base.
	fn token_endpoint(&self) -> Result<Url, TransportError> {
		let mut endpoint = self.endpoint_base.clone();

		endpoint
			.path_segments_mut()
			.map_err(|()| TransportError::EndpointBase)?
			.pop_if_empty()
			.extend([self.tenant.as_str(), "oauth2", "token"]);

		Ok(endpoint)
	}
}
#[cfg(feature = "reqwest")]
impl TokenProvider<ReqwestTransport> {
	/// Creates a provider backed by the crate's default reqwest transport.
	pub fn new(
		tenant: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self::with_transport(tenant, client_id, client_secret, ReqwestTransport::default())
	}
}
impl<T> Debug for TokenProvider<T>
where
	T: ?Sized + TokenTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("endpoint_base", &self.endpoint_base.as_str())
			.field("tenant", &self.tenant)
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("cached_resources", &self.cache.read().len())
			.finish()
	}
}

/// Wire shape of the token endpoint response; success and error fields share one body.
#[derive(Debug, Deserialize)]
struct TokenEndpointBody {
	access_token: Option<String>,
	expires_in: Option<ExpiresIn>,
	error: Option<String>,
	error_description: Option<String>,
}

/// `expires_in` arrives as a JSON number or a numeric string depending on the deployment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(i64),
	Text(String),
}
impl ExpiresIn {
	fn as_seconds(&self) -> Result<i64, TransportError> {
		match self {
			Self::Seconds(value) => Ok(*value),
			Self::Text(value) => value
				.trim()
				.parse()
				.map_err(|_| TransportError::MalformedExpiresIn { value: value.clone() }),
		}
	}
}

fn parse_token_response(response: FormResponse) -> Result<(TokenSecret, Duration)> {
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
	let body: TokenEndpointBody = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransportError::MalformedBody { source, status: response.status })?;

	if let Some(code) = body.error {
		return Err(AuthError::from_wire(code, body.error_description.as_deref()).into());
	}

	let secret = TokenSecret::new(body.access_token.ok_or(TransportError::MissingAccessToken)?);
	let expires_in = body.expires_in.ok_or(TransportError::MissingExpiresIn)?.as_seconds()?;

	Ok((secret, Duration::seconds(expires_in)))
}
