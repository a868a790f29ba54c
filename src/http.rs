//! Transport seam for the token endpoint.
//!
//! The provider delegates all HTTP mechanics to a [`TokenTransport`] collaborator: one
//! form-encoded POST, raw bytes back. Interpreting the response body stays with the provider so
//! custom transports never re-implement the wire contract. Timeouts, proxies, and TLS behavior
//! are whatever the underlying client is configured with; the provider adds none of its own.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Future type returned by [`TokenTransport`] implementations.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Raw response captured from the token endpoint before any interpretation.
#[derive(Clone, Debug)]
pub struct FormResponse {
	/// HTTP status code returned by the endpoint.
	pub status: u16,
	/// Unparsed response body.
	pub body: Vec<u8>,
}

/// HTTP collaborator capable of issuing form-encoded POST requests.
///
/// Implementations must not retry and must surface the underlying failure unchanged through
/// [`TransportError::Network`]; retry policy belongs to the caller. Error responses from the
/// endpoint still count as responses: return the status and body as-is and let the provider
/// classify them.
pub trait TokenTransport
where
	Self: 'static + Send + Sync,
{
	/// POSTs `form` to `endpoint` with `application/x-www-form-urlencoded` encoding and returns
	/// the raw response.
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: Vec<(String, String)>,
	) -> TransportFuture<'a, FormResponse>;
}

/// Default transport backed by [`ReqwestClient`].
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token endpoints
/// return results directly instead of delegating to another URI. Configure any custom
/// [`ReqwestClient`] to disable redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenTransport for ReqwestTransport {
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: Vec<(String, String)>,
	) -> TransportFuture<'a, FormResponse> {
		let client = self.0.clone();
		let endpoint = endpoint.clone();

		Box::pin(async move {
			let response = client
				.post(endpoint)
				.form(&form)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(FormResponse { status, body })
		})
	}
}
