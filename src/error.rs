//! Provider error types surfaced by token fetches.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by the provider's public API.
///
/// Exactly two kinds exist: a structured rejection from the token endpoint ([`AuthError`]) and
/// everything that prevented a structured response from being obtained ([`TransportError`]).
/// Neither is retried internally; retry policy belongs to the caller.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token endpoint returned a structured OAuth error.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure (DNS, TCP, TLS, unparseable body).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Structured rejection parsed from an `error` + `error_description` response body.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct AuthError {
	/// Machine-readable code taken from the response's `error` field.
	pub code: String,
	/// First line of the response's `error_description` field.
	pub message: String,
}
impl AuthError {
	/// Builds an error from the endpoint's wire fields, keeping only the first line of the
	/// description. Directory services emit multi-line CRLF-separated descriptions whose trailing
	/// lines carry trace identifiers rather than anything user-facing.
	pub(crate) fn from_wire(code: String, description: Option<&str>) -> Self {
		let message = description
			.and_then(|text| text.lines().next())
			.map(str::to_owned)
			.unwrap_or_else(|| code.clone());

		Self { code, message }
	}
}

/// Failures raised before a structured response was obtained.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Endpoint base URL cannot carry additional path segments.
	#[error("Token endpoint base URL cannot carry path segments.")]
	EndpointBase,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error, surfaced unchanged.
		#[source]
		source: BoxError,
	},
	/// Token endpoint returned a body that could not be parsed as JSON.
	#[error("Token endpoint returned a malformed body.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the offending response.
		status: u16,
	},
	/// Token endpoint response carried neither an access token nor an error.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an `expires_in` that does not parse as whole seconds.
	#[error("The expires_in value `{value}` is not a number of seconds.")]
	MalformedExpiresIn {
		/// Raw value as received on the wire.
		value: String,
	},
	/// Token endpoint returned an `expires_in` that pushes the expiry instant outside the
	/// representable datetime range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn auth_error_keeps_first_line_of_description() {
		let err = AuthError::from_wire(
			"invalid_client".into(),
			Some("AADSTS7000215: Invalid client secret.\r\nTrace ID: 0000\r\nTimestamp: 2017"),
		);

		assert_eq!(err.code, "invalid_client");
		assert_eq!(err.message, "AADSTS7000215: Invalid client secret.");
		assert_eq!(err.to_string(), "AADSTS7000215: Invalid client secret.");
	}

	#[test]
	fn auth_error_handles_plain_newlines_and_single_lines() {
		let multi = AuthError::from_wire("invalid_grant".into(), Some("first line\nsecond line"));

		assert_eq!(multi.message, "first line");

		let single = AuthError::from_wire("invalid_grant".into(), Some("only line"));

		assert_eq!(single.message, "only line");
	}

	#[test]
	fn auth_error_falls_back_to_code_without_description() {
		let missing = AuthError::from_wire("server_error".into(), None);

		assert_eq!(missing.message, "server_error");

		let empty = AuthError::from_wire("server_error".into(), Some(""));

		assert_eq!(empty.message, "server_error");
	}

	#[test]
	fn network_error_exposes_the_underlying_cause() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
		let err: Error = TransportError::network(io).into();

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));

		// `Error::Transport` is transparent, so the first source hop is the underlying cause.
		let source =
			StdError::source(&err).expect("Network errors should chain to the underlying cause.");

		assert_eq!(source.to_string(), "connection refused");
	}
}
