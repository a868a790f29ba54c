//! Cached token records and the expiry-buffer policy.

// self
use crate::_prelude::*;

/// Safety margin subtracted from the server-reported expiry so a cached token is never served
/// right up to its true expiration.
pub const EXPIRY_BUFFER: Duration = Duration::minutes(5);

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Cache entry binding an access token to its buffered expiry instant.
///
/// One entry exists per requested resource; entries are overwritten on refetch and never
/// explicitly removed for the lifetime of the owning provider.
#[derive(Clone, Debug)]
pub struct CachedToken {
	/// Access token secret; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Expiry instant, already reduced by [`EXPIRY_BUFFER`].
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds an entry from the instant the token was issued and the server-reported lifetime.
	///
	/// Returns `None` when the lifetime pushes the expiry instant outside the representable
	/// datetime range.
	pub fn issued(
		secret: TokenSecret,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(expires_in)?.checked_sub(EXPIRY_BUFFER)?;

		Some(Self { secret, expires_at })
	}

	/// Returns `true` while the entry may still be served at the provided instant.
	pub fn is_fresh_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "super-secret");
	}

	#[test]
	fn buffer_is_subtracted_from_the_reported_lifetime() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::issued(TokenSecret::new("tok"), issued, Duration::seconds(600))
			.expect("A ten-minute lifetime should be representable.");

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 00:05 UTC));
	}

	#[test]
	fn freshness_flips_exactly_at_the_buffered_expiry() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::issued(TokenSecret::new("tok"), issued, Duration::minutes(10))
			.expect("A ten-minute lifetime should be representable.");

		// 10-minute lifetime minus the 5-minute buffer leaves 5 usable minutes.
		assert!(token.is_fresh_at(issued));
		assert!(token.is_fresh_at(issued + Duration::seconds(299)));
		assert!(!token.is_fresh_at(issued + Duration::minutes(5)));
		assert!(!token.is_fresh_at(issued + Duration::minutes(9)));
	}

	#[test]
	fn short_lifetimes_produce_immediately_stale_entries() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::issued(TokenSecret::new("tok"), issued, Duration::seconds(60))
			.expect("A one-minute lifetime should be representable.");

		assert!(!token.is_fresh_at(issued));
	}

	#[test]
	fn out_of_range_lifetimes_are_rejected_instead_of_panicking() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);

		assert!(
			CachedToken::issued(TokenSecret::new("tok"), issued, Duration::seconds(i64::MAX))
				.is_none(),
		);
		assert!(CachedToken::issued(TokenSecret::new("tok"), issued, Duration::MIN).is_none());
	}
}
