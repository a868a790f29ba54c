//! Tracing hooks around token fetches; no-ops unless the `tracing` feature is enabled.

// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// A span builder wrapping one token-endpoint exchange.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the requested resource.
	pub fn new(resource: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("token_provider.fetch", resource);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = resource;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Records whether a lookup was served from cache.
pub fn record_cache_lookup(resource: &str, hit: bool) {
	#[cfg(feature = "tracing")]
	tracing::debug!(resource, hit, "token_provider.cache");
	#[cfg(not(feature = "tracing"))]
	let _ = (resource, hit);
}
