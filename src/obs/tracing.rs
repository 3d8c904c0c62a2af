// self
use crate::{_prelude::*, obs::CheckKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCheck<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCheck<F> = F;

/// A span builder used by checker operations.
#[derive(Clone, Debug)]
pub struct CheckSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CheckSpan {
	/// Creates a new span tagged with the provided check kind + stage.
	pub fn new(kind: CheckKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("d365_auth_checker.check", check = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCheck<Fut>
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

/// Emits the one-line diagnostic for a finished check.
///
/// Passing checks log at `info`, failing ones at `warn`. The message never contains secrets.
pub fn emit_diagnostic(kind: CheckKind, success: bool, diagnostic: &str) {
	#[cfg(feature = "tracing")]
	{
		if success {
			tracing::info!(check = kind.as_str(), success, "{diagnostic}");
		} else {
			tracing::warn!(check = kind.as_str(), success, "{diagnostic}");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, success, diagnostic);
	}
}
