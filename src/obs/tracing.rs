// self
use crate::{_prelude::*, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by gateway operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("console_gateway.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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

/// Emits a warning that a failed refresh dropped the session and rejected `waiters` requests.
pub fn session_invalidated(waiters: usize, status: Option<u16>) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(waiters, status, "credential refresh failed; session cleared");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (waiters, status);
	}
}

/// Emits a warning that the store refused to clear a session a failed refresh invalidated.
pub fn session_clear_failed(error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%error, "failed to clear the invalidated session");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
