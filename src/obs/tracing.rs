// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Span wrapped around one observed call.
///
/// The span opens with an empty `outcome` field that [`CallSpan::run`] fills in once the call
/// settles, so a subscriber sees `success`/`failure` on the span itself rather than on a
/// separate event.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span tagged with the call kind and call site.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"auth_relay.call",
				call = kind.as_str(),
				stage,
				outcome = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Stores the terminal outcome on the span.
	pub fn record(&self, outcome: CallOutcome) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = outcome;
		}
	}

	/// Drives `fut` inside the span and records how it settled.
	pub async fn run<T, E, Fut>(self, fut: Fut) -> Result<T, E>
	where
		Fut: Future<Output = Result<T, E>>,
	{
		#[cfg(feature = "tracing")]
		let result = {
			use tracing::Instrument;

			fut.instrument(self.span.clone()).await
		};
		#[cfg(not(feature = "tracing"))]
		let result = fut.await;

		self.record(CallOutcome::of(&result));

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn run_passes_results_through() {
		let ok = CallSpan::new(CallKind::Refresh, "run_ok").run(async { Ok::<_, ()>(42) }).await;
		let err = CallSpan::new(CallKind::Logout, "run_err").run(async { Err::<(), _>("down") }).await;

		assert_eq!(ok, Ok(42));
		assert_eq!(err, Err("down"));
	}
}
