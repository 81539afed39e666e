//! Optional observability helpers for session calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `auth_relay.call` with the `call`,
//!   `stage` (call site), and `outcome` fields, plus events under the `auth_relay` target.
//! - Enable `metrics` to increment the `auth_relay_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`, and to record the
//!   `auth_relay_refresh_released` histogram of waiters released per refresh.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Kinds of calls observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Coordinated API request (decoration, interception, replay).
	Request,
	/// Access-token refresh.
	Refresh,
	/// Login call.
	Login,
	/// Logout call.
	Logout,
	/// Account registration or profile edit.
	Account,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
			CallKind::Logout => "logout",
			CallKind::Account => "account",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto its terminal outcome.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`CallSpan`] and records attempt plus terminal outcome.
pub(crate) async fn observe<T, E, Fut>(kind: CallKind, stage: &'static str, fut: Fut) -> Result<T, E>
where
	Fut: Future<Output = Result<T, E>>,
{
	record_call_outcome(kind, CallOutcome::Attempt);

	let result = CallSpan::new(kind, stage).run(fut).await;

	record_call_outcome(kind, CallOutcome::of(&result));

	result
}
