//! Refresh bookkeeping: the in-flight flag and the FIFO queue of waiting requests.

// crates.io
use futures::channel::oneshot;
// self
use crate::{_prelude::*, auth::AccessToken, error::RefreshError};

/// Result delivered to every request waiting on a refresh.
pub type RefreshOutcome = Result<AccessToken, RefreshError>;

type Waiter = oneshot::Sender<RefreshOutcome>;

/// Position a failed request takes when it asks for a fresh token.
#[derive(Debug)]
pub(crate) enum Turn {
	/// No refresh was in flight; the caller now owns it and must settle it.
	Lead,
	/// A refresh is in flight; the receiver resolves when it settles.
	Wait(oneshot::Receiver<RefreshOutcome>),
}

/// In-flight flag plus the waiters queued behind it.
///
/// `waiters` is non-empty only while `refreshing` is set, and [`RefreshState::settle`] resets
/// both in one step. Callers hold the state behind a lock, so [`RefreshState::enter`] acts as
/// a check-and-set on the flag.
#[derive(Debug, Default)]
pub struct RefreshState {
	refreshing: bool,
	waiters: VecDeque<Waiter>,
}
impl RefreshState {
	/// Returns `true` while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.refreshing
	}

	/// Returns the number of requests queued behind the in-flight refresh.
	pub fn pending(&self) -> usize {
		self.waiters.len()
	}

	pub(crate) fn enter(&mut self) -> Turn {
		if self.refreshing {
			let (tx, rx) = oneshot::channel();

			self.waiters.push_back(tx);

			Turn::Wait(rx)
		} else {
			self.refreshing = true;

			Turn::Lead
		}
	}

	/// Releases every waiter in enqueue order with `outcome` and resets the state.
	///
	/// Returns the number of waiters released.
	pub(crate) fn settle(&mut self, outcome: &RefreshOutcome) -> usize {
		let waiters = std::mem::take(&mut self.waiters);
		let released = waiters.len();

		self.refreshing = false;

		for waiter in waiters {
			// A dropped receiver means the waiting call was cancelled; nothing to deliver.
			let _ = waiter.send(outcome.clone());
		}

		released
	}
}

/// Resets the state if the leading call unwinds or is dropped before settling.
pub(crate) struct LeaderGuard<'a> {
	state: &'a Mutex<RefreshState>,
	settled: bool,
}
impl<'a> LeaderGuard<'a> {
	pub(crate) fn new(state: &'a Mutex<RefreshState>) -> Self {
		Self { state, settled: false }
	}

	pub(crate) fn settle(mut self, outcome: &RefreshOutcome) -> usize {
		self.settled = true;

		self.state.lock().settle(outcome)
	}
}
impl Drop for LeaderGuard<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.state.lock().settle(&Err(RefreshError::Interrupted));
		}
	}
}
