//! Access-token refresh coordination around a [`Dispatcher`].
//!
//! [`RefreshCoordinator::send`] decorates each request with the session's bearer token and
//! dispatches it. When the call fails because the access token expired, the request is
//! marked retried and either starts a refresh or, when one is already in flight, queues
//! behind it. A successful refresh releases the queue in FIFO order and every affected
//! request is replayed once with the new token; a failed refresh rejects the whole queue
//! with the same [`RefreshError`] and clears the session exactly once.

mod metrics;
mod state;

pub use metrics::RefreshMetrics;
pub use state::{RefreshOutcome, RefreshState};

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, SessionStore},
	config::AuthConfig,
	coordinator::state::{LeaderGuard, Turn},
	error::RefreshError,
	http::{AUTHORIZATION, Dispatcher, RequestDescriptor, Response},
	obs::{self, CallKind, CallOutcome},
};

/// A blocked outbound call that may be replayed once.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRequest {
	/// Request as it will be (re)sent.
	pub request: RequestDescriptor,
	/// Set once the request has been through a refresh cycle.
	pub retried: bool,
}
impl PendingRequest {
	/// Wraps a request that has not been retried yet.
	pub fn new(request: RequestDescriptor) -> Self {
		Self { request, retried: false }
	}
}

/// Wraps a dispatcher with bearer decoration and the refresh-and-replay protocol.
///
/// Clones share the same refresh state, so one coordinator instance (or its clones) should
/// front every call made on behalf of a session.
pub struct RefreshCoordinator<D, S>
where
	D: ?Sized + Dispatcher,
	S: ?Sized + SessionStore,
{
	dispatcher: Arc<D>,
	session: Arc<S>,
	config: Arc<AuthConfig>,
	state: Arc<Mutex<RefreshState>>,
	metrics: Arc<RefreshMetrics>,
}
impl<D, S> RefreshCoordinator<D, S>
where
	D: ?Sized + Dispatcher,
	S: ?Sized + SessionStore,
{
	/// Creates a coordinator over the provided dispatcher and session store.
	pub fn new(
		dispatcher: impl Into<Arc<D>>,
		session: impl Into<Arc<S>>,
		config: impl Into<Arc<AuthConfig>>,
	) -> Self {
		Self {
			dispatcher: dispatcher.into(),
			session: session.into(),
			config: config.into(),
			state: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Shared refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns `true` while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().is_refreshing()
	}

	/// Returns the number of requests queued behind the in-flight refresh.
	pub fn pending_waiters(&self) -> usize {
		self.state.lock().pending()
	}

	/// Attaches `Authorization: Bearer <token>` unless the path is a session endpoint or no
	/// token is held.
	pub fn decorate(&self, mut request: RequestDescriptor) -> RequestDescriptor {
		if self.config.is_excepted(&request.path) {
			return request;
		}
		if let Some(token) = self.session.current_token() {
			request.set_header(AUTHORIZATION, token.bearer());
		}

		request
	}

	/// Sends a request, transparently refreshing the access token at most once.
	pub async fn send(&self, request: RequestDescriptor) -> Result<Response> {
		let pending = PendingRequest::new(self.decorate(request));

		obs::observe(CallKind::Request, "send", self.dispatch(pending)).await
	}

	async fn dispatch(&self, mut pending: PendingRequest) -> Result<Response> {
		loop {
			let err = match self.dispatcher.send(pending.request.clone()).await {
				Ok(response) => return Ok(response),
				Err(err) => err,
			};

			if pending.retried || !self.is_expired_token(&pending.request, &err) {
				return Err(err);
			}

			pending.retried = true;

			let token = self.await_token().await?;

			pending.request.set_header(AUTHORIZATION, token.bearer());
			self.metrics.record_replay();

			obs_event!(
				debug,
				method = %pending.request.method,
				path = %pending.request.path,
				"replaying request with refreshed token"
			);
		}
	}

	fn is_expired_token(&self, request: &RequestDescriptor, err: &Error) -> bool {
		if self.config.is_excepted(&request.path) {
			return false;
		}

		match err {
			Error::Http(http) => {
				http.status == self.config.expired_status
					&& http.error_code().as_deref() == Some(self.config.expired_error_code.as_str())
			},
			_ => false,
		}
	}

	async fn await_token(&self) -> Result<AccessToken, RefreshError> {
		let turn = self.state.lock().enter();

		match turn {
			Turn::Lead => self.lead_refresh().await,
			Turn::Wait(rx) => {
				self.metrics.record_queued();

				obs_event!(debug, "queued behind in-flight refresh");

				rx.await.unwrap_or(Err(RefreshError::Interrupted))
			},
		}
	}

	async fn lead_refresh(&self) -> Result<AccessToken, RefreshError> {
		let guard = LeaderGuard::new(&self.state);

		self.metrics.record_attempt();

		let outcome = obs::observe(CallKind::Refresh, "lead_refresh", self.session.refresh()).await;

		if outcome.is_ok() {
			self.metrics.record_success();
		} else {
			self.metrics.record_failure();
			self.session.clear();
		}

		let released = guard.settle(&outcome);

		obs::record_refresh_settled(CallOutcome::of(&outcome), released);

		if let Err(_err) = &outcome {
			obs_event!(warn, released, error = %_err, "access token refresh failed, session cleared");
		} else {
			obs_event!(info, released, "access token refreshed");
		}

		outcome
	}
}
impl<D, S> Clone for RefreshCoordinator<D, S>
where
	D: ?Sized + Dispatcher,
	S: ?Sized + SessionStore,
{
	fn clone(&self) -> Self {
		Self {
			dispatcher: self.dispatcher.clone(),
			session: self.session.clone(),
			config: self.config.clone(),
			state: self.state.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<D, S> Debug for RefreshCoordinator<D, S>
where
	D: ?Sized + Dispatcher,
	S: ?Sized + SessionStore,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("config", &self.config)
			.field("refreshing", &state.is_refreshing())
			.field("pending", &state.pending())
			.finish()
	}
}
