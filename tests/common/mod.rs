//! Shared fakes for integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc, time::Duration};
// crates.io
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::oneshot;
// self
use auth_relay::{
	auth::{AccessToken, SessionFuture, SessionStore},
	error::{Error, HttpError, RefreshError},
	http::{AUTHORIZATION, DispatchFuture, Dispatcher, RequestDescriptor, Response},
};

/// Outcome a test releases into a gated refresh.
pub type RefreshReply = Result<AccessToken, RefreshError>;

/// One call observed by [`TokenGatedDispatcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentCall {
	pub path: String,
	pub authorization: Option<String>,
}

/// Dispatcher that accepts exactly one bearer token and answers everything else with an
/// expired-token failure.
pub struct TokenGatedDispatcher {
	accepted: String,
	sent: Mutex<Vec<SentCall>>,
}
impl TokenGatedDispatcher {
	pub fn accepting(token: &str) -> Arc<Self> {
		Arc::new(Self { accepted: format!("Bearer {token}"), sent: Default::default() })
	}

	pub fn sent(&self) -> Vec<SentCall> {
		self.sent.lock().clone()
	}

	/// Paths sent with the accepted token, in dispatch order.
	pub fn accepted_paths(&self) -> Vec<String> {
		self.sent
			.lock()
			.iter()
			.filter(|call| call.authorization.as_deref() == Some(self.accepted.as_str()))
			.map(|call| call.path.clone())
			.collect()
	}
}
impl Dispatcher for TokenGatedDispatcher {
	fn send(&self, request: RequestDescriptor) -> DispatchFuture<'_> {
		let authorization = request.header(AUTHORIZATION).map(str::to_owned);
		let accepted = authorization.as_deref() == Some(self.accepted.as_str());

		self.sent.lock().push(SentCall { path: request.path.clone(), authorization });

		Box::pin(async move {
			if accepted {
				Ok(Response::new(200, json!({ "path": request.path }).to_string()))
			} else {
				Err(expired_token())
			}
		})
	}
}

/// Session store whose refresh calls block until the test releases them.
pub struct GatedSession {
	token: Mutex<Option<AccessToken>>,
	gates: Mutex<VecDeque<oneshot::Receiver<RefreshReply>>>,
	refreshes: Mutex<usize>,
	clears: Mutex<usize>,
}
impl GatedSession {
	pub fn with_token(token: &str) -> Arc<Self> {
		Arc::new(Self {
			token: Mutex::new(Some(AccessToken::new(token))),
			gates: Default::default(),
			refreshes: Mutex::new(0),
			clears: Mutex::new(0),
		})
	}

	/// Prepares the reply channel for the next refresh call.
	pub fn arm(&self) -> oneshot::Sender<RefreshReply> {
		let (tx, rx) = oneshot::channel();

		self.gates.lock().push_back(rx);

		tx
	}

	pub fn refreshes(&self) -> usize {
		*self.refreshes.lock()
	}

	pub fn clears(&self) -> usize {
		*self.clears.lock()
	}
}
impl SessionStore for GatedSession {
	fn current_token(&self) -> Option<AccessToken> {
		self.token.lock().clone()
	}

	fn refresh(&self) -> SessionFuture<'_, AccessToken> {
		*self.refreshes.lock() += 1;

		let gate = self.gates.lock().pop_front();

		Box::pin(async move {
			let gate = gate.expect("Every refresh in these tests must be armed first.");
			let reply = gate.await.unwrap_or(Err(RefreshError::Interrupted));

			if let Ok(token) = &reply {
				*self.token.lock() = Some(token.clone());
			}

			reply
		})
	}

	fn clear(&self) {
		*self.clears.lock() += 1;
		*self.token.lock() = None;
	}
}

pub fn expired_token() -> Error {
	HttpError::new(
		401,
		json!({ "error_code": "TOKEN_EXPIRED", "message": "The token has expired" }).to_string(),
	)
	.into()
}

/// Polls `condition` every millisecond until it holds, failing after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	let poll = async {
		while !condition() {
			tokio::time::sleep(Duration::from_millis(1)).await;
		}
	};

	tokio::time::timeout(Duration::from_secs(5), poll)
		.await
		.expect("Condition should hold within the timeout.");
}
