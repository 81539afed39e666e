//! Shared session state and the store contract consumed by the refresh coordinator.
//!
//! A [`SessionHandle`] is the single owner of the current access token and user profile.
//! Implementations of [`SessionStore`] wrap a handle and add the network side of the
//! lifecycle (refreshing the token); the coordinator only reads the token and triggers
//! [`SessionStore::refresh`] or [`SessionStore::clear`], it never writes the session itself.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserProfile},
	error::RefreshError,
};

/// Boxed future returned by [`SessionStore::refresh`].
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RefreshError>> + 'a + Send>>;

/// Session store contract the refresh coordinator depends on.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the current access token, if a session exists.
	fn current_token(&self) -> Option<AccessToken>;

	/// Obtains and stores a new access token.
	fn refresh(&self) -> SessionFuture<'_, AccessToken>;

	/// Drops the client-side session (logout).
	fn clear(&self);
}

/// Authenticated session material.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
	/// Current bearer token.
	pub access_token: AccessToken,
	/// Signed-in user, when the backend returned one.
	pub user: Option<UserProfile>,
	/// Instant the session was first established.
	pub authenticated_at: OffsetDateTime,
	/// Instant the access token was last rotated.
	pub refreshed_at: Option<OffsetDateTime>,
}
impl Session {
	/// Creates a session that starts now.
	pub fn new(access_token: AccessToken, user: Option<UserProfile>) -> Self {
		Self { access_token, user, authenticated_at: OffsetDateTime::now_utc(), refreshed_at: None }
	}
}

/// Cloneable handle to the process-wide session.
#[derive(Clone, Debug, Default)]
pub struct SessionHandle(Arc<RwLock<Option<Session>>>);
impl SessionHandle {
	/// Returns a snapshot of the session.
	pub fn snapshot(&self) -> Option<Session> {
		self.0.read().clone()
	}

	/// Returns `true` while an access token is held.
	pub fn is_authenticated(&self) -> bool {
		self.0.read().is_some()
	}

	/// Returns `true` when the signed-in user is an administrator.
	pub fn is_admin(&self) -> bool {
		self.0.read().as_ref().and_then(|s| s.user.as_ref()).is_some_and(|u| u.is_admin)
	}

	/// Returns the signed-in user.
	pub fn user(&self) -> Option<UserProfile> {
		self.0.read().as_ref().and_then(|s| s.user.clone())
	}

	/// Returns the current access token.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.0.read().as_ref().map(|s| s.access_token.clone())
	}

	/// Replaces the session with a freshly authenticated one.
	pub fn establish(&self, access_token: AccessToken, user: Option<UserProfile>) {
		*self.0.write() = Some(Session::new(access_token, user));
	}

	/// Stores a rotated access token, keeping the existing user unless a new one is given.
	///
	/// A missing session is recreated, which is how a session is restored on startup.
	pub fn rotate(&self, access_token: AccessToken, user: Option<UserProfile>) {
		let mut guard = self.0.write();

		match guard.as_mut() {
			Some(session) => {
				session.access_token = access_token;
				session.refreshed_at = Some(OffsetDateTime::now_utc());

				if user.is_some() {
					session.user = user;
				}
			},
			None => *guard = Some(Session::new(access_token, user)),
		}
	}

	/// Replaces the stored user profile; no-op without a session.
	pub fn update_user(&self, user: UserProfile) {
		if let Some(session) = self.0.write().as_mut() {
			session.user = Some(user);
		}
	}

	/// Drops the session.
	pub fn clear(&self) {
		*self.0.write() = None;
	}
}
