//! Session endpoints (register, login, logout, refresh) called over a raw dispatcher.
//!
//! [`SessionApi`] is the network half of the session store: it owns a [`SessionHandle`],
//! talks to the session endpoints directly (never through the coordinator, so a refresh
//! can never queue behind itself), and implements [`SessionStore`] for the coordinator.
//!
//! A refresh driven through [`SessionStore::refresh`] that fails ends the session the way a
//! user-initiated logout does: the logout endpoint is called so the server revokes the
//! refresh cookie, then local state is cleared. A later [`SessionStore::clear`] is a no-op.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, SessionFuture, SessionHandle, SessionStore, UserProfile},
	config::AuthConfig,
	error::RefreshError,
	http::{Dispatcher, RequestDescriptor},
	obs::{self, CallKind},
};

#[derive(Debug, Deserialize)]
struct LoginGrant {
	access_token: AccessToken,
	user_data: UserProfile,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
	access_token: AccessToken,
	#[serde(default)]
	user_data: Option<UserProfile>,
}

/// Calls the session endpoints and keeps the shared session in sync.
pub struct SessionApi<D>
where
	D: ?Sized + Dispatcher,
{
	dispatcher: Arc<D>,
	config: Arc<AuthConfig>,
	session: SessionHandle,
}
impl<D> SessionApi<D>
where
	D: ?Sized + Dispatcher,
{
	/// Creates a session API over the provided dispatcher and session handle.
	pub fn new(
		dispatcher: impl Into<Arc<D>>,
		config: impl Into<Arc<AuthConfig>>,
		session: SessionHandle,
	) -> Self {
		Self { dispatcher: dispatcher.into(), config: config.into(), session }
	}

	/// Shared session handle.
	pub fn session(&self) -> &SessionHandle {
		&self.session
	}

	/// Active configuration.
	pub fn config(&self) -> &AuthConfig {
		&self.config
	}

	/// Creates an account; the new user is not signed in.
	pub async fn register(
		&self,
		username: &str,
		email: &str,
		password: &str,
	) -> Result<UserProfile> {
		obs::observe(CallKind::Account, "register", async {
			let body = json!({ "username": username, "email": email, "raw_password": password });
			let response = self
				.dispatcher
				.send(RequestDescriptor::post(self.config.users_path.as_str(), body))
				.await?;

			response.json()
		})
		.await
	}

	/// Signs in and stores the issued access token and profile.
	///
	/// Any failure clears the session before it is returned.
	pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
		let result = obs::observe(CallKind::Login, "login", async {
			let body = json!({ "email": email, "raw_password": password });
			let response = self
				.dispatcher
				.send(RequestDescriptor::post(self.config.login_path.as_str(), body))
				.await?;
			let grant = response.json::<LoginGrant>()?;

			self.session.establish(grant.access_token, Some(grant.user_data.clone()));

			Ok(grant.user_data)
		})
		.await;

		if result.is_err() {
			self.session.clear();
		}

		result
	}

	/// Signs out on the server when possible and always clears the local session.
	///
	/// Server-side failures are logged and swallowed so the client-side logout proceeds.
	pub async fn logout(&self) {
		let result = obs::observe(CallKind::Logout, "logout", async {
			self.dispatcher
				.send(RequestDescriptor::post(self.config.logout_path.as_str(), json!({})))
				.await
		})
		.await;

		if let Err(_err) = result {
			obs_event!(
				warn,
				status = _err.status(),
				error = %_err,
				"server-side logout failed, proceeding with client-side logout"
			);
		}

		self.session.clear();
	}

	/// Exchanges the refresh cookie for a new access token and stores it.
	///
	/// The session is left untouched on failure; [`SessionStore::refresh`] is the variant that
	/// logs out.
	pub async fn refresh_access_token(&self) -> Result<AccessToken, RefreshError> {
		let request = RequestDescriptor::post(self.config.refresh_path.as_str(), json!({}));
		let grant = self
			.dispatcher
			.send(request)
			.await
			.and_then(|response| response.json::<TokenGrant>())
			.map_err(RefreshError::from)?;

		self.session.rotate(grant.access_token.clone(), grant.user_data);

		Ok(grant.access_token)
	}
}
impl<D> SessionStore for SessionApi<D>
where
	D: ?Sized + Dispatcher,
{
	fn current_token(&self) -> Option<AccessToken> {
		self.session.access_token()
	}

	fn refresh(&self) -> SessionFuture<'_, AccessToken> {
		Box::pin(async move {
			match self.refresh_access_token().await {
				Ok(token) => Ok(token),
				Err(err) => {
					obs_event!(info, error = %err, "access token refresh failed, logging out");

					self.logout().await;

					Err(err)
				},
			}
		})
	}

	fn clear(&self) {
		self.session.clear();
	}
}
impl<D> Debug for SessionApi<D>
where
	D: ?Sized + Dispatcher,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionApi")
			.field("config", &self.config)
			.field("authenticated", &self.session.is_authenticated())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::HttpError,
		http::{AUTHORIZATION, DispatchFuture, Response},
	};

	struct ScriptedDispatcher {
		replies: Mutex<VecDeque<Result<Response>>>,
		sent: Mutex<Vec<RequestDescriptor>>,
	}
	impl ScriptedDispatcher {
		fn new(replies: impl IntoIterator<Item = Result<Response>>) -> Self {
			Self { replies: Mutex::new(replies.into_iter().collect()), sent: Default::default() }
		}
	}
	impl Dispatcher for ScriptedDispatcher {
		fn send(&self, request: RequestDescriptor) -> DispatchFuture<'_> {
			self.sent.lock().push(request);

			let reply = self
				.replies
				.lock()
				.pop_front()
				.unwrap_or_else(|| Err(HttpError::new(500, Vec::new()).into()));

			Box::pin(async move { reply })
		}
	}

	fn grant(token: &str) -> Result<Response> {
		Ok(Response::new(
			200,
			json!({
				"access_token": token,
				"user_data": {
					"id": "u-1",
					"username": "kicks",
					"email": "kicks@example.com",
					"is_admin": false
				}
			})
			.to_string(),
		))
	}

	fn expired() -> Result<Response> {
		Err(HttpError::new(
			401,
			json!({ "error_code": "TOKEN_EXPIRED", "message": "The token has expired" }).to_string(),
		)
		.into())
	}

	fn api(
		replies: impl IntoIterator<Item = Result<Response>>,
	) -> (SessionApi<ScriptedDispatcher>, Arc<ScriptedDispatcher>) {
		let dispatcher = Arc::new(ScriptedDispatcher::new(replies));
		let api = SessionApi::new(dispatcher.clone(), AuthConfig::default(), SessionHandle::default());

		(api, dispatcher)
	}

	#[tokio::test]
	async fn login_establishes_session_without_bearer_header() {
		let (api, dispatcher) = api([grant("t1")]);
		let user = api.login("kicks@example.com", "hunter22").await.expect("Login should succeed.");

		assert_eq!(user.username, "kicks");
		assert_eq!(api.current_token().map(|t| t.expose().to_owned()), Some("t1".into()));

		let sent = dispatcher.sent.lock().clone();

		assert_eq!(sent[0].path, "/api/users/login");
		assert_eq!(sent[0].header(AUTHORIZATION), None);
		assert_eq!(
			sent[0].body,
			Some(json!({ "email": "kicks@example.com", "raw_password": "hunter22" }))
		);
	}

	#[tokio::test]
	async fn failed_login_clears_previous_session() {
		let rejected = HttpError::new(
			401,
			json!({ "error_code": "INVALID_CREDENTIALS", "message": "Invalid email or password" })
				.to_string(),
		);
		let (api, _) = api([grant("t1"), Err(rejected.into())]);

		api.login("kicks@example.com", "hunter22").await.expect("First login should succeed.");

		let err = api
			.login("kicks@example.com", "wrong-password")
			.await
			.expect_err("Second login should be rejected.");

		assert!(matches!(&err, Error::Http(http) if http.message() == "Invalid email or password"));
		assert!(!api.session().is_authenticated());
	}

	#[tokio::test]
	async fn logout_clears_session_even_when_server_fails() {
		let (api, dispatcher) = api([grant("t1")]);

		api.login("kicks@example.com", "hunter22").await.expect("Login should succeed.");
		api.logout().await;

		assert!(!api.session().is_authenticated());
		assert_eq!(dispatcher.sent.lock()[1].path, "/api/users/logout");
	}

	#[tokio::test]
	async fn refresh_rotates_token_and_leaves_session_on_failure() {
		let (api, dispatcher) = api([grant("t1"), grant("t2"), expired()]);

		api.login("kicks@example.com", "hunter22").await.expect("Login should succeed.");

		let token = api.refresh_access_token().await.expect("Refresh should succeed.");

		assert_eq!(token.expose(), "t2");
		assert_eq!(api.current_token(), Some(AccessToken::new("t2")));

		let err = api.refresh_access_token().await.expect_err("Expired refresh cookie should fail.");

		assert_eq!(err, RefreshError::Rejected {
			status: 401,
			error_code: Some("TOKEN_EXPIRED".into()),
			message: "The token has expired".into(),
		});
		assert!(api.session().is_authenticated());
		assert_eq!(dispatcher.sent.lock().len(), 3);
	}

	#[tokio::test]
	async fn store_refresh_failure_logs_out_on_server() {
		let (api, dispatcher) =
			api([grant("t1"), expired(), Ok(Response::new(200, b"{}".to_vec()))]);

		api.login("kicks@example.com", "hunter22").await.expect("Login should succeed.");

		let err = api.refresh().await.expect_err("Rejected refresh should surface.");

		assert_eq!(err.status(), Some(401));
		assert!(!api.session().is_authenticated());

		let paths = dispatcher.sent.lock().iter().map(|r| r.path.clone()).collect::<Vec<_>>();

		assert_eq!(paths, ["/api/users/login", "/api/users/refresh", "/api/users/logout"]);

		// Clearing again after the logout is harmless.
		api.clear();

		assert!(!api.session().is_authenticated());
	}

	#[tokio::test]
	async fn malformed_refresh_response_is_a_decode_failure() {
		let (api, _) = api([Ok(Response::new(200, json!({ "token": "t2" }).to_string()))]);
		let err = api.refresh().await.expect_err("Missing access_token should fail.");

		assert!(matches!(err, RefreshError::Decode { .. }));
	}
}
