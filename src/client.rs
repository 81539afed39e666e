//! Application-facing client that wires the dispatcher, session API, and coordinator.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::{SessionHandle, SessionStore, UserProfile},
	config::AuthConfig,
	coordinator::RefreshCoordinator,
	http::{Dispatcher, RequestDescriptor, Response},
	obs::{self, CallKind},
	session_api::SessionApi,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestDispatcher};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestDispatcher>;

#[derive(Debug, Deserialize)]
struct UserEnvelope {
	user_data: UserProfile,
}

/// Session-aware API client.
///
/// Session calls (login, logout, refresh) go straight to the dispatcher; everything else
/// goes through the [`RefreshCoordinator`], which keeps the bearer token current.
pub struct ApiClient<D>
where
	D: ?Sized + Dispatcher,
{
	api: Arc<SessionApi<D>>,
	coordinator: RefreshCoordinator<D, SessionApi<D>>,
}
impl<D> ApiClient<D>
where
	D: ?Sized + Dispatcher,
{
	/// Creates a client with a fresh, signed-out session.
	pub fn new(dispatcher: impl Into<Arc<D>>, config: AuthConfig) -> Self {
		Self::with_session(dispatcher, config, SessionHandle::default())
	}

	/// Creates a client over an existing session handle.
	pub fn with_session(
		dispatcher: impl Into<Arc<D>>,
		config: AuthConfig,
		session: SessionHandle,
	) -> Self {
		let dispatcher = dispatcher.into();
		let config = Arc::new(config);
		let api = Arc::new(SessionApi::new(dispatcher.clone(), config.clone(), session));
		let coordinator = RefreshCoordinator::new(dispatcher, api.clone(), config);

		Self { api, coordinator }
	}

	/// Shared session handle.
	pub fn session(&self) -> &SessionHandle {
		self.api.session()
	}

	/// Underlying coordinator.
	pub fn coordinator(&self) -> &RefreshCoordinator<D, SessionApi<D>> {
		&self.coordinator
	}

	/// Session endpoint calls.
	pub fn session_api(&self) -> &SessionApi<D> {
		&self.api
	}

	/// Creates an account without signing in.
	pub async fn register(
		&self,
		username: &str,
		email: &str,
		password: &str,
	) -> Result<UserProfile> {
		self.api.register(username, email, password).await
	}

	/// Signs in.
	pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
		self.api.login(email, password).await
	}

	/// Signs out; never fails.
	pub async fn logout(&self) {
		self.api.logout().await
	}

	/// Restores a session from the refresh cookie, typically at startup.
	///
	/// On failure the client logs out fully (server and local) and returns the error.
	pub async fn restore_session(&self) -> Result<()> {
		self.api.refresh().await?;

		Ok(())
	}

	/// Sends an API request with bearer decoration and refresh-and-replay.
	pub async fn send(&self, request: RequestDescriptor) -> Result<Response> {
		self.coordinator.send(request).await
	}

	/// Sends an API request and decodes the JSON response.
	pub async fn send_json<T>(&self, request: RequestDescriptor) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(request).await?.json()
	}

	/// Renames the signed-in user and stores the updated profile.
	pub async fn change_username(&self, username: &str) -> Result<UserProfile> {
		let user = self.current_user()?;

		obs::observe(CallKind::Account, "change_username", async {
			let path = format!("{}/username", self.api.config().user_path(&user.id));
			let envelope = self
				.send_json::<UserEnvelope>(RequestDescriptor::patch(
					path,
					json!({ "username": username }),
				))
				.await?;

			self.session().update_user(envelope.user_data.clone());

			Ok(envelope.user_data)
		})
		.await
	}

	/// Changes the password; the server revokes existing tokens, so the session is cleared.
	pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
		let user = self.current_user()?;

		obs::observe(CallKind::Account, "change_password", async {
			let path = format!("{}/password", self.api.config().user_path(&user.id));
			let body = json!({
				"old_raw_password": old_password,
				"new_raw_password": new_password,
			});

			self.send(RequestDescriptor::patch(path, body)).await?;
			self.session().clear();

			Ok(())
		})
		.await
	}

	/// Deletes the account and clears the session.
	pub async fn delete_user(&self, user_id: &str) -> Result<()> {
		self.current_user()?;

		obs::observe(CallKind::Account, "delete_user", async {
			self.send(RequestDescriptor::delete(self.api.config().user_path(user_id))).await?;
			self.session().clear();

			Ok(())
		})
		.await
	}

	fn current_user(&self) -> Result<UserProfile> {
		self.session().user().ok_or(Error::NotAuthenticated)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestDispatcher> {
	/// Creates a reqwest-backed client for the API at `base`.
	pub fn connect(base: Url, config: AuthConfig) -> Result<Self, ConfigError> {
		Ok(Self::new(ReqwestDispatcher::new(base)?, config))
	}
}
impl<D> Clone for ApiClient<D>
where
	D: ?Sized + Dispatcher,
{
	fn clone(&self) -> Self {
		Self { api: self.api.clone(), coordinator: self.coordinator.clone() }
	}
}
impl<D> Debug for ApiClient<D>
where
	D: ?Sized + Dispatcher,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient").field("coordinator", &self.coordinator).finish()
	}
}
