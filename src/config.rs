//! Endpoint layout and expired-token signal shared by the coordinator and the session API.

mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Validated auth configuration.
///
/// Paths are compared verbatim against [`RequestDescriptor::path`](crate::http::RequestDescriptor)
/// when deciding whether a request is exempt from bearer decoration, so they must be spelled
/// exactly as callers spell them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
	/// Login endpoint; never decorated.
	pub login_path: String,
	/// Logout endpoint; never decorated.
	pub logout_path: String,
	/// Refresh endpoint; never decorated.
	pub refresh_path: String,
	/// Collection path for user resources (registration, profile edits).
	pub users_path: String,
	/// HTTP status that accompanies an expired access token.
	pub expired_status: u16,
	/// Backend `error_code` that marks an expired access token.
	pub expired_error_code: String,
}
impl AuthConfig {
	/// Returns a builder seeded with the default layout.
	pub fn builder() -> AuthConfigBuilder {
		AuthConfigBuilder::new()
	}

	/// Parses and validates a JSON configuration document; missing keys take defaults.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(de)?;

		config.validate()?;

		Ok(config)
	}

	/// Returns `true` for the login, logout, and refresh endpoints.
	pub fn is_excepted(&self, path: &str) -> bool {
		path == self.login_path || path == self.logout_path || path == self.refresh_path
	}

	/// Path of a single user resource.
	pub fn user_path(&self, user_id: &str) -> String {
		format!("{}/{user_id}", self.users_path.trim_end_matches('/'))
	}
}
impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			login_path: "/api/users/login".into(),
			logout_path: "/api/users/logout".into(),
			refresh_path: "/api/users/refresh".into(),
			users_path: "/api/users".into(),
			expired_status: 401,
			expired_error_code: "TOKEN_EXPIRED".into(),
		}
	}
}
