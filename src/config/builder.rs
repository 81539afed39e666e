// self
use crate::{_prelude::*, config::AuthConfig};

/// Errors raised while constructing or validating an [`AuthConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthConfigError {
	/// Endpoint paths must be absolute.
	#[error("The {endpoint} path must start with `/`: {path:?}.")]
	RelativePath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Login, logout, and refresh must be distinct endpoints.
	#[error("The {first} and {second} endpoints share the path {path:?}.")]
	DuplicatePath {
		/// First endpoint label.
		first: &'static str,
		/// Second endpoint label.
		second: &'static str,
		/// Shared path.
		path: String,
	},
	/// Expired-token status must be a client error.
	#[error("Expired-token status {status} is not a 4xx status.")]
	InvalidStatus {
		/// Rejected status.
		status: u16,
	},
	/// Expired-token error code cannot be blank.
	#[error("Expired-token error code cannot be empty.")]
	EmptyErrorCode,
}

/// Builder for [`AuthConfig`] values.
#[derive(Debug)]
pub struct AuthConfigBuilder {
	config: AuthConfig,
}
impl AuthConfigBuilder {
	/// Creates a builder seeded with [`AuthConfig::default`].
	pub fn new() -> Self {
		Self { config: AuthConfig::default() }
	}

	/// Sets the login path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.config.login_path = path.into();

		self
	}

	/// Sets the logout path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.config.logout_path = path.into();

		self
	}

	/// Sets the refresh path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.config.refresh_path = path.into();

		self
	}

	/// Sets the user collection path.
	pub fn users_path(mut self, path: impl Into<String>) -> Self {
		self.config.users_path = path.into();

		self
	}

	/// Overrides the status/error-code pair that marks an expired access token.
	pub fn expired_signal(mut self, status: u16, error_code: impl Into<String>) -> Self {
		self.config.expired_status = status;
		self.config.expired_error_code = error_code.into();

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<AuthConfig, AuthConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}
impl Default for AuthConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl AuthConfig {
	/// Validates invariants for the config.
	pub(crate) fn validate(&self) -> Result<(), AuthConfigError> {
		let endpoints = [
			("login", &self.login_path),
			("logout", &self.logout_path),
			("refresh", &self.refresh_path),
			("users", &self.users_path),
		];

		for (endpoint, path) in endpoints {
			validate_path(endpoint, path)?;
		}
		let exempt = &endpoints[..3];

		for (i, &(first, a)) in exempt.iter().enumerate() {
			if let Some(&(second, _)) = exempt[i + 1..].iter().find(|&&(_, b)| a == b) {
				return Err(AuthConfigError::DuplicatePath { first, second, path: a.clone() });
			}
		}
		if !(400..=499).contains(&self.expired_status) {
			return Err(AuthConfigError::InvalidStatus { status: self.expired_status });
		}
		if self.expired_error_code.trim().is_empty() {
			return Err(AuthConfigError::EmptyErrorCode);
		}

		Ok(())
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), AuthConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(AuthConfigError::RelativePath { endpoint, path: path.to_owned() })
	}
}
