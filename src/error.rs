//! Crate-level error types shared by the dispatcher, the session store, and the coordinator.

// self
use crate::{_prelude::*, config::AuthConfigError, http::ApiErrorBody};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The server answered with a non-success status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// The access token could not be refreshed; the session has been cleared.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Response body could not be decoded into the expected shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response being decoded.
		status: u16,
	},
	/// The operation needs an authenticated session.
	#[error("No authenticated session is available.")]
	NotAuthenticated,
}
impl Error {
	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http(e) => Some(e.status),
			Self::Refresh(e) => e.status(),
			Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Non-success HTTP response surfaced to the caller unchanged.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Request failed with status {status}.")]
pub struct HttpError {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpError {
	const FALLBACK_MESSAGE: &'static str = "An unknown error occurred.";

	/// Creates an error for the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Parses the backend's `{"error_code", "message"}` envelope, if the body carries one.
	pub fn api_error(&self) -> Option<ApiErrorBody> {
		serde_json::from_slice(&self.body).ok()
	}

	/// Returns the backend error code, if present.
	pub fn error_code(&self) -> Option<String> {
		self.api_error().and_then(|body| body.error_code)
	}

	/// Returns a human-readable message, falling back to a generic one.
	pub fn message(&self) -> String {
		self.api_error()
			.and_then(|body| body.message)
			.unwrap_or_else(|| Self::FALLBACK_MESSAGE.into())
	}
}

/// Refresh failure delivered to the triggering request and to every queued request.
///
/// The type is [`Clone`] because one failure fans out to all waiters.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// The refresh endpoint rejected the call.
	#[error("Refresh endpoint rejected the request with status {status}: {message}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Backend error code, when supplied.
		error_code: Option<String>,
		/// Backend or fallback message.
		message: String,
	},
	/// The refresh call never reached the server or the connection broke.
	#[error("Refresh call failed in transport: {message}.")]
	Transport {
		/// Transport failure description.
		message: String,
	},
	/// The refresh response did not contain a usable access token.
	#[error("Refresh response could not be decoded: {message}.")]
	Decode {
		/// Decoding failure description.
		message: String,
	},
	/// The refresh in flight was abandoned before it settled.
	#[error("Refresh was interrupted before it completed.")]
	Interrupted,
}
impl RefreshError {
	/// Returns the HTTP status of a rejected refresh.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			_ => None,
		}
	}
}
impl From<Error> for RefreshError {
	fn from(e: Error) -> Self {
		match e {
			Error::Http(http) => Self::Rejected {
				status: http.status,
				error_code: http.error_code(),
				message: http.message(),
			},
			Error::Refresh(inner) => inner,
			Error::Transport(inner) => Self::Transport { message: inner.to_string() },
			Error::Decode { source, .. } => Self::Decode { message: source.to_string() },
			other => Self::Transport { message: other.to_string() },
		}
	}
}

/// Configuration and construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path could not be joined onto the base URL.
	#[error("Request path `{path}` is not a valid URL reference.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request carries a header that cannot be sent.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Auth configuration failed validation.
	#[error(transparent)]
	Auth(#[from] AuthConfigError),
	/// Auth configuration document could not be parsed.
	#[error("Auth configuration could not be parsed.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
