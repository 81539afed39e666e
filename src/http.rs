//! Request/response model and the dispatcher abstraction the coordinator wraps.
//!
//! [`Dispatcher`] is the crate's only dependency on an HTTP stack. It performs exactly one
//! network call per [`RequestDescriptor`] and reports any non-success status as
//! [`Error::Http`] so the coordinator can inspect it. Descriptors are plain data, so a
//! failed call can be resent after its headers are mutated.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::error::{ConfigError, HttpError, TransportError};

/// Lower-case name of the authorization header.
pub const AUTHORIZATION: &str = "authorization";

/// Boxed future returned by [`Dispatcher::send`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + 'a + Send>>;

/// Performs outbound API calls.
///
/// Implementations must be `Send + Sync + 'static` so one dispatcher can be shared by the
/// coordinator, the session API, and every in-flight call.
pub trait Dispatcher
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` once. Non-2xx responses resolve to [`Error::Http`].
	fn send(&self, request: RequestDescriptor) -> DispatchFuture<'_>;
}
impl<T> Dispatcher for Arc<T>
where
	T: ?Sized + Dispatcher,
{
	fn send(&self, request: RequestDescriptor) -> DispatchFuture<'_> {
		(**self).send(request)
	}
}

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Replayable description of one outbound call.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the dispatcher's base URL, without query string.
	pub path: String,
	/// Query parameters, in order.
	pub query: Vec<(String, String)>,
	/// Headers keyed by lower-case name.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<Value>,
}
impl RequestDescriptor {
	/// Creates a bodiless request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: Vec::new(), headers: BTreeMap::new(), body: None }
	}

	/// Shorthand for `GET path`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for `POST path` with a JSON body.
	pub fn post(path: impl Into<String>, body: Value) -> Self {
		Self::new(Method::Post, path).with_json(body)
	}

	/// Shorthand for `PATCH path` with a JSON body.
	pub fn patch(path: impl Into<String>, body: Value) -> Self {
		Self::new(Method::Patch, path).with_json(body)
	}

	/// Shorthand for `DELETE path`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Attaches a JSON body.
	pub fn with_json(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Appends a query parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets a header; the name is stored in lower case.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.set_header(name, value);

		self
	}

	/// Sets a header in place; the name is stored in lower case.
	pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}

	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

/// Successful response returned by a [`Dispatcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
	/// HTTP status code.
	pub status: u16,
	/// Headers keyed by lower-case name.
	pub headers: BTreeMap<String, String>,
	/// Raw body.
	pub body: Vec<u8>,
}
impl Response {
	/// Creates a response without headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(de)
			.map_err(|source| Error::Decode { source, status: self.status })
	}
}

/// Error envelope used by the backend for every failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
	/// Machine-readable error code, e.g. `TOKEN_EXPIRED`.
	#[serde(default)]
	pub error_code: Option<String>,
	/// Human-readable message.
	#[serde(default)]
	pub message: Option<String>,
}

/// Reqwest-backed [`Dispatcher`] rooted at a base URL.
///
/// The default client keeps a cookie store, so the refresh cookie set by the login
/// endpoint is sent back to the refresh and logout endpoints.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestDispatcher {
	base: Url,
	client: ReqwestClient,
}
#[cfg(feature = "reqwest")]
impl ReqwestDispatcher {
	/// Builds a dispatcher with a cookie-enabled client.
	pub fn new(base: Url) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self::with_client(base, client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(base: Url, client: ReqwestClient) -> Self {
		Self { base, client }
	}

	/// Base URL every request path is joined onto.
	pub fn base(&self) -> &Url {
		&self.base
	}

	fn build(&self, request: &RequestDescriptor) -> Result<reqwest::RequestBuilder> {
		let mut url = self.base.join(&request.path).map_err(|source| ConfigError::InvalidPath {
			path: request.path.clone(),
			source,
		})?;

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(request.query.iter());
		}

		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.client.request(method, url);

		for (name, value) in &request.headers {
			let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
				.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
			let value = reqwest::header::HeaderValue::from_str(value)
				.map_err(|_| ConfigError::InvalidHeader { name: name.to_string() })?;

			builder = builder.header(name, value);
		}
		if let Some(body) = &request.body {
			builder = builder
				.header(reqwest::header::CONTENT_TYPE, "application/json")
				.body(body.to_string());
		}

		Ok(builder)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestDispatcher {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestDispatcher {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Dispatcher for ReqwestDispatcher {
	fn send(&self, request: RequestDescriptor) -> DispatchFuture<'_> {
		Box::pin(async move {
			let response =
				self.build(&request)?.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			if (200..300).contains(&status) {
				Ok(Response { status, headers, body })
			} else {
				Err(HttpError::new(status, body).into())
			}
		})
	}
}
