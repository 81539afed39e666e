//! Bearer-token session layer for API clients: single-flight access-token refresh, queued
//! replay of requests that failed on an expired token, and the session lifecycle around it.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

#[macro_use]
mod macros;

pub mod auth;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod obs;
pub mod session_api;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, VecDeque},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	#[cfg(feature = "reqwest")]
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
