//! Session-domain models: access tokens, user profiles, and the session store contract.

pub mod profile;
pub mod session;
pub mod token;

pub use profile::*;
pub use session::*;
pub use token::*;
