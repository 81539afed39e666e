//! Authenticated user profile as returned by the backend's `user_data` field.

// self
use crate::_prelude::*;

/// Profile of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Backend user identifier (UUID string).
	pub id: String,
	/// Display name.
	pub username: String,
	/// Login e-mail address.
	pub email: String,
	/// Whether the user may use the admin panel.
	#[serde(default)]
	pub is_admin: bool,
}
