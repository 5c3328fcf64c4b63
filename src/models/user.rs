//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Auth UID (also used as document ID)
    pub uid: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name from the identity provider
    pub display_name: String,
    /// Profile picture URL
    pub photo_url: Option<String>,
    /// When user first signed in
    pub created_at: String,
    /// Last sign-in timestamp
    pub last_active: String,
}
