use serde::{Deserialize, Serialize};

/// The user record returned alongside a session token.
///
/// The backend's user shape is loosely specified, so every field is optional.
/// Either `_id` or `id` (or both) may carry the identifier.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(from = "UserRecord")]
pub struct User {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.mongo_id.or(record.id),
            username: record.username,
            email: record.email,
        }
    }
}

/// Response of `POST /api/auth`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthSession {
    /// Opaque bearer token for task requests.
    pub token: String,
    #[serde(default)]
    pub user: User,
}
