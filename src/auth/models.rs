//! Authentication models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered claim names the token layer owns or validates.
const RESERVED_CLAIMS: [&str; 7] = ["iat", "exp", "nbf", "aud", "iss", "sub", "jti"];

/// Identity carried inside an access token.
///
/// `email` and `role` are the fields authorization looks at. Anything else the
/// client sent with its user record rides along in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Create an identity with just an email and a role
    pub fn new(email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: Some(role.into()),
            extra: Map::new(),
        }
    }

    /// Build the identity for a user record stored under `email`.
    ///
    /// The key the record was stored under wins over any `email` field in the
    /// body, so the token always names the document it was issued for.
    pub fn from_record(email: &str, record: &Map<String, Value>) -> Self {
        let role = record
            .get("role")
            .and_then(Value::as_str)
            .map(str::to_string);

        let extra = record
            .iter()
            .filter(|(key, _)| {
                !matches!(key.as_str(), "email" | "role" | "_id")
                    && !RESERVED_CLAIMS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            email: email.to_string(),
            role,
            extra,
        }
    }

    /// Whether this identity owns a resource keyed by `owner`
    pub fn owns(&self, owner: &str) -> bool {
        self.email == owner
    }
}
