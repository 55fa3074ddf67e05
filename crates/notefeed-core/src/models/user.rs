//! User model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::UserId;

const ADMIN_ROLE: &str = "ADMIN";

/// Account role as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    User,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            ADMIN_ROLE => Self::Admin,
            "USER" => Self::User,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => ADMIN_ROLE.to_string(),
            Role::User => "USER".to_string(),
            Role::Other(other) => other,
        }
    }
}

/// A user account, either the signed-in user or a note/comment author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub role: Role,
    /// Fields this client does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: None,
            name: None,
            role,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn admin_role_is_detected() {
        let user: User =
            serde_json::from_value(json!({ "id": 1, "username": "root", "role": "ADMIN" }))
                .unwrap();
        assert!(user.is_admin());
        assert_eq!(user.id, Some(UserId::from(1)));
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let user: User = serde_json::from_value(json!({ "username": "ann" })).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn null_role_and_username_fall_back_to_defaults() {
        let user: User =
            serde_json::from_value(json!({ "id": 9, "username": null, "role": null })).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.username.is_empty());
    }

    #[test]
    fn unknown_fields_round_trip() {
        let raw = json!({
            "username": "ann",
            "role": "MODERATOR",
            "profilePicture": "/uploads/ann.png"
        });
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.role, Role::Other("MODERATOR".to_string()));
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["profilePicture"], json!("/uploads/ann.png"));
        assert_eq!(back["role"], json!("MODERATOR"));
    }
}
