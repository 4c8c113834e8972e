//! User records and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// The role a user holds on the platform.
///
/// Roles change only through explicit promotion (`STUDENT` → `TEACHER`);
/// `ADMIN` is assigned out of band and is never promoted or demoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Purchases courses to unlock content.
    Student,

    /// Authors courses, modules, and lessons.
    Teacher,

    /// Platform operator: may read anything and refund purchases, but never
    /// owns content.
    Admin,
}

/// A registered user.
///
/// Credential material (password hashes, tokens) is handled by an external
/// identity service and never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user id.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Contact email (uniqueness is the identity service's concern).
    pub email: String,

    /// Current role.
    pub role: Role,

    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default `Student` role.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            role: Role::Student,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_student() {
        let user = User::new("Ana", "ana@example.com");
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn role_serializes_screaming_snake() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"TEACHER\"");
        let parsed: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }
}
