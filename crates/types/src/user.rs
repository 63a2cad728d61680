//! Identity records read from the console backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Curator,
    GlobalCurator,
    #[default]
    Basic,
    #[serde(other)]
    Other,
}

/// The currently signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub is_cloud_superuser: bool,
}

impl User {
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: None,
            email: email.into(),
            role,
            is_cloud_superuser: false,
        }
    }

    /// Marks the user as a cloud superuser.
    pub fn cloud_superuser(mut self) -> Self {
        self.is_cloud_superuser = true;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Access-control grouping of users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGroup {
    pub id: i64,
    pub name: String,
}

impl UserGroup {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Body of the tenant impersonation request.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpersonateRequest {
    pub email: String,
    pub api_key: String,
}

impl fmt::Debug for ImpersonateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpersonateRequest")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
