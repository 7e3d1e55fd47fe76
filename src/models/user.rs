//! Admin user model
//!
//! The admin user is owned by the upstream auth service. The gateway and the
//! admin client only carry it around: a snapshot is cached in the auth store
//! for display, never as a source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Back-office user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Backend document identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login email
    pub email: String,
    /// Back-office role
    #[serde(default)]
    pub role: AdminRole,
    /// Whether the account may sign in
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Short biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl AdminUser {
    /// Create an active admin user snapshot with no optional fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: AdminRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            is_active: true,
            profile_picture: None,
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Label shown in the back office header
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Back-office role.
///
/// - Admin: full access including user management
/// - Editor: content management only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    #[default]
    Editor,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRole::Admin => write!(f, "admin"),
            AdminRole::Editor => write!(f, "editor"),
        }
    }
}

impl FromStr for AdminRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(AdminRole::Admin),
            "editor" => Ok(AdminRole::Editor),
            _ => Err(anyhow::anyhow!("Invalid admin role: {}", s)),
        }
    }
}
