use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parse_timestamp;

/// Console role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reviewer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Reviewer => write!(f, "reviewer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "reviewer" => Ok(Role::Reviewer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Create an active profile with the given identity and role
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
            is_active: true,
            email: None,
            created_at: None,
            last_login: None,
        }
    }

    /// Set email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_reviewer(&self) -> bool {
        self.role == Role::Reviewer
    }

    /// Last login time, if the backend reported a parseable one
    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login.as_deref().and_then(parse_timestamp)
    }
}

/// Credentials posted to `/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload of a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserProfile,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Admin request to create an account
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

impl RegisterRequest {
    /// New reviewer account
    pub fn reviewer(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
            role: Role::Reviewer,
        }
    }

    /// Set role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Partial account update (admin only)
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body of `/auth/change-password`
#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
