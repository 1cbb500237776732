use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Identifier issued by the authentication collaborator for every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub is_staff: bool,
    pub joined_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Contact and identity details kept for tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    pub user_id: UserId,
    pub phone: String,
    pub address: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub id_number: String,
}

/// Account row handed to the store; the id is allocated on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub is_staff: bool,
    pub joined_at: DateTime<Utc>,
}

/// Self-service sign-up payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRegistration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub emergency_phone: String,
    pub id_number: String,
}

impl TenantRegistration {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let required = [
            ("username", &self.username),
            ("full name", &self.full_name),
            ("email", &self.email),
            ("id number", &self.id_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ServiceError::validation(format!("{field} is required")));
            }
        }

        if !self.email.contains('@') {
            return Err(ServiceError::validation("email must be a valid address"));
        }

        if self.username.chars().any(char::is_whitespace) {
            return Err(ServiceError::validation("username cannot contain spaces"));
        }

        Ok(())
    }
}

/// Registered account together with its tenant profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredTenant {
    pub account: UserAccount,
    pub profile: TenantProfile,
}
