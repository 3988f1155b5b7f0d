//! Explicitly injected session context.
//!
//! The identity provider owns authentication; this crate only needs the
//! current user's opaque id, their role and the display language. A
//! [`SessionContext`] is passed to every operation that needs it instead of
//! being read from process-wide state.

use std::str::FromStr;

use caviar_core::codes::Language;
use caviar_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A prodigy (or their guardian) managing their own profiles.
    #[default]
    Prodige,
    /// A professional recruiter browsing profiles.
    Recruiter,
    /// Platform staff; the only role allowed to moderate videos.
    Admin,
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prodige" => Ok(Self::Prodige),
            "recruiter" => Ok(Self::Recruiter),
            "admin" => Ok(Self::Admin),
            other => Err(format!(
                "Unknown role '{other}'. Must be one of: prodige, recruiter, admin"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: UserId,
    pub role: UserRole,
    pub language: Language,
}

impl SessionContext {
    pub fn new(user_id: impl Into<UserId>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn can_moderate(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Build a session from environment-style lookups.
    ///
    /// | Key               | Default   |
    /// |-------------------|-----------|
    /// | `CAVIAR_USER_ID`  | required  |
    /// | `CAVIAR_USER_ROLE`| `prodige` |
    /// | `CAVIAR_LANGUAGE` | `en`      |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let user_id = lookup("CAVIAR_USER_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing {
                key: "CAVIAR_USER_ID",
            })?;

        let role = match lookup("CAVIAR_USER_ROLE") {
            Some(raw) => raw.parse::<UserRole>().map_err(|reason| ConfigError::Invalid {
                key: "CAVIAR_USER_ROLE",
                reason,
            })?,
            None => UserRole::default(),
        };

        let language = match lookup("CAVIAR_LANGUAGE") {
            Some(raw) => Language::from_tag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "CAVIAR_LANGUAGE",
                reason: format!("unsupported language '{raw}'"),
            })?,
            None => Language::default(),
        };

        Ok(Self {
            user_id,
            role,
            language,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
