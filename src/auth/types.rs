//! Auth configuration types

use std::fmt;

/// Authentication configuration
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username (the Aircall API ID)
        username: String,
        /// Password (the Aircall API token)
        password: String,
    },
}

impl AuthConfig {
    /// Create a basic auth config
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check whether any credentials are configured
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Credentials never show up in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = AuthConfig::basic("id-123", "super-secret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("id-123"));
        assert!(!rendered.contains("super-secret"));
    }
}
