//! User types.

use chrono::{DateTime, Utc};
use grocer_commerce::ids::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Shop staff: manages orders.
    Staff,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" | "authenticated" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// A user as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    /// Set once the email address is confirmed.
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// Free-form profile data supplied at sign-up (`full_name`, `phone`).
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    /// Provider-managed data; carries the `role` claim.
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: Some(email.into()),
            email_confirmed_at: None,
            user_metadata: serde_json::Value::Null,
            app_metadata: serde_json::Value::Null,
            created_at: None,
        }
    }

    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// Name from the sign-up metadata.
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata
            .get("full_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Get display name.
    pub fn display_name(&self) -> &str {
        self.full_name()
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }

    /// Role claim; unknown or missing roles are customers.
    pub fn role(&self) -> Role {
        self.app_metadata
            .get("role")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Check if user has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.role().has_permission(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Role::Customer));
        assert!(Role::Admin.has_permission(Role::Staff));
        assert!(!Role::Staff.has_permission(Role::Admin));
    }

    #[test]
    fn test_decode_provider_user() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "awa@example.com",
            "email_confirmed_at": "2024-05-01T10:00:00Z",
            "user_metadata": {"full_name": "Awa Diop"},
            "app_metadata": {"provider": "email", "role": "admin"},
            "aud": "authenticated"
        }))
        .unwrap();

        assert!(user.is_email_confirmed());
        assert_eq!(user.display_name(), "Awa Diop");
        assert_eq!(user.role(), Role::Admin);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = AuthUser::new("u2", "moussa@example.com");
        assert_eq!(user.display_name(), "moussa@example.com");
        assert_eq!(user.role(), Role::Customer);
        assert!(!user.has_permission(Role::Staff));
    }
}
