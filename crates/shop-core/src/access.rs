//! # Access Decisions
//!
//! The one authorization rule every engine shares: a caller may touch a
//! resource if they own it or are an admin. Authentication happens
//! elsewhere; by the time a [`Principal`] exists its identity is trusted.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::UserRole;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub role: UserRole,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::User,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Admin,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails with `Forbidden` unless the caller owns `owner_id` or is an admin.
    pub fn require_owner_or_admin(&self, owner_id: &str) -> CoreResult<()> {
        if is_owner_or_admin(&self.user_id, owner_id, self.role) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "resource belongs to another user".to_string(),
            ))
        }
    }

    /// Fails with `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> CoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("admin role required".to_string()))
        }
    }
}

/// Owner-or-admin decision.
pub fn is_owner_or_admin(caller_id: &str, owner_id: &str, caller_role: UserRole) -> bool {
    caller_role == UserRole::Admin || caller_id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_owner_or_admin() {
        assert!(is_owner_or_admin("u1", "u1", UserRole::User));
        assert!(!is_owner_or_admin("u2", "u1", UserRole::User));
        assert!(is_owner_or_admin("admin", "u1", UserRole::Admin));
    }

    #[test]
    fn test_principal_guards() {
        let alice = Principal::user("alice");
        assert!(alice.require_owner_or_admin("alice").is_ok());
        assert!(matches!(
            alice.require_owner_or_admin("bob"),
            Err(CoreError::Forbidden(_))
        ));
        assert!(alice.require_admin().is_err());

        let root = Principal::admin("root");
        assert!(root.require_owner_or_admin("bob").is_ok());
        assert!(root.require_admin().is_ok());
    }
}
