//! Authenticated user as seen by authorization checks.

use serde::{Deserialize, Serialize};

use skyyard_core::UserId;

use crate::Role;

/// The caller of an operation: account id plus role text.
///
/// The role is kept as the raw text the account carries; decisions parse it
/// and deny anything outside the known role set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub role: String,
}

impl AuthUser {
    pub fn new(id: UserId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }

    pub fn with_role(id: UserId, role: Role) -> Self {
        Self::new(id, role.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role() == Some(Role::SuperAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_is_normalized() {
        let user = AuthUser::new(UserId::new(1), " Internal_Super_Admin ");
        assert!(user.is_super_admin());
        assert_eq!(AuthUser::new(UserId::new(2), "STAFF").role(), Some(Role::Staff));
        assert_eq!(AuthUser::new(UserId::new(3), "guest").role(), None);
    }
}
