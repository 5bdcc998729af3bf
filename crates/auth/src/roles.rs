use serde::{Deserialize, Serialize};

/// Role assigned to a user account.
///
/// Closed set. Users carry their role as free text (`users.role`); parse it
/// with [`Role::parse`] at the boundary. Unknown text has no role and is
/// denied everything.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "internal_super_admin")]
    SuperAdmin,
    Admin,
    Staff,
    Supplier,
}

impl Role {
    /// Every role, in policy-screen order.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Staff, Role::Supplier];

    /// Canonical storage spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Supplier => "supplier",
        }
    }

    /// Parse role text after trimming and lower-casing it.
    ///
    /// Accepts the legacy `internal_super_admin` spelling still present on
    /// older user rows.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "super_admin" | "internal_super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "supplier" => Some(Role::Supplier),
            _ => None,
        }
    }

    /// Locked roles always hold every permission; their policy row is not editable.
    pub fn is_locked(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super administrator",
            Role::Admin => "Administrator",
            Role::Staff => "Staff",
            Role::Supplier => "Supplier user",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Every permission, including policy management",
            Role::Admin => {
                "Full CRUD on settings (container types, suppliers, BL positions, car numbers) plus user lookup"
            }
            Role::Staff => {
                "Register containers, BL markings and reports; update or delete only their own records"
            }
            Role::Supplier => "Read-only access to the supplier portal",
        }
    }

    /// Operating rule shown next to the role on the policy screen.
    pub fn exception(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Always allowed; policy changes never restrict this role.",
            Role::Admin => "User management is read-only by default.",
            Role::Staff => {
                "Update/delete is limited to records the user created, whatever the policy says."
            }
            Role::Supplier => "Only the supplier portal is available.",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(Role::parse("  STAFF "), Some(Role::Staff));
        assert_eq!(Role::parse("Super_Admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("INTERNAL_SUPER_ADMIN"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn only_super_admin_is_locked() {
        let locked: Vec<_> = Role::ALL.into_iter().filter(Role::is_locked).collect();
        assert_eq!(locked, vec![Role::SuperAdmin]);
    }
}
