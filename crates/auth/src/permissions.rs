use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Operation performed on a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Some(Action::Read),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Update and delete mutate an existing record.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Action::Update | Action::Delete)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Read => "View",
            Action::Create => "Register",
            Action::Update => "Edit",
            Action::Delete => "Delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protected area of the yard administration application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Dashboard,
    Containers,
    BlMarkings,
    Reports,
    ContainerTypes,
    Suppliers,
    BlPositions,
    #[serde(alias = "carnumbers")]
    CarNumbers,
    Users,
    SupplierPortal,
    Policies,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Dashboard,
        Resource::Containers,
        Resource::BlMarkings,
        Resource::Reports,
        Resource::ContainerTypes,
        Resource::Suppliers,
        Resource::BlPositions,
        Resource::CarNumbers,
        Resource::Users,
        Resource::SupplierPortal,
        Resource::Policies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::Containers => "containers",
            Resource::BlMarkings => "bl_markings",
            Resource::Reports => "reports",
            Resource::ContainerTypes => "container_types",
            Resource::Suppliers => "suppliers",
            Resource::BlPositions => "bl_positions",
            Resource::CarNumbers => "car_numbers",
            Resource::Users => "users",
            Resource::SupplierPortal => "supplier_portal",
            Resource::Policies => "policies",
        }
    }

    /// Accepts the legacy `carnumbers` spelling.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "carnumbers" {
            return Some(Resource::CarNumbers);
        }
        Self::ALL.into_iter().find(|r| r.as_str() == normalized)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Dashboard => "Dashboard",
            Resource::Containers => "Containers",
            Resource::BlMarkings => "BL markings",
            Resource::Reports => "Leave reports",
            Resource::ContainerTypes => "Container types",
            Resource::Suppliers => "Suppliers",
            Resource::BlPositions => "BL positions",
            Resource::CarNumbers => "Car numbers",
            Resource::Users => "Users",
            Resource::SupplierPortal => "Supplier portal",
            Resource::Policies => "Policies",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// Composite key of a permission entry: `(role, resource, action)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    pub role: Role,
    pub resource: Resource,
    pub action: Action,
}

impl PermissionKey {
    pub fn new(role: Role, resource: Resource, action: Action) -> Self {
        Self { role, resource, action }
    }

    /// Parse a key from stored or submitted text.
    pub fn parse(role: &str, resource: &str, action: &str) -> Result<Self, ParseError> {
        Ok(Self {
            role: Role::parse(role).ok_or_else(|| ParseError::UnknownRole(role.to_string()))?,
            resource: Resource::parse(resource)
                .ok_or_else(|| ParseError::UnknownResource(resource.to_string()))?,
            action: Action::parse(action)
                .ok_or_else(|| ParseError::UnknownAction(action.to_string()))?,
        })
    }
}

impl core::fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}::{}::{}", self.role, self.resource, self.action)
    }
}

/// One cell of the permission matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    #[serde(flatten)]
    pub key: PermissionKey,
    pub allowed: bool,
}

impl PermissionEntry {
    pub fn new(key: PermissionKey, allowed: bool) -> Self {
        Self { key, allowed }
    }
}

/// The closed cross-product roles × resources × actions, in screen order.
pub fn all_keys() -> impl Iterator<Item = PermissionKey> {
    Role::ALL.into_iter().flat_map(|role| {
        Resource::ALL.into_iter().flat_map(move |resource| {
            Action::ALL
                .into_iter()
                .map(move |action| PermissionKey::new(role, resource, action))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_parse_accepts_canonical_and_legacy_names() {
        for resource in Resource::ALL {
            assert_eq!(Resource::parse(resource.as_str()), Some(resource));
        }
        assert_eq!(Resource::parse(" CarNumbers "), Some(Resource::CarNumbers));
        assert_eq!(Resource::parse("warehouses"), None);
    }

    #[test]
    fn action_parse_normalizes() {
        assert_eq!(Action::parse(" Delete"), Some(Action::Delete));
        assert_eq!(Action::parse("write"), None);
    }

    #[test]
    fn key_parse_reports_the_unknown_part() {
        assert_eq!(
            PermissionKey::parse("staff", "reports", "approve"),
            Err(ParseError::UnknownAction("approve".to_string()))
        );
        assert_eq!(
            PermissionKey::parse("guest", "reports", "read"),
            Err(ParseError::UnknownRole("guest".to_string()))
        );
        let key = PermissionKey::parse("ADMIN", "suppliers", "update").unwrap();
        assert_eq!(key, PermissionKey::new(Role::Admin, Resource::Suppliers, Action::Update));
        assert_eq!(key.to_string(), "admin::suppliers::update");
    }

    #[test]
    fn all_keys_covers_the_cross_product_once() {
        let keys: Vec<_> = all_keys().collect();
        assert_eq!(keys.len(), Role::ALL.len() * Resource::ALL.len() * Action::ALL.len());
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn entry_serializes_flat() {
        let entry = PermissionEntry::new(
            PermissionKey::new(Role::Staff, Resource::BlMarkings, Action::Create),
            true,
        );
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "staff",
                "resource": "bl_markings",
                "action": "create",
                "allowed": true
            })
        );
    }
}
