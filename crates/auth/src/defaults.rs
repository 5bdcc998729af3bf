//! Built-in permission matrix.
//!
//! Seeds the permission store on first use and answers decisions whenever the
//! store is unreachable, so it must stay conservative.

use crate::permissions::all_keys;
use crate::{Action, PermissionEntry, Resource, Role};

/// Default allow/deny for a role. Total over the closed cross-product.
pub fn default_allow(role: Role, action: Action, resource: Resource) -> bool {
    match role {
        Role::SuperAdmin => true,
        Role::Supplier => resource == Resource::SupplierPortal && action == Action::Read,
        Role::Admin => match resource {
            Resource::Dashboard | Resource::Users => action == Action::Read,
            Resource::ContainerTypes
            | Resource::Suppliers
            | Resource::BlPositions
            | Resource::CarNumbers => true,
            Resource::Policies => false,
            Resource::Containers
            | Resource::BlMarkings
            | Resource::Reports
            | Resource::SupplierPortal => false,
        },
        Role::Staff => match resource {
            Resource::Dashboard => action == Action::Read,
            Resource::Containers | Resource::BlMarkings | Resource::Reports => true,
            _ => false,
        },
    }
}

/// Resources whose records staff may only update/delete when they own them.
pub fn is_owner_scoped(resource: Resource) -> bool {
    matches!(
        resource,
        Resource::Containers | Resource::BlMarkings | Resource::Reports
    )
}

/// Expand [`default_allow`] into one entry per `(role, resource, action)`.
pub fn default_permissions() -> Vec<PermissionEntry> {
    all_keys()
        .map(|key| PermissionEntry::new(key, default_allow(key.role, key.action, key.resource)))
        .collect()
}
