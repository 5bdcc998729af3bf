use serde::Serialize;

use skyyard_core::{OwnerId, UserId};

use crate::defaults::{default_allow, is_owner_scoped};
use crate::{Action, Resource, Role};

/// Whether a check must additionally match the record owner.
///
/// Staff may update/delete containers, BL markings and reports only when they
/// created the record. No stored override can lift this.
pub fn requires_owner_match(role: Role, action: Action, resource: Resource) -> bool {
    role == Role::Staff && action.is_mutation() && is_owner_scoped(resource)
}

/// Owner-scoping rule, applied identically after a stored grant and on the
/// default-table fallback.
pub fn owner_scope_permits(
    user_id: UserId,
    role: Role,
    action: Action,
    resource: Resource,
    owner: OwnerId,
) -> bool {
    !requires_owner_match(role, action, resource) || owner.is_owned_by(user_id)
}

/// Decide purely from the built-in matrix (store unavailable).
pub fn decide_from_defaults(
    user_id: UserId,
    role: Role,
    action: Action,
    resource: Resource,
    owner: OwnerId,
) -> bool {
    default_allow(role, action, resource)
        && owner_scope_permits(user_id, role, action, resource, owner)
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionBasis {
    /// No authenticated user.
    NoUser,
    /// The user's role text is not a known role.
    UnknownRole,
    /// Action or resource text is not in the closed sets.
    UnknownTarget,
    /// Super-admin bypasses the store.
    SuperAdmin,
    /// Stored entry grants the permission (and owner scoping passed).
    Stored,
    /// No stored entry for the key.
    NotStored,
    /// Stored entry denies the permission.
    StoredDenied,
    /// Granted by the store but the record belongs to someone else.
    OwnerMismatch,
    /// Store unavailable; answered from the built-in matrix.
    Fallback { seed_failed: bool },
}

/// Final authorization decision with its basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub basis: DecisionBasis,
}

impl Decision {
    pub fn allow(basis: DecisionBasis) -> Self {
        Self { allowed: true, basis }
    }

    pub fn deny(basis: DecisionBasis) -> Self {
        Self { allowed: false, basis }
    }

    /// Human-readable reason, for logs and the explain endpoint.
    pub fn reason(&self) -> &'static str {
        match self.basis {
            DecisionBasis::NoUser => "no authenticated user",
            DecisionBasis::UnknownRole => "role is not recognised",
            DecisionBasis::UnknownTarget => "action or resource is not recognised",
            DecisionBasis::SuperAdmin => "super administrators hold every permission",
            DecisionBasis::Stored => "granted by the stored policy",
            DecisionBasis::NotStored => "no stored policy entry for this permission",
            DecisionBasis::StoredDenied => "denied by the stored policy",
            DecisionBasis::OwnerMismatch => "only the record owner may update or delete it",
            DecisionBasis::Fallback { .. } if self.allowed => {
                "policy store unavailable; granted by the built-in defaults"
            }
            DecisionBasis::Fallback { .. } => {
                "policy store unavailable; denied by the built-in defaults"
            }
        }
    }
}
