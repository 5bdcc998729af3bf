//! `skyyard-auth`: pure authorization vocabulary and default policy (no I/O).
//!
//! This crate is intentionally decoupled from HTTP and storage: it names the
//! closed sets of roles, resources and actions, holds the built-in permission
//! matrix, and the owner-scoping rule shared by every decision path.

pub mod authorize;
pub mod claims;
pub mod defaults;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{
    Decision, DecisionBasis, decide_from_defaults, owner_scope_permits, requires_owner_match,
};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use defaults::{default_allow, default_permissions, is_owner_scoped};
pub use permissions::{Action, ParseError, PermissionEntry, PermissionKey, Resource, all_keys};
pub use roles::Role;
pub use user::AuthUser;
