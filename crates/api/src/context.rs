use skyyard_auth::{AuthUser, Role};
use skyyard_core::UserId;

/// Authenticated caller for a request, taken from the bearer token.
///
/// Present on every protected route; handlers extract it with `Extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user: AuthUser,
}

impl UserContext {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> Option<Role> {
        self.user.role()
    }
}
