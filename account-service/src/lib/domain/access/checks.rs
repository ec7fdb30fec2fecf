use crate::domain::access::errors::AccessError;
use crate::domain::user::models::Permissions;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;

/// A single predicate over the authenticated account.
pub trait AccessCheck: Send + Sync {
    fn check(&self, user: &User) -> Result<(), AccessError>;
}

/// Account must not be deactivated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveCheck;

impl AccessCheck for ActiveCheck {
    fn check(&self, user: &User) -> Result<(), AccessError> {
        if user.is_active {
            Ok(())
        } else {
            Err(AccessError::Inactive)
        }
    }
}

/// Account must have confirmed its email.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifiedCheck;

impl AccessCheck for VerifiedCheck {
    fn check(&self, user: &User) -> Result<(), AccessError> {
        if user.is_verified {
            Ok(())
        } else {
            Err(AccessError::Unverified)
        }
    }
}

/// Account must hold every required permission, unless it is a superuser.
#[derive(Debug, Clone)]
pub struct PermissionCheck {
    required: Permissions,
}

impl PermissionCheck {
    pub fn new(required: Permissions) -> Self {
        Self { required }
    }
}

impl AccessCheck for PermissionCheck {
    fn check(&self, user: &User) -> Result<(), AccessError> {
        if user.is_superuser() || user.permissions.contains_all(&self.required) {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

/// Account must have exactly this role.
#[derive(Debug, Clone, Copy)]
pub struct RoleCheck {
    role: Role,
}

impl RoleCheck {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl AccessCheck for RoleCheck {
    fn check(&self, user: &User) -> Result<(), AccessError> {
        if user.role == self.role {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}
