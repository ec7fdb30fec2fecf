use std::fmt;

use crate::domain::access::checks::AccessCheck;
use crate::domain::access::checks::ActiveCheck;
use crate::domain::access::checks::PermissionCheck;
use crate::domain::access::checks::RoleCheck;
use crate::domain::access::checks::VerifiedCheck;
use crate::domain::access::errors::AccessError;
use crate::domain::user::models::Permissions;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;

/// Ordered chain of checks guarding a route.
pub struct AccessGate {
    checks: Vec<Box<dyn AccessCheck>>,
}

impl AccessGate {
    /// Gate with no checks: any authenticated account passes.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check; checks run in insertion order.
    pub fn with_check<C: AccessCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Authenticated and active.
    pub fn active() -> Self {
        Self::new().with_check(ActiveCheck)
    }

    /// Authenticated, active and verified.
    pub fn active_verified() -> Self {
        Self::active().with_check(VerifiedCheck)
    }

    /// Active, verified and holding `required` (superusers always pass).
    pub fn require_permissions(required: Permissions) -> Self {
        Self::active_verified().with_check(PermissionCheck::new(required))
    }

    /// Active, verified and exactly `admin2`.
    pub fn admin2_only() -> Self {
        Self::active_verified().with_check(RoleCheck::new(Role::Admin2))
    }

    /// Run every check in order, stopping at the first failure.
    pub fn evaluate(&self, user: &User) -> Result<(), AccessError> {
        self.checks.iter().try_for_each(|check| check.check(user))
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("checks", &self.checks.len())
            .finish()
    }
}
