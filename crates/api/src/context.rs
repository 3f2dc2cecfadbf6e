use wolfshield_auth::Role;
use wolfshield_core::{OrganizationId, UserId};

/// Organization context for a request, taken from the verified token.
///
/// Immutable and present on every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrganizationContext {
    organization_id: OrganizationId,
}

impl OrganizationContext {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self { organization_id }
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

/// Principal context for a request (authenticated identity + roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: UserId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: UserId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn principal_id(&self) -> UserId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
