use serde::{Deserialize, Serialize};

use wolfshield_core::OrganizationId;

/// A principal's membership in an organization.
///
/// This is an authorization boundary object: it states *which organization's*
/// ledger the principal may act on and which roles/permissions it holds there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    pub organization_id: OrganizationId,
    pub roles: Vec<crate::Role>,
    pub permissions: Vec<crate::Permission>,
}

impl OrganizationMembership {
    /// Membership whose permissions are derived from `roles` by the default policy.
    pub fn from_roles(organization_id: OrganizationId, roles: Vec<crate::Role>) -> Self {
        let permissions = crate::policy::permissions_for_roles(&roles);
        Self {
            organization_id,
            roles,
            permissions,
        }
    }
}
