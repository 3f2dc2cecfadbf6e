//! API-side authorization guard for ledger operations.
//!
//! Runs before the engine is called, so the engine itself stays auth-agnostic and
//! only ever sees a trusted `created_by`.

use wolfshield_auth::{
    AuthzError, OrganizationMembership, Permission, Principal, authorize,
};
use wolfshield_core::OrganizationId;

use crate::context::{OrganizationContext, PrincipalContext};

/// Check that the caller may use `required` on `organization_id`'s ledger.
pub fn authorize_ledger(
    organization: &OrganizationContext,
    principal: &PrincipalContext,
    organization_id: OrganizationId,
    required: &Permission,
) -> Result<(), AuthzError> {
    let principal = Principal {
        principal_id: principal.principal_id(),
        active_organization_id: organization.organization_id(),
        membership: OrganizationMembership::from_roles(
            organization.organization_id(),
            principal.roles().to_vec(),
        ),
    };

    authorize(&principal, organization_id, required)
}
