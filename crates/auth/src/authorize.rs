use thiserror::Error;

use wolfshield_core::{OrganizationId, UserId};

use crate::{OrganizationMembership, Permission};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives it from
/// verified token claims and the role policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: UserId,
    pub active_organization_id: OrganizationId,
    pub membership: OrganizationMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("organization mismatch")]
    OrganizationMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for `required` on the ledger of `organization_id`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(
    principal: &Principal,
    organization_id: OrganizationId,
    required: &Permission,
) -> Result<(), AuthzError> {
    if principal.active_organization_id != principal.membership.organization_id
        || principal.membership.organization_id != organization_id
    {
        tracing::debug!(
            principal_id = %principal.principal_id,
            requested = %organization_id,
            "organization mismatch"
        );
        return Err(AuthzError::OrganizationMismatch);
    }

    let granted = principal
        .membership
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
