use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::{OrganizationContext, PrincipalContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(organization): Extension<OrganizationContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    let permissions = wolfshield_auth::permissions_for_roles(principal.roles());
    Json(serde_json::json!({
        "organizationId": organization.organization_id().to_string(),
        "principalId": principal.principal_id().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
    }))
}
