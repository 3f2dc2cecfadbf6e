use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use wolfshield_auth::Permission;
use wolfshield_core::{DomainError, OrganizationId};
use wolfshield_infra::{AuditAction, AuditEvent};
use wolfshield_ledger::AccountingPeriod;

use crate::app::dto::{self, AppendEntryRequest, EntriesResponse, LedgerEntryDto, VerifyRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::authorize_ledger;
use crate::context::{OrganizationContext, PrincipalContext};

pub fn router() -> Router {
    Router::new()
        .route("/entries", post(append_entry).get(list_entries))
        .route("/verify", post(verify_ledger))
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation { field, reason } => errors::validation_error(field, reason),
        other => errors::json_error(StatusCode::BAD_REQUEST, "validation_error", other.to_string()),
    }
}

fn body_rejection(rejection: JsonRejection) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

/// The organization a request acts on: `requested`, or the token's own.
///
/// `permission` is checked on the token's organization before the request is
/// inspected at all, so callers without it get 403 whatever they sent.
fn resolve_organization(
    organization: &OrganizationContext,
    principal: &PrincipalContext,
    requested: Option<&str>,
    permission: &Permission,
) -> Result<OrganizationId, axum::response::Response> {
    authorize_ledger(organization, principal, organization.organization_id(), permission)
        .map_err(errors::authz_error_to_response)?;
    let organization_id = dto::parse_organization(requested, organization.organization_id())
        .map_err(domain_error_to_response)?;
    authorize_ledger(organization, principal, organization_id, permission)
        .map_err(errors::authz_error_to_response)?;
    Ok(organization_id)
}

/// 400 for an unreadable body, unless the caller may not act at all.
fn reject_body(
    organization: &OrganizationContext,
    principal: &PrincipalContext,
    permission: &Permission,
    rejection: JsonRejection,
) -> axum::response::Response {
    match resolve_organization(organization, principal, None, permission) {
        Ok(_) => body_rejection(rejection),
        Err(denied) => denied,
    }
}

pub async fn append_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(organization): Extension<OrganizationContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<AppendEntryRequest>, JsonRejection>,
) -> axum::response::Response {
    let permission = Permission::LEDGER_WRITE;
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return reject_body(&organization, &principal, &permission, rejection),
    };

    let organization_id = match resolve_organization(
        &organization,
        &principal,
        body.organization_id.as_deref(),
        &permission,
    ) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let new = match body.into_new_entry(organization_id, principal.principal_id()) {
        Ok(new) => new,
        Err(e) => return domain_error_to_response(e),
    };

    let entry = match services.engine.append(new).await {
        Ok(entry) => entry,
        Err(e) => return errors::engine_error_to_response(e),
    };

    services.audit.record(AuditEvent::now(
        AuditAction::LedgerAppend,
        entry.organization_id,
        principal.principal_id(),
        serde_json::json!({
            "entryId": entry.id,
            "sequence": entry.sequence,
            "entryHash": entry.entry_hash,
        }),
    ));

    (StatusCode::CREATED, Json(LedgerEntryDto::from(entry))).into_response()
}

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(organization): Extension<OrganizationContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ListEntriesQuery>,
) -> axum::response::Response {
    let organization_id = match resolve_organization(
        &organization,
        &principal,
        query.organization_id.as_deref(),
        &Permission::LEDGER_READ,
    ) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let period = match query.accounting_period.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match AccountingPeriod::parse(raw) {
            Ok(p) => p,
            Err(e) => return domain_error_to_response(e),
        },
        _ => AccountingPeriod::current(),
    };

    match services.engine.entries_for_period(organization_id, Some(period)).await {
        Ok(entries) => {
            let entries: Vec<LedgerEntryDto> = entries.into_iter().map(LedgerEntryDto::from).collect();
            let body = EntriesResponse {
                count: entries.len(),
                entries,
                accounting_period: period,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn verify_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(organization): Extension<OrganizationContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> axum::response::Response {
    let permission = Permission::LEDGER_VERIFY;
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return reject_body(&organization, &principal, &permission, rejection),
    };

    let organization_id = match resolve_organization(
        &organization,
        &principal,
        body.organization_id.as_deref(),
        &permission,
    ) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let report = match services.engine.verify(organization_id).await {
        Ok(report) => report,
        Err(e) => return errors::engine_error_to_response(e),
    };

    services.audit.record(AuditEvent::now(
        AuditAction::LedgerVerify,
        organization_id,
        principal.principal_id(),
        serde_json::to_value(&report).unwrap_or(serde_json::Value::Null),
    ));

    (StatusCode::OK, Json(report)).into_response()
}
