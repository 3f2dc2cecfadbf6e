//! Audit trail of who appended or verified what.
//!
//! Separate from the ledger itself: the ledger proves *what* was recorded, this
//! records *who asked* and what came back.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wolfshield_core::{OrganizationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    LedgerAppend,
    LedgerVerify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub organization_id: OrganizationId,
    pub principal_id: UserId,
    /// Action-specific summary (entry id/hash, or the verification report).
    pub outcome: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn now(
        action: AuditAction,
        organization_id: OrganizationId,
        principal_id: UserId,
        outcome: serde_json::Value,
    ) -> Self {
        Self {
            action,
            organization_id,
            principal_id,
            outcome,
            occurred_at: Utc::now(),
        }
    }
}

/// Where audit events go. Recording must not fail the audited operation.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits each event as a structured log line on the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "audit",
            action = ?event.action,
            organization_id = %event.organization_id,
            principal_id = %event.principal_id,
            outcome = %event.outcome,
            occurred_at = %event.occurred_at.to_rfc3339(),
            "audit event"
        );
    }
}

/// Keeps events in memory (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
