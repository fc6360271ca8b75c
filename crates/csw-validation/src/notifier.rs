//! # Webhook Notifier Capability
//!
//! Outcome notifications go through [`WebhookNotifier`]. Deployments
//! without a webhook use [`NoopNotifier`]; the engine never checks for an
//! absent notifier. Dispatch is best-effort: [`dispatch_best_effort`] logs
//! failures at `warn` and swallows them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use csw_core::{Timestamp, ValidationContext};

use crate::transaction::Transaction;

/// Event type names.
pub mod event_types {
    /// Validation passed.
    pub const TRANSACTION_PASSED: &str = "transaction.passed";
    /// Validation failed with only overridable violations.
    pub const TRANSACTION_OVERRIDE_REQUIRED: &str = "transaction.override_required";
    /// A pending override was approved.
    pub const TRANSACTION_OVERRIDE_APPROVED: &str = "transaction.override_approved";
    /// A pending override was rejected.
    pub const TRANSACTION_OVERRIDE_REJECTED: &str = "transaction.override_rejected";
}

/// Errors raised while delivering a notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The endpoint could not be reached.
    #[error("notification transport failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("notification rejected with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// The notifier is misconfigured.
    #[error("notifier not configured: {0}")]
    NotConfigured(String),

    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One outbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// One of [`event_types`].
    pub event_type: String,
    /// JSON payload.
    pub payload: serde_json::Value,
    /// When the event was raised.
    pub occurred_at: Timestamp,
}

impl NotificationEvent {
    /// Build the standard transaction payload for `event_type`.
    pub fn for_transaction(
        event_type: &str,
        transaction: &Transaction,
        ctx: &ValidationContext,
    ) -> Self {
        let decision = &transaction.override_decision;
        let payload = serde_json::json!({
            "transaction_id": transaction.id,
            "external_id": transaction.external_id,
            "customer": {
                "account": transaction.customer.account,
                "data_area_id": transaction.customer.data_area_id,
            },
            "validation_status": transaction.validation_status,
            "requires_override": transaction.requires_override,
            "override_status": decision.status,
            "decided_by": decision.decided_by,
            "decided_at": decision.decided_at,
            "justification": decision.justification,
            "violation_count": transaction.violations.len(),
            "correlation_id": ctx.correlation_id,
        });
        Self {
            event_type: event_type.to_string(),
            payload,
            occurred_at: Timestamp::now(),
        }
    }
}

/// Delivers notifications.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

/// Notifier that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl WebhookNotifier for NoopNotifier {
    async fn dispatch(&self, _event: &NotificationEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Dispatch `event`, logging and swallowing any failure.
pub async fn dispatch_best_effort(notifier: &dyn WebhookNotifier, event: NotificationEvent) {
    if let Err(e) = notifier.dispatch(&event).await {
        tracing::warn!(
            event_type = %event.event_type,
            error = %e,
            "notification dispatch failed"
        );
    }
}
