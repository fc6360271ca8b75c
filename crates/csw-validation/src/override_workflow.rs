//! # Override Workflow
//!
//! Human approval or rejection of a transaction whose validation failed
//! with only overridable violations. Preconditions are checked in order:
//!
//! 1. the transaction exists (`TransactionNotFound`);
//! 2. it requires an override (`OverrideNotRequired`);
//! 3. its decision is `Pending` (`NotPending`);
//! 4. actor and justification are non-blank (`MissingActor`, `MissingJustification`).
//!
//! Decisions on one transaction made through one workflow (and its
//! clones) are serialised, so of two concurrent decisions exactly one
//! succeeds. Decisions on different transactions do not wait for each
//! other. Notification runs after the lock is released and is
//! best-effort.

use std::sync::Arc;

use tracing::Instrument;

use csw_core::{TransactionId, ValidationContext};
use csw_state::OverrideEvidence;

use crate::error::OverrideError;
use crate::lock::KeyedLocks;
use crate::notifier::{dispatch_best_effort, event_types, NotificationEvent, WebhookNotifier};
use crate::ports::{Collaborators, TransactionStore};
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

/// Approves and rejects pending overrides.
#[derive(Clone)]
pub struct OverrideWorkflow {
    transactions: Arc<dyn TransactionStore>,
    notifier: Arc<dyn WebhookNotifier>,
    decisions: Arc<KeyedLocks<TransactionId>>,
}

impl std::fmt::Debug for OverrideWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideWorkflow").finish_non_exhaustive()
    }
}

impl OverrideWorkflow {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        notifier: Arc<dyn WebhookNotifier>,
    ) -> Self {
        Self {
            transactions,
            notifier,
            decisions: Arc::new(KeyedLocks::new()),
        }
    }

    /// A workflow over the collaborators' transaction store and notifier.
    pub fn from_collaborators(collaborators: &Collaborators) -> Self {
        Self::new(
            Arc::clone(&collaborators.transactions),
            Arc::clone(&collaborators.notifier),
        )
    }

    /// Grant the pending override of `id`.
    pub async fn approve_override(
        &self,
        ctx: &ValidationContext,
        id: TransactionId,
        approver: &str,
        justification: &str,
    ) -> Result<Transaction, OverrideError> {
        let span = tracing::info_span!(
            "override_decision",
            correlation_id = %ctx.correlation_id,
            transaction_id = %id,
            decision = "approve",
        );
        self.decide(ctx, id, Decision::Approve, approver, justification)
            .instrument(span)
            .await
    }

    /// Refuse the pending override of `id`.
    pub async fn reject_override(
        &self,
        ctx: &ValidationContext,
        id: TransactionId,
        rejecter: &str,
        reason: &str,
    ) -> Result<Transaction, OverrideError> {
        let span = tracing::info_span!(
            "override_decision",
            correlation_id = %ctx.correlation_id,
            transaction_id = %id,
            decision = "reject",
        );
        self.decide(ctx, id, Decision::Reject, rejecter, reason)
            .instrument(span)
            .await
    }

    /// Transactions awaiting a decision, oldest transaction date first.
    pub async fn pending_overrides(&self) -> Result<Vec<Transaction>, OverrideError> {
        let mut pending = self.transactions.get_pending_overrides().await?;
        pending.retain(|t| t.override_decision.is_pending());
        pending.sort_by(|a, b| {
            a.transaction_date
                .cmp(&b.transaction_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(pending)
    }

    /// Number of transactions awaiting a decision.
    pub async fn pending_override_count(&self) -> Result<usize, OverrideError> {
        Ok(self.pending_overrides().await?.len())
    }

    async fn decide(
        &self,
        ctx: &ValidationContext,
        id: TransactionId,
        decision: Decision,
        actor: &str,
        justification: &str,
    ) -> Result<Transaction, OverrideError> {
        let guard = self.decisions.acquire(&id).await;
        let decided = self.record_decision(id, decision, actor, justification).await;
        drop(guard);
        self.decisions.prune();
        let (transaction, event_type) = decided?;

        let event = NotificationEvent::for_transaction(event_type, &transaction, ctx);
        dispatch_best_effort(self.notifier.as_ref(), event).await;
        Ok(transaction)
    }

    /// Check preconditions and persist the decision. Caller holds the
    /// transaction's lock.
    async fn record_decision(
        &self,
        id: TransactionId,
        decision: Decision,
        actor: &str,
        justification: &str,
    ) -> Result<(Transaction, &'static str), OverrideError> {
        let mut transaction = self
            .transactions
            .get(id)
            .await?
            .ok_or(OverrideError::TransactionNotFound(id))?;
        if !transaction.requires_override {
            return Err(OverrideError::OverrideNotRequired(id));
        }
        if !transaction.override_decision.is_pending() {
            return Err(OverrideError::NotPending {
                current: transaction.override_decision.status,
            });
        }
        let evidence = OverrideEvidence::new(actor, justification)?;

        let event_type = match decision {
            Decision::Approve => {
                transaction.override_decision.approve(&evidence)?;
                event_types::TRANSACTION_OVERRIDE_APPROVED
            }
            Decision::Reject => {
                transaction.override_decision.reject(&evidence)?;
                event_types::TRANSACTION_OVERRIDE_REJECTED
            }
        };
        self.transactions.update(&transaction).await?;

        tracing::info!(
            actor = evidence.actor(),
            status = %transaction.override_decision.status,
            "override decided"
        );
        Ok((transaction, event_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;

    use csw_core::{CountryCode, CustomerRef, SubstanceCode, TransactionType, ValidationStatus};
    use csw_state::OverrideStatus;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::error::StoreError;
    use crate::notifier::{NoopNotifier, NotifyError};
    use crate::transaction::{TransactionLicenceUsage, TransactionViolation};

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<TransactionId, Transaction>>);

    #[async_trait]
    impl TransactionStore for MapStore {
        async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
            Ok(self.0.lock().get(&id).cloned())
        }
        async fn get_by_external_id(&self, _: &str) -> Result<Option<Transaction>, StoreError> {
            Ok(None)
        }
        async fn create(&self, t: &Transaction) -> Result<(), StoreError> {
            self.0.lock().insert(t.id, t.clone());
            Ok(())
        }
        async fn update(&self, t: &Transaction) -> Result<(), StoreError> {
            self.0.lock().insert(t.id, t.clone());
            Ok(())
        }
        async fn get_in_period(
            &self,
            _: &CustomerRef,
            _: Option<&SubstanceCode>,
            _: NaiveDate,
            _: NaiveDate,
        ) -> Result<Vec<Transaction>, StoreError> {
            Ok(Vec::new())
        }
        async fn add_violations(
            &self,
            _: TransactionId,
            _: &[TransactionViolation],
        ) -> Result<(), StoreError> {
            Ok(())
        }
        async fn clear_violations(&self, _: TransactionId) -> Result<(), StoreError> {
            Ok(())
        }
        async fn add_licence_usage(
            &self,
            _: TransactionId,
            _: &[TransactionLicenceUsage],
        ) -> Result<(), StoreError> {
            Ok(())
        }
        async fn get_pending_overrides(&self) -> Result<Vec<Transaction>, StoreError> {
            Ok(self
                .0
                .lock()
                .values()
                .filter(|t| t.override_decision.is_pending())
                .cloned()
                .collect())
        }
    }

    /// Holds its first dispatch until released.
    #[derive(Default)]
    struct StalledNotifier {
        first: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl StalledNotifier {
        fn new() -> Self {
            Self {
                first: AtomicBool::new(true),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl WebhookNotifier for StalledNotifier {
        async fn dispatch(&self, _event: &NotificationEvent) -> Result<(), NotifyError> {
            if self.first.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(())
        }
    }

    fn failed(day: u32, pending: bool) -> Transaction {
        let mut t = Transaction::new(
            format!("SO-{day}"),
            CustomerRef::new("C-001", "nl01").unwrap(),
            TransactionType::Order,
            NaiveDate::from_ymd_opt(2026, 4, day).unwrap(),
            CountryCode::new("NL").unwrap(),
            CountryCode::new("NL").unwrap(),
            vec![],
        );
        t.validation_status = ValidationStatus::Failed;
        if pending {
            t.requires_override = true;
            t.override_decision.request("licence expired").unwrap();
        }
        t
    }

    async fn workflow_with(ts: Vec<Transaction>) -> OverrideWorkflow {
        let store = Arc::new(MapStore::default());
        for t in &ts {
            store.create(t).await.unwrap();
        }
        OverrideWorkflow::new(store, Arc::new(NoopNotifier))
    }

    #[tokio::test]
    async fn preconditions_in_order() {
        let not_required = failed(1, false);
        let pending = failed(2, true);
        let wf = workflow_with(vec![not_required.clone(), pending.clone()]).await;
        let ctx = ValidationContext::for_user("qa.officer");

        let unknown = TransactionId::new();
        assert_eq!(
            wf.approve_override(&ctx, unknown, "qa", "ok").await,
            Err(OverrideError::TransactionNotFound(unknown))
        );
        assert_eq!(
            wf.approve_override(&ctx, not_required.id, "qa", "ok").await,
            Err(OverrideError::OverrideNotRequired(not_required.id))
        );
        assert_eq!(
            wf.reject_override(&ctx, pending.id, "qa", "   ").await,
            Err(OverrideError::MissingJustification)
        );
        assert_eq!(
            wf.reject_override(&ctx, pending.id, "", "reason").await,
            Err(OverrideError::MissingActor)
        );
    }

    #[tokio::test]
    async fn decision_is_one_shot() {
        let pending = failed(3, true);
        let wf = workflow_with(vec![pending.clone()]).await;
        let ctx = ValidationContext::new();

        let approved = wf
            .approve_override(&ctx, pending.id, "qa", "Emergency stock")
            .await
            .unwrap();
        assert_eq!(approved.override_decision.status, OverrideStatus::Approved);
        assert!(approved.may_proceed());

        assert_eq!(
            wf.reject_override(&ctx, pending.id, "qa", "changed mind").await,
            Err(OverrideError::NotPending {
                current: OverrideStatus::Approved
            })
        );
    }

    #[tokio::test]
    async fn slow_notification_does_not_hold_other_decisions() {
        let a = failed(4, true);
        let b = failed(6, true);
        let a_id = a.id;
        let store = Arc::new(MapStore::default());
        store.create(&a).await.unwrap();
        store.create(&b).await.unwrap();
        let notifier = Arc::new(StalledNotifier::new());
        let wf = OverrideWorkflow::new(store.clone(), notifier.clone());

        let first = {
            let wf = wf.clone();
            tokio::spawn(async move {
                wf.approve_override(&ValidationContext::new(), a_id, "qa", "Emergency stock")
                    .await
            })
        };
        notifier.entered.notified().await;

        let stored = store.get(a_id).await.unwrap().unwrap();
        assert_eq!(stored.override_decision.status, OverrideStatus::Approved);

        let rejected = tokio::time::timeout(
            Duration::from_secs(1),
            wf.reject_override(&ValidationContext::new(), b.id, "qa", "not justified"),
        )
        .await
        .expect("decision on another transaction must not wait for the notifier")
        .unwrap();
        assert_eq!(rejected.override_decision.status, OverrideStatus::Rejected);

        notifier.release.notify_one();
        let approved = first.await.unwrap().unwrap();
        assert_eq!(approved.override_decision.status, OverrideStatus::Approved);
    }

    #[tokio::test]
    async fn pending_queue_is_oldest_first() {
        let wf = workflow_with(vec![failed(20, true), failed(5, true), failed(9, false)]).await;
        let pending = wf.pending_overrides().await.unwrap();
        let days: Vec<_> = pending.iter().map(|t| t.external_id.as_str()).collect();
        assert_eq!(days, vec!["SO-5", "SO-20"]);
        assert_eq!(wf.pending_override_count().await.unwrap(), 2);
    }
}
