//! # Validation Orchestrator
//!
//! Runs the checkers over a transaction in a fixed order and combines
//! their findings into one outcome:
//!
//! ```text
//! (a) customer qualification
//! (b) per-line licence coverage
//! (c) quantity thresholds
//! (d) cross-border permits
//! (e) frequency thresholds
//! ```
//!
//! No step short-circuits another. The outcome is `Passed` iff no step
//! produced a violation. Every run starts from scratch: prior violations,
//! usages and the override decision are discarded first.
//!
//! ## Persistence sequence
//!
//! `create` (first run only) → `clear_violations` → checks → `update` →
//! `add_violations` → `add_licence_usage` → notification.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::Instrument;

use csw_core::{
    CountryCode, CustomerRef, HolderId, HolderType, SubstanceCode, Timestamp, TradeDirection,
    TransactionId, ValidationContext, ValidationStatus,
};
use csw_pack::{Customer, LicenceTypeRegistry, Substance, ThresholdType};
use csw_state::OverrideStateError;

use crate::activities::RequiredActivityTable;
use crate::config::{ConfigError, EngineConfig};
use crate::coverage::{LicenceCoverageMatcher, LineSubstance, ResolvedLine};
use crate::cross_border::CrossBorderPermitChecker;
use crate::error::{StoreError, ValidationError};
use crate::lock::UsageLockRegistry;
use crate::notifier::{dispatch_best_effort, event_types, NotificationEvent};
use crate::override_workflow::OverrideWorkflow;
use crate::period::PeriodWindow;
use crate::ports::Collaborators;
use crate::qualification::CustomerQualificationChecker;
use crate::threshold::{Measure, ThresholdEvaluator};
use crate::transaction::{
    Transaction, TransactionLicenceUsage, TransactionViolation, ValidationOutcome,
};

/// The transaction compliance validation engine.
pub struct ValidationEngine {
    collaborators: Collaborators,
    company: HolderId,
    home_country: CountryCode,
    exempt_countries: Vec<CountryCode>,
    serialize_usage_checks: bool,
    notify_on_pass: bool,
    activities: RequiredActivityTable,
    qualification: CustomerQualificationChecker,
    coverage: LicenceCoverageMatcher,
    cross_border: CrossBorderPermitChecker,
    thresholds: ThresholdEvaluator,
    locks: Arc<UsageLockRegistry>,
    overrides: OverrideWorkflow,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("company", &self.company)
            .field("home_country", &self.home_country)
            .field("serialize_usage_checks", &self.serialize_usage_checks)
            .finish_non_exhaustive()
    }
}

impl ValidationEngine {
    /// Build an engine with the standard licence-type and activity tables.
    pub fn new(config: &EngineConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = LicenceTypeRegistry::standard();
        let exempt_countries = config.exempt_country_codes()?;
        let overrides = OverrideWorkflow::from_collaborators(&collaborators);
        Ok(Self {
            company: config.company_holder()?,
            home_country: config.home_country_code()?,
            serialize_usage_checks: config.serialize_usage_checks,
            notify_on_pass: config.notify_on_pass,
            activities: RequiredActivityTable::standard(),
            qualification: CustomerQualificationChecker,
            coverage: LicenceCoverageMatcher::new(registry.clone()),
            cross_border: CrossBorderPermitChecker::new(registry, exempt_countries.clone()),
            exempt_countries,
            thresholds: ThresholdEvaluator,
            locks: Arc::new(UsageLockRegistry::new()),
            overrides,
            collaborators,
        })
    }

    /// Replace the licence-type strategy table.
    pub fn with_licence_types(mut self, registry: LicenceTypeRegistry) -> Self {
        self.coverage = LicenceCoverageMatcher::new(registry.clone());
        self.cross_border = CrossBorderPermitChecker::new(registry, self.exempt_countries.clone());
        self
    }

    /// Replace the required-activity table.
    pub fn with_required_activities(mut self, table: RequiredActivityTable) -> Self {
        self.activities = table;
        self
    }

    /// Share a lock registry between engines of one process.
    pub fn with_lock_registry(mut self, locks: Arc<UsageLockRegistry>) -> Self {
        self.locks = locks;
        self
    }

    /// The override workflow bound to the same transaction store and notifier.
    pub fn overrides(&self) -> &OverrideWorkflow {
        &self.overrides
    }

    // ─── Entry points ────────────────────────────────────────────────

    /// Validate `transaction`, persist the outcome and notify.
    ///
    /// Collaborator failures propagate; nothing is retried.
    pub async fn validate_transaction(
        &self,
        ctx: &ValidationContext,
        transaction: Transaction,
    ) -> Result<ValidationOutcome, ValidationError> {
        let span = tracing::info_span!(
            "validate_transaction",
            correlation_id = %ctx.correlation_id,
            transaction_id = %transaction.id,
            external_id = %transaction.external_id,
        );
        self.run(ctx, transaction).instrument(span).await
    }

    /// Reload a stored transaction and validate it again from scratch.
    pub async fn revalidate_transaction(
        &self,
        ctx: &ValidationContext,
        id: TransactionId,
    ) -> Result<ValidationOutcome, ValidationError> {
        let transaction = self
            .collaborators
            .transactions
            .get(id)
            .await?
            .ok_or(ValidationError::TransactionNotFound(id))?;
        self.validate_transaction(ctx, transaction).await
    }

    /// Quantity and cumulative-quantity threshold violations of `transaction`.
    ///
    /// Lines must already carry their substance codes. A transaction with
    /// no controlled line yields nothing.
    pub async fn check_quantity_thresholds(
        &self,
        ctx: &ValidationContext,
        transaction: &Transaction,
        customer: Option<&Customer>,
    ) -> Result<Vec<TransactionViolation>, ValidationError> {
        let substances = transaction.substance_codes();
        if substances.is_empty() {
            return Ok(Vec::new());
        }
        let category = customer.map(|c| c.business_category);
        let candidates = self
            .collaborators
            .thresholds
            .get_applicable(&substances, &transaction.customer, category)
            .await?;
        let chosen = self.thresholds.select(
            &candidates,
            &transaction.customer,
            category,
            &substances,
            &[ThresholdType::Quantity, ThresholdType::CumulativeQuantity],
        );

        let mut violations = Vec::new();
        for threshold in chosen {
            let scope = threshold.substance_code.as_ref();
            let window = PeriodWindow::containing(threshold.period, transaction.transaction_date);
            let mut amount = transaction.quantity_of(scope);
            if threshold.threshold_type == ThresholdType::CumulativeQuantity
                && window.aggregates_history()
            {
                let history = self
                    .collaborators
                    .transactions
                    .get_in_period(&transaction.customer, scope, window.start, window.end)
                    .await?;
                amount += self
                    .thresholds
                    .historical_quantity(&history, scope, transaction.id);
            }
            tracing::debug!(
                correlation_id = %ctx.correlation_id,
                threshold_id = %threshold.id,
                amount = %amount,
                "quantity threshold evaluated"
            );
            violations.extend(
                self.thresholds
                    .assess(threshold, amount, &window, Measure::Quantity),
            );
        }
        Ok(violations)
    }

    /// Frequency threshold violations for one more transaction of `customer_ref`
    /// on `date`, counting history in each threshold's window.
    pub async fn check_frequency_thresholds(
        &self,
        ctx: &ValidationContext,
        customer_ref: &CustomerRef,
        customer: Option<&Customer>,
        date: NaiveDate,
        substances: &[SubstanceCode],
        exclude: Option<TransactionId>,
    ) -> Result<Vec<TransactionViolation>, ValidationError> {
        let category = customer.map(|c| c.business_category);
        let candidates = self
            .collaborators
            .thresholds
            .get_applicable(substances, customer_ref, category)
            .await?;
        let chosen = self.thresholds.select(
            &candidates,
            customer_ref,
            category,
            substances,
            &[ThresholdType::Frequency],
        );

        let mut violations = Vec::new();
        for threshold in chosen {
            let window = PeriodWindow::containing(threshold.period, date);
            let past = if window.aggregates_history() {
                let history = self
                    .collaborators
                    .transactions
                    .get_in_period(
                        customer_ref,
                        threshold.substance_code.as_ref(),
                        window.start,
                        window.end,
                    )
                    .await?;
                self.thresholds.historical_count(&history, exclude)
            } else {
                0
            };
            let count = Decimal::from(past + 1);
            tracing::debug!(
                correlation_id = %ctx.correlation_id,
                threshold_id = %threshold.id,
                count = %count,
                "frequency threshold evaluated"
            );
            violations.extend(
                self.thresholds
                    .assess(threshold, count, &window, Measure::Frequency),
            );
        }
        Ok(violations)
    }

    // ─── Pipeline ────────────────────────────────────────────────────

    async fn run(
        &self,
        ctx: &ValidationContext,
        mut transaction: Transaction,
    ) -> Result<ValidationOutcome, ValidationError> {
        let guard = if self.serialize_usage_checks {
            Some(self.locks.acquire(&transaction.customer).await)
        } else {
            None
        };

        let store = &self.collaborators.transactions;
        transaction.reset_outcome();
        if store.get(transaction.id).await?.is_none() {
            store.create(&transaction).await?;
        }
        store.clear_violations(transaction.id).await?;

        let customer = self
            .collaborators
            .customers
            .get_by_account(
                &transaction.customer.account,
                &transaction.customer.data_area_id,
            )
            .await?;
        let date = transaction.transaction_date;
        let mut violations = Vec::new();

        // (a)
        violations.extend(
            self.qualification
                .check(&transaction.customer, customer.as_ref()),
        );

        // (b)
        let resolved = self.resolve_lines(&mut transaction).await?;
        let company_licences = self
            .collaborators
            .licences
            .get_by_holder(&self.company, HolderType::Company)
            .await?;
        let mut licences = if customer.is_some() {
            self.collaborators
                .licences
                .get_by_holder(&transaction.customer.holder_id(), HolderType::Customer)
                .await?
        } else {
            Vec::new()
        };
        licences.extend(company_licences.iter().cloned());

        let direction = TradeDirection::between(
            &transaction.origin_country,
            &transaction.destination_country,
            &self.home_country,
        );
        let required = self
            .activities
            .required_for(transaction.transaction_type, direction);
        tracing::debug!(%direction, required = %required.describe(), "required activities");

        let coverage =
            self.coverage
                .check_lines(transaction.id, &resolved, required, &licences, date);
        for (line_number, licence_id) in &coverage.covered_lines {
            if let Some(line) = transaction
                .lines
                .iter_mut()
                .find(|l| l.line_number == *line_number)
            {
                line.licence_id = Some(*licence_id);
            }
        }
        violations.extend(coverage.violations);

        // (c)
        violations.extend(
            self.check_quantity_thresholds(ctx, &transaction, customer.as_ref())
                .await?,
        );

        // (d)
        violations.extend(self.cross_border.check(
            direction,
            &transaction.origin_country,
            &transaction.destination_country,
            &company_licences,
            date,
        ));

        // (e)
        let substances = transaction.substance_codes();
        if !substances.is_empty() {
            violations.extend(
                self.check_frequency_thresholds(
                    ctx,
                    &transaction.customer,
                    customer.as_ref(),
                    date,
                    &substances,
                    Some(transaction.id),
                )
                .await?,
            );
        }

        apply_outcome(&mut transaction, violations, coverage.usages)?;

        store.update(&transaction).await?;
        store
            .add_violations(transaction.id, &transaction.violations)
            .await?;
        store
            .add_licence_usage(transaction.id, &transaction.licence_usages)
            .await?;
        drop(guard);

        tracing::info!(
            status = %transaction.validation_status,
            violations = transaction.violations.len(),
            requires_override = transaction.requires_override,
            "transaction validated"
        );

        self.notify(ctx, &transaction).await;
        Ok(ValidationOutcome::of(&transaction))
    }

    async fn resolve_lines(
        &self,
        transaction: &mut Transaction,
    ) -> Result<Vec<ResolvedLine>, StoreError> {
        let mut known: HashMap<SubstanceCode, Option<Substance>> = HashMap::new();
        let mut resolved = Vec::with_capacity(transaction.lines.len());

        for line in &mut transaction.lines {
            if line.substance_code.is_none() {
                line.substance_code = self
                    .collaborators
                    .products
                    .resolve_substance_code(&line.item)
                    .await?;
            }
            let substance = match &line.substance_code {
                None => LineSubstance::Uncontrolled,
                Some(code) => {
                    if !known.contains_key(code) {
                        let found = self
                            .collaborators
                            .substances
                            .get_by_substance_code(code)
                            .await?;
                        known.insert(code.clone(), found);
                    }
                    match known.get(code).cloned().flatten() {
                        Some(substance) => LineSubstance::Known(substance),
                        None => LineSubstance::Unknown(code.clone()),
                    }
                }
            };
            resolved.push(ResolvedLine {
                line_number: line.line_number,
                quantity: line.quantity,
                substance,
            });
        }
        Ok(resolved)
    }

    async fn notify(&self, ctx: &ValidationContext, transaction: &Transaction) {
        let event_type = if transaction.validation_status == ValidationStatus::Passed {
            if !self.notify_on_pass {
                return;
            }
            event_types::TRANSACTION_PASSED
        } else if transaction.requires_override {
            event_types::TRANSACTION_OVERRIDE_REQUIRED
        } else {
            return;
        };
        let event = NotificationEvent::for_transaction(event_type, transaction, ctx);
        dispatch_best_effort(self.collaborators.notifier.as_ref(), event).await;
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// Whether `violations` route a transaction to a human decision: at least
/// one violation, and every one of them overridable.
pub fn requires_override(violations: &[TransactionViolation]) -> bool {
    !violations.is_empty() && violations.iter().all(|v| v.can_override)
}

/// Write the combined findings onto `transaction`.
pub(crate) fn apply_outcome(
    transaction: &mut Transaction,
    violations: Vec<TransactionViolation>,
    usages: Vec<TransactionLicenceUsage>,
) -> Result<(), OverrideStateError> {
    for violation in violations.iter().filter(|v| v.is_blocking()) {
        let Some(line_number) = violation.line_number else {
            continue;
        };
        if let Some(line) = transaction
            .lines
            .iter_mut()
            .find(|l| l.line_number == line_number && l.error_code.is_none())
        {
            line.error_code = Some(violation.code);
            line.error_message = Some(violation.message.clone());
        }
    }

    transaction.validation_status = if violations.is_empty() {
        ValidationStatus::Passed
    } else {
        ValidationStatus::Failed
    };
    transaction.requires_override = requires_override(&violations);
    if transaction.requires_override {
        transaction
            .override_decision
            .request("validation failed with overridable violations")?;
    }
    transaction.violations = violations;
    transaction.licence_usages = usages;
    transaction.validated_at = Some(Timestamp::now());
    Ok(())
}
