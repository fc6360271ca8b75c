//! # Threshold Evaluation
//!
//! Pure parts of threshold checking: choosing the most specific threshold
//! per `(type, substance scope)`, aggregating history, and comparing an
//! amount against a limit. The engine supplies history from the
//! transaction store (see `orchestrator.rs`).
//!
//! ## Comparison
//!
//! ```text
//! percentage = amount / limit * 100
//! amount >= limit                          → exceeded (Error)
//! percentage >= warning_percentage         → warning (quantity only)
//! exceeded overridable iff allow_override
//!     and (no ceiling or amount <= limit * max_override_percentage / 100)
//! ```

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rust_decimal::Decimal;

use csw_core::{CustomerRef, SubstanceCode, TransactionId};
use csw_pack::{BusinessCategory, Threshold, ThresholdType};

use crate::period::PeriodWindow;
use crate::transaction::{ThresholdDetail, Transaction, TransactionViolation, ViolationCode};

/// What is being compared against a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// A base-unit quantity; has a warning tier.
    Quantity,
    /// A transaction count; no warning tier.
    Frequency,
}

/// Stateless threshold logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    /// Most specific applicable threshold of each `(type, substance scope)`
    /// among `candidates`, restricted to `types`.
    ///
    /// A substance-scoped threshold applies only if its substance is in
    /// `substances`; global thresholds always apply. Global and
    /// substance-scoped thresholds sit in different groups and never
    /// compete: both are selected and both are enforced, so a global limit
    /// caps the total while a substance limit caps its own lines.
    /// Specificity ranks only within a group (customer > category > none);
    /// ties go to the lowest threshold id. The result is ordered by type,
    /// then substance scope (global first).
    pub fn select<'a>(
        &self,
        candidates: &'a [Threshold],
        customer: &CustomerRef,
        category: Option<BusinessCategory>,
        substances: &[SubstanceCode],
        types: &[ThresholdType],
    ) -> Vec<&'a Threshold> {
        let mut best: BTreeMap<(ThresholdType, Option<SubstanceCode>), &'a Threshold> =
            BTreeMap::new();

        let applicable = candidates.iter().filter(|t| {
            types.contains(&t.threshold_type)
                && t.applies_to(customer, category)
                && t.substance_code
                    .as_ref()
                    .map_or(true, |code| substances.contains(code))
        });

        for threshold in applicable {
            let key = (threshold.threshold_type, threshold.substance_code.clone());
            match best.get(&key) {
                Some(current)
                    if (current.specificity(), Reverse(current.id))
                        >= (threshold.specificity(), Reverse(threshold.id)) => {}
                _ => {
                    best.insert(key, threshold);
                }
            }
        }

        best.into_values().collect()
    }

    /// Quantity of `substance` (or every controlled line) on `history`,
    /// skipping the transaction under validation.
    pub fn historical_quantity(
        &self,
        history: &[Transaction],
        substance: Option<&SubstanceCode>,
        exclude: TransactionId,
    ) -> Decimal {
        history
            .iter()
            .filter(|t| t.id != exclude)
            .map(|t| t.quantity_of(substance))
            .sum()
    }

    /// Number of transactions in `history`, skipping the one under validation.
    pub fn historical_count(&self, history: &[Transaction], exclude: Option<TransactionId>) -> usize {
        history
            .iter()
            .filter(|t| Some(t.id) != exclude)
            .count()
    }

    /// Compare `amount` against `threshold`; `None` when below every tier.
    pub fn assess(
        &self,
        threshold: &Threshold,
        amount: Decimal,
        window: &PeriodWindow,
        measure: Measure,
    ) -> Option<TransactionViolation> {
        let limit = threshold.limit_value;
        if limit <= Decimal::ZERO {
            tracing::warn!(
                threshold_id = %threshold.id,
                limit = %limit,
                "threshold with non-positive limit skipped"
            );
            return None;
        }

        let Some(exact) = amount
            .checked_div(limit)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        else {
            tracing::warn!(
                threshold_id = %threshold.id,
                amount = %amount,
                limit = %limit,
                "threshold percentage overflowed, threshold skipped"
            );
            return None;
        };
        // Tiers compare the exact value; only the reported figure is rounded.
        let percentage = exact.round_dp(2);

        tracing::debug!(
            threshold_id = %threshold.id,
            amount = %amount,
            limit = %limit,
            percentage = %percentage,
            window_start = %window.start,
            window_end = %window.end,
            "threshold assessed"
        );

        let detail = ThresholdDetail {
            amount,
            limit,
            unit: threshold.limit_unit.clone(),
            percentage,
            period: threshold.period,
            window_start: window.start,
            window_end: window.end,
        };
        let scope = threshold
            .substance_code
            .as_ref()
            .map_or_else(|| "all substances".to_string(), |c| c.to_string());

        let violation = if amount >= limit {
            let can_override = threshold.allow_override
                && threshold
                    .override_ceiling()
                    .map_or(true, |ceiling| amount <= ceiling);
            let code = match measure {
                Measure::Quantity => ViolationCode::ThresholdExceeded,
                Measure::Frequency => ViolationCode::FrequencyExceeded,
            };
            TransactionViolation::error(
                code,
                format!(
                    "{}: {amount} {unit} for {scope} reaches limit of {limit} {unit} ({percentage}%) for period {period} {start}..{end}",
                    threshold.name,
                    unit = threshold.limit_unit,
                    period = threshold.period,
                    start = window.start,
                    end = window.end,
                ),
                can_override,
            )
        } else {
            match (measure, threshold.warning_percentage) {
                (Measure::Quantity, Some(warning)) if exact >= warning => {
                    TransactionViolation::warning(
                        ViolationCode::ThresholdWarning,
                        format!(
                            "{}: {amount} {unit} for {scope} is at {percentage}% of limit {limit} {unit} for period {period}",
                            threshold.name,
                            unit = threshold.limit_unit,
                            period = threshold.period,
                        ),
                    )
                }
                _ => return None,
            }
        };

        let violation = violation.with_threshold(threshold.id, detail);
        Some(match &threshold.substance_code {
            Some(code) => violation.for_substance(code.clone()),
            None => violation,
        })
    }
}
