//! # Licence Coverage Matching
//!
//! A licence covers a line when its permitted activities are a superset of
//! the line's required activities AND its licence type covers the line's
//! substance. The search runs in two passes:
//!
//! 1. Usable licences only (status `Valid`, not expired on the transaction
//!    date). The best fit covers the line.
//! 2. If nothing matched, every licence regardless of status, so the
//!    violation can say *why* (suspended, expired) instead of "missing".
//!
//! ## Best fit
//!
//! Among matches: customer-held before company-held, specific coverage
//! before blanket coverage, open-ended before dated, later expiry before
//! earlier, then lowest licence id.

use std::cmp::Reverse;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use csw_core::{ActivitySet, HolderType, LicenceId, SubstanceCode, TransactionId};
use csw_pack::{Licence, LicenceTypeRegistry, Substance};

use crate::transaction::{TransactionLicenceUsage, TransactionViolation, ViolationCode};

// ─── Inputs ──────────────────────────────────────────────────────────

/// What a line's item resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSubstance {
    /// Not a controlled product; skipped by coverage and thresholds.
    Uncontrolled,
    /// A substance code absent from the substance registry.
    Unknown(SubstanceCode),
    /// A registered substance.
    Known(Substance),
}

/// A transaction line after substance resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// Line number.
    pub line_number: u32,
    /// Base-unit quantity.
    pub quantity: Decimal,
    /// Resolution result.
    pub substance: LineSubstance,
}

// ─── Outputs ─────────────────────────────────────────────────────────

/// Result of the licence search for one substance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageMatch<'a> {
    /// A usable licence covers the line.
    Covered(&'a Licence),
    /// The best match is suspended.
    Suspended(&'a Licence),
    /// The best match has expired.
    Expired(&'a Licence),
    /// No licence matches activities and substance.
    Missing,
}

/// Coverage result for a whole transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Per-line violations, in line order.
    pub violations: Vec<TransactionViolation>,
    /// One record per covering licence, in order of first covered line.
    pub usages: Vec<TransactionLicenceUsage>,
    /// `(line_number, licence)` for every covered line.
    pub covered_lines: Vec<(u32, LicenceId)>,
}

// ─── Matcher ─────────────────────────────────────────────────────────

/// Finds covering licences using the licence-type strategy table.
#[derive(Debug, Clone)]
pub struct LicenceCoverageMatcher {
    registry: LicenceTypeRegistry,
}

impl LicenceCoverageMatcher {
    pub fn new(registry: LicenceTypeRegistry) -> Self {
        Self { registry }
    }

    /// The licence-type strategy table in use.
    pub fn registry(&self) -> &LicenceTypeRegistry {
        &self.registry
    }

    /// Whether `licence` permits `required` for `substance`, ignoring status.
    pub fn matches(&self, licence: &Licence, substance: &Substance, required: ActivitySet) -> bool {
        licence.permitted_activities.covers(required) && self.registry.covers(licence, substance)
    }

    /// Best-fit licence for `substance` among `licences` on `date`.
    pub fn find_best_fit<'a>(
        &self,
        substance: &Substance,
        required: ActivitySet,
        licences: &'a [Licence],
        date: NaiveDate,
    ) -> CoverageMatch<'a> {
        let matching: Vec<&Licence> = licences
            .iter()
            .filter(|l| self.matches(l, substance, required))
            .collect();

        if let Some(best) = self.best(matching.iter().copied().filter(|l| l.is_usable_on(date))) {
            return CoverageMatch::Covered(best);
        }
        if let Some(suspended) = self.best(matching.iter().copied().filter(|l| l.is_suspended())) {
            return CoverageMatch::Suspended(suspended);
        }
        match self.best(matching.into_iter()) {
            Some(expired) => CoverageMatch::Expired(expired),
            None => CoverageMatch::Missing,
        }
    }

    /// Match every controlled line and bundle usage per covering licence.
    pub fn check_lines(
        &self,
        transaction_id: TransactionId,
        lines: &[ResolvedLine],
        required: ActivitySet,
        licences: &[Licence],
        date: NaiveDate,
    ) -> CoverageReport {
        let mut report = CoverageReport::default();

        for line in lines {
            let substance = match &line.substance {
                LineSubstance::Uncontrolled => continue,
                LineSubstance::Unknown(code) => {
                    report.violations.push(
                        TransactionViolation::error(
                            ViolationCode::SubstanceNotFound,
                            format!("Substance {code} is not in the substance registry"),
                            false,
                        )
                        .on_line(line.line_number)
                        .for_substance(code.clone()),
                    );
                    continue;
                }
                LineSubstance::Known(substance) => substance,
            };

            match self.find_best_fit(substance, required, licences, date) {
                CoverageMatch::Covered(licence) => {
                    tracing::debug!(
                        line = line.line_number,
                        substance = %substance.code,
                        licence_id = %licence.id,
                        "line covered"
                    );
                    report.covered_lines.push((line.line_number, licence.id));
                    Self::record_usage(&mut report.usages, transaction_id, licence, line);
                }
                CoverageMatch::Suspended(licence) => report.violations.push(
                    TransactionViolation::error(
                        ViolationCode::LicenceSuspended,
                        format!(
                            "Licence {} covering {} is suspended",
                            licence.licence_number, substance.name
                        ),
                        false,
                    )
                    .on_line(line.line_number)
                    .for_substance(substance.code.clone())
                    .with_licence(licence.id),
                ),
                CoverageMatch::Expired(licence) => report.violations.push(
                    TransactionViolation::error(
                        ViolationCode::LicenceExpired,
                        format!(
                            "Licence {} covering {} has expired",
                            licence.licence_number, substance.name
                        ),
                        true,
                    )
                    .on_line(line.line_number)
                    .for_substance(substance.code.clone())
                    .with_licence(licence.id),
                ),
                CoverageMatch::Missing => report.violations.push(
                    TransactionViolation::error(
                        ViolationCode::LicenceMissing,
                        format!(
                            "No licence permits {} for {}",
                            required.describe(),
                            substance.name
                        ),
                        true,
                    )
                    .on_line(line.line_number)
                    .for_substance(substance.code.clone()),
                ),
            }
        }

        report
    }

    fn best<'a>(&self, candidates: impl Iterator<Item = &'a Licence>) -> Option<&'a Licence> {
        candidates.min_by_key(|l| self.fit_key(l))
    }

    fn fit_key(&self, licence: &Licence) -> (u8, Reverse<u8>, Reverse<NaiveDate>, LicenceId) {
        let holder_rank = match licence.holder_type {
            HolderType::Customer => 0,
            HolderType::Company => 1,
        };
        (
            holder_rank,
            Reverse(self.registry.coverage_of(licence).specificity()),
            Reverse(licence.expires_on.unwrap_or(NaiveDate::MAX)),
            licence.id,
        )
    }

    fn record_usage(
        usages: &mut Vec<TransactionLicenceUsage>,
        transaction_id: TransactionId,
        licence: &Licence,
        line: &ResolvedLine,
    ) {
        match usages.iter_mut().find(|u| u.licence_id == licence.id) {
            Some(usage) => {
                usage.line_numbers.push(line.line_number);
                usage.total_quantity += line.quantity;
            }
            None => usages.push(TransactionLicenceUsage {
                transaction_id,
                licence_id: licence.id,
                licence_number: licence.licence_number.clone(),
                line_numbers: vec![line.line_number],
                total_quantity: line.quantity,
            }),
        }
    }
}

impl Default for LicenceCoverageMatcher {
    fn default() -> Self {
        Self::new(LicenceTypeRegistry::standard())
    }
}
