//! # Transaction Model
//!
//! A [`Transaction`] is created by the caller and mutated only by the
//! orchestrator (validation outcome) and the override workflow (decision
//! fields). Violations and licence-usage records hang off the transaction
//! and are replaced wholesale on every validation run.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use csw_core::{
    CountryCode, CustomerRef, ItemRef, LicenceId, Severity, SubstanceCode, ThresholdId, Timestamp,
    TransactionId, TransactionType, ValidationStatus,
};
use csw_pack::ThresholdPeriod;
use csw_state::{OverrideDecision, OverrideStatus};

// ─── Violation codes ─────────────────────────────────────────────────

/// Stable code of a violation, suitable for display and API mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// The customer account is unknown.
    CustomerNotFound,
    /// The customer is suspended.
    CustomerSuspended,
    /// The customer has not been approved.
    CustomerNotApproved,
    /// The customer's category requires GDP qualification it lacks.
    CustomerGdpNotQualified,
    /// The line's substance is not in the substance registry.
    SubstanceNotFound,
    /// No licence covers the line.
    LicenceMissing,
    /// The best matching licence has expired.
    LicenceExpired,
    /// The best matching licence is suspended.
    LicenceSuspended,
    /// A quantity threshold is reached or exceeded.
    ThresholdExceeded,
    /// A quantity threshold's warning level is reached.
    ThresholdWarning,
    /// A frequency threshold is reached or exceeded.
    FrequencyExceeded,
    /// An import permit is missing.
    ImportPermitRequired,
    /// An export permit is missing.
    ExportPermitRequired,
}

impl ViolationCode {
    /// The stable SCREAMING_SNAKE_CASE code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            Self::CustomerSuspended => "CUSTOMER_SUSPENDED",
            Self::CustomerNotApproved => "CUSTOMER_NOT_APPROVED",
            Self::CustomerGdpNotQualified => "CUSTOMER_GDP_NOT_QUALIFIED",
            Self::SubstanceNotFound => "SUBSTANCE_NOT_FOUND",
            Self::LicenceMissing => "LICENCE_MISSING",
            Self::LicenceExpired => "LICENCE_EXPIRED",
            Self::LicenceSuspended => "LICENCE_SUSPENDED",
            Self::ThresholdExceeded => "THRESHOLD_EXCEEDED",
            Self::ThresholdWarning => "THRESHOLD_WARNING",
            Self::FrequencyExceeded => "FREQUENCY_EXCEEDED",
            Self::ImportPermitRequired => "IMPORT_PERMIT_REQUIRED",
            Self::ExportPermitRequired => "EXPORT_PERMIT_REQUIRED",
        }
    }
}

impl std::fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Violations ──────────────────────────────────────────────────────

/// Numbers behind a threshold violation, so a UI can render
/// "X exceeds limit of Y for period Z" without re-deriving them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdDetail {
    /// Quantity or transaction count that was compared.
    pub amount: Decimal,
    /// Configured limit.
    pub limit: Decimal,
    /// Unit of `amount` and `limit`.
    pub unit: String,
    /// `amount / limit * 100`, rounded to two decimals.
    pub percentage: Decimal,
    /// Aggregation period.
    pub period: ThresholdPeriod,
    /// First day of the aggregation window.
    pub window_start: NaiveDate,
    /// Last day of the aggregation window.
    pub window_end: NaiveDate,
}

/// One finding of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionViolation {
    /// Stable code.
    pub code: ViolationCode,
    /// Error blocks; Warning is informational.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Whether the override workflow may clear this violation.
    pub can_override: bool,
    /// Line the violation concerns, if any.
    #[serde(default)]
    pub line_number: Option<u32>,
    /// Substance the violation concerns, if any.
    #[serde(default)]
    pub substance_code: Option<SubstanceCode>,
    /// Licence the violation concerns, if any.
    #[serde(default)]
    pub licence_id: Option<LicenceId>,
    /// Threshold the violation concerns, if any.
    #[serde(default)]
    pub threshold_id: Option<ThresholdId>,
    /// Computed numbers for threshold violations.
    #[serde(default)]
    pub threshold: Option<ThresholdDetail>,
}

impl TransactionViolation {
    /// An Error-severity violation.
    pub fn error(code: ViolationCode, message: impl Into<String>, can_override: bool) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            can_override,
            line_number: None,
            substance_code: None,
            licence_id: None,
            threshold_id: None,
            threshold: None,
        }
    }

    /// A Warning-severity violation; warnings are always overridable.
    pub fn warning(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, true)
        }
    }

    /// Attach a line number.
    pub fn on_line(mut self, line_number: u32) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Attach a substance code.
    pub fn for_substance(mut self, code: SubstanceCode) -> Self {
        self.substance_code = Some(code);
        self
    }

    /// Attach a licence reference.
    pub fn with_licence(mut self, id: LicenceId) -> Self {
        self.licence_id = Some(id);
        self
    }

    /// Attach a threshold reference and its computed numbers.
    pub fn with_threshold(mut self, id: ThresholdId, detail: ThresholdDetail) -> Self {
        self.threshold_id = Some(id);
        self.threshold = Some(detail);
        self
    }

    /// Whether the violation blocks the transaction until overridden.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ─── Licence usage ───────────────────────────────────────────────────

/// Lines of one transaction covered by one licence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLicenceUsage {
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Covering licence.
    pub licence_id: LicenceId,
    /// Licence number, for display.
    pub licence_number: String,
    /// Covered line numbers, ascending.
    pub line_numbers: Vec<u32>,
    /// Sum of the covered lines' base-unit quantities.
    pub total_quantity: Decimal,
}

// ─── Transaction ─────────────────────────────────────────────────────

/// One line of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Line number, unique within the transaction.
    pub line_number: u32,
    /// Ordered item.
    pub item: ItemRef,
    /// Controlled substance of the item, resolved once and cached.
    #[serde(default)]
    pub substance_code: Option<SubstanceCode>,
    /// Quantity in the substance's base unit.
    pub quantity: Decimal,
    /// Code of the first Error-severity violation on this line.
    #[serde(default)]
    pub error_code: Option<ViolationCode>,
    /// Message of the first Error-severity violation on this line.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Covering licence, set only for covered lines.
    #[serde(default)]
    pub licence_id: Option<LicenceId>,
}

impl TransactionLine {
    /// A line whose substance has not been resolved yet.
    pub fn new(line_number: u32, item: ItemRef, quantity: Decimal) -> Self {
        Self {
            line_number,
            item,
            substance_code: None,
            quantity,
            error_code: None,
            error_message: None,
            licence_id: None,
        }
    }

    /// Pre-set the substance code, skipping product-registry resolution.
    pub fn with_substance(mut self, code: SubstanceCode) -> Self {
        self.substance_code = Some(code);
        self
    }

    fn clear_outcome(&mut self) {
        self.error_code = None;
        self.error_message = None;
        self.licence_id = None;
    }
}

/// A proposed commercial transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier.
    pub id: TransactionId,
    /// Identifier in the originating ERP.
    pub external_id: String,
    /// Counterparty.
    pub customer: CustomerRef,
    /// Kind of transaction.
    pub transaction_type: TransactionType,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Country goods leave from.
    pub origin_country: CountryCode,
    /// Country goods arrive in.
    pub destination_country: CountryCode,
    /// Ordered lines.
    pub lines: Vec<TransactionLine>,
    /// Outcome of the last validation.
    #[serde(default)]
    pub validation_status: ValidationStatus,
    /// Whether the last validation routed the transaction to a human decision.
    #[serde(default)]
    pub requires_override: bool,
    /// Override decision.
    #[serde(default, rename = "override")]
    pub override_decision: OverrideDecision,
    /// Violations of the last validation.
    #[serde(default)]
    pub violations: Vec<TransactionViolation>,
    /// Licence-usage records of the last validation.
    #[serde(default)]
    pub licence_usages: Vec<TransactionLicenceUsage>,
    /// When the last validation completed.
    #[serde(default)]
    pub validated_at: Option<Timestamp>,
}

impl Transaction {
    /// A new, unvalidated transaction.
    pub fn new(
        external_id: impl Into<String>,
        customer: CustomerRef,
        transaction_type: TransactionType,
        transaction_date: NaiveDate,
        origin_country: CountryCode,
        destination_country: CountryCode,
        lines: Vec<TransactionLine>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            external_id: external_id.into(),
            customer,
            transaction_type,
            transaction_date,
            origin_country,
            destination_country,
            lines,
            validation_status: ValidationStatus::Pending,
            requires_override: false,
            override_decision: OverrideDecision::new(),
            violations: Vec::new(),
            licence_usages: Vec::new(),
            validated_at: None,
        }
    }

    /// Whether the transaction may proceed: passed, or overridden.
    pub fn may_proceed(&self) -> bool {
        self.validation_status == ValidationStatus::Passed
            || self.override_decision.status == OverrideStatus::Approved
    }

    /// Distinct substance codes on the lines, sorted.
    pub fn substance_codes(&self) -> Vec<SubstanceCode> {
        self.lines
            .iter()
            .filter_map(|l| l.substance_code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether any line carries a controlled substance.
    pub fn has_controlled_lines(&self) -> bool {
        self.lines.iter().any(|l| l.substance_code.is_some())
    }

    /// Quantity of `substance` on this transaction, or of every controlled
    /// line when `substance` is `None`.
    pub fn quantity_of(&self, substance: Option<&SubstanceCode>) -> Decimal {
        self.lines
            .iter()
            .filter(|l| match (substance, &l.substance_code) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(wanted), Some(code)) => wanted == code,
            })
            .map(|l| l.quantity)
            .sum()
    }

    /// Whether any line carries `substance`.
    pub fn contains_substance(&self, substance: &SubstanceCode) -> bool {
        self.lines
            .iter()
            .any(|l| l.substance_code.as_ref() == Some(substance))
    }

    /// Discard the outcome of any previous run ahead of re-validation.
    pub(crate) fn reset_outcome(&mut self) {
        self.validation_status = ValidationStatus::Pending;
        self.requires_override = false;
        self.override_decision.reset("re-validation");
        self.violations.clear();
        self.licence_usages.clear();
        self.validated_at = None;
        for line in &mut self.lines {
            line.clear_outcome();
        }
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// Result of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Validated transaction.
    pub transaction_id: TransactionId,
    /// `Passed` iff `violations` is empty.
    pub status: ValidationStatus,
    /// Every violation from every step, in step order.
    pub violations: Vec<TransactionViolation>,
    /// One record per covering licence.
    pub licence_usages: Vec<TransactionLicenceUsage>,
    /// Whether a human override decision is now pending.
    pub requires_override: bool,
}

impl ValidationOutcome {
    /// Snapshot the outcome fields of a validated transaction.
    pub fn of(transaction: &Transaction) -> Self {
        Self {
            transaction_id: transaction.id,
            status: transaction.validation_status,
            violations: transaction.violations.clone(),
            licence_usages: transaction.licence_usages.clone(),
            requires_override: transaction.requires_override,
        }
    }

    /// Whether validation passed.
    pub fn is_passed(&self) -> bool {
        self.status == ValidationStatus::Passed
    }

    /// Whether any violation carries `code`.
    pub fn has(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }
}
