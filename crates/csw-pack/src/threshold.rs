//! # Thresholds
//!
//! Quantity and frequency limits configured by the compliance department.
//! A threshold is scoped by substance (or global), and optionally narrowed
//! to one customer or one business category. When several thresholds of
//! the same type apply to the same substance scope, the most specific one
//! is used:
//!
//! ```text
//! customer-specific (3) > category-specific (2) > substance-specific (1) > global (0)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use csw_core::{CustomerRef, SubstanceCode, ThresholdId};

use crate::customer::BusinessCategory;

/// What a threshold limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdType {
    /// Quantity in the current transaction.
    Quantity,
    /// Quantity in the current transaction plus history over the period.
    CumulativeQuantity,
    /// Number of transactions over the period.
    Frequency,
}

impl ThresholdType {
    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::CumulativeQuantity => "cumulative_quantity",
            Self::Frequency => "frequency",
        }
    }
}

impl std::fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation period of a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPeriod {
    /// The transaction alone.
    PerTransaction,
    /// Calendar day.
    Daily,
    /// ISO week, Monday to Sunday.
    Weekly,
    /// Calendar month.
    Monthly,
    /// Calendar year.
    Yearly,
}

impl ThresholdPeriod {
    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerTransaction => "per_transaction",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for ThresholdPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    /// Identifier.
    pub id: ThresholdId,
    /// Display name.
    pub name: String,
    /// What is limited.
    pub threshold_type: ThresholdType,
    /// Substance scope; `None` is a global threshold over all substances.
    #[serde(default)]
    pub substance_code: Option<SubstanceCode>,
    /// Narrows the threshold to one customer.
    #[serde(default)]
    pub customer_ref: Option<CustomerRef>,
    /// Narrows the threshold to one business category.
    #[serde(default)]
    pub customer_category: Option<BusinessCategory>,
    /// Aggregation period.
    pub period: ThresholdPeriod,
    /// Limit value (base-unit quantity, or transaction count).
    pub limit_value: Decimal,
    /// Unit of `limit_value`, for display.
    pub limit_unit: String,
    /// Percentage of the limit at which a warning is raised.
    #[serde(default)]
    pub warning_percentage: Option<Decimal>,
    /// Whether exceeding the limit may be overridden.
    #[serde(default)]
    pub allow_override: bool,
    /// Highest percentage of the limit that may still be overridden.
    #[serde(default)]
    pub max_override_percentage: Option<Decimal>,
    /// Inactive thresholds are ignored.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Threshold {
    /// Rank used to pick the most specific threshold of a group.
    pub fn specificity(&self) -> u8 {
        if self.customer_ref.is_some() {
            3
        } else if self.customer_category.is_some() {
            2
        } else if self.substance_code.is_some() {
            1
        } else {
            0
        }
    }

    /// Whether the customer/category narrowing admits this customer.
    pub fn applies_to(&self, customer: &CustomerRef, category: Option<BusinessCategory>) -> bool {
        let customer_ok = self
            .customer_ref
            .as_ref()
            .map_or(true, |scoped| scoped == customer);
        let category_ok = match self.customer_category {
            None => true,
            Some(scoped) => category == Some(scoped),
        };
        self.is_active && customer_ok && category_ok
    }

    /// Whether the threshold's substance scope admits `substance`.
    pub fn covers_substance(&self, substance: &SubstanceCode) -> bool {
        self.substance_code
            .as_ref()
            .map_or(true, |scoped| scoped == substance)
    }

    /// Highest amount still eligible for override, if any ceiling applies.
    pub fn override_ceiling(&self) -> Option<Decimal> {
        self.max_override_percentage
            .map(|pct| self.limit_value * pct / Decimal::ONE_HUNDRED)
    }
}
