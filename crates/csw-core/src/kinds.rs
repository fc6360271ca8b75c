//! # Closed Enumerations
//!
//! Transaction types, violation severities and validation statuses. Each
//! has one string form, shared by `as_str()`, `Display`, `FromStr` and serde,
//! so values stored by one component parse identically in another.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CswError;

// ─── Transaction type ────────────────────────────────────────────────

/// Kind of commercial movement being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Customer sales order.
    Order,
    /// Outbound shipment.
    Shipment,
    /// Goods returned by the customer.
    Return,
    /// Movement between the company's own locations.
    Transfer,
}

impl TransactionType {
    /// Every transaction type, in declaration order.
    pub fn all() -> &'static [TransactionType] {
        &[Self::Order, Self::Shipment, Self::Return, Self::Transfer]
    }

    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Shipment => "shipment",
            Self::Return => "return",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = CswError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "shipment" => Ok(Self::Shipment),
            "return" => Ok(Self::Return),
            "transfer" => Ok(Self::Transfer),
            other => Err(CswError::unknown("transaction type", other)),
        }
    }
}

// ─── Severity ────────────────────────────────────────────────────────

/// Severity of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; always overridable.
    Warning,
    /// Blocks the transaction unless overridden (when overridable).
    Error,
}

impl Severity {
    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CswError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(CswError::unknown("severity", other)),
        }
    }
}

// ─── Validation status ───────────────────────────────────────────────

/// Outcome of the most recent validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Not yet validated, or validation in progress.
    #[default]
    Pending,
    /// No violations.
    Passed,
    /// One or more violations.
    Failed,
}

impl ValidationStatus {
    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = CswError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            other => Err(CswError::unknown("validation status", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_string_forms_agree() {
        for t in TransactionType::all() {
            let parsed: TransactionType = t.as_str().parse().unwrap();
            assert_eq!(*t, parsed);
            assert_eq!(serde_json::to_string(t).unwrap(), format!("\"{}\"", t.as_str()));
            assert_eq!(t.to_string(), t.as_str());
        }
    }

    #[test]
    fn unknown_strings_rejected() {
        assert!("Order".parse::<TransactionType>().is_err());
        assert!("fatal".parse::<Severity>().is_err());
        assert!("".parse::<ValidationStatus>().is_err());
    }

    #[test]
    fn severity_orders_warning_below_error() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn validation_status_defaults_to_pending() {
        assert_eq!(ValidationStatus::default(), ValidationStatus::Pending);
        assert_eq!("failed".parse::<ValidationStatus>().unwrap(), ValidationStatus::Failed);
    }
}
