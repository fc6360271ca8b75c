//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every identifier the engine handles. A
//! `LicenceId` cannot be passed where a `ThresholdId` is expected, and a
//! substance code cannot be confused with a holder id.
//!
//! String identifiers reject empty or whitespace-only input at
//! construction. Deserialized values are trusted as-is; they come from the
//! reference-data stores, which validate on write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CswError;

/// Unique identifier for a commercial transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub Uuid);

/// Unique identifier for a licence or permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenceId(pub Uuid);

/// Unique identifier for a configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdId(pub Uuid);

impl TransactionId {
    /// Generate a new random transaction identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl LicenceId {
    /// Generate a new random licence identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl ThresholdId {
    /// Generate a new random threshold identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for LicenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ThresholdId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

impl std::fmt::Display for LicenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "licence:{}", self.0)
    }
}

impl std::fmt::Display for ThresholdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "threshold:{}", self.0)
    }
}

fn require_non_blank(kind: &'static str, value: impl Into<String>) -> Result<String, CswError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CswError::InvalidIdentifier { kind, value });
    }
    Ok(trimmed.to_string())
}

// ─── Holders ─────────────────────────────────────────────────────────

/// Identifier of a licence holder (a customer account or the company).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    /// Create a holder id, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, CswError> {
        require_non_blank("holder", value).map(Self)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a licence belongs to a customer or to the operating company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderType {
    /// A trading counterparty.
    Customer,
    /// The wholesaler running the engine.
    Company,
}

impl std::fmt::Display for HolderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Customer => "customer",
            Self::Company => "company",
        })
    }
}

// ─── Substances and items ────────────────────────────────────────────

/// Code of a controlled substance in the substance registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstanceCode(String);

impl SubstanceCode {
    /// Create a substance code, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, CswError> {
        require_non_blank("substance", value).map(Self)
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubstanceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key of a customer: account number within a data area
/// (legal entity partition of the ERP).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Customer account number.
    pub account: String,
    /// Data-area (legal entity) identifier.
    pub data_area_id: String,
}

impl CustomerRef {
    /// Create a customer reference, rejecting blank parts.
    pub fn new(
        account: impl Into<String>,
        data_area_id: impl Into<String>,
    ) -> Result<Self, CswError> {
        Ok(Self {
            account: require_non_blank("customer account", account)?,
            data_area_id: require_non_blank("data area", data_area_id)?,
        })
    }

    /// The holder id under which this customer's licences are stored.
    pub fn holder_id(&self) -> HolderId {
        HolderId(format!("{}/{}", self.data_area_id, self.account))
    }
}

impl std::fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.data_area_id, self.account)
    }
}

/// Composite key of a product: item number within a data area.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    /// Item number.
    pub item_number: String,
    /// Data-area (legal entity) identifier.
    pub data_area_id: String,
}

impl ItemRef {
    /// Create an item reference, rejecting blank parts.
    pub fn new(
        item_number: impl Into<String>,
        data_area_id: impl Into<String>,
    ) -> Result<Self, CswError> {
        Ok(Self {
            item_number: require_non_blank("item", item_number)?,
            data_area_id: require_non_blank("data area", data_area_id)?,
        })
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.data_area_id, self.item_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_distinct() {
        assert_ne!(TransactionId::new(), TransactionId::new());
        assert_ne!(LicenceId::new(), LicenceId::new());
    }

    #[test]
    fn display_prefixes() {
        let id = LicenceId(Uuid::nil());
        assert_eq!(id.to_string(), format!("licence:{}", Uuid::nil()));
        let id = ThresholdId(Uuid::nil());
        assert!(id.to_string().starts_with("threshold:"));
    }

    #[test]
    fn blank_strings_rejected() {
        assert!(HolderId::new("").is_err());
        assert!(HolderId::new("   ").is_err());
        assert!(SubstanceCode::new("\t").is_err());
        assert!(CustomerRef::new("C-001", "").is_err());
        assert!(ItemRef::new("", "nl01").is_err());
    }

    #[test]
    fn values_are_trimmed() {
        let code = SubstanceCode::new(" MORPHINE ").unwrap();
        assert_eq!(code.as_str(), "MORPHINE");
    }

    #[test]
    fn customer_holder_id_is_stable() {
        let c = CustomerRef::new("C-001", "nl01").unwrap();
        assert_eq!(c.holder_id().as_str(), "nl01/C-001");
        assert_eq!(c.to_string(), "nl01/C-001");
    }

    #[test]
    fn transaction_id_serializes_as_bare_uuid() {
        let id = TransactionId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", Uuid::nil()));
    }
}
