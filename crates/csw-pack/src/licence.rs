//! # Licences and the Licence-Type Strategy Table
//!
//! A [`Licence`] says *what* its holder may do (`permitted_activities`) and,
//! through its licence-type code, *which substances* it may do it with.
//! The second part is data, not code: [`LicenceTypeRegistry`] maps each
//! licence-type code to a [`LicenceTypeRule`], so a new licence kind is a
//! `register` call rather than a new match arm.
//!
//! ## Standard licence types
//!
//! | Code | Substance coverage | Permit |
//! |------|--------------------|--------|
//! | `OPIUM_ACT_EXEMPTION` | Opium-Act-listed | — |
//! | `PRECURSOR_REGISTRATION` | precursors | — |
//! | `WHOLESALE_LICENCE` | all | — |
//! | `PHARMACY_LICENCE` | all | — |
//! | `IMPORT_PERMIT` | none | import |
//! | `EXPORT_PERMIT` | none | export |

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use csw_core::{ActivitySet, HolderId, HolderType, LicenceId};

use crate::substance::Substance;

/// Codes of the licence types known out of the box.
pub mod licence_types {
    /// Opium Act exemption (art. 6 / art. 8 style exemption).
    pub const OPIUM_ACT_EXEMPTION: &str = "OPIUM_ACT_EXEMPTION";
    /// Drug precursor registration.
    pub const PRECURSOR_REGISTRATION: &str = "PRECURSOR_REGISTRATION";
    /// Pharmaceutical wholesale distribution licence.
    pub const WHOLESALE_LICENCE: &str = "WHOLESALE_LICENCE";
    /// Pharmacy licence.
    pub const PHARMACY_LICENCE: &str = "PHARMACY_LICENCE";
    /// Per-consignment or standing import permit.
    pub const IMPORT_PERMIT: &str = "IMPORT_PERMIT";
    /// Per-consignment or standing export permit.
    pub const EXPORT_PERMIT: &str = "EXPORT_PERMIT";
}

// ─── Licence ─────────────────────────────────────────────────────────

/// Administrative status of a licence as reported by the licence registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenceStatus {
    /// In force (subject to its expiry date).
    Valid,
    /// Lapsed.
    Expired,
    /// Suspended by the authority.
    Suspended,
}

impl LicenceStatus {
    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for LicenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A licence or permit held by a customer or by the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licence {
    /// Registry identifier.
    pub id: LicenceId,
    /// Number printed on the licence document.
    pub licence_number: String,
    /// Who holds it.
    pub holder_id: HolderId,
    /// Whether the holder is a customer or the company.
    pub holder_type: HolderType,
    /// Licence-type code; resolved through [`LicenceTypeRegistry`].
    pub licence_type: String,
    /// Administrative status.
    pub status: LicenceStatus,
    /// Last day the licence is in force; `None` for open-ended licences.
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    /// Activities the licence permits.
    pub permitted_activities: ActivitySet,
    /// Issuing authority, for display.
    #[serde(default)]
    pub issuing_authority: Option<String>,
}

impl Licence {
    /// Whether the licence has lapsed on `date`, by status or by expiry date.
    ///
    /// A licence is in force through its expiry date inclusive.
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.status == LicenceStatus::Expired
            || self.expires_on.is_some_and(|expiry| expiry < date)
    }

    /// Whether the licence is suspended.
    pub fn is_suspended(&self) -> bool {
        self.status == LicenceStatus::Suspended
    }

    /// Whether the licence is `Valid` and not expired on `date`.
    pub fn is_usable_on(&self, date: NaiveDate) -> bool {
        self.status == LicenceStatus::Valid && !self.is_expired_on(date)
    }
}

// ─── Strategy table ──────────────────────────────────────────────────

/// Which substances a licence type covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstanceCoverage {
    /// Substances listed under the Opium Act.
    OpiumActListed,
    /// Drug precursors.
    Precursors,
    /// Every controlled substance.
    AllSubstances,
    /// No substance (permits).
    Nothing,
}

impl SubstanceCoverage {
    /// Whether this coverage includes `substance`.
    pub fn covers(&self, substance: &Substance) -> bool {
        match self {
            Self::OpiumActListed => substance.is_opium_act_listed(),
            Self::Precursors => substance.is_precursor(),
            Self::AllSubstances => true,
            Self::Nothing => false,
        }
    }

    /// Specific coverage outranks blanket coverage when choosing a licence.
    pub fn specificity(&self) -> u8 {
        match self {
            Self::OpiumActListed | Self::Precursors => 1,
            Self::AllSubstances | Self::Nothing => 0,
        }
    }
}

/// Kind of cross-border permit a licence type represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermitKind {
    /// Import permit.
    Import,
    /// Export permit.
    Export,
}

impl std::fmt::Display for PermitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Import => "import",
            Self::Export => "export",
        })
    }
}

/// Behaviour attached to a licence-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenceTypeRule {
    /// Substances the licence type covers.
    pub coverage: SubstanceCoverage,
    /// Whether the licence type is a cross-border permit.
    #[serde(default)]
    pub permit: Option<PermitKind>,
}

/// Mapping from licence-type code to [`LicenceTypeRule`].
#[derive(Debug, Clone, Default)]
pub struct LicenceTypeRegistry {
    rules: HashMap<String, LicenceTypeRule>,
}

impl LicenceTypeRegistry {
    /// An empty registry; every licence type covers nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry of the standard licence types.
    pub fn standard() -> Self {
        use licence_types::*;

        let mut registry = Self::empty();
        registry.register(OPIUM_ACT_EXEMPTION, SubstanceCoverage::OpiumActListed, None);
        registry.register(PRECURSOR_REGISTRATION, SubstanceCoverage::Precursors, None);
        registry.register(WHOLESALE_LICENCE, SubstanceCoverage::AllSubstances, None);
        registry.register(PHARMACY_LICENCE, SubstanceCoverage::AllSubstances, None);
        registry.register(IMPORT_PERMIT, SubstanceCoverage::Nothing, Some(PermitKind::Import));
        registry.register(EXPORT_PERMIT, SubstanceCoverage::Nothing, Some(PermitKind::Export));
        registry
    }

    /// Add or replace the rule for `code`.
    pub fn register(
        &mut self,
        code: impl Into<String>,
        coverage: SubstanceCoverage,
        permit: Option<PermitKind>,
    ) -> &mut Self {
        self.rules
            .insert(code.into(), LicenceTypeRule { coverage, permit });
        self
    }

    /// The rule for `code`, if registered.
    pub fn rule(&self, code: &str) -> Option<&LicenceTypeRule> {
        self.rules.get(code)
    }

    /// The substance coverage of a licence; unknown types cover nothing.
    pub fn coverage_of(&self, licence: &Licence) -> SubstanceCoverage {
        match self.rule(&licence.licence_type) {
            Some(rule) => rule.coverage,
            None => {
                tracing::warn!(
                    licence_id = %licence.id,
                    licence_type = %licence.licence_type,
                    "unknown licence type, treating as covering no substance"
                );
                SubstanceCoverage::Nothing
            }
        }
    }

    /// Whether `licence` covers `substance` under its licence type.
    pub fn covers(&self, licence: &Licence, substance: &Substance) -> bool {
        self.coverage_of(licence).covers(substance)
    }

    /// Whether `licence` is a permit of the given kind.
    pub fn is_permit(&self, licence: &Licence, kind: PermitKind) -> bool {
        self.rule(&licence.licence_type)
            .and_then(|rule| rule.permit)
            .is_some_and(|permit| permit == kind)
    }

    /// Number of registered licence types.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no licence type is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
