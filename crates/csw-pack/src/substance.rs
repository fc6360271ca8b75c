//! Controlled substances as known to the substance registry.

use serde::{Deserialize, Serialize};

use csw_core::SubstanceCode;

/// Schedule of the Opium Act a substance is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpiumActList {
    /// List I (hard drugs, e.g. morphine, fentanyl).
    ListI,
    /// List II (e.g. cannabis, certain benzodiazepines).
    ListII,
}

/// EU drug precursor category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecursorCategory {
    /// Category 1 (e.g. ephedrine, pseudoephedrine).
    Category1,
    /// Category 2.
    Category2,
    /// Category 3.
    Category3,
}

/// A controlled substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substance {
    /// Registry code.
    pub code: SubstanceCode,
    /// Display name.
    pub name: String,
    /// Opium Act listing, if any.
    #[serde(default)]
    pub opium_act_list: Option<OpiumActList>,
    /// Precursor category, if any.
    #[serde(default)]
    pub precursor_category: Option<PrecursorCategory>,
    /// Base unit in which line quantities are normalized (e.g. "g").
    pub base_unit: String,
}

impl Substance {
    /// Whether the substance is listed under the Opium Act.
    pub fn is_opium_act_listed(&self) -> bool {
        self.opium_act_list.is_some()
    }

    /// Whether the substance is a drug precursor.
    pub fn is_precursor(&self) -> bool {
        self.precursor_category.is_some()
    }
}
