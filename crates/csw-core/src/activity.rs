//! Permitted-activity flags carried by licences and demanded by transactions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Activities a licence permits, or a transaction line requires.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ActivitySet: u32 {
        /// Hold stock of the substance.
        const POSSESS = 1 << 0;

        /// Store the substance on licensed premises.
        const STORE = 1 << 1;

        /// Sell or deliver the substance to third parties.
        const DISTRIBUTE = 1 << 2;

        /// Bring the substance into the country.
        const IMPORT = 1 << 3;

        /// Take the substance out of the country.
        const EXPORT = 1 << 4;

        /// Handle drug precursor chemicals.
        const HANDLE_PRECURSORS = 1 << 5;
    }
}

impl Default for ActivitySet {
    fn default() -> Self {
        ActivitySet::empty()
    }
}

impl ActivitySet {
    /// Whether this set permits every activity in `required`.
    pub fn covers(&self, required: ActivitySet) -> bool {
        self.contains(required)
    }

    /// Activities in `required` that this set lacks.
    pub fn missing(&self, required: ActivitySet) -> ActivitySet {
        required.difference(*self)
    }

    /// Upper-case names of the set flags, joined with `|`.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "NONE".to_string();
        }
        self.iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join("|")
    }
}
