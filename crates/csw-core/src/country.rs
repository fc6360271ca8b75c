//! # Countries and Trade Direction
//!
//! `CountryCode` is an upper-cased ISO 3166-1 alpha-2 code. A transaction's
//! origin and destination, read against the company's home country, give a
//! [`TradeDirection`], which decides both the Import/Export activity bits a
//! covering licence must carry and the permits the company must hold.
//!
//! ```text
//! origin == destination            → Domestic
//! destination == home              → Import
//! origin == home                   → Export
//! neither side is home             → Transit   (both permits required)
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CswError;

/// ISO 3166-1 alpha-2 country code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a two-letter code. Case-insensitive; surrounding whitespace is
    /// ignored.
    pub fn new(code: &str) -> Result<Self, CswError> {
        let trimmed = code.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CswError::InvalidCountryCode(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = CswError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CswError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of goods movement relative to the company's home country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// Origin and destination are the same country.
    Domestic,
    /// Goods enter the home country.
    Import,
    /// Goods leave the home country.
    Export,
    /// Goods move between two foreign countries on the company's account.
    Transit,
}

impl TradeDirection {
    /// Classify a movement from `origin` to `destination`.
    pub fn between(origin: &CountryCode, destination: &CountryCode, home: &CountryCode) -> Self {
        if origin == destination {
            Self::Domestic
        } else if destination == home {
            Self::Import
        } else if origin == home {
            Self::Export
        } else {
            Self::Transit
        }
    }

    /// Whether the movement crosses a border at all.
    pub fn is_cross_border(&self) -> bool {
        !matches!(self, Self::Domestic)
    }

    /// Whether an import permit (and the Import activity) is required.
    pub fn requires_import(&self) -> bool {
        matches!(self, Self::Import | Self::Transit)
    }

    /// Whether an export permit (and the Export activity) is required.
    pub fn requires_export(&self) -> bool {
        matches!(self, Self::Export | Self::Transit)
    }
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Domestic => "domestic",
            Self::Import => "import",
            Self::Export => "export",
            Self::Transit => "transit",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(s: &str) -> CountryCode {
        CountryCode::new(s).unwrap()
    }

    #[test]
    fn country_code_normalizes_case() {
        assert_eq!(cc("nl").as_str(), "NL");
        assert_eq!(cc(" de ").as_str(), "DE");
    }

    #[test]
    fn country_code_rejects_malformed() {
        assert!(CountryCode::new("").is_err());
        assert!(CountryCode::new("NLD").is_err());
        assert!(CountryCode::new("N1").is_err());
    }

    #[test]
    fn country_code_deserialize_validates() {
        let ok: CountryCode = serde_json::from_str("\"be\"").unwrap();
        assert_eq!(ok.as_str(), "BE");
        assert!(serde_json::from_str::<CountryCode>("\"belgium\"").is_err());
    }

    #[test]
    fn direction_classification() {
        let home = cc("NL");
        assert_eq!(TradeDirection::between(&cc("NL"), &cc("NL"), &home), TradeDirection::Domestic);
        assert_eq!(TradeDirection::between(&cc("DE"), &cc("NL"), &home), TradeDirection::Import);
        assert_eq!(TradeDirection::between(&cc("NL"), &cc("BE"), &home), TradeDirection::Export);
        assert_eq!(TradeDirection::between(&cc("DE"), &cc("BE"), &home), TradeDirection::Transit);
        // A foreign domestic movement is still domestic.
        assert_eq!(TradeDirection::between(&cc("DE"), &cc("DE"), &home), TradeDirection::Domestic);
    }

    #[test]
    fn permit_requirements_per_direction() {
        assert!(!TradeDirection::Domestic.requires_import());
        assert!(!TradeDirection::Domestic.requires_export());
        assert!(TradeDirection::Import.requires_import());
        assert!(!TradeDirection::Import.requires_export());
        assert!(TradeDirection::Export.requires_export());
        assert!(TradeDirection::Transit.requires_import());
        assert!(TradeDirection::Transit.requires_export());
    }
}
