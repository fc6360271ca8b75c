//! Cross-border permits.
//!
//! Only the company's own licences count. The import side's counterpart
//! country is the origin, the export side's is the destination; a
//! counterpart listed as permit-exempt waives that side.

use chrono::NaiveDate;

use csw_core::{CountryCode, TradeDirection};
use csw_pack::{Licence, LicenceTypeRegistry, PermitKind};

use crate::transaction::{TransactionViolation, ViolationCode};

/// Checks that the company holds the permits a movement requires.
#[derive(Debug, Clone)]
pub struct CrossBorderPermitChecker {
    registry: LicenceTypeRegistry,
    exempt: Vec<CountryCode>,
}

impl CrossBorderPermitChecker {
    pub fn new(registry: LicenceTypeRegistry, exempt: Vec<CountryCode>) -> Self {
        Self { registry, exempt }
    }

    /// Violations for a movement from `origin` to `destination`.
    pub fn check(
        &self,
        direction: TradeDirection,
        origin: &CountryCode,
        destination: &CountryCode,
        company_licences: &[Licence],
        date: NaiveDate,
    ) -> Vec<TransactionViolation> {
        if !direction.is_cross_border() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        if direction.requires_import() && !self.exempt.contains(origin) {
            if let Some(v) = self.require(PermitKind::Import, origin, company_licences, date) {
                violations.push(v);
            }
        }
        if direction.requires_export() && !self.exempt.contains(destination) {
            if let Some(v) = self.require(PermitKind::Export, destination, company_licences, date)
            {
                violations.push(v);
            }
        }
        violations
    }

    fn require(
        &self,
        kind: PermitKind,
        counterpart: &CountryCode,
        company_licences: &[Licence],
        date: NaiveDate,
    ) -> Option<TransactionViolation> {
        let held = company_licences
            .iter()
            .any(|l| l.is_usable_on(date) && self.registry.is_permit(l, kind));
        if held {
            return None;
        }
        let (code, message) = match kind {
            PermitKind::Import => (
                ViolationCode::ImportPermitRequired,
                format!("A valid import permit is required for goods from {counterpart}"),
            ),
            PermitKind::Export => (
                ViolationCode::ExportPermitRequired,
                format!("A valid export permit is required for goods to {counterpart}"),
            ),
        };
        Some(TransactionViolation::error(code, message, true))
    }
}
