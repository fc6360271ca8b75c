//! Customer qualification: existence, suspension, approval and GDP status.

use csw_core::CustomerRef;
use csw_pack::{ApprovalStatus, Customer};

use crate::transaction::{TransactionViolation, ViolationCode};

/// Checks the transaction's customer before anything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerQualificationChecker;

impl CustomerQualificationChecker {
    /// Violations for `customer`, looked up under `customer_ref`.
    ///
    /// An unknown customer yields exactly one non-overridable violation and
    /// no further qualification checks.
    pub fn check(
        &self,
        customer_ref: &CustomerRef,
        customer: Option<&Customer>,
    ) -> Vec<TransactionViolation> {
        let Some(customer) = customer else {
            return vec![TransactionViolation::error(
                ViolationCode::CustomerNotFound,
                format!("Customer {customer_ref} was not found"),
                false,
            )];
        };

        let mut violations = Vec::new();

        if customer.is_suspended {
            let reason = customer
                .suspension_reason
                .as_deref()
                .map(|r| format!(": {r}"))
                .unwrap_or_default();
            violations.push(TransactionViolation::error(
                ViolationCode::CustomerSuspended,
                format!("Customer {} is suspended{reason}", customer.name),
                false,
            ));
        }

        if customer.approval_status != ApprovalStatus::Approved {
            violations.push(TransactionViolation::error(
                ViolationCode::CustomerNotApproved,
                format!("Customer {} is not approved", customer.name),
                true,
            ));
        }

        if customer.lacks_required_gdp() {
            violations.push(TransactionViolation::error(
                ViolationCode::CustomerGdpNotQualified,
                format!(
                    "Customer {} ({}) requires GDP qualification",
                    customer.name, customer.business_category
                ),
                true,
            ));
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csw_pack::{BusinessCategory, GdpQualificationStatus};

    fn customer_ref() -> CustomerRef {
        CustomerRef::new("C-001", "nl01").unwrap()
    }

    fn qualified() -> Customer {
        Customer {
            customer_ref: customer_ref(),
            name: "Ziekenhuisapotheek Noord".into(),
            approval_status: ApprovalStatus::Approved,
            is_suspended: false,
            suspension_reason: None,
            gdp_status: GdpQualificationStatus::Approved,
            business_category: BusinessCategory::HospitalPharmacy,
            country: None,
        }
    }

    fn codes(v: &[TransactionViolation]) -> Vec<ViolationCode> {
        v.iter().map(|v| v.code).collect()
    }

    #[test]
    fn qualified_customer_has_no_violations() {
        assert!(CustomerQualificationChecker
            .check(&customer_ref(), Some(&qualified()))
            .is_empty());
    }

    #[test]
    fn unknown_customer_short_circuits() {
        let v = CustomerQualificationChecker.check(&customer_ref(), None);
        assert_eq!(codes(&v), vec![ViolationCode::CustomerNotFound]);
        assert!(!v[0].can_override);
    }

    #[test]
    fn suspended_is_hard_not_approved_is_soft() {
        let c = Customer {
            is_suspended: true,
            suspension_reason: Some("inspection pending".into()),
            approval_status: ApprovalStatus::Pending,
            ..qualified()
        };
        let v = CustomerQualificationChecker.check(&customer_ref(), Some(&c));
        assert_eq!(
            codes(&v),
            vec![
                ViolationCode::CustomerSuspended,
                ViolationCode::CustomerNotApproved
            ]
        );
        assert!(!v[0].can_override);
        assert!(v[0].message.contains("inspection pending"));
        assert!(v[1].can_override);
    }

    #[test]
    fn gdp_checked_only_for_requiring_categories() {
        let pharmacy = Customer {
            gdp_status: GdpQualificationStatus::Expired,
            ..qualified()
        };
        let v = CustomerQualificationChecker.check(&customer_ref(), Some(&pharmacy));
        assert_eq!(codes(&v), vec![ViolationCode::CustomerGdpNotQualified]);
        assert!(v[0].can_override);

        let vet = Customer {
            business_category: BusinessCategory::Veterinarian,
            ..pharmacy
        };
        assert!(CustomerQualificationChecker
            .check(&customer_ref(), Some(&vet))
            .is_empty());
    }
}
