//! Customer qualification data as kept by the customer master.

use serde::{Deserialize, Serialize};

use csw_core::{CountryCode, CustomerRef};

/// Commercial approval of a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Onboarding not finished.
    Pending,
    /// Approved for trade in controlled substances.
    Approved,
    /// Refused.
    Rejected,
}

/// Good Distribution Practice qualification of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GdpQualificationStatus {
    /// No qualification started.
    NotStarted,
    /// Qualification under way.
    InProgress,
    /// Fully qualified.
    Approved,
    /// Qualified with conditions.
    ConditionallyApproved,
    /// Qualification refused.
    Rejected,
    /// Qualification lapsed.
    Expired,
}

impl GdpQualificationStatus {
    /// Whether the status counts as qualified.
    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Approved | Self::ConditionallyApproved)
    }
}

/// Business category of a customer. Drives the GDP requirement and
/// category-scoped thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessCategory {
    /// Hospital pharmacy.
    HospitalPharmacy,
    /// Community (retail) pharmacy.
    CommunityPharmacy,
    /// Wholesaler established in the EU.
    EuWholesaler,
    /// Wholesaler established outside the EU.
    NonEuWholesaler,
    /// Veterinary practice.
    Veterinarian,
    /// Research institution or laboratory.
    ResearchInstitution,
}

impl BusinessCategory {
    /// Whether customers of this category must be GDP-qualified.
    pub fn requires_gdp(&self) -> bool {
        match self {
            Self::HospitalPharmacy
            | Self::CommunityPharmacy
            | Self::EuWholesaler
            | Self::NonEuWholesaler => true,
            Self::Veterinarian | Self::ResearchInstitution => false,
        }
    }

    /// The snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HospitalPharmacy => "hospital_pharmacy",
            Self::CommunityPharmacy => "community_pharmacy",
            Self::EuWholesaler => "eu_wholesaler",
            Self::NonEuWholesaler => "non_eu_wholesaler",
            Self::Veterinarian => "veterinarian",
            Self::ResearchInstitution => "research_institution",
        }
    }
}

impl std::fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trading counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Account/data-area key.
    pub customer_ref: CustomerRef,
    /// Display name.
    pub name: String,
    /// Commercial approval.
    pub approval_status: ApprovalStatus,
    /// Whether trade is suspended.
    #[serde(default)]
    pub is_suspended: bool,
    /// Why trade is suspended.
    #[serde(default)]
    pub suspension_reason: Option<String>,
    /// GDP qualification.
    pub gdp_status: GdpQualificationStatus,
    /// Business category.
    pub business_category: BusinessCategory,
    /// Country of establishment.
    #[serde(default)]
    pub country: Option<CountryCode>,
}

impl Customer {
    /// Whether the customer's category demands GDP qualification that it
    /// does not have.
    pub fn lacks_required_gdp(&self) -> bool {
        self.business_category.requires_gdp() && !self.gdp_status.is_qualified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(category: BusinessCategory, gdp: GdpQualificationStatus) -> Customer {
        Customer {
            customer_ref: CustomerRef::new("C-001", "nl01").unwrap(),
            name: "Apotheek De Vries".into(),
            approval_status: ApprovalStatus::Approved,
            is_suspended: false,
            suspension_reason: None,
            gdp_status: gdp,
            business_category: category,
            country: None,
        }
    }

    #[test]
    fn gdp_requirement_by_category() {
        assert!(BusinessCategory::HospitalPharmacy.requires_gdp());
        assert!(BusinessCategory::CommunityPharmacy.requires_gdp());
        assert!(BusinessCategory::EuWholesaler.requires_gdp());
        assert!(BusinessCategory::NonEuWholesaler.requires_gdp());
        assert!(!BusinessCategory::Veterinarian.requires_gdp());
        assert!(!BusinessCategory::ResearchInstitution.requires_gdp());
    }

    #[test]
    fn conditional_approval_counts_as_qualified() {
        let c = customer(
            BusinessCategory::HospitalPharmacy,
            GdpQualificationStatus::ConditionallyApproved,
        );
        assert!(!c.lacks_required_gdp());
    }

    #[test]
    fn in_progress_is_not_qualified() {
        let c = customer(BusinessCategory::EuWholesaler, GdpQualificationStatus::InProgress);
        assert!(c.lacks_required_gdp());
    }

    #[test]
    fn exempt_category_never_lacks_gdp() {
        let c = customer(BusinessCategory::Veterinarian, GdpQualificationStatus::NotStarted);
        assert!(!c.lacks_required_gdp());
    }
}
