//! Shared fixtures: a home-country wholesaler in NL with one approved
//! community-pharmacy customer, morphine and ephedrine in the registry,
//! and in-memory collaborators throughout.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use csw_adapters::{MemoryBackend, RecordingNotifier};
use csw_core::{
    ActivitySet, CountryCode, CustomerRef, HolderId, HolderType, ItemRef, LicenceId,
    SubstanceCode, ThresholdId, TransactionType, ValidationContext, ValidationStatus,
};
use csw_pack::{
    licence_types, ApprovalStatus, BusinessCategory, Customer, GdpQualificationStatus, Licence,
    LicenceStatus, OpiumActList, PrecursorCategory, Substance, Threshold, ThresholdPeriod,
    ThresholdType,
};
use csw_validation::{EngineConfig, Transaction, TransactionLine, ValidationEngine};

pub const COMPANY: &str = "nl01/COMPANY";
pub const DATA_AREA: &str = "nl01";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// The business date every scenario runs on.
pub fn today() -> NaiveDate {
    date(2026, 5, 20)
}

pub fn cc(code: &str) -> CountryCode {
    CountryCode::new(code).expect("country")
}

pub fn grams(n: i64) -> Decimal {
    Decimal::from(n)
}

pub fn ctx() -> ValidationContext {
    ValidationContext::for_user("integration")
}

pub fn morphine() -> SubstanceCode {
    SubstanceCode::new("MORPHINE").expect("code")
}

pub fn ephedrine() -> SubstanceCode {
    SubstanceCode::new("EPHEDRINE").expect("code")
}

pub fn customer_ref(account: &str) -> CustomerRef {
    CustomerRef::new(account, DATA_AREA).expect("customer ref")
}

pub fn approved_customer(account: &str) -> Customer {
    Customer {
        customer_ref: customer_ref(account),
        name: format!("Apotheek {account}"),
        approval_status: ApprovalStatus::Approved,
        is_suspended: false,
        suspension_reason: None,
        gdp_status: GdpQualificationStatus::Approved,
        business_category: BusinessCategory::CommunityPharmacy,
        country: Some(cc("NL")),
    }
}

pub fn licence(
    holder: HolderId,
    holder_type: HolderType,
    licence_type: &str,
    activities: ActivitySet,
) -> Licence {
    Licence {
        id: LicenceId::new(),
        licence_number: format!("{licence_type}-{holder}"),
        holder_id: holder,
        holder_type,
        licence_type: licence_type.to_string(),
        status: LicenceStatus::Valid,
        expires_on: Some(date(2027, 12, 31)),
        permitted_activities: activities,
        issuing_authority: Some("Farmatec".into()),
    }
}

pub fn company_holder() -> HolderId {
    HolderId::new(COMPANY).expect("holder")
}

/// Cumulative monthly morphine limit; overridable up to `max_override_pct`.
pub fn morphine_monthly(limit: i64, max_override_pct: Option<i64>) -> Threshold {
    Threshold {
        id: ThresholdId::new(),
        name: "Morphine monthly".into(),
        threshold_type: ThresholdType::CumulativeQuantity,
        substance_code: Some(morphine()),
        customer_ref: None,
        customer_category: None,
        period: ThresholdPeriod::Monthly,
        limit_value: grams(limit),
        limit_unit: "g".into(),
        warning_percentage: None,
        allow_override: true,
        max_override_percentage: max_override_pct.map(Decimal::from),
        is_active: true,
    }
}

/// Per-transaction morphine limit without warnings.
pub fn morphine_per_order(limit: Decimal) -> Threshold {
    Threshold {
        id: ThresholdId::new(),
        name: "Morphine per order".into(),
        threshold_type: ThresholdType::Quantity,
        substance_code: Some(morphine()),
        customer_ref: None,
        customer_category: None,
        period: ThresholdPeriod::PerTransaction,
        limit_value: limit,
        limit_unit: "g".into(),
        warning_percentage: None,
        allow_override: false,
        max_override_percentage: None,
        is_active: true,
    }
}

/// Engine, backend and recording notifier wired together.
pub struct Fixture {
    pub backend: MemoryBackend,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: ValidationEngine,
}

impl Fixture {
    /// Reference data only: substances, products, customer C-001, no licences.
    pub fn bare() -> Self {
        Self::with_notifier(Arc::new(RecordingNotifier::new()))
    }

    pub fn with_notifier(notifier: Arc<RecordingNotifier>) -> Self {
        let backend = MemoryBackend::new();
        backend.substances.insert(Substance {
            code: morphine(),
            name: "Morphine".into(),
            opium_act_list: Some(OpiumActList::ListI),
            precursor_category: None,
            base_unit: "g".into(),
        });
        backend.substances.insert(Substance {
            code: ephedrine(),
            name: "Ephedrine".into(),
            opium_act_list: None,
            precursor_category: Some(PrecursorCategory::Category1),
            base_unit: "g".into(),
        });
        backend.products.register(item("MORPH-10MG"), morphine());
        backend.products.register(item("EPH-25MG"), ephedrine());
        backend.customers.insert(approved_customer("C-001"));

        let collaborators = backend.collaborators().with_notifier(notifier.clone());
        let engine = ValidationEngine::new(&EngineConfig::new(COMPANY, "NL"), collaborators)
            .expect("engine");
        Self {
            backend,
            notifier,
            engine,
        }
    }

    /// [`Fixture::bare`] plus a company wholesale licence permitting every activity.
    pub fn licensed() -> Self {
        let fixture = Self::bare();
        fixture.backend.licences.insert(licence(
            company_holder(),
            HolderType::Company,
            licence_types::WHOLESALE_LICENCE,
            ActivitySet::all(),
        ));
        fixture
    }
}

pub fn item(number: &str) -> ItemRef {
    ItemRef::new(number, DATA_AREA).expect("item")
}

/// A domestic order for C-001 with one morphine line of `qty` grams.
pub fn morphine_order(external_id: &str, qty: Decimal) -> Transaction {
    order_for("C-001", external_id, today(), qty)
}

pub fn order_for(account: &str, external_id: &str, on: NaiveDate, qty: Decimal) -> Transaction {
    Transaction::new(
        external_id,
        customer_ref(account),
        TransactionType::Order,
        on,
        cc("NL"),
        cc("NL"),
        vec![TransactionLine::new(1, item("MORPH-10MG"), qty)],
    )
}

/// A stored, already-passed morphine transaction counting as history.
pub fn passed_history(account: &str, external_id: &str, on: NaiveDate, qty: Decimal) -> Transaction {
    let mut t = order_for(account, external_id, on, qty);
    t.lines[0].substance_code = Some(morphine());
    t.validation_status = ValidationStatus::Passed;
    t
}

/// Frequency limit of `limit` transactions per `period`; global when
/// `substance` is `None`. Carries a warning tier, which frequency ignores.
pub fn frequency(substance: Option<SubstanceCode>, period: ThresholdPeriod, limit: i64) -> Threshold {
    Threshold {
        id: ThresholdId::new(),
        name: format!("Orders per {period}"),
        threshold_type: ThresholdType::Frequency,
        substance_code: substance,
        customer_ref: None,
        customer_category: None,
        period,
        limit_value: Decimal::from(limit),
        limit_unit: "transactions".into(),
        warning_percentage: Some(Decimal::from(50)),
        allow_override: true,
        max_override_percentage: None,
        is_active: true,
    }
}

/// A stored, already-passed ephedrine transaction counting as history.
pub fn passed_ephedrine_history(
    account: &str,
    external_id: &str,
    on: NaiveDate,
    qty: Decimal,
) -> Transaction {
    let mut t = order_for(account, external_id, on, qty);
    t.lines[0] = TransactionLine::new(1, item("EPH-25MG"), qty).with_substance(ephedrine());
    t.validation_status = ValidationStatus::Passed;
    t
}
