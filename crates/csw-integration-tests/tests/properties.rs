//! # Engine Properties
//!
//! Determinism, soundness of `Passed`, coverage monotonicity and the
//! inclusive threshold boundary, checked over generated inputs.

mod common;

use common::*;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use csw_core::{ActivitySet, HolderType, ValidationStatus};
use csw_pack::{licence_types, Licence, LicenceStatus};
use csw_validation::{TransactionStore, ValidationOutcome, ViolationCode};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn status_strategy() -> impl Strategy<Value = LicenceStatus> {
    prop_oneof![
        Just(LicenceStatus::Valid),
        Just(LicenceStatus::Expired),
        Just(LicenceStatus::Suspended),
    ]
}

fn activity_strategy() -> impl Strategy<Value = ActivitySet> {
    (0u32..64).prop_map(ActivitySet::from_bits_truncate)
}

fn licence_type_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(licence_types::WHOLESALE_LICENCE),
        Just(licence_types::OPIUM_ACT_EXEMPTION),
        Just(licence_types::PRECURSOR_REGISTRATION),
        Just(licence_types::EXPORT_PERMIT),
    ]
}

fn expiry_strategy() -> impl Strategy<Value = Option<NaiveDate>> {
    prop_oneof![
        Just(None),
        Just(Some(date(2026, 5, 19))),
        Just(Some(date(2026, 5, 20))),
        Just(Some(date(2027, 1, 1))),
    ]
}

prop_compose! {
    fn arb_licence()(
        customer_held in any::<bool>(),
        licence_type in licence_type_strategy(),
        activities in activity_strategy(),
        status in status_strategy(),
        expires_on in expiry_strategy(),
    ) -> Licence {
        let (holder, holder_type) = if customer_held {
            (customer_ref("C-001").holder_id(), HolderType::Customer)
        } else {
            (company_holder(), HolderType::Company)
        };
        let mut l = licence(holder, holder_type, licence_type, activities);
        l.status = status;
        l.expires_on = expires_on;
        l
    }
}

fn assert_sound(outcome: &ValidationOutcome) {
    assert_eq!(
        outcome.status == ValidationStatus::Passed,
        outcome.violations.is_empty(),
        "status {:?} with {} violations",
        outcome.status,
        outcome.violations.len()
    );
    assert_eq!(
        outcome.requires_override,
        !outcome.violations.is_empty() && outcome.violations.iter().all(|v| v.can_override)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn validation_is_deterministic(
        licences in prop::collection::vec(arb_licence(), 0..4),
        qty in 1i64..2_000,
        history in 0i64..1_200,
        cross_border in any::<bool>(),
    ) {
        runtime().block_on(async {
            let f = Fixture::bare();
            for l in &licences {
                f.backend.licences.insert(l.clone());
            }
            f.backend.thresholds.insert(morphine_monthly(1000, Some(120)));
            if history > 0 {
                f.backend.transactions.seed(passed_history(
                    "C-001", "SO-HIST", date(2026, 5, 2), Decimal::from(history),
                ));
            }
            let mut txn = morphine_order("SO-P", Decimal::from(qty));
            if cross_border {
                txn.destination_country = cc("BE");
            }

            let first = f.engine.validate_transaction(&ctx(), txn).await.unwrap();
            let second = f
                .engine
                .revalidate_transaction(&ctx(), first.transaction_id)
                .await
                .unwrap();

            assert_sound(&first);
            assert_eq!(first.status, second.status);
            assert_eq!(first.violations, second.violations);
            assert_eq!(first.licence_usages, second.licence_usages);
            assert_eq!(first.requires_override, second.requires_override);
        });
    }

    #[test]
    fn covering_licence_is_always_usable(
        licences in prop::collection::vec(arb_licence(), 1..6),
        export in any::<bool>(),
    ) {
        runtime().block_on(async {
            let f = Fixture::bare();
            for l in &licences {
                f.backend.licences.insert(l.clone());
            }
            let mut txn = morphine_order("SO-COV", Decimal::from(3));
            let mut required = ActivitySet::DISTRIBUTE;
            if export {
                txn.destination_country = cc("CH");
                required |= ActivitySet::EXPORT;
            }

            let outcome = f.engine.validate_transaction(&ctx(), txn).await.unwrap();
            assert_sound(&outcome);

            let stored = f
                .backend
                .transactions
                .get(outcome.transaction_id)
                .await
                .unwrap()
                .unwrap();
            for line in &stored.lines {
                let Some(id) = line.licence_id else { continue };
                let licence = licences.iter().find(|l| l.id == id).expect("known licence");
                assert_eq!(licence.status, LicenceStatus::Valid);
                assert!(!licence.is_expired_on(today()));
                assert!(licence.permitted_activities.covers(required));
                assert_ne!(licence.licence_type, licence_types::EXPORT_PERMIT);
                assert_ne!(licence.licence_type, licence_types::PRECURSOR_REGISTRATION);
            }

            let covered = stored.lines.iter().any(|l| l.licence_id.is_some());
            assert_eq!(covered, !outcome.has(ViolationCode::LicenceMissing)
                && !outcome.has(ViolationCode::LicenceExpired)
                && !outcome.has(ViolationCode::LicenceSuspended));
        });
    }

    #[test]
    fn threshold_boundary_is_inclusive(limit in 2i64..10_000) {
        runtime().block_on(async {
            let f = Fixture::licensed();
            f.backend.thresholds.insert(morphine_per_order(Decimal::from(limit)));

            let at = f
                .engine
                .validate_transaction(&ctx(), morphine_order("SO-AT", Decimal::from(limit)))
                .await
                .unwrap();
            assert!(at.has(ViolationCode::ThresholdExceeded));

            let below = f
                .engine
                .validate_transaction(&ctx(), morphine_order("SO-BELOW", Decimal::from(limit - 1)))
                .await
                .unwrap();
            assert!(below.is_passed(), "{:?}", below.violations);
        });
    }
}

#[tokio::test]
async fn fractional_quantity_just_below_limit_passes() {
    let f = Fixture::licensed();
    f.backend
        .thresholds
        .insert(morphine_per_order(Decimal::new(100, 0)));
    let outcome = f
        .engine
        .validate_transaction(&ctx(), morphine_order("SO-FRAC", Decimal::new(99_999, 3)))
        .await
        .unwrap();
    assert!(outcome.is_passed());
}
