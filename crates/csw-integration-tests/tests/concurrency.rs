//! # Concurrent Validations for One Customer
//!
//! Cumulative thresholds read history, aggregate and compare. With usage
//! checks serialised per customer, two concurrent orders that each fit
//! under the limit but together exceed it cannot both pass.

mod common;

use std::sync::Arc;

use common::*;

use csw_adapters::MemoryBackend;
use csw_validation::{EngineConfig, UsageLockRegistry, ValidationEngine};

fn engine_over(f: &Fixture, locks: Arc<UsageLockRegistry>) -> ValidationEngine {
    ValidationEngine::new(
        &EngineConfig::new(COMPANY, "NL"),
        f.backend.collaborators(),
    )
    .expect("engine")
    .with_lock_registry(locks)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serialised_checks_admit_only_one_of_two_orders() {
    let f = Fixture::licensed();
    f.backend.thresholds.insert(morphine_monthly(1000, None));

    let locks = Arc::new(UsageLockRegistry::new());
    let a = Arc::new(engine_over(&f, Arc::clone(&locks)));
    let b = Arc::new(engine_over(&f, locks));

    let first = {
        let engine = Arc::clone(&a);
        tokio::spawn(async move {
            engine
                .validate_transaction(&ctx(), morphine_order("SO-1", grams(600)))
                .await
        })
    };
    let second = {
        let engine = Arc::clone(&b);
        tokio::spawn(async move {
            engine
                .validate_transaction(&ctx(), morphine_order("SO-2", grams(600)))
                .await
        })
    };
    let outcomes = [
        first.await.unwrap().unwrap(),
        second.await.unwrap().unwrap(),
    ];

    let passed = outcomes.iter().filter(|o| o.is_passed()).count();
    assert_eq!(passed, 1);
    let failed = outcomes.iter().find(|o| !o.is_passed()).unwrap();
    let detail = failed.violations[0].threshold.as_ref().unwrap();
    assert_eq!(detail.amount, grams(1200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_customers_do_not_contend() {
    let f = Fixture::licensed();
    f.backend.customers.insert(approved_customer("C-002"));
    f.backend.thresholds.insert(morphine_monthly(1000, None));
    let engine = Arc::new(engine_over(&f, Arc::new(UsageLockRegistry::new())));

    let handles: Vec<_> = ["C-001", "C-002"]
        .into_iter()
        .map(|account| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .validate_transaction(
                        &ctx(),
                        order_for(account, &format!("SO-{account}"), today(), grams(600)),
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_passed());
    }
}

#[tokio::test]
async fn engines_share_one_backend() {
    let backend = MemoryBackend::new();
    let clone = backend.clone();
    clone.customers.insert(approved_customer("C-009"));
    assert!(backend.transactions.is_empty());
    let engine = ValidationEngine::new(
        &EngineConfig::new(COMPANY, "NL"),
        backend.collaborators(),
    )
    .expect("engine");
    engine
        .validate_transaction(&ctx(), order_for("C-009", "SO-9", today(), grams(1)))
        .await
        .unwrap();
    assert_eq!(clone.transactions.len(), 1);
}
