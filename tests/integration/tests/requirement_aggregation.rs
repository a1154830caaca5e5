//! Integration test: requirements satisfied by any of several ledgers or
//! token balances.

use attest_core::Principal;
use attest_integration_tests::{sign_for, Deployment};
use attest_registry::{
    Administrator, InMemoryTokenBalances, RegistryError, RequirementAggregator, SourceRef,
};
use chrono::Duration;
use std::sync::Arc;

fn alice() -> Principal {
    Principal::new("alice")
}

#[test]
fn test_any_ledger_satisfies_requirement() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let us = net.ledger("ledger-us");
    let eu = net.ledger("ledger-eu");
    let agg = RequirementAggregator::new(Administrator::new(net.admin.clone()));
    agg.add_registry(&net.admin, "kyc", us.clone()).unwrap();
    agg.add_registry(&net.admin, "kyc", eu.clone()).unwrap();
    assert_eq!(agg.registry_count("kyc"), 2);
    assert!(!agg.is_verified("kyc", &alice()));

    let result = net.claim("alice", Duration::days(1));
    eu.register_verification(&result, &sign_for(&eu, &result, &key))
        .unwrap();
    assert!(agg.is_verified("kyc", &alice()));
    assert!(!us.is_verified(&alice()));

    agg.remove_registry(&net.admin, "kyc", &SourceRef::ledger(Principal::new("ledger-eu")))
        .unwrap();
    assert!(!agg.is_verified("kyc", &alice()));
}

#[test]
fn test_ledger_and_token_sources_combined() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");
    let tokens = Arc::new(InMemoryTokenBalances::new(Principal::new("membership-nft")));

    let agg = RequirementAggregator::new(Administrator::new(net.admin.clone()));
    agg.add_registry(&net.admin, "access", ledger.clone()).unwrap();
    agg.add_nft_registry(&net.admin, "access", tokens.clone(), 1)
        .unwrap();

    tokens.mint(&Principal::new("bob"), 1, 1);
    assert!(agg.is_verified("access", &Principal::new("bob")));
    assert!(!agg.is_verified("access", &alice()));

    let result = net.claim("alice", Duration::hours(1));
    ledger
        .register_verification(&result, &sign_for(&ledger, &result, &key))
        .unwrap();
    assert!(agg.is_verified("access", &alice()));

    // The ledger credential lapses; alice falls back to nothing.
    net.clock.advance(Duration::hours(1));
    assert!(!agg.is_verified("access", &alice()));
    tokens.burn(&Principal::new("bob"), 1, 1);
    assert!(!agg.is_verified("access", &Principal::new("bob")));
}

#[test]
fn test_aggregator_admin_is_independent_of_ledger_admin() {
    let net = Deployment::new();
    let ledger = net.ledger("ledger-1");
    let agg = RequirementAggregator::new(Administrator::new(Principal::new("compliance")));

    assert!(matches!(
        agg.add_registry(&net.admin, "kyc", ledger.clone()),
        Err(RegistryError::Unauthorized(_))
    ));
    agg.add_registry(&Principal::new("compliance"), "kyc", ledger)
        .unwrap();
    assert!(agg.has_registry("kyc", &SourceRef::ledger(Principal::new("ledger-1"))));
}
