//! Integration test: signatures are bound to one ledger and one network.

use attest_core::Principal;
use attest_integration_tests::{sign_for, Deployment};
use attest_registry::RegistryError;
use chrono::Duration;

#[test]
fn test_signature_for_one_ledger_rejected_by_another() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger_a = net.ledger("ledger-a");
    let ledger_b = net.ledger("ledger-b");

    let result = net.claim("alice", Duration::days(1));
    let sig = sign_for(&ledger_a, &result, &key);
    ledger_a.register_verification(&result, &sig).unwrap();

    assert!(matches!(
        ledger_b.register_verification(&result, &sig),
        Err(RegistryError::InvalidSignature)
    ));
    assert!(!ledger_b.is_verified(&Principal::new("alice")));
}

#[test]
fn test_signature_for_other_network_rejected() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let mut other = Deployment::new();
    other.domain.network_id = 1;
    let foreign = other.ledger("ledger-1");
    assert_ne!(foreign.domain(), ledger.domain());

    let result = net.claim("alice", Duration::days(1));
    let sig = sign_for(&foreign, &result, &key);
    assert!(matches!(
        ledger.register_verification(&result, &sig),
        Err(RegistryError::InvalidSignature)
    ));
}

#[test]
fn test_resubmitting_same_signature_creates_new_record() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let result = net.claim("alice", Duration::days(1));
    let sig = sign_for(&ledger, &result, &key);
    let first = ledger.register_verification(&result, &sig).unwrap();
    let second = ledger.register_verification(&result, &sig).unwrap();
    assert_eq!((first.uuid, second.uuid), (1, 2));
    assert_eq!(ledger.verification_count(), 2);
}
