//! Integration test: verifier onboarding, signed registration and revocation
//! across attest-core, attest-crypto and attest-registry.

use attest_core::{Principal, VerificationResult};
use attest_crypto::{KeyPair, RecoverableSignature};
use attest_integration_tests::{sign_for, Deployment, KYC_SCHEMA};
use attest_registry::RegistryError;
use chrono::Duration;

#[test]
fn test_end_to_end_register_and_revoke() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let result = net.claim("alice", Duration::days(30));
    let sig = sign_for(&ledger, &result, &key);
    let record = ledger
        .register_verification(&result, &sig)
        .expect("registration should succeed");

    assert_eq!(ledger.verification_count(), 1);
    assert!(ledger.is_verified(&Principal::new("alice")));
    let stored = ledger.get_verification(record.uuid).unwrap();
    assert_eq!(stored.subject.as_str(), "alice");
    assert_eq!(stored.schema.as_str(), KYC_SCHEMA);
    assert_eq!(stored.verifier.as_str(), "centre");

    ledger
        .remove_verification(&Principal::new("alice"), record.uuid)
        .expect("subject may revoke");
    assert!(!ledger.is_verified(&Principal::new("alice")));
    assert!(matches!(
        ledger.get_verification(record.uuid),
        Err(RegistryError::VerificationNotFound(_))
    ));
}

#[test]
fn test_signature_survives_json_transport() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let result = net.claim("alice", Duration::days(1));
    let sig = sign_for(&ledger, &result, &key);
    let wire = serde_json::json!({ "result": result, "signature": sig });

    let result_back: VerificationResult = serde_json::from_value(wire["result"].clone()).unwrap();
    let sig_back: RecoverableSignature = serde_json::from_value(wire["signature"].clone()).unwrap();
    assert_eq!(sig_back, sig);
    ledger.register_verification(&result_back, &sig_back).unwrap();
    assert_eq!(ledger.verification_count(), 1);
}

#[test]
fn test_key_rotation_changes_accepted_signer() {
    let net = Deployment::new();
    let old_key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let new_key = KeyPair::from_seed(&[2u8; 32]);
    let mut info = net.directory.get_verifier(&Principal::new("centre")).unwrap();
    info.signer = new_key.principal();
    net.directory
        .update_verifier(&net.admin, &Principal::new("centre"), info)
        .unwrap();

    let result = net.claim("alice", Duration::days(1));
    assert!(matches!(
        ledger.register_verification(&result, &sign_for(&ledger, &result, &old_key)),
        Err(RegistryError::InvalidSignature)
    ));
    let record = ledger
        .register_verification(&result, &sign_for(&ledger, &result, &new_key))
        .unwrap();
    assert_eq!(record.verifier.as_str(), "centre");
}

#[test]
fn test_removed_verifier_keeps_history() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let result = net.claim("alice", Duration::days(1));
    ledger
        .register_verification(&result, &sign_for(&ledger, &result, &key))
        .unwrap();
    net.directory
        .remove_verifier(&net.admin, &Principal::new("centre"))
        .unwrap();

    // Past records stay in force; new signatures are refused.
    assert!(ledger.is_verified(&Principal::new("alice")));
    assert_eq!(
        ledger
            .verifications_for_verifier(&Principal::new("centre"))
            .len(),
        1
    );
    let next = net.claim("bob", Duration::days(1));
    assert!(ledger
        .register_verification(&next, &sign_for(&ledger, &next, &key))
        .is_err());
}

#[test]
fn test_expiry_follows_trusted_clock() {
    let net = Deployment::new();
    let key = net.add_verifier("centre", 1);
    let ledger = net.ledger("ledger-1");

    let result = net.claim("alice", Duration::hours(2));
    ledger
        .register_verification(&result, &sign_for(&ledger, &result, &key))
        .unwrap();

    net.clock.advance(Duration::hours(1));
    assert!(ledger.is_verified(&Principal::new("alice")));
    net.clock.advance(Duration::hours(1));
    assert!(!ledger.is_verified(&Principal::new("alice")));
    // Expiry hides nothing from listings.
    assert_eq!(
        ledger
            .verifications_for_subject(&Principal::new("alice"))
            .len(),
        1
    );
}
