//! Vault Service orchestration: caller scoping, audit and pure operations.

use std::sync::{Arc, Mutex};

use credvault::audit::{AuditEvent, AuditOperation, AuditOutcome, AuditSink};
use credvault::auth::Caller;
use credvault::crypto::MasterKey;
use credvault::errors::VaultError;
use credvault::generator::GenerationPolicy;
use credvault::service::api::{CreateCredentialRequest, UpdateCredentialRequest};
use credvault::service::VaultService;
use credvault::strength::StrengthTier;
use credvault::vault::{CredentialRepository, MemoryRepository, OwnerId, VaultStore};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(AuditOperation, String, AuditOutcome)>>,
}

impl AuditSink for Recorder {
    fn record(&self, event: &AuditEvent<'_>) {
        self.events.lock().unwrap().push((
            event.operation,
            event.owner.fingerprint(),
            event.outcome,
        ));
    }
}

fn caller(name: &str) -> Caller {
    Caller {
        owner: OwnerId::new(name).unwrap(),
    }
}

fn service() -> (VaultService, Arc<Recorder>) {
    let store = VaultStore::new(Arc::new(MemoryRepository::new()), MasterKey::generate());
    let recorder = Arc::new(Recorder::default());
    (VaultService::new(store).with_audit(recorder.clone()), recorder)
}

fn github() -> CreateCredentialRequest {
    CreateCredentialRequest {
        service_name: Some("GitHub".into()),
        username: Some("alice".into()),
        password: Some("Tr0ub4dor&3".into()),
        ..CreateCredentialRequest::default()
    }
}

#[test]
fn lifecycle_is_audited_in_order() {
    let (service, recorder) = service();
    let alice = caller("alice");

    let meta = service.create(&alice, github()).unwrap();
    assert_eq!(service.reveal(&alice, &meta.id).unwrap().as_str(), "Tr0ub4dor&3");
    service
        .update(
            &alice,
            &meta.id,
            UpdateCredentialRequest {
                notes: Some(Some("work account".into())),
                ..UpdateCredentialRequest::default()
            },
        )
        .unwrap();
    service.delete(&alice, &meta.id).unwrap();
    assert!(matches!(service.delete(&alice, &meta.id), Err(VaultError::NotFound)));

    let events = recorder.events.lock().unwrap();
    let ops: Vec<_> = events.iter().map(|(op, _, outcome)| (*op, *outcome)).collect();
    assert_eq!(
        ops,
        vec![
            (AuditOperation::Create, AuditOutcome::Success),
            (AuditOperation::Reveal, AuditOutcome::Success),
            (AuditOperation::Update, AuditOutcome::Success),
            (AuditOperation::Delete, AuditOutcome::Success),
            (AuditOperation::Delete, AuditOutcome::NotFound),
        ]
    );
    // Owners are recorded as fingerprints only.
    assert!(events.iter().all(|(_, owner, _)| owner != "alice"));
}

#[test]
fn foreign_reveal_is_not_found_and_audited() {
    let (service, recorder) = service();
    let meta = service.create(&caller("alice"), github()).unwrap();

    assert!(matches!(
        service.reveal(&caller("bob"), &meta.id),
        Err(VaultError::NotFound)
    ));
    let events = recorder.events.lock().unwrap();
    assert_eq!(
        events.last().map(|(op, _, outcome)| (*op, *outcome)),
        Some((AuditOperation::Reveal, AuditOutcome::NotFound))
    );
}

#[test]
fn swapped_envelope_is_audited_as_decryption_failure() {
    let repo = Arc::new(MemoryRepository::new());
    let store = VaultStore::new(repo.clone(), MasterKey::generate());
    let recorder = Arc::new(Recorder::default());
    let service = VaultService::new(store).with_audit(recorder.clone());
    let alice = caller("alice");

    let first = service.create(&alice, github()).unwrap();
    let second = service
        .create(
            &alice,
            CreateCredentialRequest {
                service_name: Some("Bank".into()),
                ..github()
            },
        )
        .unwrap();

    let mut a = repo.get(&alice.owner, &first.id).unwrap().unwrap();
    let mut b = repo.get(&alice.owner, &second.id).unwrap().unwrap();
    std::mem::swap(&mut a.secret_envelope, &mut b.secret_envelope);
    assert!(repo.replace(a).unwrap());
    assert!(repo.replace(b).unwrap());

    let err = service.reveal(&alice, &first.id).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed));
    assert_eq!(err.public_message(), "Failed to decrypt password");

    let events = recorder.events.lock().unwrap();
    assert_eq!(
        events.last().map(|(op, _, outcome)| (*op, *outcome)),
        Some((AuditOperation::Reveal, AuditOutcome::DecryptionFailed))
    );
}

#[test]
fn rejected_create_is_audited_as_rejected() {
    let (service, recorder) = service();
    let request = CreateCredentialRequest {
        password: None,
        ..github()
    };
    let err = service.create(&caller("alice"), request).unwrap_err();
    assert_eq!(err.to_string(), "Missing required field: password");

    let events = recorder.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].2, AuditOutcome::Rejected);
}

#[test]
fn generate_returns_password_with_its_assessment() {
    let (service, _) = service();
    let response = service.generate(&GenerationPolicy::default()).unwrap();
    assert_eq!(response.password.len(), 16);
    assert_eq!(
        response.strength,
        service.check_strength(&response.password)
    );
}

#[test]
fn check_strength_of_empty_password_is_lowest_tier() {
    let (service, _) = service();
    assert_eq!(service.check_strength("").tier, StrengthTier::VeryWeak);
}

#[test]
fn validate_lists_every_missing_class() {
    let (service, _) = service();
    let v = service.validate("abcdefgh");
    assert!(!v.is_valid);
    assert!(v.issues.contains(&"Password must contain uppercase letters".to_string()));
    assert!(v.issues.contains(&"Password must contain numbers".to_string()));
    assert!(v.issues.contains(&"Password must contain special characters".to_string()));
}
