//! Tests for the contract signing flow, driven by an in-memory store.
//!
//! Run with: `cargo test --test signing_test`
mod common;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use common::MemoryStore;
use glee_backend::models::contract_signatures::RecordStatus;
use glee_backend::models::contracts::{ContractStatus, UpdateContract};
use glee_backend::signing::embedder::{SignerRole, embed_signature, extract_signatures};
use glee_backend::signing::{
    AdminSignatureRequest, MemberSignatureRequest, RefreshScope, SigningError, SigningService,
};

fn admin_request(signature: &str) -> AdminSignatureRequest {
    AdminSignatureRequest {
        signature_data: signature.to_string(),
        signer_name: "Dana Whitfield".to_string(),
        signed_at: Utc.with_ymd_and_hms(2026, 10, 18, 14, 3, 11).unwrap(),
        date_signed: None,
    }
}

fn member_request(field_id: i64, signature: &str) -> MemberSignatureRequest {
    MemberSignatureRequest {
        field_id,
        signature_data: signature.to_string(),
        signer_name: "Sam Ortiz".to_string(),
        signed_at: Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap(),
        date_signed: Some("10/17/2026".to_string()),
    }
}

#[tokio::test]
async fn test_signing_unsigned_contract_embeds_admin_entry_and_completes() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    let service = SigningService::new(store);

    let outcome = service
        .complete_signing(id, admin_request("data:image/png;base64,iVBORw0KGgo="))
        .await
        .expect("signing should succeed");

    let contract = service.store().contract(id);
    assert_eq!(contract.status, ContractStatus::Completed);
    assert_eq!(contract.revision, 1);
    assert!(contract.content.starts_with("Body text\n\n[EMBEDDED_SIGNATURES][{\"fieldId\":999,"));
    assert!(contract.content.ends_with("}][/EMBEDDED_SIGNATURES]"));
    assert!(contract.content.contains(r#""signerType":"admin""#));
    assert!(contract.content.contains(r#""dateSigned":"10/18/2026""#));
    assert!(contract.content.contains(r#""timestamp":"2026-10-18T14:03:11.000Z""#));

    assert_eq!(outcome.contract, contract);
    assert_eq!(outcome.signatures.len(), 1);
    assert_eq!(outcome.refresh, RefreshScope::ContractList);
    assert_eq!(outcome.record.status, RecordStatus::Completed);
    assert_eq!(
        outcome.record.admin_signature_data.as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
    assert_eq!(outcome.record.date_signed.as_deref(), Some("10/18/2026"));
}

#[tokio::test]
async fn test_resigning_replaces_previous_admin_entry() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    let service = SigningService::new(store);

    service.complete_signing(id, admin_request("sigA")).await.unwrap();
    service.complete_signing(id, admin_request("sigB")).await.unwrap();

    let contract = service.store().contract(id);
    let admins: Vec<_> = extract_signatures(&contract.content)
        .into_iter()
        .filter(|e| e.signer_role == SignerRole::Admin)
        .collect();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].signature_data, "sigB");
    assert_eq!(contract.status, ContractStatus::Completed);

    let record = service.store().record(id).expect("record exists");
    assert_eq!(record.admin_signature_data.as_deref(), Some("sigB"));
}

#[tokio::test]
async fn test_empty_signature_is_rejected_before_any_io() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    let service = SigningService::new(store);

    for payload in ["", "   \n"] {
        let err = service
            .complete_signing(id, admin_request(payload))
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Validation(_)));
    }

    assert_eq!(service.store().calls(), 0);
    assert_eq!(service.store().contract(id).content, "Body text");
    assert!(service.store().record(id).is_none());
}

#[tokio::test]
async fn test_missing_contract_is_not_found() {
    let service = SigningService::new(MemoryStore::new());
    let missing = Uuid::new_v4();

    let err = service
        .complete_signing(missing, admin_request("sigA"))
        .await
        .unwrap_err();

    assert!(matches!(err, SigningError::NotFound(id) if id == missing));
    assert!(service.store().record(missing).is_none());
}

#[tokio::test]
async fn test_failed_load_is_a_persistence_error() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    store.fail_loads();
    let service = SigningService::new(store);

    let err = service
        .complete_signing(id, admin_request("sigA"))
        .await
        .unwrap_err();

    assert!(matches!(err, SigningError::Persistence(_)));
    assert_eq!(service.store().calls(), 1);
    assert!(service.store().record(id).is_none());
    assert_eq!(service.store().contract(id).revision, 0);
}

#[tokio::test]
async fn test_draft_cannot_be_signed() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Draft);
    let service = SigningService::new(store);

    let err = service
        .complete_signing(id, admin_request("sigA"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SigningError::InvalidTransition {
            from: ContractStatus::Draft,
            to: ContractStatus::Completed
        }
    ));
    assert!(service.store().record(id).is_none());
}

#[tokio::test]
async fn test_failed_contract_write_leaves_record_completed() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    store.fail_commits();
    let service = SigningService::new(store);

    let err = service
        .complete_signing(id, admin_request("sigA"))
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::Persistence(_)));

    // No compensation: the record was written before the contract write failed.
    let record = service.store().record(id).expect("record was upserted");
    assert_eq!(record.status, RecordStatus::Completed);
    let contract = service.store().contract(id);
    assert_eq!(contract.status, ContractStatus::Pending);
    assert_eq!(contract.content, "Body text");
}

#[tokio::test]
async fn test_concurrent_signing_keeps_exactly_one_admin_entry() {
    let store = MemoryStore::with_load_barrier(2);
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    let service = SigningService::new(store);

    let (first, second) = tokio::join!(
        service.complete_signing(id, admin_request("sigA")),
        service.complete_signing(id, admin_request("sigB")),
    );

    let (winner, loser) = match (first, second) {
        (Ok(outcome), Err(e)) => (outcome, e),
        (Err(e), Ok(outcome)) => (outcome, e),
        other => panic!("expected one success and one conflict, got {other:?}"),
    };
    assert!(matches!(loser, SigningError::Conflict(conflicted) if conflicted == id));

    let contract = service.store().contract(id);
    let admins: Vec<_> = extract_signatures(&contract.content)
        .into_iter()
        .filter(|e| e.signer_role == SignerRole::Admin)
        .collect();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].signature_data, winner.signatures[0].signature_data);
    assert_eq!(contract.revision, 1);
}

#[tokio::test]
async fn test_member_then_admin_signatures_coexist() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Pending);
    let service = SigningService::new(store);

    let outcome = service
        .apply_member_signature(id, member_request(1, "Sam Ortiz"))
        .await
        .unwrap();
    assert_eq!(outcome.contract.status, ContractStatus::Pending);
    assert_eq!(outcome.record.status, RecordStatus::Pending);
    assert_eq!(outcome.record.member_signature_data.as_deref(), Some("Sam Ortiz"));

    service.complete_signing(id, admin_request("sigA")).await.unwrap();

    let contract = service.store().contract(id);
    let entries = extract_signatures(&contract.content);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].signer_role, SignerRole::Member);
    assert_eq!(entries[0].field_id, 1);
    assert_eq!(entries[0].ip_address, "member-portal");
    assert_eq!(entries[1].signer_role, SignerRole::Admin);
    assert_eq!(contract.status, ContractStatus::Completed);

    let record = service.store().record(id).unwrap();
    assert_eq!(record.member_signature_data.as_deref(), Some("Sam Ortiz"));
    assert_eq!(record.admin_signature_data.as_deref(), Some("sigA"));
}

#[tokio::test]
async fn test_member_cannot_sign_outside_pending_or_admin_field() {
    let store = MemoryStore::new();
    let draft = store.insert_contract("Body text", ContractStatus::Draft);
    let pending = store.insert_contract("Body text", ContractStatus::Pending);
    let service = SigningService::new(store);

    let err = service
        .apply_member_signature(draft, member_request(1, "Sam Ortiz"))
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::Validation(_)));

    let err = service
        .apply_member_signature(pending, member_request(999, "Sam Ortiz"))
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::Validation(_)));
    assert_eq!(service.store().contract(pending).content, "Body text");
}

#[tokio::test]
async fn test_distribute_moves_draft_to_pending_once() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Body text", ContractStatus::Draft);
    let service = SigningService::new(store);

    let contract = service.distribute(id).await.unwrap();
    assert_eq!(contract.status, ContractStatus::Pending);
    assert_eq!(contract.content, "Body text");
    assert_eq!(contract.revision, 1);

    let err = service.distribute(id).await.unwrap_err();
    assert!(matches!(
        err,
        SigningError::InvalidTransition {
            from: ContractStatus::Pending,
            to: ContractStatus::Pending
        }
    ));
}

#[tokio::test]
async fn test_signing_recovers_from_hand_edited_block() {
    let store = MemoryStore::new();
    let id = store.insert_contract(
        "Body text\n\n[EMBEDDED_SIGNATURES][{broken[/EMBEDDED_SIGNATURES]",
        ContractStatus::Pending,
    );
    let service = SigningService::new(store);

    service.complete_signing(id, admin_request("sigA")).await.unwrap();

    let content = service.store().contract(id).content;
    let entries = extract_signatures(&content);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].signature_data, "sigA");
    assert!(!content.contains("broken"));
}

#[tokio::test]
async fn test_explicit_display_date_is_kept() {
    let store = MemoryStore::new();
    let content = embed_signature(
        "Body text",
        glee_backend::signing::embedder::SignatureEntry {
            field_id: 1,
            signature_data: "Sam Ortiz".to_string(),
            date_signed: "10/17/2026".to_string(),
            timestamp: "2026-10-17T09:00:00.000Z".to_string(),
            ip_address: "member-portal".to_string(),
            signer_role: SignerRole::Member,
            signer_name: "Sam Ortiz".to_string(),
        },
    )
    .unwrap();
    let id = store.insert_contract(&content, ContractStatus::Pending);
    let service = SigningService::new(store);

    let mut request = admin_request("sigA");
    request.date_signed = Some("18/10/2026".to_string());
    let outcome = service.complete_signing(id, request).await.unwrap();

    assert_eq!(outcome.signatures[1].date_signed, "18/10/2026");
    assert_eq!(outcome.record.date_signed.as_deref(), Some("18/10/2026"));
}

#[tokio::test]
async fn test_draft_edit_keeps_unchanged_fields() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Original terms", ContractStatus::Draft);
    let member = store.contract(id).member_id;
    let service = SigningService::new(store);

    let updated = service
        .revise_draft(
            id,
            UpdateContract {
                content: Some("Revised terms\n".to_string()),
                ..UpdateContract::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.content, "Revised terms");
    assert_eq!(updated.title, "Fall Tour Participation Agreement");
    assert_eq!(updated.member_id, member);
    assert_eq!(updated.status, ContractStatus::Draft);
    assert_eq!(updated.revision, 1);
}

#[tokio::test]
async fn test_distributed_contract_cannot_be_edited_or_deleted() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Original terms", ContractStatus::Pending);
    let service = SigningService::new(store);

    let edit = UpdateContract {
        content: Some("Rewritten terms".to_string()),
        ..UpdateContract::default()
    };
    let err = service.revise_draft(id, edit).await.unwrap_err();
    assert!(matches!(err, SigningError::Validation(_)));

    let err = service.discard_draft(id).await.unwrap_err();
    assert!(matches!(err, SigningError::Validation(_)));

    let contract = service.store().contract(id);
    assert_eq!(contract.content, "Original terms");
    assert_eq!(contract.revision, 0);
}

#[tokio::test]
async fn test_draft_edit_racing_distribution_never_rewrites_pending_body() {
    let store = MemoryStore::with_load_barrier(2);
    let id = store.insert_contract("Original terms", ContractStatus::Draft);
    let service = SigningService::new(store);

    let edit = UpdateContract {
        content: Some("Rewritten terms".to_string()),
        ..UpdateContract::default()
    };
    let (distributed, edited) = tokio::join!(service.distribute(id), service.revise_draft(id, edit));

    let contract = service.store().contract(id);
    match (distributed, edited) {
        (Ok(_), Err(SigningError::Conflict(conflicted))) => {
            assert_eq!(conflicted, id);
            assert_eq!(contract.status, ContractStatus::Pending);
            assert_eq!(contract.content, "Original terms");
        }
        (Err(SigningError::Conflict(conflicted)), Ok(_)) => {
            assert_eq!(conflicted, id);
            assert_eq!(contract.status, ContractStatus::Draft);
            assert_eq!(contract.content, "Rewritten terms");
        }
        other => panic!("expected one success and one conflict, got {other:?}"),
    }
    assert_eq!(contract.revision, 1);
}

#[tokio::test]
async fn test_draft_delete_racing_distribution_keeps_distributed_contract() {
    let store = MemoryStore::with_load_barrier(2);
    let id = store.insert_contract("Original terms", ContractStatus::Draft);
    let service = SigningService::new(store);

    let (distributed, deleted) = tokio::join!(service.distribute(id), service.discard_draft(id));

    match (distributed, deleted) {
        (Ok(_), Err(SigningError::Conflict(conflicted))) => {
            assert_eq!(conflicted, id);
            let contract = service.store().find_contract(id).expect("contract kept");
            assert_eq!(contract.status, ContractStatus::Pending);
        }
        (Err(SigningError::Conflict(conflicted)), Ok(())) => {
            assert_eq!(conflicted, id);
            assert!(service.store().find_contract(id).is_none());
        }
        other => panic!("expected one success and one conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_draft_can_be_discarded() {
    let store = MemoryStore::new();
    let id = store.insert_contract("Original terms", ContractStatus::Draft);
    let service = SigningService::new(store);

    service.discard_draft(id).await.unwrap();

    assert!(service.store().find_contract(id).is_none());
    let err = service.discard_draft(id).await.unwrap_err();
    assert!(matches!(err, SigningError::NotFound(missing) if missing == id));
}
