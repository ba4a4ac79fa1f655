use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::contract_signatures::{self, AdminSignatureFields, MemberSignatureFields};
use crate::models::contracts::{self, ContractStatus, UpdateContract};
use crate::signing::embedder::{
    ADMIN_FIELD_ID, ADMIN_ORIGIN, MEMBER_ORIGIN, SignatureEntry, SignerRole, contract_body,
    extract_signatures, merge_signature, reserialize,
};
use crate::signing::error::SigningError;
use crate::signing::field::display_date;
use crate::signing::store::{ContractStore, DraftFields};

/// Input for the admin countersignature.
#[derive(Debug, Clone)]
pub struct AdminSignatureRequest {
    pub signature_data: String,
    pub signer_name: String,
    pub signed_at: DateTime<Utc>,
    /// Display date chosen by the signer; defaults to `signed_at` as `M/D/YYYY`.
    pub date_signed: Option<String>,
}

impl AdminSignatureRequest {
    pub fn new(signature_data: impl Into<String>, signer_name: impl Into<String>) -> Self {
        Self {
            signature_data: signature_data.into(),
            signer_name: signer_name.into(),
            signed_at: Utc::now(),
            date_signed: None,
        }
    }
}

/// Input for a member signing one field of their contract.
#[derive(Debug, Clone)]
pub struct MemberSignatureRequest {
    pub field_id: i64,
    pub signature_data: String,
    pub signer_name: String,
    pub signed_at: DateTime<Utc>,
    pub date_signed: Option<String>,
}

/// What the caller should reload after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshScope {
    ContractList,
}

#[derive(Debug, Clone, Serialize)]
pub struct SigningOutcome {
    pub contract: contracts::Model,
    pub record: contract_signatures::Model,
    pub signatures: Vec<SignatureEntry>,
    pub refresh: RefreshScope,
}

/// Drives contract signing against a [`ContractStore`].
///
/// Each call is a straight sequence of store round-trips. A failure aborts the
/// remaining steps without undoing earlier ones: if the contract write loses,
/// the signature record has already been upserted.
#[derive(Clone)]
pub struct SigningService<S> {
    store: S,
}

impl<S: ContractStore> SigningService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Countersign a contract as admin and mark it completed.
    pub async fn complete_signing(
        &self,
        contract_id: Uuid,
        request: AdminSignatureRequest,
    ) -> Result<SigningOutcome, SigningError> {
        let result = self.sign_as_admin(contract_id, request).await;
        log_failure(contract_id, "admin signing", &result);
        result
    }

    /// Add or replace the member's signature. The contract stays pending.
    pub async fn apply_member_signature(
        &self,
        contract_id: Uuid,
        request: MemberSignatureRequest,
    ) -> Result<SigningOutcome, SigningError> {
        let result = self.sign_as_member(contract_id, request).await;
        log_failure(contract_id, "member signing", &result);
        result
    }

    /// Move a draft to pending so it can be signed.
    pub async fn distribute(&self, contract_id: Uuid) -> Result<contracts::Model, SigningError> {
        let result = self.move_to_pending(contract_id).await;
        log_failure(contract_id, "distribution", &result);
        result
    }

    /// Edit a draft. A new `content` replaces the body; any signatures already
    /// embedded are carried over.
    pub async fn revise_draft(
        &self,
        contract_id: Uuid,
        edit: UpdateContract,
    ) -> Result<contracts::Model, SigningError> {
        let result = self.edit_draft(contract_id, edit).await;
        log_failure(contract_id, "draft edit", &result);
        result
    }

    /// Delete a contract that has not been distributed yet.
    pub async fn discard_draft(&self, contract_id: Uuid) -> Result<(), SigningError> {
        let result = self.delete_draft(contract_id).await;
        log_failure(contract_id, "draft deletion", &result);
        result
    }

    async fn sign_as_admin(
        &self,
        contract_id: Uuid,
        request: AdminSignatureRequest,
    ) -> Result<SigningOutcome, SigningError> {
        let signature_data = request.signature_data.trim();
        if signature_data.is_empty() {
            return Err(SigningError::signature_required());
        }

        let contract = self.load(contract_id).await?;
        ensure_transition(contract.status, ContractStatus::Completed)?;

        let date_signed = resolve_display_date(request.date_signed, request.signed_at);
        let entry = SignatureEntry {
            field_id: ADMIN_FIELD_ID,
            signature_data: signature_data.to_string(),
            date_signed: date_signed.clone(),
            timestamp: iso_timestamp(request.signed_at),
            ip_address: ADMIN_ORIGIN.to_string(),
            signer_role: SignerRole::Admin,
            signer_name: request.signer_name,
        };
        let signatures = merge_signature(extract_signatures(&contract.content), entry);
        let content = reserialize(&contract.content, &signatures)?;

        let record = self
            .store
            .upsert_admin_signature(AdminSignatureFields {
                contract_id,
                signature_data: signature_data.to_string(),
                signed_at: request.signed_at,
                date_signed,
            })
            .await?;

        let contract = self
            .store
            .commit_contract(
                contract_id,
                contract.revision,
                content,
                ContractStatus::Completed,
            )
            .await?
            .ok_or(SigningError::Conflict(contract_id))?;

        info!(%contract_id, revision = contract.revision, "Contract countersigned by admin");

        Ok(SigningOutcome {
            contract,
            record,
            signatures,
            refresh: RefreshScope::ContractList,
        })
    }

    async fn sign_as_member(
        &self,
        contract_id: Uuid,
        request: MemberSignatureRequest,
    ) -> Result<SigningOutcome, SigningError> {
        let signature_data = request.signature_data.trim();
        if signature_data.is_empty() {
            return Err(SigningError::signature_required());
        }
        if request.field_id < 0 || request.field_id == ADMIN_FIELD_ID {
            return Err(SigningError::Validation(format!(
                "Field {} cannot be signed by a member",
                request.field_id
            )));
        }

        let contract = self.load(contract_id).await?;
        if contract.status != ContractStatus::Pending {
            return Err(SigningError::Validation(format!(
                "Contract is {}; only pending contracts accept member signatures",
                contract.status.as_str()
            )));
        }

        let entry = SignatureEntry {
            field_id: request.field_id,
            signature_data: signature_data.to_string(),
            date_signed: resolve_display_date(request.date_signed, request.signed_at),
            timestamp: iso_timestamp(request.signed_at),
            ip_address: MEMBER_ORIGIN.to_string(),
            signer_role: SignerRole::Member,
            signer_name: request.signer_name,
        };
        let signatures = merge_signature(extract_signatures(&contract.content), entry);
        let content = reserialize(&contract.content, &signatures)?;

        let record = self
            .store
            .upsert_member_signature(MemberSignatureFields {
                contract_id,
                signature_data: signature_data.to_string(),
                signed_at: request.signed_at,
            })
            .await?;

        let contract = self
            .store
            .commit_contract(contract_id, contract.revision, content, ContractStatus::Pending)
            .await?
            .ok_or(SigningError::Conflict(contract_id))?;

        info!(%contract_id, field_id = request.field_id, "Contract signed by member");

        Ok(SigningOutcome {
            contract,
            record,
            signatures,
            refresh: RefreshScope::ContractList,
        })
    }

    async fn move_to_pending(&self, contract_id: Uuid) -> Result<contracts::Model, SigningError> {
        let contract = self.load(contract_id).await?;
        ensure_transition(contract.status, ContractStatus::Pending)?;

        let revision = contract.revision;
        let updated = self
            .store
            .commit_contract(contract_id, revision, contract.content, ContractStatus::Pending)
            .await?
            .ok_or(SigningError::Conflict(contract_id))?;

        info!(%contract_id, "Contract distributed for signing");
        Ok(updated)
    }

    async fn edit_draft(
        &self,
        contract_id: Uuid,
        edit: UpdateContract,
    ) -> Result<contracts::Model, SigningError> {
        let contract = self.load(contract_id).await?;
        ensure_draft(&contract, "edited")?;

        let content = match edit.content {
            Some(body) => {
                let existing = extract_signatures(&contract.content);
                if existing.is_empty() {
                    contract_body(&body)
                } else {
                    reserialize(&body, &existing)?
                }
            }
            None => contract.content,
        };
        let draft = DraftFields {
            title: edit.title.unwrap_or(contract.title),
            content,
            member_id: edit.member_id.or(contract.member_id),
        };

        let updated = self
            .store
            .commit_draft(contract_id, contract.revision, draft)
            .await?
            .ok_or(SigningError::Conflict(contract_id))?;

        info!(%contract_id, revision = updated.revision, "Contract draft updated");
        Ok(updated)
    }

    async fn delete_draft(&self, contract_id: Uuid) -> Result<(), SigningError> {
        let contract = self.load(contract_id).await?;
        ensure_draft(&contract, "deleted")?;

        if !self.store.delete_draft(contract_id, contract.revision).await? {
            return Err(SigningError::Conflict(contract_id));
        }

        info!(%contract_id, "Contract draft deleted");
        Ok(())
    }

    async fn load(&self, contract_id: Uuid) -> Result<contracts::Model, SigningError> {
        self.store
            .load_contract(contract_id)
            .await?
            .ok_or(SigningError::NotFound(contract_id))
    }
}

fn ensure_transition(from: ContractStatus, to: ContractStatus) -> Result<(), SigningError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(SigningError::InvalidTransition { from, to })
    }
}

fn ensure_draft(contract: &contracts::Model, action: &str) -> Result<(), SigningError> {
    if contract.status == ContractStatus::Draft {
        return Ok(());
    }
    Err(SigningError::Validation(format!(
        "Contract is already {}. Only drafts can be {action}.",
        contract.status.as_str()
    )))
}

fn resolve_display_date(requested: Option<String>, signed_at: DateTime<Utc>) -> String {
    requested
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| display_date(signed_at.date_naive()))
}

/// `2026-10-18T14:03:11.204Z`
fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn log_failure<T>(contract_id: Uuid, action: &str, result: &Result<T, SigningError>) {
    match result {
        Ok(_) => {}
        Err(e @ (SigningError::Persistence(_) | SigningError::Encoding(_))) => {
            error!(%contract_id, action, error = %e, "Contract write failed");
        }
        Err(e) => {
            warn!(%contract_id, action, error = %e, "Contract write rejected");
        }
    }
}
