use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::db::contract_signatures as signature_db;
use crate::db::contracts as contract_db;
use crate::models::contract_signatures::{self, AdminSignatureFields, MemberSignatureFields};
use crate::models::contracts::{self, ContractStatus};

/// Row-level access the signing flow needs.
#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn load_contract(&self, id: Uuid) -> Result<Option<contracts::Model>, DbErr>;

    async fn upsert_admin_signature(
        &self,
        fields: AdminSignatureFields,
    ) -> Result<contract_signatures::Model, DbErr>;

    async fn upsert_member_signature(
        &self,
        fields: MemberSignatureFields,
    ) -> Result<contract_signatures::Model, DbErr>;

    /// Write `content` and `status` if the contract is still at
    /// `expected_revision`. `Ok(None)` means the revision moved on.
    async fn commit_contract(
        &self,
        id: Uuid,
        expected_revision: i64,
        content: String,
        status: ContractStatus,
    ) -> Result<Option<contracts::Model>, DbErr>;

    /// Overwrite the editable fields of a draft still at `expected_revision`.
    async fn commit_draft(
        &self,
        id: Uuid,
        expected_revision: i64,
        draft: DraftFields,
    ) -> Result<Option<contracts::Model>, DbErr>;

    /// Delete a draft still at `expected_revision`. `Ok(false)` if it moved on.
    async fn delete_draft(&self, id: Uuid, expected_revision: i64) -> Result<bool, DbErr>;
}

/// Resolved values for a draft edit.
#[derive(Debug, Clone)]
pub struct DraftFields {
    pub title: String,
    pub content: String,
    pub member_id: Option<Uuid>,
}

#[async_trait]
impl ContractStore for DatabaseConnection {
    async fn load_contract(&self, id: Uuid) -> Result<Option<contracts::Model>, DbErr> {
        contract_db::get_contract_by_id(self, id).await
    }

    async fn upsert_admin_signature(
        &self,
        fields: AdminSignatureFields,
    ) -> Result<contract_signatures::Model, DbErr> {
        signature_db::upsert_admin_signature(self, fields).await
    }

    async fn upsert_member_signature(
        &self,
        fields: MemberSignatureFields,
    ) -> Result<contract_signatures::Model, DbErr> {
        signature_db::upsert_member_signature(self, fields).await
    }

    async fn commit_contract(
        &self,
        id: Uuid,
        expected_revision: i64,
        content: String,
        status: ContractStatus,
    ) -> Result<Option<contracts::Model>, DbErr> {
        contract_db::compare_and_swap_content(self, id, expected_revision, content, status).await
    }

    async fn commit_draft(
        &self,
        id: Uuid,
        expected_revision: i64,
        draft: DraftFields,
    ) -> Result<Option<contracts::Model>, DbErr> {
        contract_db::update_draft(
            self,
            id,
            expected_revision,
            draft.title,
            draft.content,
            draft.member_id,
        )
        .await
    }

    async fn delete_draft(&self, id: Uuid, expected_revision: i64) -> Result<bool, DbErr> {
        contract_db::delete_draft(self, id, expected_revision).await
    }
}
