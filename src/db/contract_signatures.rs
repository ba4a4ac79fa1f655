use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::models::contract_signatures::{
    self, AdminSignatureFields, MemberSignatureFields, RecordStatus,
};

/// Fetch the signature record of a contract, if one has been written.
pub async fn get_by_contract_id(
    db: &DatabaseConnection,
    contract_id: Uuid,
) -> Result<Option<contract_signatures::Model>, DbErr> {
    contract_signatures::Entity::find()
        .filter(contract_signatures::Column::ContractId.eq(contract_id))
        .one(db)
        .await
}

/// Insert an empty, pending record for `contract_id`. A row that already
/// exists (including one a concurrent signer just created) is left untouched.
pub fn insert_if_absent(contract_id: Uuid) -> Insert<contract_signatures::ActiveModel> {
    let record = contract_signatures::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(contract_id),
        admin_signature_data: Set(None),
        admin_signed_at: Set(None),
        member_signature_data: Set(None),
        member_signed_at: Set(None),
        status: Set(RecordStatus::Pending),
        date_signed: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    contract_signatures::Entity::insert(record).on_conflict(
        OnConflict::column(contract_signatures::Column::ContractId)
            .do_nothing()
            .to_owned(),
    )
}

/// The record for `contract_id`, created first if needed.
async fn ensure_record(
    db: &DatabaseConnection,
    contract_id: Uuid,
) -> Result<contract_signatures::Model, DbErr> {
    if let Some(existing) = get_by_contract_id(db, contract_id).await? {
        return Ok(existing);
    }

    insert_if_absent(contract_id).exec_without_returning(db).await?;

    get_by_contract_id(db, contract_id)
        .await?
        .ok_or(DbErr::RecordNotFound(format!(
            "Signature record for contract {contract_id}"
        )))
}

/// Upsert the admin columns of a contract's signature record and mark it completed.
pub async fn upsert_admin_signature(
    db: &DatabaseConnection,
    input: AdminSignatureFields,
) -> Result<contract_signatures::Model, DbErr> {
    let existing = ensure_record(db, input.contract_id).await?;

    // Only the columns set here are written, so a member signing at the same
    // time keeps their columns.
    let mut active: contract_signatures::ActiveModel = existing.into();
    active.admin_signature_data = Set(Some(input.signature_data));
    active.admin_signed_at = Set(Some(input.signed_at));
    active.date_signed = Set(Some(input.date_signed));
    active.status = Set(RecordStatus::Completed);
    active.updated_at = Set(Some(chrono::Utc::now()));
    active.update(db).await
}

/// Upsert the member columns of a contract's signature record. The record
/// status is left alone; a new record starts as pending.
pub async fn upsert_member_signature(
    db: &DatabaseConnection,
    input: MemberSignatureFields,
) -> Result<contract_signatures::Model, DbErr> {
    let existing = ensure_record(db, input.contract_id).await?;

    let mut active: contract_signatures::ActiveModel = existing.into();
    active.member_signature_data = Set(Some(input.signature_data));
    active.member_signed_at = Set(Some(input.signed_at));
    active.updated_at = Set(Some(chrono::Utc::now()));
    active.update(db).await
}
