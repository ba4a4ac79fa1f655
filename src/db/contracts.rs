use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::contracts::{self, ContractStatus, CreateContract};

/// Insert a new contract (always starts as a Draft).
pub async fn insert_contract(
    db: &DatabaseConnection,
    input: CreateContract,
    created_by: Uuid,
) -> Result<contracts::Model, DbErr> {
    let new_contract = contracts::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        content: Set(input.content),
        status: Set(ContractStatus::Draft),
        member_id: Set(input.member_id),
        created_by: Set(created_by),
        revision: Set(0),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_contract.insert(db).await
}

/// Fetch all contracts, newest first.
pub async fn get_all_contracts(db: &DatabaseConnection) -> Result<Vec<contracts::Model>, DbErr> {
    contracts::Entity::find()
        .order_by_desc(contracts::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch the contracts addressed to a member.
pub async fn get_contracts_for_member(
    db: &DatabaseConnection,
    member_id: Uuid,
) -> Result<Vec<contracts::Model>, DbErr> {
    contracts::Entity::find()
        .filter(contracts::Column::MemberId.eq(member_id))
        .order_by_desc(contracts::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single contract by ID.
pub async fn get_contract_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find_by_id(id).one(db).await
}

/// Write `content` and `status` only if the row is still at `expected_revision`.
///
/// Returns `Ok(None)` when another writer got there first (or the row is gone).
pub async fn compare_and_swap_content(
    db: &DatabaseConnection,
    id: Uuid,
    expected_revision: i64,
    content: String,
    status: ContractStatus,
) -> Result<Option<contracts::Model>, DbErr> {
    let result = contracts::Entity::update_many()
        .col_expr(contracts::Column::Content, Expr::value(content))
        .col_expr(contracts::Column::Status, Expr::value(status.as_str()))
        .col_expr(contracts::Column::Revision, Expr::value(expected_revision + 1))
        .col_expr(contracts::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(contracts::Column::Id.eq(id))
        .filter(contracts::Column::Revision.eq(expected_revision))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    contracts::Entity::find_by_id(id).one(db).await
}

/// Overwrite title, content and member of a contract that is still a draft
/// at `expected_revision`.
///
/// Returns `Ok(None)` if the contract moved on (edited, distributed or deleted).
pub async fn update_draft(
    db: &DatabaseConnection,
    id: Uuid,
    expected_revision: i64,
    title: String,
    content: String,
    member_id: Option<Uuid>,
) -> Result<Option<contracts::Model>, DbErr> {
    let result = contracts::Entity::update_many()
        .col_expr(contracts::Column::Title, Expr::value(title))
        .col_expr(contracts::Column::Content, Expr::value(content))
        .col_expr(contracts::Column::MemberId, Expr::value(member_id))
        .col_expr(contracts::Column::Revision, Expr::value(expected_revision + 1))
        .col_expr(contracts::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(contracts::Column::Id.eq(id))
        .filter(contracts::Column::Revision.eq(expected_revision))
        .filter(contracts::Column::Status.eq(ContractStatus::Draft.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    contracts::Entity::find_by_id(id).one(db).await
}

/// Delete a contract only if it is still a draft at `expected_revision`.
pub async fn delete_draft(
    db: &DatabaseConnection,
    id: Uuid,
    expected_revision: i64,
) -> Result<bool, DbErr> {
    let result = contracts::Entity::delete_many()
        .filter(contracts::Column::Id.eq(id))
        .filter(contracts::Column::Revision.eq(expected_revision))
        .filter(contracts::Column::Status.eq(ContractStatus::Draft.as_str()))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}
