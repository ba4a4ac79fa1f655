use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract status stored as a lowercase string in the database.
///
/// `draft -> pending -> completed`. Nothing leaves `completed`; an admin
/// re-signing a completed contract keeps it there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ContractStatus {
    /// Whether a contract in `self` may be written with status `next`.
    pub fn can_transition_to(self, next: ContractStatus) -> bool {
        matches!(
            (self, next),
            (ContractStatus::Draft, ContractStatus::Pending)
                | (ContractStatus::Pending, ContractStatus::Completed)
                | (ContractStatus::Completed, ContractStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Pending => "pending",
            ContractStatus::Completed => "completed",
        }
    }
}

/// SeaORM entity for the `contracts` table.
///
/// `content` holds the human-readable body followed by the embedded
/// signature block (see [`crate::signing::embedder`]).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub status: ContractStatus,
    /// Member the contract is addressed to, if any.
    pub member_id: Option<Uuid>,
    pub created_by: Uuid,
    /// Bumped on every content/status write; used as a compare-and-swap token.
    pub revision: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MemberId",
        to = "super::users::Column::Id"
    )]
    Member,
    #[sea_orm(has_one = "super::contract_signatures::Entity")]
    SignatureRecord,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::contract_signatures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SignatureRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContract {
    pub title: String,
    pub content: String,
    pub member_id: Option<Uuid>,
}

/// Edits allowed while a contract is still a draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContract {
    pub title: Option<String>,
    pub content: Option<String>,
    pub member_id: Option<Uuid>,
}
