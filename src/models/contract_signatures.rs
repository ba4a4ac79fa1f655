use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// SeaORM entity for the `contract_signatures` table (one row per contract).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_signatures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contract_id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_signature_data: Option<String>,
    pub admin_signed_at: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub member_signature_data: Option<String>,
    pub member_signed_at: Option<DateTimeUtc>,
    pub status: RecordStatus,
    pub date_signed: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contract,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── Write inputs ──

/// Admin columns written by the signing flow.
#[derive(Debug, Clone)]
pub struct AdminSignatureFields {
    pub contract_id: Uuid,
    pub signature_data: String,
    pub signed_at: DateTimeUtc,
    pub date_signed: String,
}

/// Member columns written by the member signing flow.
#[derive(Debug, Clone)]
pub struct MemberSignatureFields {
    pub contract_id: Uuid,
    pub signature_data: String,
    pub signed_at: DateTimeUtc,
}
