use actix_web::HttpResponse;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::contracts as contract_db;
use crate::models::contracts::Model;
use crate::models::users;

pub fn require_admin(user: &users::Model) -> Result<(), HttpResponse> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only admins can manage contracts",
        })))
    }
}

/// Load a contract the user may see: admins see everything, members only
/// the contracts addressed to them.
pub async fn load_visible_contract(
    db: &DatabaseConnection,
    contract_id: Uuid,
    user: &users::Model,
) -> Result<Model, HttpResponse> {
    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await
        .map_err(|e| {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }))
        })?
        .ok_or_else(|| {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Contract {contract_id} not found"),
            }))
        })?;

    if user.is_admin() || contract.member_id == Some(user.id) {
        return Ok(contract);
    }

    // Members get the same answer for other members' contracts as for missing ones.
    Err(HttpResponse::NotFound().json(serde_json::json!({
        "error": format!("Contract {contract_id} not found"),
    })))
}
