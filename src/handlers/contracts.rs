use actix_web::{HttpResponse, Responder, ResponseError, web};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::authorization::{load_visible_contract, require_admin};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::contract_signatures as signature_db;
use crate::db::contracts as contract_db;
use crate::models::contracts::{CreateContract, Model, UpdateContract};
use crate::signing::DbSigningService;
use crate::signing::embedder::{SignatureEntry, contract_body, extract_signatures};

/// A contract with its body and embedded signatures split out.
#[derive(Debug, Clone, Serialize)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: Model,
    pub body: String,
    pub signatures: Vec<SignatureEntry>,
}

impl From<Model> for ContractView {
    fn from(contract: Model) -> Self {
        Self {
            body: contract_body(&contract.content),
            signatures: extract_signatures(&contract.content),
            contract,
        }
    }
}

/// GET /api/contracts: admins see every contract, members the ones addressed to them.
pub async fn get_contracts(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> impl Responder {
    let result = if user.0.is_admin() {
        contract_db::get_all_contracts(db.get_ref()).await
    } else {
        contract_db::get_contracts_for_member(db.get_ref(), user.0.id).await
    };

    match result {
        Ok(contracts) => {
            let views: Vec<ContractView> = contracts.into_iter().map(ContractView::from).collect();
            HttpResponse::Ok().json(views)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch contracts: {e}"),
        })),
    }
}

/// POST /api/contracts: create a draft (admin only).
///
/// Any signature block pasted into the content is dropped; drafts start unsigned.
pub async fn create_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateContract>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let mut input = body.into_inner();
    if input.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Contract title is required",
        }));
    }
    input.content = contract_body(&input.content);

    match contract_db::insert_contract(db.get_ref(), input, user.0.id).await {
        Ok(contract) => {
            tracing::info!(contract_id = %contract.id, "Contract draft created");
            HttpResponse::Created().json(ContractView::from(contract))
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create contract: {e}"),
        })),
    }
}

/// GET /api/contracts/{id}
pub async fn get_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match load_visible_contract(db.get_ref(), path.into_inner(), &user.0).await {
        Ok(contract) => HttpResponse::Ok().json(ContractView::from(contract)),
        Err(resp) => resp,
    }
}

/// PUT /api/contracts/{id}: edit a draft (admin only).
///
/// `content` replaces the body; signatures already embedded are carried over.
pub async fn update_contract(
    user: AuthenticatedUser,
    signing: web::Data<DbSigningService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContract>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match signing.revise_draft(path.into_inner(), body.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(ContractView::from(updated)),
        Err(e) => e.error_response(),
    }
}

/// DELETE /api/contracts/{id}: discard a draft (admin only).
pub async fn delete_contract(
    user: AuthenticatedUser,
    signing: web::Data<DbSigningService>,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let contract_id = path.into_inner();
    match signing.discard_draft(contract_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": format!("Contract {contract_id} deleted"),
        })),
        Err(e) => e.error_response(),
    }
}

/// GET /api/contracts/{id}/signatures: the embedded signature list.
pub async fn get_signatures(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match load_visible_contract(db.get_ref(), path.into_inner(), &user.0).await {
        Ok(contract) => HttpResponse::Ok().json(extract_signatures(&contract.content)),
        Err(resp) => resp,
    }
}

/// GET /api/contracts/{id}/signature-record
pub async fn get_signature_record(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let contract = match load_visible_contract(db.get_ref(), path.into_inner(), &user.0).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match signature_db::get_by_contract_id(db.get_ref(), contract.id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Contract {} has not been signed yet", contract.id),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}
