use actix_web::{HttpResponse, Responder, ResponseError, web};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::authorization::{load_visible_contract, require_admin};
use crate::auth::middleware::AuthenticatedUser;
use crate::handlers::contracts::ContractView;
use crate::signing::field::SignatureFieldValue;
use crate::signing::{AdminSignatureRequest, DbSigningService, MemberSignatureRequest};

/// Request body for POST /api/contracts/{id}/sign.
#[derive(Debug, Clone, Deserialize)]
pub struct SignContractRequest {
    pub signature: SignatureFieldValue,
    /// Date as displayed to the signer, e.g. `10/18/2026`.
    pub date_signed: Option<String>,
}

/// Request body for POST /api/contracts/{id}/member-sign.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberSignRequest {
    pub field_id: i64,
    pub signature: SignatureFieldValue,
    pub date_signed: Option<String>,
}

/// POST /api/contracts/{id}/distribute: send a draft out for signing (admin only).
pub async fn distribute_contract(
    user: AuthenticatedUser,
    signing: web::Data<DbSigningService>,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    match signing.distribute(path.into_inner()).await {
        Ok(contract) => HttpResponse::Ok().json(ContractView::from(contract)),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/sign: admin countersignature; completes the contract.
pub async fn sign_contract(
    user: AuthenticatedUser,
    signing: web::Data<DbSigningService>,
    path: web::Path<Uuid>,
    body: web::Json<SignContractRequest>,
) -> impl Responder {
    if let Err(resp) = require_admin(&user.0) {
        return resp;
    }

    let body = body.into_inner();
    let request = AdminSignatureRequest {
        date_signed: body.date_signed,
        ..AdminSignatureRequest::new(body.signature.into_payload(), user.0.signer_name())
    };

    match signing.complete_signing(path.into_inner(), request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

/// POST /api/contracts/{id}/member-sign: the addressed member signs one field.
pub async fn member_sign_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    signing: web::Data<DbSigningService>,
    path: web::Path<Uuid>,
    body: web::Json<MemberSignRequest>,
) -> impl Responder {
    let contract_id = path.into_inner();

    let contract = match load_visible_contract(db.get_ref(), contract_id, &user.0).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if contract.member_id != Some(user.0.id) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only the member this contract is addressed to can sign it here",
        }));
    }

    let body = body.into_inner();
    let request = MemberSignatureRequest {
        field_id: body.field_id,
        signature_data: body.signature.into_payload(),
        signer_name: user.0.signer_name(),
        signed_at: Utc::now(),
        date_signed: body.date_signed,
    };

    match signing.apply_member_signature(contract_id, request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}
