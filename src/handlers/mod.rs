pub mod auth;
pub mod contracts;
pub mod signing;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Contract routes (all require a valid JWT) ──
    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(contracts::get_contracts))
            .route("", web::post().to(contracts::create_contract))
            .route("/{id}", web::get().to(contracts::get_contract))
            .route("/{id}", web::put().to(contracts::update_contract))
            .route("/{id}", web::delete().to(contracts::delete_contract))
            .route("/{id}/signatures", web::get().to(contracts::get_signatures))
            .route(
                "/{id}/signature-record",
                web::get().to(contracts::get_signature_record),
            )
            .route("/{id}/distribute", web::post().to(signing::distribute_contract))
            .route("/{id}/sign", web::post().to(signing::sign_contract))
            .route("/{id}/member-sign", web::post().to(signing::member_sign_contract)),
    );
}
