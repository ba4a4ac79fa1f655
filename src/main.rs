use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use glee_backend::auth::jwks::JwksCache;
use glee_backend::config::AppConfig;
use glee_backend::create_pool;
use glee_backend::handlers;
use glee_backend::signing::SigningService;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations applied");
    }

    let signing = web::Data::new(SigningService::new(db.clone()));
    let db_data = web::Data::new(db);

    let jwks_cache = web::Data::new(Arc::new(JwksCache::new(
        &config.supabase_project_ref,
        &config.supabase_anon_key,
        config.jwks_cache_ttl,
    )));

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(signing.clone())
            .app_data(jwks_cache.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
