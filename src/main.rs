use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use gymkeeper::database::init_database;
use gymkeeper::middleware::RequestIdMiddleware;
use gymkeeper::{AppState, Config, PlanCatalog, SystemClock, routes};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

fn load_catalog(config: &Config) -> Result<PlanCatalog> {
    match config.read_plan_catalog()? {
        Some(json) => PlanCatalog::from_json(&json, config.pt_validity_days),
        None => Ok(PlanCatalog::builtin(config.pt_validity_days)),
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let catalog = load_catalog(&config)?;
    log::info!("Plan catalog loaded with {} plans", catalog.plans().len());

    let server_address = config.server_address();
    let config_data = web::Data::new(config.clone());
    let state = web::Data::new(AppState::new(
        pool,
        Arc::new(SystemClock),
        config.clone(),
        catalog,
    ));

    log::info!("Server starting on http://{}", server_address);

    let allow_any_origin = config.is_development();
    HttpServer::new(move || {
        let cors = if allow_any_origin {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Content-Type", "Accept", "X-Request-ID"])
                .max_age(3600)
        };

        App::new()
            .app_data(config_data.clone())
            .app_data(state.clone())
            .wrap(cors)
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %T request_id=%{x-request-id}o"#,
            ))
            .service(health)
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
