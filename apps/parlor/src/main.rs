use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use parlor::config::ServerConfig;
use parlor::domain::dictionary::Dictionary;
use parlor::middleware::cors::cors_middleware;
use parlor::middleware::request_log::RequestLog;
use parlor::routes;
use parlor::state::app_state::AppState;
use parlor::state::security_config::SecurityConfig;
use parlor::store::MemoryStore;
use tracing::info;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let dictionary = Dictionary::load(&config.dictionary_path);

    let security = SecurityConfig::new(config.jwt_secret.as_bytes());
    let app_state = AppState::build(
        Arc::new(MemoryStore::new()),
        Arc::new(dictionary),
        config.session,
        security,
    );
    let hub = app_state.hub.clone();
    let data = web::Data::new(app_state);

    println!(
        "🚀 Starting parlor on http://{}:{}",
        config.host, config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(RequestLog)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    hub.shutdown().await;
    info!("[BOOT] stopped");
    Ok(())
}
