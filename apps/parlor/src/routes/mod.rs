use actix_web::web;

pub mod games;
pub mod health;
pub mod realtime;

use crate::ws;

/// Register every route. `main.rs` and the integration tests share this so
/// both serve the same paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root));

    // /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // /api/games/**
    cfg.service(web::scope("/api/games").configure(games::configure_routes));

    // /api/ws/token
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));

    // /ws/{game_id}
    cfg.service(web::resource("/ws/{game_id}").route(web::get().to(ws::session::upgrade)));
}
