//! Game creation and lookup.

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::domain::rules::GameMode;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::game_id::GamePath;
use crate::errors::ErrorCode;
use crate::protocol::{GameId, UserId};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub game_mode: GameMode,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Serialize)]
struct CreateGameResponse {
    game_id: GameId,
    game_mode: GameMode,
}

#[derive(Debug, Serialize)]
struct GameSummary {
    game_id: GameId,
    game_mode: GameMode,
    owner: UserId,
    config: Value,
    live: bool,
}

/// POST /api/games
///
/// The caller becomes the owner. The configuration is validated against the
/// mode before anything is stored, so a bad config never yields a game id.
async fn create_game(
    current_user: CurrentUser,
    body: web::Json<CreateGameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let CreateGameRequest { game_mode, config } = body.into_inner();
    let record = app_state
        .hub
        .create_game(game_mode, current_user.id, config)
        .await?;
    info!(game_id = record.game_id, user_id = current_user.id, "[HTTP] game created");

    Ok(HttpResponse::Created().json(CreateGameResponse {
        game_id: record.game_id,
        game_mode: record.mode,
    }))
}

/// GET /api/games/{game_id}
async fn get_game(
    _current_user: CurrentUser,
    game: GamePath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = app_state
        .hub
        .store()
        .load_config(game.0)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::GameNotFound, format!("Game {} not found", game.0))
        })?;

    Ok(HttpResponse::Ok().json(GameSummary {
        game_id: record.game_id,
        game_mode: record.mode,
        owner: record.owner,
        config: record.config,
        live: app_state.hub.is_live(record.game_id),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_game))
        .route("/{game_id}", web::get().to(get_game));
}
