use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::protocol::GameId;
use crate::state::app_state::AppState;

/// The `{game_id}` path segment, checked against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePath(pub GameId);

impl FromRequest for GamePath {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let raw = req
                .match_info()
                .get("game_id")
                .ok_or_else(|| AppError::bad_request("Missing game_id parameter".to_string()))?;
            let game_id = raw
                .parse::<GameId>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| AppError::bad_request(format!("Invalid game id: {raw}")))?;

            let app_state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not available".to_string()))?;
            if app_state.hub.store().load_config(game_id).await?.is_none() {
                return Err(AppError::not_found(
                    ErrorCode::GameNotFound,
                    format!("Game {game_id} not found"),
                ));
            }
            Ok(GamePath(game_id))
        })
    }
}
