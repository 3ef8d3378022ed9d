use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use serde::Deserialize;

use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::protocol::UserId;
use crate::state::app_state::AppState;

/// The authenticated user.
///
/// The token is read from `Authorization: Bearer <token>` or, for browser
/// WebSocket upgrades that cannot set headers, from the `token` query
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer(req: &HttpRequest) -> Result<Option<String>, AppError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized_missing_bearer())?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(Some(token.to_string())),
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}

fn query_token(req: &HttpRequest) -> Option<String> {
    web::Query::<TokenQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().token)
        .filter(|token| !token.is_empty())
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token = match bearer(&req)? {
                Some(token) => token,
                None => query_token(&req).ok_or_else(AppError::unauthorized_missing_bearer)?,
            };

            let app_state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not available".to_string()))?;
            let claims = verify_access_token(&token, &app_state.security)?;
            Ok(CurrentUser {
                id: claims.user_id()?,
            })
        })
    }
}
