//! WebSocket transport adapter.
//!
//! One actor per socket. Text frames go to the game's session worker as-is;
//! whatever the worker queues for this connection streams back out. The
//! adapter never parses envelopes; all protocol errors come from the session.

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::extractors::current_user::CurrentUser;
use crate::extractors::game_id::GamePath;
use crate::hub::ConnectionSender;
use crate::protocol::GameId;
use crate::state::app_state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// GET /ws/{game_id}
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    current_user: CurrentUser,
    game: GamePath,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let connection = app_state.hub.attach(game.0, current_user.id).await?;
    let (sender, outbound) = connection.into_parts();
    ws::start(WsSession::new(game.0, sender, outbound), &req, stream)
}

/// A notification from the session worker.
struct Outgoing(String);

pub struct WsSession {
    game_id: GameId,
    sender: ConnectionSender,
    outbound: Option<UnboundedReceiver<String>>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(game_id: GameId, sender: ConnectionSender, outbound: UnboundedReceiver<String>) -> Self {
        Self {
            game_id,
            sender,
            outbound: Some(outbound),
            last_heartbeat: Instant::now(),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    game_id = actor.game_id,
                    user_id = actor.sender.user(),
                    conn_id = %actor.sender.conn_id(),
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn close_with_error(&self, ctx: &mut ws::WebsocketContext<Self>, description: &str) {
        ctx.close(Some(ws::CloseReason {
            code: ws::CloseCode::Error,
            description: Some(description.to_string()),
        }));
        ctx.stop();
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            game_id = self.game_id,
            user_id = self.sender.user(),
            conn_id = %self.sender.conn_id(),
            "[WS SESSION] started"
        );
        if let Some(outbound) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(outbound).map(Outgoing));
        }
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(
            game_id = self.game_id,
            user_id = self.sender.user(),
            conn_id = %self.sender.conn_id(),
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Outgoing> for WsSession {
    fn handle(&mut self, Outgoing(text): Outgoing, ctx: &mut Self::Context) {
        ctx.text(text);
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        debug!(game_id = self.game_id, user_id = self.sender.user(), "[WS SESSION] session worker closed");
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Away)));
        ctx.stop();
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                if !self.sender.send(text.to_string()) {
                    self.close_with_error(ctx, "game session closed");
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.close_with_error(ctx, "binary frames are not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    game_id = self.game_id,
                    user_id = self.sender.user(),
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}
