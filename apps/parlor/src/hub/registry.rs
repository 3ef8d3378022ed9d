use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use uuid::Uuid;

use super::session::SessionSettings;
use super::worker::{self, Command, SessionHandle, WorkerContext};
use crate::domain::dictionary::Dictionary;
use crate::domain::rules::GameMode;
use crate::error::AppError;
use crate::modes::{build_driver, CommonOptions};
use crate::protocol::{GameId, UserId};
use crate::store::{GameRecord, Store};

/// A worker may close between lookup and attach; this many retries is plenty.
const ATTACH_ATTEMPTS: usize = 3;

/// Routes connections to the worker that owns their game, starting one on
/// demand.
pub struct Hub {
    sessions: Arc<DashMap<GameId, SessionHandle>>,
    store: Arc<dyn Store>,
    dictionary: Arc<Dictionary>,
    settings: SessionSettings,
    shutdown: CancellationToken,
    workers: TaskTracker,
}

impl Hub {
    pub fn new(store: Arc<dyn Store>, dictionary: Arc<Dictionary>, settings: SessionSettings) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            store,
            dictionary,
            settings,
            shutdown: CancellationToken::new(),
            workers: TaskTracker::new(),
        }
    }

    /// Stop every worker after it saves, and wait for them to finish.
    pub async fn shutdown(&self) {
        info!(sessions = self.sessions.len(), "[HUB] shutting down");
        self.shutdown.cancel();
        self.workers.close();
        self.workers.wait().await;
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    pub fn dictionary(&self) -> Arc<Dictionary> {
        self.dictionary.clone()
    }

    /// Number of games with a running worker.
    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_live(&self, game_id: GameId) -> bool {
        self.sessions.contains_key(&game_id)
    }

    /// Check the configuration, then persist a new game.
    pub async fn create_game(
        &self,
        mode: GameMode,
        owner: UserId,
        config: Value,
    ) -> Result<GameRecord, AppError> {
        CommonOptions::from_config(&config)?;
        build_driver(mode, &config, [0u8; 32], self.dictionary.clone())?;
        let record = self.store.create_game(mode, owner, config).await?;
        info!(game_id = record.game_id, mode = mode.as_str(), owner, "[HUB] game created");
        Ok(record)
    }

    /// Attach a connection for `user` to `game_id`.
    pub async fn attach(&self, game_id: GameId, user: UserId) -> Result<Connection, AppError> {
        for _ in 0..ATTACH_ATTEMPTS {
            let handle = self.handle_for(game_id);
            let conn_id = Uuid::new_v4();
            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (reply_tx, reply_rx) = oneshot::channel();

            let command = Command::Attach {
                conn_id,
                user,
                outbound: outbound_tx,
                reply: reply_tx,
            };
            if handle.tx.send(command).is_err() {
                self.forget(game_id, handle.id);
                continue;
            }
            match reply_rx.await {
                Ok(Ok(())) => {
                    return Ok(Connection {
                        sender: ConnectionSender {
                            conn_id,
                            user,
                            tx: handle.tx,
                        },
                        outbound: outbound_rx,
                    })
                }
                Ok(Err(err)) => return Err(err),
                Err(_) => {
                    debug!(game_id, user_id = user, "[HUB] session closed during attach; retrying");
                    self.forget(game_id, handle.id);
                }
            }
        }
        Err(AppError::internal(format!(
            "unable to attach to game {game_id}"
        )))
    }

    fn handle_for(&self, game_id: GameId) -> SessionHandle {
        self.sessions
            .entry(game_id)
            .or_insert_with(|| {
                let context = WorkerContext {
                    sessions: self.sessions.clone(),
                    store: self.store.clone(),
                    dictionary: self.dictionary.clone(),
                    settings: self.settings,
                    shutdown: self.shutdown.clone(),
                };
                worker::spawn(game_id, context, &self.workers)
            })
            .clone()
    }

    fn forget(&self, game_id: GameId, handle_id: Uuid) {
        self.sessions
            .remove_if(&game_id, |_, handle| handle.id == handle_id);
    }
}

/// One attached connection: send envelopes in, read notifications out.
pub struct Connection {
    pub sender: ConnectionSender,
    pub outbound: mpsc::UnboundedReceiver<String>,
}

impl Connection {
    pub fn conn_id(&self) -> Uuid {
        self.sender.conn_id
    }

    pub fn send(&self, text: impl Into<String>) -> bool {
        self.sender.send(text)
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    pub fn into_parts(self) -> (ConnectionSender, mpsc::UnboundedReceiver<String>) {
        (self.sender, self.outbound)
    }
}

/// The inbound half. Dropping it detaches the connection.
pub struct ConnectionSender {
    conn_id: Uuid,
    user: UserId,
    tx: mpsc::UnboundedSender<Command>,
}

impl ConnectionSender {
    pub fn conn_id(&self) -> Uuid {
        self.conn_id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    /// Queue a raw text frame; false once the session is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.tx
            .send(Command::Envelope {
                user: self.user,
                text: text.into(),
            })
            .is_ok()
    }
}

impl Drop for ConnectionSender {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Detach {
            conn_id: self.conn_id,
        });
    }
}
