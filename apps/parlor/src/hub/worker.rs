use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::session::{SessionCore, SessionSettings, SessionSnapshot};
use crate::domain::dictionary::Dictionary;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::protocol::{GameId, UserId};
use crate::store::Store;

pub(crate) enum Command {
    Attach {
        conn_id: Uuid,
        user: UserId,
        outbound: mpsc::UnboundedSender<String>,
        reply: oneshot::Sender<Result<(), AppError>>,
    },
    Detach {
        conn_id: Uuid,
    },
    Envelope {
        user: UserId,
        text: String,
    },
}

/// The registry's entry for a running worker.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    pub id: Uuid,
    pub tx: mpsc::UnboundedSender<Command>,
}

enum Event {
    Command(Option<Command>),
    Timer,
    Shutdown,
}

struct Attached {
    user: UserId,
    outbound: mpsc::UnboundedSender<String>,
}

pub(crate) struct Worker {
    game_id: GameId,
    handle_id: Uuid,
    rx: mpsc::UnboundedReceiver<Command>,
    sessions: Arc<DashMap<GameId, SessionHandle>>,
    store: Arc<dyn Store>,
    dictionary: Arc<Dictionary>,
    settings: SessionSettings,
    shutdown: CancellationToken,
    connections: HashMap<Uuid, Attached>,
}

/// What a worker needs from the registry besides its game id.
pub(crate) struct WorkerContext {
    pub sessions: Arc<DashMap<GameId, SessionHandle>>,
    pub store: Arc<dyn Store>,
    pub dictionary: Arc<Dictionary>,
    pub settings: SessionSettings,
    pub shutdown: CancellationToken,
}

/// Start a worker for `game_id` and return its handle. The worker loads the
/// game on its own, so this never blocks.
pub(crate) fn spawn(game_id: GameId, context: WorkerContext, tracker: &TaskTracker) -> SessionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = SessionHandle {
        id: Uuid::new_v4(),
        tx,
    };
    let worker = Worker {
        game_id,
        handle_id: handle.id,
        rx,
        sessions: context.sessions,
        store: context.store,
        dictionary: context.dictionary,
        settings: context.settings,
        shutdown: context.shutdown,
        connections: HashMap::new(),
    };
    tracker.spawn(worker.run());
    handle
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl Worker {
    async fn run(mut self) {
        let mut core = match self.load().await {
            Ok(core) => core,
            Err(err) => {
                warn!(game_id = self.game_id, error = %err, "[HUB] unable to open session");
                self.refuse(&err);
                return;
            }
        };
        info!(game_id = self.game_id, mode = core.mode().as_str(), "[HUB] session opened");

        loop {
            let wakeup = core.next_wakeup();
            let event = tokio::select! {
                command = self.rx.recv() => Event::Command(command),
                _ = wait_until(wakeup) => Event::Timer,
                _ = self.shutdown.cancelled() => Event::Shutdown,
            };
            match event {
                Event::Command(Some(command)) => self.apply(&mut core, command).await,
                Event::Command(None) => break,
                Event::Timer => core.tick(Instant::now()),
                Event::Shutdown => {
                    self.flush(&mut core).await;
                    break;
                }
            }
            self.flush(&mut core).await;

            if self.connections.is_empty() && !core.in_play() {
                break;
            }
        }

        self.close();
        info!(game_id = self.game_id, "[HUB] session closed");
    }

    async fn load(&self) -> Result<SessionCore, AppError> {
        let game_id = self.game_id;
        let record = self.store.load_config(game_id).await?.ok_or_else(|| {
            AppError::not_found(ErrorCode::GameNotFound, format!("Game {game_id} not found"))
        })?;

        let core = match self.store.load_state(game_id).await? {
            Some(saved) => {
                let snapshot: SessionSnapshot = serde_json::from_value(saved).map_err(|e| {
                    AppError::internal(format!("stored state for game {game_id} is unreadable: {e}"))
                })?;
                debug!(game_id, "[HUB] restoring saved session");
                SessionCore::restore(record, snapshot, self.dictionary.clone(), self.settings)?
            }
            None => SessionCore::new(record, self.dictionary.clone(), self.settings)?,
        };
        Ok(core)
    }

    async fn apply(&mut self, core: &mut SessionCore, command: Command) {
        match command {
            Command::Attach {
                conn_id,
                user,
                outbound,
                reply,
            } => {
                let saved = if core.roster().contains(user) {
                    None
                } else {
                    match self.store.load_player_state(self.game_id, user).await {
                        Ok(saved) => saved,
                        Err(err) => {
                            error!(game_id = self.game_id, user_id = user, error = %err, "[HUB] unable to load player");
                            None
                        }
                    }
                };
                core.attach(user, saved);
                self.connections.insert(conn_id, Attached { user, outbound });
                if reply.send(Ok(())).is_err() {
                    // The caller stopped waiting; nobody owns this connection.
                    self.connections.remove(&conn_id);
                    debug!(game_id = self.game_id, user_id = user, %conn_id, "[HUB] attach abandoned");
                    return;
                }
                debug!(game_id = self.game_id, user_id = user, %conn_id, "[HUB] connection attached");
            }
            Command::Detach { conn_id } => {
                if let Some(attached) = self.connections.remove(&conn_id) {
                    debug!(game_id = self.game_id, user_id = attached.user, %conn_id, "[HUB] connection detached");
                }
            }
            Command::Envelope { user, text } => core.dispatch(user, &text, Instant::now()),
        }
    }

    /// Hand queued notifications to every attached connection, then save.
    /// Messages that no connection of a user accepted stay queued for them.
    async fn flush(&mut self, core: &mut SessionCore) {
        let mut users: Vec<UserId> = self.connections.values().map(|a| a.user).collect();
        users.sort_unstable();
        users.dedup();

        for user in users {
            let messages = core.drain(user);
            if messages.is_empty() {
                continue;
            }
            let mut heard = false;
            self.connections.retain(|conn_id, attached| {
                if attached.user != user {
                    return true;
                }
                let delivered = messages
                    .iter()
                    .all(|text| attached.outbound.send(text.clone()).is_ok());
                if !delivered {
                    debug!(user_id = user, %conn_id, "[HUB] connection went away");
                }
                heard |= delivered;
                delivered
            });
            if !heard {
                core.requeue(user, messages);
            }
        }

        if core.take_dirty() {
            let state = encode(core);
            let players = core.player_states();
            save(self.store.as_ref(), self.game_id, state, players).await;
        }
    }

    /// Unregister and stop accepting commands. Attach requests still queued
    /// lose their reply, which tells the registry to start a fresh worker.
    fn close(&mut self) {
        let handle_id = self.handle_id;
        self.sessions
            .remove_if(&self.game_id, |_, handle| handle.id == handle_id);
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    /// Loading failed: answer every queued attach with the failure.
    fn refuse(&mut self, err: &AppError) {
        let handle_id = self.handle_id;
        self.sessions
            .remove_if(&self.game_id, |_, handle| handle.id == handle_id);
        self.rx.close();
        while let Ok(command) = self.rx.try_recv() {
            if let Command::Attach { reply, .. } = command {
                let _ = reply.send(Err(refusal(self.game_id, err)));
            }
        }
    }
}

fn encode(core: &SessionCore) -> Result<Value, AppError> {
    let snapshot = core.snapshot()?;
    serde_json::to_value(snapshot)
        .map_err(|e| AppError::internal(format!("unable to encode session: {e}")))
}

async fn save(store: &dyn Store, game_id: GameId, state: Result<Value, AppError>, players: Vec<(UserId, Value)>) {
    match state {
        Ok(state) => {
            if let Err(err) = store.save_state(game_id, state).await {
                error!(game_id, error = %err, "[HUB] unable to save session");
            }
        }
        Err(err) => error!(game_id, error = %err, "[HUB] unable to snapshot session"),
    }

    for (user, state) in players {
        if let Err(err) = store.save_player_state(game_id, user, state).await {
            error!(game_id, user_id = user, error = %err, "[HUB] unable to save player");
        }
    }
}

fn refusal(game_id: GameId, err: &AppError) -> AppError {
    match err.code() {
        ErrorCode::GameNotFound => {
            AppError::not_found(ErrorCode::GameNotFound, format!("Game {game_id} not found"))
        }
        ErrorCode::ValidationError | ErrorCode::ConfigError => {
            AppError::invalid(err.code(), err.to_string())
        }
        _ => AppError::internal(format!("unable to open game {game_id}: {err}")),
    }
}
