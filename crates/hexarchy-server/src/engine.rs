//! The single-writer engine loop.
//!
//! All simulation mutation happens on one task; transports push commands
//! into a bounded queue and never touch the game directly. Suspension points
//! are I/O only: receiving a command, writing a snapshot.

use crate::command::PlayerAction;
use crate::config::ServerConfig;
use crate::ServerError;
use hexarchy_core::{CivId, Game};
use std::fs;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Queue depth for inbound commands.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// A command for the engine task.
#[derive(Debug)]
pub enum Command {
    /// A player action; illegal actions are silently ignored by the core.
    Action { civ_id: CivId, action: PlayerAction },
    /// Finish the current turn and begin the next.
    EndTurn,
    /// Convert a player's seat to AI.
    Disconnect { civ_id: CivId },
    /// Write a snapshot under the configured save directory.
    Save {
        name: String,
        reply: oneshot::Sender<Result<PathBuf, ServerError>>,
    },
    /// Stop the engine task.
    Shutdown,
}

/// Handle for pushing commands into a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl EngineHandle {
    /// Enqueue a command; fails when the engine task has stopped.
    pub async fn send(&self, command: Command) -> Result<(), ServerError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| ServerError::EngineClosed)
    }

    /// Request a snapshot and wait for the written path.
    pub async fn save(&self, name: String) -> Result<PathBuf, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Save { name, reply }).await?;
        rx.await.map_err(|_| ServerError::EngineClosed)?
    }
}

/// Spawn the engine task for a game. Returns the command handle and the
/// task's join handle.
pub fn spawn(game: Game, config: ServerConfig) -> (EngineHandle, JoinHandle<Game>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let task = tokio::spawn(run(game, config, rx));
    (EngineHandle { tx }, task)
}

async fn run(mut game: Game, config: ServerConfig, mut rx: mpsc::Receiver<Command>) -> Game {
    info!(game = %game.meta.game_name, "engine started");
    while let Some(command) = rx.recv().await {
        match command {
            Command::Action { civ_id, action } => {
                let applied = dispatch(&mut game, civ_id, &action);
                if !applied {
                    debug!(civ = civ_id, ?action, "illegal action ignored");
                }
            }
            Command::EndTurn => {
                game.end_turn();
                debug!(turn = game.world.turn_count, "turn finished");
            }
            Command::Disconnect { civ_id } => {
                game.disconnect_player(civ_id);
            }
            Command::Save { name, reply } => {
                let result = write_snapshot(&game, &config, &name);
                if reply.send(result).is_err() {
                    warn!("snapshot requester went away");
                }
            }
            Command::Shutdown => break,
        }
    }
    info!(game = %game.meta.game_name, "engine stopped");
    game
}

/// Route a player action into the matching core handler. Returns whether
/// the core accepted it.
fn dispatch(game: &mut Game, civ_id: CivId, action: &PlayerAction) -> bool {
    let world = &mut game.world;
    match action {
        PlayerAction::MoveUnit { unit_id, target } => world.move_unit(civ_id, *unit_id, *target),
        PlayerAction::Attack { unit_id, target } => world.attack(civ_id, *unit_id, *target),
        PlayerAction::SettleCity { coords, name } => world.settle_city(civ_id, *coords, name),
        PlayerAction::BuildImprovement { coords, kind } => {
            world.build_improvement(civ_id, *coords, *kind)
        }
        PlayerAction::StartConstruction { coords, kind } => {
            world.start_construction(civ_id, *coords, *kind)
        }
        PlayerAction::TrainUnit {
            coords,
            kind,
            location,
        } => world.train_unit(civ_id, *coords, *kind, *location),
        PlayerAction::Research { coords, branch } => {
            world.research(civ_id, *coords, branch.clone())
        }
    }
}

/// Write a snapshot file, creating the save directory on demand.
fn write_snapshot(game: &Game, config: &ServerConfig, name: &str) -> Result<PathBuf, ServerError> {
    fs::create_dir_all(&config.save_dir)?;
    let path = config.save_dir.join(format!("{}.json", name));
    let snapshot = serde_json::to_string(&game.export())?;
    fs::write(&path, snapshot)?;
    info!(path = %path.display(), "snapshot written");
    Ok(path)
}

/// Load a snapshot file back into a game. A malformed snapshot is fatal at
/// load time; no partial state is published.
pub fn load_snapshot(config: &ServerConfig, name: &str) -> Result<Game, ServerError> {
    let path = config.save_dir.join(format!("{}.json", name));
    if !path.exists() {
        return Err(ServerError::MissingSave(path));
    }
    let content = fs::read_to_string(&path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(Game::import(value)?)
}
