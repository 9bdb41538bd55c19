//! Hexarchy server: hosts one simulation on a dedicated task.
//!
//! The simulation core is single-writer; this crate provides the writer. A
//! bounded mpsc queue feeds [`engine::Command`]s from network receive
//! callbacks into one task that owns the [`hexarchy_core::Game`], and
//! snapshots are persisted as JSON files under a configured directory.

pub mod command;
pub mod config;
pub mod engine;

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the server layer.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] hexarchy_core::SaveError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] hexarchy_core::SettingsError),

    #[error("engine is no longer running")]
    EngineClosed,

    #[error("no such save: {0}")]
    MissingSave(PathBuf),
}

pub use command::PlayerAction;
pub use config::ServerConfig;
pub use engine::{Command, EngineHandle};
