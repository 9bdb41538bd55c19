//! Game settings and validation.

use serde::{Deserialize, Serialize};

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Display name for the game.
    pub game_name: String,
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Number of player seats (1-8).
    pub player_count: u8,
    /// Seed for deterministic map generation.
    pub seed: [u8; 32],
}

impl GameSettings {
    /// Create default settings for a new game.
    pub fn new(game_name: String) -> Self {
        Self {
            game_name,
            width: 40,
            height: 25,
            player_count: 2,
            seed: [0u8; 32],
        }
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.game_name.is_empty() {
            return Err(SettingsError::EmptyName);
        }
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::EmptyMap);
        }
        if self.width > 512 || self.height > 512 {
            return Err(SettingsError::MapTooLarge);
        }
        if self.player_count == 0 || self.player_count > 8 {
            return Err(SettingsError::InvalidPlayerCount(self.player_count));
        }
        Ok(())
    }
}

/// Errors from invalid settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsError {
    EmptyName,
    EmptyMap,
    MapTooLarge,
    InvalidPlayerCount(u8),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::EmptyName => write!(f, "Game name cannot be empty"),
            SettingsError::EmptyMap => write!(f, "Map dimensions must be positive"),
            SettingsError::MapTooLarge => write!(f, "Map dimensions exceed 512"),
            SettingsError::InvalidPlayerCount(n) => {
                write!(f, "Player count {} outside 1-8", n)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
