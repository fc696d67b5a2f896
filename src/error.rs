use std::path::PathBuf;

/// Why an in-range move request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMove {
    #[error("cell {0} is already occupied")]
    Occupied(usize),

    #[error("the game is over")]
    GameOver,

    #[error("it is the computer's turn")]
    ComputerTurn,
}

/// Errors returned when a move request is rejected. The game state is left
/// untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cell index {0} is out of range (expected 0..16)")]
    InvalidIndex(usize),

    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
