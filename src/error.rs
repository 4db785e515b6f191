//! Centralized error types for the Pac-Man simulation core.
//!
//! This module defines all error types used throughout the crate,
//! providing a consistent error handling approach.

use std::io;

use bevy_ecs::event::Event;
use glam::IVec2;

use crate::systems::GameStage;

/// Main error type for the simulation core.
///
/// Systems report errors by writing this as an event; [`crate::game::RoundController::tick`]
/// surfaces the first one written during a tick.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Cell {0} is outside the board")]
    OutOfBounds(IVec2),

    #[error("Not a direction: {0:?}")]
    InvalidDirection(String),

    #[error("Illegal stage transition from {from:?} to {to:?}")]
    IllegalTransition { from: GameStage, to: GameStage },

    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Error type for map parsing operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character in board: {0}")]
    UnknownCharacter(char),
    #[error("Map parsing failed: {0}")]
    ParseFailed(String),
}

/// Errors from loading or saving [`crate::config::Settings`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid colour {value:?} for {field}, expected #RRGGBB")]
    InvalidColour { field: &'static str, value: String },
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
