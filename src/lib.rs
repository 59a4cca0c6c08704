//! # Obol
//!
//! A turn-based river-exploration roguelike simulation engine.
//!
//! ## Architecture Overview
//!
//! The crate is organized around a small set of cooperating systems:
//!
//! - **Game State**: an explicit world context ([`GameState`]) owning the
//!   entity arena, the tile grid, the RNG, and the message log
//! - **Entity System**: entities with optional capability components
//!   (AI behavior, combat profile, health profile, item payload)
//! - **Generation System**: procedural river synthesis and rejection-sampling
//!   placement of monsters and items
//! - **Turn Scheduling**: a compact state machine that sequences player and
//!   monster turns, aiming mode, and level transitions
//!
//! Rendering, window management, and keybinding configuration are external
//! collaborators: the engine exposes read-only tile/entity queries and an
//! ordered narration log, and consumes discrete [`PlayerIntent`] values.

pub mod game;
pub mod generation;
pub mod input;
pub mod narration;

pub use game::combat;
pub use game::entities::{
    AiBehavior, CombatProfile, DeathKind, Entity, EntityArena, EntityId, HealthProfile,
    ItemPayload, MonsterControlled, NameSet, PlayerControlled, ZOrder,
};
pub use game::state::{drift_landing, GameState};
pub use game::world::{Tile, WorldGrid};
pub use game::{Camera, Direction, GameStatus, Position, Rgb};
pub use generation::river::{RiverModel, Rock};
pub use generation::signal::synthesize;
pub use input::PlayerIntent;
pub use narration::MessageLog;

/// Core error type for the Obol engine.
///
/// The simulation itself has no recoverable error paths: invalid moves are
/// rejected silently and loss conditions are ordinary game states. This enum
/// covers construction/configuration misuse and I/O in the binary.
#[derive(thiserror::Error, Debug)]
pub enum ObolError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation parameters are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Obol codebase.
pub type ObolResult<T> = Result<T, ObolError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Map width in tiles (one river segment per level)
    pub const MAP_WIDTH: i32 = 500;

    /// Map height in tiles
    pub const MAP_HEIGHT: i32 = 120;

    /// Column of the player's starting position on each level
    pub const START_COLUMN: i32 = 10;

    /// Distance of the level-exit column from the right edge of the map
    pub const EXIT_MARGIN: i32 = 20;

    /// Euclidean distance at which a dormant monster wakes and pursues
    pub const ACTIVATION_RADIUS: f32 = 100.0;

    /// Squared distance kept clear of monsters and items around the start
    pub const PLACEMENT_EXCLUSION_SQ: f32 = 400.0;

    /// Reaching the exit of this level ends the journey
    pub const FINAL_LEVEL: u32 = 5;

    /// Defense threshold an attack roll must beat (plus dodge and modifiers)
    pub const BASE_DEFENSE: i32 = 10;

    /// Default viewport width in screen cells (two cells per tile)
    pub const VIEW_WIDTH: i32 = 120;

    /// Default viewport height in screen cells
    pub const VIEW_HEIGHT: i32 = 40;
}
