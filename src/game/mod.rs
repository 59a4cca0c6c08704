//! # Game Module
//!
//! Core world representation, entity system, combat resolution, and the
//! turn-scheduling state machine.

pub mod combat;
pub mod entities;
pub mod state;
pub mod world;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate in the game world.
///
/// The y axis points up: row 0 is the bottom of the map and the river flows
/// toward increasing x.
///
/// # Examples
///
/// ```
/// use obol::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Euclidean distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use obol::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.distance(pos2), 5.0);
    /// ```
    pub fn distance(self, other: Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Squared Euclidean distance, for threshold comparisons without a sqrt.
    pub fn distance_sq(self, other: Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        dx * dx + dy * dy
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Directions for movement and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// North is up, which is +y in map coordinates.
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, 1),
            Direction::South => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::Northeast => Position::new(1, 1),
            Direction::Northwest => Position::new(-1, 1),
            Direction::Southeast => Position::new(1, -1),
            Direction::Southwest => Position::new(-1, -1),
        }
    }

    /// Converts a position delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a unit direction.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, 1) => Some(Direction::North),
            (0, -1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, 1) => Some(Direction::Northeast),
            (-1, 1) => Some(Direction::Northwest),
            (1, -1) => Some(Direction::Southeast),
            (-1, -1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// Returns all 8 directions.
    pub fn all() -> Vec<Direction> {
        vec![
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Northeast,
            Direction::Northwest,
            Direction::Southeast,
            Direction::Southwest,
        ]
    }
}

/// Overall game lifecycle, driving what the scheduler does each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// One-time level/entity initialization
    Startup,
    /// Waiting for the player's pending action
    Idle,
    /// Every active non-player entity gets exactly one update
    NewTurn,
    /// Ranged targeting: cursor selection within weapon range
    Aiming,
    /// Terminal: the journey is complete
    Victory,
    /// Terminal: the player or the raft is lost
    Defeat,
}

impl GameStatus {
    /// Whether this status absorbs all further simulation updates.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Victory | GameStatus::Defeat)
    }
}

/// A display color. Render-only: never consulted by simulation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend of two colors, `t` in `[0, 1]` selecting `other`.
    pub fn blend(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

/// Tracks the view center and converts between screen and grid coordinates.
///
/// Map cells are two terminal columns wide, and the terminal's y axis points
/// down while the map's points up; both conversions account for that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    /// Grid cell at the center of the view
    pub center: Position,
    /// Viewport width in terminal cells
    pub panel_width: i32,
    /// Viewport height in terminal cells
    pub panel_height: i32,
}

impl Camera {
    pub fn new(center: Position, panel_width: i32, panel_height: i32) -> Self {
        Self {
            center,
            panel_width,
            panel_height,
        }
    }

    /// Converts a screen-space cursor position to a grid cell.
    pub fn screen_to_grid(&self, screen: Position) -> Position {
        Position::new(
            self.center.x + (screen.x - self.panel_width / 2) / 2,
            self.center.y + self.panel_height / 2 - screen.y,
        )
    }

    /// Converts a grid cell to its screen-space position.
    pub fn grid_to_screen(&self, grid: Position) -> Position {
        Position::new(
            (grid.x - self.center.x) * 2 + self.panel_width / 2,
            self.panel_height / 2 - (grid.y - self.center.y),
        )
    }
}
