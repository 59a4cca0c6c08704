//! # World Grid
//!
//! The 2-D tile grid a level is played on. Per-tile velocity, flow direction,
//! and display color are derived from the [`RiverModel`] the grid owns; the
//! grid is rebuilt from scratch whenever a level starts.
//!
//! All point queries have safe out-of-bounds defaults (not a wall, zero
//! velocity) rather than faulting: movement logic probes cells freely.

use crate::game::entities::EntityArena;
use crate::game::{Position, Rgb};
use crate::generation::river::RiverModel;
use crate::{config, ObolResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

const WATER_COLOR: Rgb = Rgb::new(32, 84, 170);
const BEACH_COLOR: Rgb = Rgb::new(194, 178, 128);
const BACKGROUND_COLOR: Rgb = Rgb::new(26, 48, 26);

/// A single map cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub can_walk: bool,
    /// Flow speed at this cell; zero on dry land
    pub velocity: f32,
    /// Downstream flow component
    pub u: f32,
    /// Cross-stream flow component
    pub v: f32,
    /// Render-only blended color
    pub color: Rgb,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            can_walk: true,
            velocity: 0.0,
            u: 0.0,
            v: 0.0,
            color: BACKGROUND_COLOR,
        }
    }
}

/// Tile grid for one river segment, wrapping the river it was derived from.
#[derive(Debug, Clone)]
pub struct WorldGrid {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    river: RiverModel,
}

impl WorldGrid {
    /// Builds the grid for a new level: synthesizes a river spanning the grid
    /// width and derives every tile's velocity, flow vector, and color.
    pub fn new(rng: &mut StdRng, width: i32, height: i32) -> ObolResult<Self> {
        let river = RiverModel::new(rng, width)?;
        let mut tiles = vec![Tile::default(); (width * height) as usize];
        for x in 0..width {
            let angle = river.angle_at(x);
            for y in 0..height {
                let velocity = river.velocity_at(x, y);
                let tile = &mut tiles[(x + y * width) as usize];
                tile.velocity = velocity;
                tile.u = velocity * angle.cos();
                tile.v = velocity * angle.sin();
                tile.color = if velocity > 0.0 {
                    BEACH_COLOR.blend(WATER_COLOR, velocity / river.max_velocity)
                } else if river.is_beach(x, y) {
                    BEACH_COLOR
                } else {
                    BACKGROUND_COLOR
                };
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
            river,
        })
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if self.in_bounds(x, y) {
            Some(&self.tiles[(x + y * self.width) as usize])
        } else {
            None
        }
    }

    /// Out-of-bounds cells read as not-a-wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map(|t| !t.can_walk).unwrap_or(false)
    }

    pub fn is_water(&self, x: i32, y: i32) -> bool {
        self.velocity(x, y) > 0.0
    }

    pub fn is_beach(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.river.is_beach(x, y)
    }

    pub fn is_rock(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.river.rock_at(x, y)
    }

    /// Flow speed at a cell; zero out of bounds.
    pub fn velocity(&self, x: i32, y: i32) -> f32 {
        self.tile(x, y).map(|t| t.velocity).unwrap_or(0.0)
    }

    /// Downstream flow component at a cell; zero out of bounds.
    pub fn u_velocity(&self, x: i32, y: i32) -> f32 {
        self.tile(x, y).map(|t| t.u).unwrap_or(0.0)
    }

    /// Cross-stream flow component at a cell; zero out of bounds.
    pub fn v_velocity(&self, x: i32, y: i32) -> f32 {
        self.tile(x, y).map(|t| t.v).unwrap_or(0.0)
    }

    /// Whether a cell is walkable and free of blocking entities.
    ///
    /// Returning false is the normal signal movement logic uses to choose an
    /// alternate step, never an error.
    pub fn can_walk(&self, x: i32, y: i32, actors: &EntityArena) -> bool {
        self.in_bounds(x, y)
            && self.tiles[(x + y * self.width) as usize].can_walk
            && !actors.blocked_at(Position::new(x, y))
    }

    /// The dry spawn cell just beyond the channel edge at a column.
    pub fn player_start(&self, x: i32) -> Position {
        Position::new(x, self.river.player_start_y(x))
    }

    /// Column whose crossing triggers the level transition.
    pub fn exit_column(&self) -> i32 {
        self.width - config::EXIT_MARGIN
    }

    pub fn river(&self) -> &RiverModel {
        &self.river
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Entity, EntityArena};
    use rand::SeedableRng;

    fn grid(seed: u64) -> WorldGrid {
        let mut rng = StdRng::seed_from_u64(seed);
        WorldGrid::new(&mut rng, 500, 120).unwrap()
    }

    #[test]
    fn test_out_of_bounds_queries_are_safe() {
        let grid = grid(1);
        assert!(!grid.is_wall(-1, -1));
        assert!(!grid.is_wall(1000, 5));
        assert_eq!(grid.velocity(-5, 3), 0.0);
        assert_eq!(grid.u_velocity(700, 0), 0.0);
        assert_eq!(grid.v_velocity(0, -9), 0.0);
        assert!(!grid.is_beach(-1, 0));
        assert!(!grid.is_rock(0, 500));
    }

    #[test]
    fn test_flow_vector_magnitude_matches_velocity() {
        let grid = grid(9);
        for x in (0..500).step_by(17) {
            for y in 0..120 {
                let speed = grid.velocity(x, y);
                let magnitude = (grid.u_velocity(x, y).powi(2) + grid.v_velocity(x, y).powi(2)).sqrt();
                assert!((speed - magnitude).abs() < 1e-4, "at {},{}", x, y);
            }
        }
    }

    #[test]
    fn test_water_flows_downstream() {
        let grid = grid(21);
        let center = grid.river().channel_center(250).round() as i32;
        assert!(grid.is_water(250, center));
        assert!(grid.u_velocity(250, center) > 0.0);
    }

    #[test]
    fn test_can_walk_respects_blocking_entities() {
        let grid = grid(4);
        let mut actors = EntityArena::new();
        let start = grid.player_start(10);
        assert!(grid.can_walk(start.x, start.y, &actors));

        actors.insert(Entity::new(start, 'o', Rgb::new(120, 120, 120), 0));
        assert!(!grid.can_walk(start.x, start.y, &actors));
    }

    #[test]
    fn test_water_tiles_tinted_by_speed() {
        let grid = grid(13);
        let center = grid.river().channel_center(100).round() as i32;
        let tile = grid.tile(100, center).unwrap();
        assert!(tile.velocity > 0.0);
        assert_ne!(tile.color, BACKGROUND_COLOR);
    }
}
