//! # River Model
//!
//! Owns the synthesized width and centerline fields, the derived per-column
//! velocity scale, and the rock obstacles scattered inside the channel.
//!
//! The channel at column `x` is the band `shape[x] ± width[x] / 2`. Flow
//! speed across the channel follows a parabolic profile that peaks on the
//! centerline, scaled by an empirical width/velocity power-law fit.

use crate::generation::signal::synthesize;
use crate::{ObolError, ObolResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Narrowest channel width, in cells.
const MIN_WIDTH: f32 = 15.0;
/// Widest channel width, in cells.
const MAX_WIDTH: f32 = 40.0;
/// Lowest centerline y.
const MIN_TRAVEL: f32 = 30.0;
/// Highest centerline y.
const MAX_TRAVEL: f32 = 90.0;
/// Harmonics per synthesized field.
const NUM_PERIODS: usize = 3;
/// Shortest period of the width field; width wiggles faster than the drift.
const WIDTH_MIN_PERIOD: f32 = 200.0;
/// Shortest period of the centerline field.
const SHAPE_MIN_PERIOD: f32 = 150.0;

/// Constant of the velocity/width curve fit.
const VELOCITY_COEFF: f32 = 2.00;
/// Power of the velocity/width curve fit.
const VELOCITY_POWER: f32 = -0.395;
/// Volumetric flow rate (m^3/s) the fit was taken at.
const FLOW_RATE: f32 = 40.0;

/// Average spacing between rock columns, in cells.
const ROCK_SPACING: f32 = 40.0;

/// An in-channel obstacle occupying one or two adjacent cells along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rock {
    pub x: i32,
    pub y: i32,
    /// Extent along y: 1 or 2 cells
    pub width: i32,
}

/// Procedurally generated river: one segment per level.
#[derive(Debug, Clone)]
pub struct RiverModel {
    length: i32,
    width: Vec<f32>,
    shape: Vec<f32>,
    angle: Vec<f32>,
    mean_velocity: Vec<f32>,
    /// Global peak velocity, used to normalize physics and rendering
    pub max_velocity: f32,
    pub rocks: Vec<Rock>,
}

impl RiverModel {
    /// Synthesizes a river of the given length (the world width in columns).
    pub fn new(rng: &mut StdRng, length: i32) -> ObolResult<Self> {
        if length < 2 {
            return Err(ObolError::InvalidConfig(format!(
                "river length {} too short",
                length
            )));
        }
        let n = length as usize;
        let max_period = length as f32 * 2.0;

        let width = synthesize(
            rng,
            n,
            MIN_WIDTH,
            MAX_WIDTH,
            WIDTH_MIN_PERIOD,
            max_period,
            NUM_PERIODS,
        )?;
        let shape = synthesize(
            rng,
            n,
            MIN_TRAVEL,
            MAX_TRAVEL,
            SHAPE_MIN_PERIOD,
            max_period,
            NUM_PERIODS,
        )?;

        // Local flow direction from the discrete derivative of the centerline,
        // one-sided at the ends.
        let mut angle = vec![0.0; n];
        angle[0] = (shape[1] - shape[0]).atan();
        for i in 1..n - 1 {
            angle[i] = ((shape[i + 1] - shape[i - 1]) / 2.0).atan();
        }
        angle[n - 1] = (shape[n - 1] - shape[n - 2]).atan();

        let mut max_velocity = 0.0_f32;
        let mut mean_velocity = vec![0.0; n];
        for i in 0..n {
            mean_velocity[i] = VELOCITY_COEFF * (width[i] / FLOW_RATE).powf(VELOCITY_POWER);
            max_velocity = max_velocity.max(1.5 * mean_velocity[i]);
        }

        let rocks = Self::scatter_rocks(rng, &shape, &width);

        Ok(Self {
            length,
            width,
            shape,
            angle,
            mean_velocity,
            max_velocity,
            rocks,
        })
    }

    /// Sparse, irregularly spaced rocks inside the channel: each column has a
    /// `1 / ROCK_SPACING` chance of holding one.
    fn scatter_rocks(rng: &mut StdRng, shape: &[f32], width: &[f32]) -> Vec<Rock> {
        let mut rocks = Vec::new();
        for x in 0..shape.len() {
            if rng.gen::<f32>() < 1.0 / ROCK_SPACING {
                // Keep rocks off the banks so they sit in open water.
                let offset = rng.gen_range(-0.7..0.7_f32);
                let y = (shape[x] + offset * width[x] / 2.0).round() as i32;
                let extent = rng.gen_range(1..=2);
                rocks.push(Rock {
                    x: x as i32,
                    y,
                    width: extent,
                });
            }
        }
        rocks
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    /// Centerline y at a column.
    pub fn channel_center(&self, x: i32) -> f32 {
        self.shape[x.clamp(0, self.length - 1) as usize]
    }

    /// Channel width at a column. Positive for every column by construction
    /// of the synthesizer's output range.
    pub fn channel_width(&self, x: i32) -> f32 {
        self.width[x.clamp(0, self.length - 1) as usize]
    }

    /// Flow direction angle at a column, in radians.
    pub fn angle_at(&self, x: i32) -> f32 {
        self.angle[x.clamp(0, self.length - 1) as usize]
    }

    /// Fastest flow speed at a column (the centerline value).
    pub fn peak_velocity(&self, x: i32) -> f32 {
        1.5 * self.mean_velocity[x.clamp(0, self.length - 1) as usize]
    }

    /// Cross-sectional flow profile: parabolic in the normalized offset from
    /// the centerline, zero outside the wetted channel.
    pub fn velocity_profile(&self, x: i32, y: f32) -> f32 {
        let i = x.clamp(0, self.length - 1) as usize;
        let rescaled = (y - self.shape[i]) / (self.width[i] / 2.0);
        if rescaled.abs() < 1.0 {
            (1.0 - rescaled * rescaled) * 1.5 * self.mean_velocity[i]
        } else {
            0.0
        }
    }

    /// Flow speed at a grid cell.
    pub fn velocity_at(&self, x: i32, y: i32) -> f32 {
        self.velocity_profile(x, y as f32)
    }

    /// True in the thin dry band just outside the wetted channel.
    pub fn is_beach(&self, x: i32, y: i32) -> bool {
        let i = x.clamp(0, self.length - 1) as usize;
        let rescaled = ((y as f32 - self.shape[i]) / (self.width[i] / 2.0)).abs();
        rescaled > 1.0 && rescaled < 1.2
    }

    /// A dry, walkable spawn row just beyond the channel edge at a column.
    pub fn player_start_y(&self, x: i32) -> i32 {
        let i = x.clamp(0, self.length - 1) as usize;
        (self.shape[i] + self.width[i] / 2.0) as i32 + 2
    }

    /// Whether a cell is covered by a rock obstacle.
    pub fn rock_at(&self, x: i32, y: i32) -> bool {
        self.rocks
            .iter()
            .any(|rock| rock.x == x && y >= rock.y && y < rock.y + rock.width)
    }
}
