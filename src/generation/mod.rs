//! # Generation Module
//!
//! Procedural content generation: river signal synthesis, the river model
//! with its velocity field and rock obstacles, and rejection-sampling
//! placement of monsters and items.
//!
//! Everything here is pure given the random number generator that is threaded
//! through it; a seeded `StdRng` reproduces a level exactly.

pub mod encounters;
pub mod items;
pub mod river;
pub mod signal;

pub use encounters::{place_monsters, Species};
pub use items::place_items;
pub use river::{RiverModel, Rock};
pub use signal::synthesize;
