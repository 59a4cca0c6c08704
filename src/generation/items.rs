//! # Item Placement
//!
//! Weapons and armor are scattered on beach cells strictly between the
//! player's start column and the level exit, so every find lies along the
//! journey downstream.

use crate::config;
use crate::game::entities::{Entity, EntityArena, ItemPayload, NameSet};
use crate::game::world::WorldGrid;
use crate::game::{Position, Rgb};
use rand::rngs::StdRng;
use rand::Rng;

/// Builds a weapon pickup scaled to the current level.
pub fn spawn_weapon(rng: &mut StdRng, level: u32, pos: Position) -> Entity {
    let mut e = Entity::new(pos, '/', Rgb::new(200, 170, 90), 0);
    e.blocks = false;
    let (payload, name, proper, possessive) = if rng.gen_bool(0.4) {
        (
            ItemPayload::Weapon {
                mean_damage: 4 + level as i32,
                max_range: 10,
            },
            "bone bow",
            "The bone bow",
            "bone bow's",
        )
    } else {
        (
            ItemPayload::Weapon {
                mean_damage: 6 + 2 * level as i32,
                max_range: 0,
            },
            "ferryman's pike",
            "The ferryman's pike",
            "pike's",
        )
    };
    e.item = Some(payload);
    e.names = Some(NameSet::new(name, proper, name, possessive, name, ""));
    e
}

/// Builds an armor pickup scaled to the current level.
pub fn spawn_armor(level: u32, pos: Position) -> Entity {
    let mut e = Entity::new(pos, ']', Rgb::new(150, 150, 170), 0);
    e.blocks = false;
    e.item = Some(ItemPayload::Armor {
        armor: 1 + (level as i32) / 2,
    });
    e.names = Some(NameSet::new(
        "drowned man's cuirass",
        "The drowned man's cuirass",
        "drowned man's cuirass",
        "cuirass's",
        "",
        "drowned man's cuirass",
    ));
    e
}

/// How many item pickups a level holds.
pub fn item_quota(level: u32) -> usize {
    (2 + level / 2) as usize
}

/// Scatters this level's items by rejection sampling.
///
/// On top of the monster-placement criteria, item cells must be beach and lie
/// strictly between the start column and the exit column.
pub fn place_items(
    grid: &WorldGrid,
    actors: &mut EntityArena,
    rng: &mut StdRng,
    level: u32,
    player_start: Position,
) -> usize {
    let quota = item_quota(level);
    let mut placed = 0;
    let mut attempts = 0;
    while placed < quota && attempts < 10_000 {
        attempts += 1;
        let candidate = Position::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        if candidate.x <= player_start.x || candidate.x >= grid.exit_column() {
            continue;
        }
        if candidate.distance_sq(player_start) < config::PLACEMENT_EXCLUSION_SQ {
            continue;
        }
        if !grid.is_beach(candidate.x, candidate.y) {
            continue;
        }
        if !grid.can_walk(candidate.x, candidate.y, actors) {
            continue;
        }
        let item = if placed % 2 == 0 {
            spawn_weapon(rng, level, candidate)
        } else {
            spawn_armor(level, candidate)
        };
        actors.insert(item);
        placed += 1;
    }
    log::debug!("placed {}/{} items in {} attempts", placed, quota, attempts);
    placed
}
