//! # Encounter Placement
//!
//! Species tables and the rejection-sampling pass that scatters monsters
//! across a freshly generated level, away from the player's start.

use crate::config;
use crate::game::entities::{
    AiBehavior, CombatProfile, DeathKind, Entity, EntityArena, HealthProfile, MonsterControlled,
    NameSet,
};
use crate::game::world::WorldGrid;
use crate::game::{Position, Rgb};
use rand::rngs::StdRng;
use rand::Rng;

/// Monster species found along the river.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    /// Slow melee bruiser on the banks
    Skeleton,
    /// Fast flier that leaves no corpse
    Ghost,
    /// Ranged attacker that volleys from the shore
    Cultist,
}

/// How many monsters a level holds.
pub fn monster_quota(level: u32) -> usize {
    (3 + 2 * level) as usize
}

/// Level-keyed weighted species roll: deeper levels skew toward ghosts and
/// cultists.
pub fn roll_species(rng: &mut StdRng, level: u32) -> Species {
    let skeleton = 50;
    let ghost = 15 + 5 * level;
    let cultist = 5 + 5 * level;
    let total = skeleton + ghost + cultist;
    let roll = rng.gen_range(0..total);
    if roll < skeleton {
        Species::Skeleton
    } else if roll < skeleton + ghost {
        Species::Ghost
    } else {
        Species::Cultist
    }
}

/// Builds a monster of the given species at a position.
pub fn spawn_monster(species: Species, pos: Position) -> Entity {
    match species {
        Species::Skeleton => {
            let mut e = Entity::new(pos, 's', Rgb::new(220, 220, 200), 1);
            e.ai = Some(AiBehavior::Monster(MonsterControlled::default()));
            e.combat = Some(CombatProfile::new(12, 10, 4, 0));
            e.health = Some(HealthProfile::new(10, 1, DeathKind::Monster));
            e.names = Some(NameSet::new(
                "skeleton",
                "The skeleton",
                "skeleton corpse",
                "skeleton's",
                "claws",
                "rusted mail",
            ));
            e
        }
        Species::Ghost => {
            let mut e = Entity::new(pos, 'g', Rgb::new(170, 190, 230), 2);
            e.can_fly = true;
            e.ai = Some(AiBehavior::Monster(MonsterControlled::default()));
            e.combat = Some(CombatProfile::new(13, 14, 3, 0));
            e.health = Some(HealthProfile::new(6, 0, DeathKind::Ghost));
            e.names = Some(NameSet::new(
                "ghost",
                "The ghost",
                "wisp of mist",
                "ghost's",
                "chill touch",
                "",
            ));
            e
        }
        Species::Cultist => {
            let mut e = Entity::new(pos, 'c', Rgb::new(180, 90, 90), 1);
            e.ai = Some(AiBehavior::Monster(MonsterControlled::default()));
            e.combat = Some(CombatProfile::new(12, 10, 4, 8));
            e.health = Some(HealthProfile::new(8, 0, DeathKind::Monster));
            e.names = Some(NameSet::new(
                "cultist",
                "The cultist",
                "cultist corpse",
                "cultist's",
                "sling",
                "robes",
            ));
            e
        }
    }
}

/// Scatters the level's monster quota by rejection sampling.
///
/// Candidate cells are drawn uniformly and rejected when they fall inside the
/// exclusion radius of the player start, are unwalkable or occupied, or are
/// water the candidate cannot fly over. Returns the number actually placed;
/// the attempt budget only matters on pathological grids.
pub fn place_monsters(
    grid: &WorldGrid,
    actors: &mut EntityArena,
    rng: &mut StdRng,
    level: u32,
    player_start: Position,
) -> usize {
    let quota = monster_quota(level);
    let mut placed = 0;
    let mut attempts = 0;
    while placed < quota && attempts < 10_000 {
        attempts += 1;
        let species = roll_species(rng, level);
        let candidate = Position::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        if candidate.distance_sq(player_start) < config::PLACEMENT_EXCLUSION_SQ {
            continue;
        }
        if !grid.can_walk(candidate.x, candidate.y, actors) {
            continue;
        }
        let monster = spawn_monster(species, candidate);
        if grid.is_water(candidate.x, candidate.y) && !monster.can_fly {
            continue;
        }
        actors.insert(monster);
        placed += 1;
    }
    log::debug!("placed {}/{} monsters in {} attempts", placed, quota, attempts);
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_quota_scales_with_level() {
        assert_eq!(monster_quota(1), 5);
        assert!(monster_quota(4) > monster_quota(1));
    }

    #[test]
    fn test_species_roll_covers_table() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = [false; 3];
        for _ in 0..500 {
            match roll_species(&mut rng, 3) {
                Species::Skeleton => seen[0] = true,
                Species::Ghost => seen[1] = true,
                Species::Cultist => seen[2] = true,
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_spawn_monster_components() {
        let skeleton = spawn_monster(Species::Skeleton, Position::new(1, 1));
        assert!(!skeleton.can_fly);
        assert!(matches!(skeleton.ai, Some(AiBehavior::Monster(_))));
        assert_eq!(skeleton.health.as_ref().unwrap().kind, DeathKind::Monster);

        let ghost = spawn_monster(Species::Ghost, Position::new(1, 1));
        assert!(ghost.can_fly);
        assert_eq!(ghost.health.as_ref().unwrap().kind, DeathKind::Ghost);

        let cultist = spawn_monster(Species::Cultist, Position::new(1, 1));
        assert!(cultist.combat.as_ref().unwrap().max_range > 0);
    }
}
