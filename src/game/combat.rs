//! # Combat Resolution
//!
//! Stochastic hit/dodge/damage computation and the death transitions.
//!
//! Attack and dodge rolls are drawn from normal distributions parameterized
//! by the combatants' profiles; damage is a third draw reduced by the
//! target's flat armor and capped at its remaining hp. Narration for a blow
//! is emitted before hp is mutated, so the killing line always reads
//! "deals N damage to X" followed by the death line, never the reverse.

use crate::config::BASE_DEFENSE;
use crate::game::entities::{DeathKind, EntityId, ZOrder};
use crate::game::state::GameState;
use crate::game::{GameStatus, Rgb};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Situational modifier applied to ordinary melee swings.
pub const MELEE_MODIFIER: i32 = 0;

const CORPSE_COLOR: Rgb = Rgb::new(240, 0, 0);

/// Draws from `Normal(mean, mean / 3)` clamped to zero. A non-positive mean
/// always rolls zero.
pub fn gauss_roll(rng: &mut StdRng, mean: f32) -> i32 {
    if mean <= 0.0 {
        return 0;
    }
    match Normal::new(mean, mean / 3.0) {
        Ok(dist) => (dist.sample(rng) as i32).max(0),
        Err(_) => 0,
    }
}

/// Core functionality behind every attack, melee and ranged alike.
///
/// `modifier` raises the defense threshold: positive values make the swing
/// harder to land (long range, awkward footing).
pub fn attack(state: &mut GameState, attacker: EntityId, target: EntityId, modifier: i32) {
    let (attack_mean, mean_damage, attacker_name) = match state.actors.get(attacker) {
        Some(e) => match e.combat.as_ref() {
            Some(c) => (c.attack, c.mean_damage, e.proper_name().to_string()),
            None => return,
        },
        None => return,
    };
    if !state.actors.contains(target) {
        return;
    }

    let attack_roll = gauss_roll(&mut state.rng, (attack_mean - 3) as f32);
    log::debug!("attack roll: {} / {}", attack_roll, attack_mean);

    let hits = does_it_hit(state, attack_roll, modifier, target);
    let mut damage = 0;
    let mut penetrates = false;
    if hits {
        damage = roll_damage(state, mean_damage, target);
        if damage > 0 {
            penetrates = true;
        }
        let target_hp = state
            .actors
            .get(target)
            .and_then(|e| e.health.as_ref())
            .map(|h| h.hp)
            .unwrap_or(0);
        damage = damage.min(target_hp);
    }

    // Narrate first: hp mutation may trigger the death line, which must come
    // after the blow that caused it.
    message(state, hits, penetrates, damage, &attacker_name, target);
    take_damage(state, target, damage);
}

/// Whether an attack roll connects. Landing a hit and penetrating armor are
/// separate questions; this only answers the first.
fn does_it_hit(state: &mut GameState, attack_roll: i32, modifier: i32, target: EntityId) -> bool {
    let dodge_mean = state
        .actors
        .get(target)
        .and_then(|e| e.combat.as_ref())
        .map(|c| c.dodge);
    match dodge_mean {
        Some(dodge) => {
            let dodge_roll = gauss_roll(&mut state.rng, (dodge - 3) as f32);
            log::debug!("dodge roll: {} / {}", dodge_roll, dodge);
            attack_roll > BASE_DEFENSE + dodge_roll + modifier
        }
        // A target with no combat profile never dodges.
        None => true,
    }
}

/// Damage roll minus the target's flat armor. May go negative, meaning the
/// blow failed to penetrate.
fn roll_damage(state: &mut GameState, mean_damage: i32, target: EntityId) -> i32 {
    let mut damage = gauss_roll(&mut state.rng, mean_damage as f32);
    log::debug!("damage roll: {} / {}", damage, mean_damage);
    if let Some(armor) = state
        .actors
        .get(target)
        .and_then(|e| e.health.as_ref())
        .map(|h| h.armor)
    {
        damage -= armor;
    }
    damage
}

fn message(
    state: &mut GameState,
    hits: bool,
    penetrates: bool,
    damage: i32,
    attacker_name: &str,
    target: EntityId,
) {
    let (target_name, destructible) = match state.actors.get(target) {
        Some(e) => (e.name().to_string(), e.health.is_some()),
        None => return,
    };
    if destructible {
        if penetrates {
            state.log.print(format!(
                "{} deals {} damage to the {}.",
                attacker_name, damage, target_name
            ));
        } else if !hits {
            state
                .log
                .print(format!("{} misses the {}.", attacker_name, target_name));
        } else {
            state.log.print(format!(
                "{}'s blow bounces off the {}'s armor.",
                attacker_name, target_name
            ));
        }
    } else {
        state.log.print(format!(
            "{} attacks the {} in vain.",
            attacker_name, target_name
        ));
    }
}

/// Applies damage to a target's hp, firing the death transition when hp
/// crosses zero. Non-positive damage never reduces hp, and an already-dead
/// target never re-enters the death transition. Returns the damage applied.
pub fn take_damage(state: &mut GameState, target: EntityId, damage: i32) -> i32 {
    if damage <= 0 {
        return 0;
    }
    let mut died = false;
    match state.actors.get_mut(target).and_then(|e| e.health.as_mut()) {
        Some(health) => {
            if health.is_dead() {
                return 0;
            }
            health.hp -= damage;
            if health.hp <= 0 {
                died = true;
            }
        }
        None => return 0,
    }
    if died {
        die(state, target);
    }
    damage
}

/// The death transition, dispatched on the health profile's kind.
fn die(state: &mut GameState, id: EntityId) {
    let kind = match state.actors.get(id).and_then(|e| e.health.as_ref()) {
        Some(health) => health.kind,
        None => return,
    };
    match kind {
        DeathKind::Monster => {
            let name = state
                .actors
                .get(id)
                .map(|e| e.proper_name().to_string())
                .unwrap_or_default();
            state.log.print(format!("{} dies!", name));
            corpse_transform(state, id, ZOrder::Corpse);
        }
        DeathKind::Player => {
            state.log.print("You died!");
            // The player's corpse is drawn on top of everything.
            corpse_transform(state, id, ZOrder::PlayerTop);
            state.status = GameStatus::Defeat;
        }
        DeathKind::Raft => {
            state
                .log
                .print("The raft breaks apart and sinks beneath the current!");
            corpse_transform(state, id, ZOrder::Corpse);
            state.status = GameStatus::Defeat;
        }
        DeathKind::Ghost => {
            let name = state
                .actors
                .get(id)
                .map(|e| e.proper_name().to_string())
                .unwrap_or_default();
            state.log.print(format!("{} dissipates into mist.", name));
            state.actors.remove(id);
        }
    }
}

/// Transforms an entity into an inert, non-blocking corpse.
fn corpse_transform(state: &mut GameState, id: EntityId, z_order: ZOrder) {
    if let Some(entity) = state.actors.get_mut(id) {
        entity.glyph = '%';
        entity.color = CORPSE_COLOR;
        entity.blocks = false;
        entity.z_order = z_order;
        if let Some(names) = entity.names.as_mut() {
            names.name = names.corpse.clone();
        }
    }
}

/// Whether `target` lies within `owner`'s firing range.
pub fn in_range(state: &GameState, owner: EntityId, target: EntityId) -> bool {
    let (owner_pos, max_range) = match state.actors.get(owner) {
        Some(e) => match e.combat.as_ref() {
            Some(c) => (e.pos, c.max_range),
            None => return false,
        },
        None => return false,
    };
    if max_range <= 0 {
        return false;
    }
    match state.actors.get(target) {
        Some(e) => owner_pos.distance(e.pos) <= max_range as f32,
        None => false,
    }
}

/// Defense bonus granted against shots from far away.
pub fn range_modifier(distance: f32) -> i32 {
    (distance / 4.0) as i32
}
