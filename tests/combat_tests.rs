//! Integration tests for combat resolution and death transitions.

use obol::game::combat;
use obol::generation::encounters::{spawn_monster, Species};
use obol::{EntityId, GameState, GameStatus, ObolResult, Position, ZOrder};

fn state_with_monster(seed: u64, species: Species) -> ObolResult<(GameState, EntityId)> {
    let mut state = GameState::new(seed)?;
    let start = state.player_position().ok_or_else(|| {
        obol::ObolError::InvalidState("player missing after startup".to_string())
    })?;
    let monster = spawn_monster(species, Position::new(start.x + 1, start.y));
    let id = state.actors.insert(monster);
    Ok((state, id))
}

#[test]
fn test_lethal_damage_leaves_a_corpse() -> ObolResult<()> {
    let (mut state, skeleton) = state_with_monster(10, Species::Skeleton)?;
    combat::take_damage(&mut state, skeleton, 999);

    // Skeletons die in place: the handle stays live but the entity becomes
    // an inert corpse drawn under everything.
    let corpse = state.actors.get(skeleton).ok_or_else(|| {
        obol::ObolError::InvalidState("corpse vanished".to_string())
    })?;
    assert!(corpse.is_dead());
    assert_eq!(corpse.glyph, '%');
    assert!(!corpse.blocks);
    assert_eq!(corpse.z_order, ZOrder::Corpse);
    assert!(state.log.contains("dies!"));
    Ok(())
}

#[test]
fn test_ghost_death_removes_the_entity() -> ObolResult<()> {
    let (mut state, ghost) = state_with_monster(10, Species::Ghost)?;
    let before = state.actors.len();
    combat::take_damage(&mut state, ghost, 999);

    // Unlike a skeleton, a dead ghost leaves nothing behind at all.
    assert!(!state.actors.contains(ghost));
    assert_eq!(state.actors.len(), before - 1);
    assert!(state.log.contains("dissipates"));
    Ok(())
}

#[test]
fn test_skeleton_death_keeps_the_entity_count() -> ObolResult<()> {
    let (mut state, skeleton) = state_with_monster(10, Species::Skeleton)?;
    let before = state.actors.len();
    combat::take_damage(&mut state, skeleton, 999);

    assert_eq!(state.actors.len(), before);
    Ok(())
}

#[test]
fn test_attack_outcome_is_seed_deterministic() -> ObolResult<()> {
    let run = |seed: u64| -> ObolResult<Vec<String>> {
        let (mut state, skeleton) = state_with_monster(seed, Species::Skeleton)?;
        let player = state.player;
        for _ in 0..10 {
            combat::attack(&mut state, player, skeleton, 0);
        }
        Ok(state.log.lines().to_vec())
    };
    assert_eq!(run(31337)?, run(31337)?);
    Ok(())
}

#[test]
fn test_death_fires_exactly_once() -> ObolResult<()> {
    let (mut state, skeleton) = state_with_monster(11, Species::Skeleton)?;
    combat::take_damage(&mut state, skeleton, 999);
    combat::take_damage(&mut state, skeleton, 999);

    let deaths = state.log.lines().iter().filter(|l| l.contains("dies!")).count();
    assert_eq!(deaths, 1);
    Ok(())
}

#[test]
fn test_player_death_is_defeat() -> ObolResult<()> {
    let mut state = GameState::new(12)?;
    let player = state.player;
    combat::take_damage(&mut state, player, 999);

    assert_eq!(state.status, GameStatus::Defeat);
    assert!(state.log.contains("You died!"));
    Ok(())
}

#[test]
fn test_raft_loss_is_defeat() -> ObolResult<()> {
    let mut state = GameState::new(12)?;
    let raft = state.raft;
    combat::take_damage(&mut state, raft, 999);

    assert_eq!(state.status, GameStatus::Defeat);
    Ok(())
}

#[test]
fn test_armor_soaks_damage() -> ObolResult<()> {
    let (mut state, skeleton) = state_with_monster(13, Species::Skeleton)?;
    if let Some(h) = state.actors.get_mut(skeleton).and_then(|e| e.health.as_mut()) {
        h.armor = 1000;
    }

    // With absurd armor every hit bounces and hp never moves.
    let player = state.player;
    for _ in 0..50 {
        combat::attack(&mut state, player, skeleton, 0);
    }
    let hp = state
        .actors
        .get(skeleton)
        .and_then(|e| e.health.as_ref())
        .map(|h| h.hp);
    assert_eq!(hp, Some(10));
    assert!(!state.log.contains("dies!"));
    Ok(())
}

#[test]
fn test_melee_eventually_lands() -> ObolResult<()> {
    let (mut state, skeleton) = state_with_monster(14, Species::Skeleton)?;

    // Rolls are random but a mean-15 attack against a mean-10 dodge cannot
    // whiff two hundred times in a row.
    let player = state.player;
    for _ in 0..200 {
        combat::attack(&mut state, player, skeleton, 0);
        let dead = state.actors.get(skeleton).map(|e| e.is_dead()).unwrap_or(true);
        if dead {
            break;
        }
    }
    assert!(state.actors.get(skeleton).map(|e| e.is_dead()).unwrap_or(true));
    Ok(())
}

#[test]
fn test_attack_message_precedes_death_message() -> ObolResult<()> {
    let (mut state, skeleton) = state_with_monster(15, Species::Skeleton)?;
    if let Some(h) = state.actors.get_mut(skeleton).and_then(|e| e.health.as_mut()) {
        h.hp = 1;
        h.armor = 0;
    }

    let player = state.player;
    for _ in 0..200 {
        combat::attack(&mut state, player, skeleton, 0);
        if state.log.contains("dies!") {
            break;
        }
    }

    let lines = state.log.lines();
    let hit = lines.iter().position(|l| l.contains("damage to the"));
    let death = lines.iter().position(|l| l.contains("dies!"));
    match (hit, death) {
        (Some(hit), Some(death)) => assert!(hit < death),
        _ => panic!("expected both a hit line and a death line"),
    }
    Ok(())
}

#[test]
fn test_range_modifier_grows_with_distance() {
    assert_eq!(combat::range_modifier(0.0), 0);
    assert!(combat::range_modifier(12.0) > combat::range_modifier(4.0));
}
