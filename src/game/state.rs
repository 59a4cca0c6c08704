//! # Game State Module
//!
//! The explicit world context and the turn-scheduling state machine.
//!
//! [`GameState`] owns every mutable resource of the simulation: the entity
//! arena, the tile grid, the RNG, the narration log, and the camera. One call
//! to [`GameState::tick`] is one scheduling opportunity: the player may act,
//! and only when a full turn truly elapses does every active monster act
//! once. The scheduler itself never mutates entities directly; it sequences
//! calls into the movement and combat code.

use crate::game::combat::{self, MELEE_MODIFIER};
use crate::game::entities::{
    AiBehavior, CombatProfile, DeathKind, Entity, EntityArena, EntityId, HealthProfile,
    ItemPayload, NameSet, PlayerControlled,
};
use crate::game::world::WorldGrid;
use crate::game::{Camera, GameStatus, Position, Rgb};
use crate::generation::{encounters, items};
use crate::input::PlayerIntent;
use crate::narration::MessageLog;
use crate::{config, ObolResult};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ROCK_COLOR: Rgb = Rgb::new(110, 110, 110);
const RAFT_COLOR: Rgb = Rgb::new(140, 100, 50);
const PLAYER_COLOR: Rgb = Rgb::new(255, 255, 255);

/// Applies the current's displacement to an intended destination.
///
/// The rounding is deliberately favorable to the player: the flow component
/// is rounded to nearest on an axis the player did not intend to move, and
/// truncated toward zero on an axis they did. A deliberate step against the
/// current is never amplified by rounding.
pub fn drift_landing(start: Position, target: Position, u: f32, v: f32) -> Position {
    Position::new(
        target.x + if start.x == target.x { u.round() as i32 } else { u.trunc() as i32 },
        target.y + if start.y == target.y { v.round() as i32 } else { v.trunc() as i32 },
    )
}

/// Central game state: the world context threaded into AI, combat, and
/// scheduling calls. There is no ambient global; everything that mutates the
/// world goes through one `&mut GameState`.
#[derive(Debug)]
pub struct GameState {
    /// All entities, in slot (turn-resolution) order
    pub actors: EntityArena,
    /// Tile grid for the current river segment
    pub map: WorldGrid,
    /// The one process-wide generator, threaded through synthesis,
    /// placement, and combat rolls
    pub rng: StdRng,
    /// Order-preserving narration sink
    pub log: MessageLog,
    pub camera: Camera,
    pub player: EntityId,
    pub raft: EntityId,
    pub status: GameStatus,
    /// Current river segment, starting at 1
    pub level: u32,
    /// Grid cell currently under the targeting cursor
    pub aim_cursor: Position,
}

impl GameState {
    /// Creates a fresh game seeded for deterministic replay, with level 1
    /// generated and populated. The state starts in [`GameStatus::Startup`]
    /// and moves to `Idle` on the first tick.
    pub fn new(seed: u64) -> ObolResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let map = WorldGrid::new(&mut rng, config::MAP_WIDTH, config::MAP_HEIGHT)?;
        let mut actors = EntityArena::new();
        let player = actors.insert(Self::make_player(map.player_start(config::START_COLUMN)));

        let mut state = Self {
            actors,
            map,
            rng,
            log: MessageLog::new(),
            camera: Camera::new(Position::origin(), config::VIEW_WIDTH, config::VIEW_HEIGHT),
            player,
            raft: player,
            status: GameStatus::Startup,
            level: 1,
            aim_cursor: Position::origin(),
        };
        state.start_level()?;
        state
            .log
            .print("The ferryman takes your obol and pushes you off into the dark.");
        Ok(state)
    }

    /// Rebuilds the grid and entity set for the current level, carrying the
    /// player (hp, gear) across. The player is inserted last so it resolves
    /// and draws after everything else; the raft is inserted after the rocks
    /// so it draws above them.
    fn start_level(&mut self) -> ObolResult<()> {
        let carried = self.actors.get(self.player).cloned();
        self.map = WorldGrid::new(&mut self.rng, config::MAP_WIDTH, config::MAP_HEIGHT)?;
        self.actors = EntityArena::new();

        let start = self.map.player_start(config::START_COLUMN);
        Self::place_rocks(&self.map, &mut self.actors);
        encounters::place_monsters(&self.map, &mut self.actors, &mut self.rng, self.level, start);
        items::place_items(&self.map, &mut self.actors, &mut self.rng, self.level, start);

        let anchor = Self::raft_anchor(&self.map, start);
        self.raft = self.actors.insert(Self::make_raft(anchor));

        let mut player = match carried {
            Some(player) => player,
            None => Self::make_player(start),
        };
        player.pos = start;
        self.player = self.actors.insert(player);

        self.camera.center = start;
        self.aim_cursor = start;
        Ok(())
    }

    fn make_player(pos: Position) -> Entity {
        let mut e = Entity::new(pos, '@', PLAYER_COLOR, 1);
        e.ai = Some(AiBehavior::Player(PlayerControlled::default()));
        e.combat = Some(CombatProfile::new(15, 14, 6, 0));
        e.health = Some(HealthProfile::new(30, 0, DeathKind::Player));
        e.names = Some(NameSet::new("you", "You", "your corpse", "your", "fists", "tunic"));
        e
    }

    fn make_raft(pos: Position) -> Entity {
        let mut e = Entity::new(pos, '=', RAFT_COLOR, 0);
        e.blocks = false;
        e.health = Some(HealthProfile::new(20, 0, DeathKind::Raft));
        e.names = Some(NameSet::new("raft", "The raft", "splintered raft", "raft's", "", ""));
        e
    }

    /// Rocks are non-blocking props: the current can carry the raft across
    /// them, dealing grinding damage instead of stopping the drift.
    fn place_rocks(map: &WorldGrid, actors: &mut EntityArena) {
        for rock in &map.river().rocks {
            for dy in 0..rock.width {
                let mut e = Entity::new(Position::new(rock.x, rock.y + dy), 'o', ROCK_COLOR, 0);
                e.blocks = false;
                e.names = Some(NameSet::new("rock", "The rock", "rock", "rock's", "", ""));
                actors.insert(e);
            }
        }
    }

    /// The raft is moored at the first water cell between the player's spawn
    /// and the channel center.
    fn raft_anchor(map: &WorldGrid, start: Position) -> Position {
        let center = map.river().channel_center(start.x).round() as i32;
        let step = if center < start.y { -1 } else { 1 };
        let mut y = start.y;
        while y != center && !map.is_water(start.x, y) {
            y += step;
        }
        Position::new(start.x, y)
    }

    /// Advances the simulation by one scheduling opportunity.
    ///
    /// `intent` is the player's buffered input for this tick, if any. In the
    /// terminal states only [`PlayerIntent::Restart`] is honored.
    pub fn tick(&mut self, intent: Option<PlayerIntent>) -> ObolResult<()> {
        match self.status {
            GameStatus::Startup => {
                self.status = GameStatus::Idle;
            }
            GameStatus::Idle => {
                if let Some(intent) = intent {
                    self.apply_idle_intent(intent);
                }
                if self.status == GameStatus::Idle && self.update_player()? {
                    // A move or attack resolved and actually changed state:
                    // the monsters get their turn next tick.
                    if self.status == GameStatus::Idle {
                        self.status = GameStatus::NewTurn;
                    }
                }
            }
            GameStatus::NewTurn => {
                self.update_monsters();
                if self.status == GameStatus::NewTurn {
                    self.status = GameStatus::Idle;
                }
            }
            GameStatus::Aiming => {
                if let Some(intent) = intent {
                    self.apply_aiming_intent(intent);
                }
            }
            GameStatus::Victory | GameStatus::Defeat => {
                if intent == Some(PlayerIntent::Restart) {
                    self.restart()?;
                }
            }
        }
        Ok(())
    }

    fn apply_idle_intent(&mut self, intent: PlayerIntent) {
        match intent {
            PlayerIntent::Move(dir) => {
                let delta = dir.to_delta();
                self.buffer_player_move(delta.x, delta.y);
            }
            PlayerIntent::Wait => self.buffer_player_move(0, 0),
            PlayerIntent::FireMode => {
                let ranged = self
                    .actors
                    .get(self.player)
                    .and_then(|e| e.combat.as_ref())
                    .map(|c| c.max_range > 0)
                    .unwrap_or(false);
                if ranged {
                    self.status = GameStatus::Aiming;
                    if let Some(p) = self.actors.get(self.player) {
                        self.aim_cursor = p.pos;
                    }
                    self.log
                        .print("You take aim. Pick any square, or cancel to lower your weapon.");
                } else {
                    self.log.print("You have nothing to fire.");
                }
            }
            PlayerIntent::CursorAt(screen) => {
                self.aim_cursor = self.camera.screen_to_grid(screen);
            }
            // Meta input is only meaningful in terminal states; confirm and
            // cancel only matter while aiming.
            PlayerIntent::Confirm | PlayerIntent::Cancel | PlayerIntent::Restart => {}
        }
    }

    fn apply_aiming_intent(&mut self, intent: PlayerIntent) {
        match intent {
            PlayerIntent::CursorAt(screen) => {
                self.aim_cursor = self.camera.screen_to_grid(screen);
            }
            PlayerIntent::Confirm => {
                if self.fire_at_cursor() {
                    self.status = GameStatus::NewTurn;
                }
            }
            PlayerIntent::Cancel | PlayerIntent::FireMode => {
                self.status = GameStatus::Idle;
                self.log.print("You lower your weapon.");
            }
            PlayerIntent::Move(_) | PlayerIntent::Wait | PlayerIntent::Restart => {}
        }
    }

    /// Resolves the player's aimed shot at the current cursor cell. Returns
    /// true when a shot was actually fired (the aiming mode ends and a turn
    /// elapses); an empty or out-of-range cell keeps the mode alive.
    fn fire_at_cursor(&mut self) -> bool {
        let target = self
            .actors
            .iter()
            .find(|(id, e)| {
                *id != self.player && e.pos == self.aim_cursor && e.health.is_some() && !e.is_dead()
            })
            .map(|(id, e)| (id, e.pos));

        let (target_id, target_pos) = match target {
            Some(found) => found,
            None => {
                self.log.print("Nothing to shoot there.");
                return false;
            }
        };
        if !combat::in_range(self, self.player, target_id) {
            self.log.print("That's beyond your weapon's range.");
            return false;
        }

        let distance = match self.actors.get(self.player) {
            Some(p) => p.pos.distance(target_pos),
            None => return false,
        };
        if let Some(c) = self.actors.get_mut(self.player).and_then(|e| e.combat.as_mut()) {
            c.current_target = Some(target_id);
        }
        combat::attack(self, self.player, target_id, combat::range_modifier(distance));
        if let Some(c) = self.actors.get_mut(self.player).and_then(|e| e.combat.as_mut()) {
            c.current_target = None;
        }
        true
    }

    fn buffer_player_move(&mut self, dx: i32, dy: i32) {
        if let Some(AiBehavior::Player(p)) =
            self.actors.get_mut(self.player).and_then(|e| e.ai.as_mut())
        {
            p.dx = dx;
            p.dy = dy;
            p.move_requested = true;
        }
    }

    /// Interprets the player's buffered input. Returns true when a full turn
    /// elapsed (the player moved, attacked, or deliberately waited).
    fn update_player(&mut self) -> ObolResult<bool> {
        let pending = match self.actors.get_mut(self.player).and_then(|e| e.ai.as_mut()) {
            Some(AiBehavior::Player(p)) if p.move_requested => {
                let pending = (p.dx, p.dy);
                p.dx = 0;
                p.dy = 0;
                p.move_requested = false;
                Some(pending)
            }
            _ => None,
        };
        let (dx, dy) = match pending {
            Some(delta) => delta,
            None => return Ok(false),
        };

        let pos = match self.actors.get(self.player) {
            Some(p) if !p.is_dead() => p.pos,
            _ => return Ok(false),
        };
        let turn = self.player_move_or_attack(Position::new(pos.x + dx, pos.y + dy))?;
        if let Some(p) = self.actors.get(self.player) {
            self.camera.center = p.pos;
        }
        Ok(turn)
    }

    /// Movement and "bump to attack", merged with the current's displacement.
    ///
    /// Returns true if the action consumed the player's turn; walking into a
    /// wall or refusing the water does not.
    fn player_move_or_attack(&mut self, mut target: Position) -> ObolResult<bool> {
        if self.map.is_wall(target.x, target.y) {
            return Ok(false);
        }

        // Look for a living actor to attack. Bumping the raft boards it.
        let victim = self.actors.iter().find(|(id, e)| {
            *id != self.player
                && *id != self.raft
                && e.pos == target
                && e.health.is_some()
                && !e.is_dead()
        });
        let victim = victim.map(|(id, _)| id);
        let start = match self.actors.get(self.player) {
            Some(p) => p.pos,
            None => return Ok(false),
        };
        let mut attacking = false;
        if let Some(victim) = victim {
            combat::attack(self, self.player, victim, MELEE_MODIFIER);
            attacking = true;
            target = start;
        }

        let raft_pos = self.actors.get(self.raft).map(|r| r.pos);
        let on_raft = raft_pos == Some(start);
        let target_is_raft = raft_pos == Some(target);
        if self.map.is_water(target.x, target.y) && !on_raft && !attacking && !target_is_raft {
            self.log
                .print("You need to board the raft to sail down the river.");
            return Ok(false);
        }

        let u = self.map.u_velocity(start.x, start.y);
        let v = self.map.v_velocity(start.x, start.y);
        let landing = drift_landing(start, target, u, v);

        let moved = landing != start;
        if target != landing && !moved && !attacking {
            self.log.print("You fight the current, but make no progress.");
        }
        if let Some(p) = self.actors.get_mut(self.player) {
            p.pos = landing;
        }

        if moved {
            self.inspect_cell(landing);
        }

        if on_raft && self.map.is_water(target.x, target.y) {
            let crossed = self.rocks_crossed(start, landing);
            if let Some(r) = self.actors.get_mut(self.raft) {
                r.pos = landing;
            }
            if crossed > 0 {
                self.log.print("The raft grinds across the rocks!");
                combat::take_damage(self, self.raft, crossed);
            }
        }

        if !self.status.is_terminal() && landing.x >= self.map.exit_column() {
            self.advance_level()?;
        }

        Ok(true)
    }

    /// Narrates corpses lying at the cell and picks up any items there.
    fn inspect_cell(&mut self, cell: Position) {
        let here: Vec<EntityId> = self
            .actors
            .iter()
            .filter(|(id, e)| *id != self.player && *id != self.raft && e.pos == cell)
            .map(|(id, _)| id)
            .collect();
        for id in here {
            let (payload, name, dead) = match self.actors.get(id) {
                Some(e) => (e.item, e.name().to_string(), e.is_dead()),
                None => continue,
            };
            if let Some(payload) = payload {
                match payload {
                    ItemPayload::Weapon { mean_damage, max_range } => {
                        if let Some(c) =
                            self.actors.get_mut(self.player).and_then(|e| e.combat.as_mut())
                        {
                            c.mean_damage = mean_damage;
                            c.max_range = max_range;
                        }
                        self.log.print(format!("You take up the {}.", name));
                    }
                    ItemPayload::Armor { armor } => {
                        if let Some(h) =
                            self.actors.get_mut(self.player).and_then(|e| e.health.as_mut())
                        {
                            h.armor = armor;
                        }
                        self.log.print(format!("You strap on the {}.", name));
                    }
                }
                self.actors.remove(id);
            } else if dead {
                self.log.print(format!("There's a {} here.", name));
            }
        }
    }

    /// Distinct rock cells on the straight-line walk from `from` to `to`,
    /// excluding the starting cell.
    fn rocks_crossed(&self, from: Position, to: Position) -> i32 {
        let steps = (to.x - from.x).abs().max((to.y - from.y).abs());
        let mut crossed = Vec::new();
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let cell = Position::new(
                (from.x as f32 + (to.x - from.x) as f32 * t).round() as i32,
                (from.y as f32 + (to.y - from.y) as f32 * t).round() as i32,
            );
            if self.map.is_rock(cell.x, cell.y) && !crossed.contains(&cell) {
                crossed.push(cell);
            }
        }
        crossed.len() as i32
    }

    /// Crossing the exit column: the next river segment, or the end of the
    /// journey after the final level.
    fn advance_level(&mut self) -> ObolResult<()> {
        if self.level >= config::FINAL_LEVEL {
            self.status = GameStatus::Victory;
            self.log
                .print("The river opens onto a wide, sunlit shore. Your crossing is over.");
            return Ok(());
        }
        self.level += 1;
        self.log
            .print("The river bends, and the banks close in around darker water.");
        self.start_level()
    }

    /// Gives every active monster exactly one update, in slot order.
    fn update_monsters(&mut self) {
        for id in self.actors.ids() {
            if self.status.is_terminal() {
                break;
            }
            if id == self.player {
                continue;
            }
            if self.monster_is_active(id) {
                self.monster_turn(id);
            }
        }
    }

    /// Dead entities are inert regardless of their latch. A dormant monster
    /// activates for life once the player comes within the activation radius.
    fn monster_is_active(&mut self, id: EntityId) -> bool {
        let player_pos = match self.actors.get(self.player) {
            Some(p) => p.pos,
            None => return false,
        };
        let entity = match self.actors.get_mut(id) {
            Some(e) => e,
            None => return false,
        };
        if entity.health.as_ref().map(|h| h.is_dead()).unwrap_or(false) {
            return false;
        }
        let pos = entity.pos;
        match entity.ai.as_mut() {
            Some(AiBehavior::Monster(m)) => {
                if m.active {
                    true
                } else if pos.distance(player_pos) < config::ACTIVATION_RADIUS {
                    m.active = true;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// One monster's turn: up to `speed` sub-steps of pursuit, with melee
    /// inside distance 2 and a charged volley when pinned in firing range.
    fn monster_turn(&mut self, id: EntityId) {
        let speed = self.actors.get(id).map(|e| e.speed).unwrap_or(0);
        for _ in 0..speed {
            if self.status.is_terminal() {
                break;
            }
            let player_pos = match self.actors.get(self.player) {
                Some(p) if !p.is_dead() => p.pos,
                _ => break,
            };
            let (pos, can_fly, max_range, has_combat) = match self.actors.get(id) {
                Some(e) => (
                    e.pos,
                    e.can_fly,
                    e.combat.as_ref().map(|c| c.max_range).unwrap_or(0),
                    e.combat.is_some(),
                ),
                None => break,
            };
            let dx = player_pos.x - pos.x;
            let dy = player_pos.y - pos.y;
            let distance = ((dx * dx + dy * dy) as f32).sqrt();

            if distance >= 2.0 {
                let diagonal = Position::new(
                    pos.x + (dx as f32 / distance).round() as i32,
                    pos.y + (dy as f32 / distance).round() as i32,
                );
                let axial_x = Position::new(pos.x + if dx > 0 { 1 } else { -1 }, pos.y);
                let axial_y = Position::new(pos.x, pos.y + if dy > 0 { 1 } else { -1 });

                if self.monster_can_step(diagonal, can_fly) {
                    if let Some(e) = self.actors.get_mut(id) {
                        e.pos = diagonal;
                    }
                } else if self.monster_can_step(axial_x, can_fly) {
                    if let Some(e) = self.actors.get_mut(id) {
                        e.pos = axial_x;
                    }
                } else if self.monster_can_step(axial_y, can_fly) {
                    if let Some(e) = self.actors.get_mut(id) {
                        e.pos = axial_y;
                    }
                } else if max_range > 0 && distance <= max_range as f32 {
                    self.monster_volley(id, distance);
                    break;
                }
            } else {
                if has_combat {
                    combat::attack(self, id, self.player, MELEE_MODIFIER);
                }
                // One attack ends the turn even with sub-steps remaining.
                break;
            }
        }
    }

    fn monster_can_step(&self, cell: Position, can_fly: bool) -> bool {
        self.map.can_walk(cell.x, cell.y, &self.actors)
            && (!self.map.is_water(cell.x, cell.y) || can_fly)
    }

    /// Ranged attacks charge for one turn and release the next; the firing
    /// flag carries the wind-up across scheduler ticks.
    fn monster_volley(&mut self, id: EntityId, distance: f32) {
        let firing = self
            .actors
            .get(id)
            .and_then(|e| e.combat.as_ref())
            .map(|c| c.firing)
            .unwrap_or(false);
        if firing {
            let committed = self
                .actors
                .get(id)
                .and_then(|e| e.combat.as_ref())
                .and_then(|c| c.current_target);
            if let Some(c) = self.actors.get_mut(id).and_then(|e| e.combat.as_mut()) {
                c.firing = false;
                c.current_target = None;
            }
            // The shot tracks the target committed at wind-up; a stale
            // handle means the target is gone and the volley fizzles.
            if let Some(target) = committed.filter(|t| self.actors.contains(*t)) {
                combat::attack(self, id, target, combat::range_modifier(distance));
            }
        } else {
            if let Some(c) = self.actors.get_mut(id).and_then(|e| e.combat.as_mut()) {
                c.firing = true;
                c.current_target = Some(self.player);
            }
            let name = self
                .actors
                .get(id)
                .map(|e| e.proper_name().to_string())
                .unwrap_or_default();
            self.log.print(format!("{} takes aim at you.", name));
        }
    }

    /// Starts over from level 1 with a fresh player. Only reachable from the
    /// terminal states.
    fn restart(&mut self) -> ObolResult<()> {
        self.level = 1;
        self.log.clear();
        self.actors = EntityArena::new();
        self.player = self
            .actors
            .insert(Self::make_player(Position::origin()));
        self.start_level()?;
        self.status = GameStatus::Startup;
        self.log
            .print("The ferryman takes another obol and pushes you off again.");
        Ok(())
    }

    /// Current player position, if the player entity still exists.
    pub fn player_position(&self) -> Option<Position> {
        self.actors.get(self.player).map(|e| e.pos)
    }

    /// Entity handles in draw order: corpses lowest, the player on top.
    pub fn draw_order(&self) -> Vec<EntityId> {
        self.actors.draw_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    #[test]
    fn test_new_state_starts_in_startup() {
        let state = GameState::new(12345).unwrap();
        assert_eq!(state.status, GameStatus::Startup);
        assert_eq!(state.level, 1);
        assert!(state.player_position().is_some());
        assert!(state.actors.contains(state.raft));
    }

    #[test]
    fn test_first_tick_moves_to_idle() {
        let mut state = GameState::new(12345).unwrap();
        state.tick(None).unwrap();
        assert_eq!(state.status, GameStatus::Idle);
    }

    #[test]
    fn test_wait_consumes_a_turn() {
        let mut state = GameState::new(12345).unwrap();
        state.tick(None).unwrap();
        state.tick(Some(PlayerIntent::Wait)).unwrap();
        assert_eq!(state.status, GameStatus::NewTurn);
        state.tick(None).unwrap();
        assert_eq!(state.status, GameStatus::Idle);
    }

    #[test]
    fn test_player_spawns_on_dry_land() {
        let state = GameState::new(99).unwrap();
        let pos = state.player_position().unwrap();
        assert!(!state.map.is_water(pos.x, pos.y));
    }

    #[test]
    fn test_raft_moored_in_water() {
        let state = GameState::new(99).unwrap();
        let raft = state.actors.get(state.raft).unwrap();
        assert!(state.map.is_water(raft.pos.x, raft.pos.y));
    }

    #[test]
    fn test_fire_mode_without_ranged_weapon() {
        let mut state = GameState::new(7).unwrap();
        state.tick(None).unwrap();
        state.tick(Some(PlayerIntent::FireMode)).unwrap();
        assert_eq!(state.status, GameStatus::Idle);
        assert!(state.log.contains("nothing to fire"));
    }

    #[test]
    fn test_move_intent_buffers_into_player_ai() {
        let mut state = GameState::new(7).unwrap();
        state.tick(None).unwrap();
        let before = state.player_position().unwrap();
        state.tick(Some(PlayerIntent::Move(Direction::East))).unwrap();
        let after = state.player_position().unwrap();
        // Walking east along the bank is never rejected as water or wall.
        assert_ne!(before, after);
    }
}
