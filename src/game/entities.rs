//! # Entity Module
//!
//! Entities are data aggregates with optional capability components: an AI
//! behavior, a combat profile, a health profile, an item payload, and a set
//! of narration strings. The world owns all entities in a generational arena
//! addressed by stable [`EntityId`] handles, so a "weak" reference (a combat
//! target, the raft) is a plain handle comparison that goes stale safely when
//! the entity is erased.

use crate::game::{Position, Rgb};
use serde::{Deserialize, Serialize};

/// Stable handle into the entity arena.
///
/// The generation counter distinguishes a live entity from a later occupant
/// of the same slot, so handles held across an erase never dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Arena of all entities in the world.
///
/// Iteration order is slot order, which doubles as turn-resolution order;
/// draw priority is the explicit [`ZOrder`] sort key, not the physical order
/// of the backing storage.
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EntityArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an entity and returns its handle.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.entity = Some(entity);
            EntityId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            EntityId {
                index,
                generation: 0,
            }
        }
    }

    /// Erases an entity, returning it if the handle was live.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        self.free.push(id.index);
        self.len -= 1;
        Some(entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Iterates live entities in slot (turn-resolution) order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entity.as_ref().map(|e| {
                (
                    EntityId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    e,
                )
            })
        })
    }

    /// Handles of all live entities in slot order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Handles sorted by draw priority: corpses first (drawn lowest), the
    /// player's marker last (drawn on top). Ties keep slot order.
    pub fn draw_order(&self) -> Vec<EntityId> {
        let mut ids = self.ids();
        ids.sort_by_key(|id| (self.get(*id).map(|e| e.z_order).unwrap_or(ZOrder::Normal), id.index));
        ids
    }

    /// Whether any blocking entity occupies the given cell.
    pub fn blocked_at(&self, pos: Position) -> bool {
        self.iter().any(|(_, e)| e.blocks && e.pos == pos)
    }
}

/// Draw/resolution priority among entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZOrder {
    /// Drawn under everything else
    Corpse,
    Normal,
    /// Drawn above everything else
    PlayerTop,
}

/// Narration strings for an entity. Only ever used for message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameSet {
    /// Lowercase name, mid-sentence ("skeleton")
    pub name: String,
    /// Capitalized name, sentence-initial ("The skeleton")
    pub proper: String,
    /// What the entity is called once dead
    pub corpse: String,
    pub possessive: String,
    /// Name of the weapon this entity swings or fires
    pub weapon: String,
    /// Name of the armor this entity wears
    pub armor: String,
}

impl NameSet {
    pub fn new(
        name: &str,
        proper: &str,
        corpse: &str,
        possessive: &str,
        weapon: &str,
        armor: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            proper: proper.to_string(),
            corpse: corpse.to_string(),
            possessive: possessive.to_string(),
            weapon: weapon.to_string(),
            armor: armor.to_string(),
        }
    }
}

/// Which death transition fires when hit points reach zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathKind {
    /// Leaves an inert, non-blocking corpse drawn under living actors
    Monster,
    /// Corpse on top of everything, and the game is lost
    Player,
    /// Losing the raft is a loss regardless of the player's own hp
    Raft,
    /// Removed from the world entirely; no corpse
    Ghost,
}

/// Hit points and flat damage reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfile {
    pub max_hp: i32,
    pub hp: i32,
    /// Flat damage reduction applied to every penetrating blow
    pub armor: i32,
    pub kind: DeathKind,
}

impl HealthProfile {
    pub fn new(max_hp: i32, armor: i32, kind: DeathKind) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            armor,
            kind,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Adds hp capped at max, returning the amount actually applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use obol::{DeathKind, HealthProfile};
    ///
    /// let mut health = HealthProfile::new(20, 0, DeathKind::Monster);
    /// health.hp = 15;
    /// assert_eq!(health.heal(10), 5);
    /// assert_eq!(health.hp, 20);
    /// assert_eq!(health.heal(3), 0);
    /// ```
    pub fn heal(&mut self, amount: i32) -> i32 {
        let applied = amount.min(self.max_hp - self.hp).max(0);
        self.hp += applied;
        applied
    }
}

/// Attack and dodge roll means, damage, and transient aim state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatProfile {
    /// Mean of the attack roll distribution
    pub attack: i32,
    /// Mean of the opposing dodge roll distribution
    pub dodge: i32,
    pub mean_damage: i32,
    /// Maximum firing distance; 0 means melee-only
    pub max_range: i32,
    /// True while a ranged attack is charging across scheduler ticks
    #[serde(skip)]
    pub firing: bool,
    /// Weak reference to the current aim target
    #[serde(skip)]
    pub current_target: Option<EntityId>,
}

impl CombatProfile {
    pub fn new(attack: i32, dodge: i32, mean_damage: i32, max_range: i32) -> Self {
        Self {
            attack,
            dodge,
            mean_damage,
            max_range,
            firing: false,
            current_target: None,
        }
    }
}

/// Player-controlled behavior: buffered directional input converted to one
/// pending move vector per scheduler tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerControlled {
    pub dx: i32,
    pub dy: i32,
    /// Set when input buffered a move; cleared once it is processed
    pub move_requested: bool,
}

/// Monster-controlled behavior with a one-way activation latch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterControlled {
    /// Once true, stays true for the entity's lifetime
    pub active: bool,
}

/// Polymorphic AI behavior, dispatched by pattern matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AiBehavior {
    Player(PlayerControlled),
    Monster(MonsterControlled),
}

/// Pick-up payload carried by an item entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemPayload {
    Weapon { mean_damage: i32, max_range: i32 },
    Armor { armor: i32 },
}

/// A game entity: position, display identity, movement traits, and optional
/// capability components.
#[derive(Debug, Clone)]
pub struct Entity {
    pub pos: Position,
    pub glyph: char,
    pub color: Rgb,
    /// Sub-steps of action granted per scheduling tick
    pub speed: i32,
    /// Bypasses the water-entry restriction
    pub can_fly: bool,
    /// Whether this entity obstructs movement
    pub blocks: bool,
    pub z_order: ZOrder,
    pub ai: Option<AiBehavior>,
    pub combat: Option<CombatProfile>,
    pub health: Option<HealthProfile>,
    pub item: Option<ItemPayload>,
    pub names: Option<NameSet>,
}

impl Entity {
    pub fn new(pos: Position, glyph: char, color: Rgb, speed: i32) -> Self {
        Self {
            pos,
            glyph,
            color,
            speed,
            can_fly: false,
            blocks: true,
            z_order: ZOrder::Normal,
            ai: None,
            combat: None,
            health: None,
            item: None,
            names: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.as_ref().map(|h| h.is_dead()).unwrap_or(false)
    }

    /// Lowercase narration name, with a neutral fallback for unnamed props.
    pub fn name(&self) -> &str {
        self.names.as_ref().map(|n| n.name.as_str()).unwrap_or("something")
    }

    /// Capitalized narration name for sentence-initial use.
    pub fn proper_name(&self) -> &str {
        self.names
            .as_ref()
            .map(|n| n.proper.as_str())
            .unwrap_or("Something")
    }
}
