//! # Input Module
//!
//! Discrete player intents delivered by the input collaborator. The engine
//! never reads devices itself: a front end translates keys, clicks, and
//! touches into these values and feeds them to [`GameState::tick`].
//!
//! [`GameState::tick`]: crate::GameState::tick

use crate::game::{Direction, Position};
use serde::{Deserialize, Serialize};

/// One discrete action intent from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerIntent {
    /// Step (or bump-attack) in one of the 8 directions
    Move(Direction),
    /// Stand still for a turn; the current still carries a rafting player
    Wait,
    /// Toggle into ranged targeting mode
    FireMode,
    /// Screen-space cursor position, converted to a grid cell via the camera
    CursorAt(Position),
    /// Commit the current selection (fires at the aimed cell while aiming)
    Confirm,
    /// Abandon the current mode
    Cancel,
    /// Start over after victory or defeat
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_compare() {
        assert_eq!(
            PlayerIntent::Move(Direction::East),
            PlayerIntent::Move(Direction::East)
        );
        assert_ne!(PlayerIntent::Wait, PlayerIntent::Cancel);
    }

    #[test]
    fn test_intents_serialize() {
        let intent = PlayerIntent::CursorAt(Position::new(12, 7));
        let json = serde_json::to_string(&intent).unwrap();
        let back: PlayerIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, back);
    }
}
