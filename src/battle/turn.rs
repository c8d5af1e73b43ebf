//! Turn state: whose turn it is and what they are in the middle of doing

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::hex::HexCoord;
use crate::core::types::{Player, UnitId};

/// What the current player may do right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerActionState {
    #[default]
    Ready, // Waiting for the player to start their turn
    Selecting,         // Choosing a unit or ending the turn
    UnitSelected,      // Unit chosen, may move or attack
    UnitMoved,         // Moved tentatively, awaiting confirmation
    UnitMoveConfirmed, // Tank moved, may still attack
    UnitAttacking,     // Target chosen, awaiting confirmation
    EndingTurn,        // Asked to end the turn, awaiting confirmation
    Waiting,           // Turn handed over, self-advances to Ready
}

impl PlayerActionState {
    pub const ALL: [PlayerActionState; 8] = [
        PlayerActionState::Ready,
        PlayerActionState::Selecting,
        PlayerActionState::UnitSelected,
        PlayerActionState::UnitMoved,
        PlayerActionState::UnitMoveConfirmed,
        PlayerActionState::UnitAttacking,
        PlayerActionState::EndingTurn,
        PlayerActionState::Waiting,
    ];

    /// States that only make sense with a selected unit
    pub fn needs_selected_unit(&self) -> bool {
        matches!(
            self,
            PlayerActionState::UnitSelected
                | PlayerActionState::UnitMoved
                | PlayerActionState::UnitMoveConfirmed
                | PlayerActionState::UnitAttacking
        )
    }
}

impl fmt::Display for PlayerActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerActionState::Ready => "READY",
            PlayerActionState::Selecting => "SELECTING",
            PlayerActionState::UnitSelected => "UNIT_SELECTED",
            PlayerActionState::UnitMoved => "UNIT_MOVED",
            PlayerActionState::UnitMoveConfirmed => "UNIT_MOVE_CONFIRMED",
            PlayerActionState::UnitAttacking => "UNIT_ATTACKING",
            PlayerActionState::EndingTurn => "ENDING_TURN",
            PlayerActionState::Waiting => "WAITING",
        };
        write!(f, "{}", name)
    }
}

/// The replicated turn state; one per active map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub current_player: Player,
    pub action_state: PlayerActionState,
    pub selected_tile: HexCoord,
    pub selected_unit: Option<UnitId>,
    pub targeted_unit: Option<UnitId>,
    /// Where the selected unit stood when it was selected; restored on cancel
    pub previous_unit_coord: HexCoord,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            current_player: Player::One,
            action_state: PlayerActionState::Ready,
            selected_tile: HexCoord::INVALID,
            selected_unit: None,
            targeted_unit: None,
            previous_unit_coord: HexCoord::INVALID,
        }
    }

    /// Drop the selected and targeted units
    pub fn clear_selection(&mut self) {
        self.selected_unit = None;
        self.targeted_unit = None;
        self.previous_unit_coord = HexCoord::INVALID;
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}
