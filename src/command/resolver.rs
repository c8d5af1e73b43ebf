//! Input resolution - converts button presses into commands for the current state

use serde::{Deserialize, Serialize};

use crate::battle::execution::Battle;
use crate::battle::turn::PlayerActionState;
use crate::command::protocol::Command;

/// Discrete button presses the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    Select,
    Cancel,
    Confirm,
    CycleLeft,
    CycleRight,
    Pause,
}

/// What a button press means right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Command(Command),
    TogglePause,
}

/// Resolves input against the current turn state
pub struct InputResolver<'a> {
    battle: &'a Battle,
}

impl<'a> InputResolver<'a> {
    pub fn new(battle: &'a Battle) -> Self {
        Self { battle }
    }

    /// Map a press to an intent; `None` if it means nothing in this state
    ///
    /// Uses the already-applied selected tile as the cursor position.
    pub fn resolve(&self, action: InputAction) -> Option<Intent> {
        if action == InputAction::Pause {
            return Some(Intent::TogglePause);
        }

        let command = match (self.battle.action_state(), action) {
            (PlayerActionState::Ready, InputAction::Confirm | InputAction::Select) => Command::StartTurn,

            (PlayerActionState::Selecting, InputAction::Select) => Command::SelectUnit,
            (PlayerActionState::Selecting, InputAction::Confirm) => Command::EndTurn,
            (PlayerActionState::Selecting, InputAction::CycleRight) => Command::SelectFirstUnit,
            (PlayerActionState::Selecting, InputAction::CycleLeft) => Command::SelectLastUnit,
            (PlayerActionState::Selecting, InputAction::Cancel) => return Some(Intent::TogglePause),

            (PlayerActionState::UnitSelected, InputAction::Select) => self.resolve_click(),
            (PlayerActionState::UnitSelected, InputAction::CycleRight) => Command::SelectNextUnit,
            (PlayerActionState::UnitSelected, InputAction::CycleLeft) => Command::SelectPreviousUnit,

            (PlayerActionState::UnitMoved, InputAction::Select) => Command::ConfirmMove,
            (PlayerActionState::UnitMoveConfirmed, InputAction::Select) => Command::Attack,
            (PlayerActionState::UnitAttacking, InputAction::Select) => Command::ConfirmAttack,

            (
                PlayerActionState::UnitSelected
                | PlayerActionState::UnitMoved
                | PlayerActionState::UnitMoveConfirmed
                | PlayerActionState::UnitAttacking,
                InputAction::Cancel,
            ) => Command::CancelMove,

            (PlayerActionState::EndingTurn, InputAction::Confirm) => Command::ConfirmEnd,
            (PlayerActionState::EndingTurn, InputAction::Cancel) => Command::CancelEnd,

            _ => return None,
        };

        Some(Intent::Command(command))
    }

    /// A click with a unit selected: re-select, attack or move
    fn resolve_click(&self) -> Command {
        let battle = self.battle;
        let tile = battle.turn.selected_tile;
        let player = battle.current_player();

        let own_ready = battle
            .map
            .unit_at(tile, Some(player))
            .is_some_and(|unit| unit.is_ready());
        if own_ready {
            return Command::SelectUnit;
        }

        if battle.map.unit_at(tile, Some(player.opponent())).is_some() {
            Command::Attack
        } else {
            Command::MoveUnit
        }
    }
}
