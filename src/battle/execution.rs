//! Battle context: registry, turn state and cost field for one match
//!
//! Both peers of a networked match hold an identical `Battle` and feed it the
//! same commands in the same order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::battle::battle_map::{BattleMap, MapSnapshot};
use crate::battle::cost_field::CostField;
use crate::battle::definitions::Definitions;
use crate::battle::turn::{PlayerActionState, TurnState};
use crate::battle::unit_type::UnitKind;
use crate::battle::units::Unit;
use crate::core::config::{MatchConfig, RetaliationRule};
use crate::core::error::Result;
use crate::core::types::Player;

/// Why the match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The loser has no units left
    Annihilation,
    /// The remote peer left the match
    OpponentQuit,
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Player,
    pub reason: EndReason,
}

/// Everything two peers must agree on, in serializable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub turn: TurnState,
    pub registry: MapSnapshot,
}

/// Complete battle state
#[derive(Debug, Clone)]
pub struct Battle {
    pub map: BattleMap,
    pub turn: TurnState,
    pub field: CostField,
    retaliation: RetaliationRule,
    pass_limit: u32,
}

impl Battle {
    pub fn new(map: BattleMap, config: &MatchConfig) -> Self {
        let pass_limit = config.flood_pass_limit(map.tile_count());
        Self {
            field: CostField::for_map(&map),
            turn: TurnState::new(),
            retaliation: config.retaliation,
            pass_limit,
            map,
        }
    }

    /// Build the config's default map
    pub fn from_definitions(defs: Arc<Definitions>, config: &MatchConfig) -> Result<Self> {
        let map = BattleMap::new(defs, &config.default_map)?;
        Ok(Self::new(map, config))
    }

    pub fn retaliation(&self) -> RetaliationRule {
        self.retaliation
    }

    pub fn pass_limit(&self) -> u32 {
        self.pass_limit
    }

    pub fn action_state(&self) -> PlayerActionState {
        self.turn.action_state
    }

    pub fn current_player(&self) -> Player {
        self.turn.current_player
    }

    /// The selected unit, if its handle still resolves
    pub fn selected_unit(&self) -> Option<&Unit> {
        self.turn.selected_unit.and_then(|id| self.map.unit(id))
    }

    pub fn targeted_unit(&self) -> Option<&Unit> {
        self.turn.targeted_unit.and_then(|id| self.map.unit(id))
    }

    pub fn selected_kind(&self) -> Option<&UnitKind> {
        self.selected_unit().map(|unit| self.map.unit_kind(unit))
    }

    /// Re-anchor the cost field on the selected unit
    ///
    /// While a move awaits confirmation the field stays on the move origin so
    /// the travelled path can still be traced. With no selection the field is
    /// cleared. Tiles never change, so an unchanged source is not refilled.
    pub fn refresh_field(&mut self) {
        let source = self.selected_unit().map(|unit| {
            if self.turn.action_state == PlayerActionState::UnitMoved {
                self.turn.previous_unit_coord
            } else {
                unit.coord
            }
        });

        match source {
            Some(source) if self.field.source() != Some(source) => {
                self.field.populate(&self.map, source, self.pass_limit);
            }
            Some(_) => {}
            None => {
                if self.field.source().is_some() {
                    self.field.clear();
                }
            }
        }
    }

    /// Force the turn back to selecting if a unit-dependent state lost its unit
    ///
    /// Returns true if the state had to be repaired.
    pub fn ensure_selection(&mut self) -> bool {
        if !self.turn.action_state.needs_selected_unit() || self.selected_unit().is_some() {
            return false;
        }

        tracing::warn!(
            "{} has no selected unit in state {}, returning to SELECTING",
            self.turn.current_player,
            self.turn.action_state
        );
        self.turn.clear_selection();
        self.turn.action_state = PlayerActionState::Selecting;
        self.refresh_field();
        true
    }

    /// Local WAITING -> READY step; needs no message since both peers take it
    pub fn advance_waiting(&mut self) -> bool {
        if self.turn.action_state != PlayerActionState::Waiting {
            return false;
        }
        self.turn.action_state = PlayerActionState::Ready;
        true
    }

    /// A player whose roster is empty loses
    pub fn check_match_end(&self) -> Option<MatchOutcome> {
        let winner = if self.map.roster(Player::One).is_empty() {
            Player::Two
        } else if self.map.roster(Player::Two).is_empty() {
            Player::One
        } else {
            return None;
        };

        Some(MatchOutcome {
            winner,
            reason: EndReason::Annihilation,
        })
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            turn: self.turn.clone(),
            registry: self.map.snapshot(),
        }
    }
}
