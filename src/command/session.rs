//! Match session: one peer's simulation context
//!
//! Each frame: apply whatever the remote peer sent, check for the end of the
//! match, turn local input into commands (applied here first, then queued for
//! the peer), and build the view for rendering.

use serde::{Deserialize, Serialize};

use crate::battle::execution::{Battle, EndReason, MatchOutcome};
use crate::battle::hex::HexCoord;
use crate::battle::highlight::FrameView;
use crate::battle::picking::{pick_tile, CursorRay};
use crate::command::executor::{ApplyOutcome, CommandExecutor};
use crate::command::protocol::Command;
use crate::command::resolver::{InputAction, InputResolver, Intent};
use crate::command::transport::Transport;
use crate::core::config::Seat;

/// Cursor height used when a frame hovers a tile directly
const HOVER_HEIGHT: f32 = 10.0;

/// Everything the input devices reported for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Camera ray through the cursor; `None` leaves the hovered tile alone
    pub cursor: Option<CursorRay>,
    /// Buttons pressed this frame, in order
    pub pressed: Vec<InputAction>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame with the cursor resting over the centre of `coord`
    pub fn hovering(coord: HexCoord) -> Self {
        Self::new().with_cursor(CursorRay::straight_down(coord.center_position(), HOVER_HEIGHT))
    }

    pub fn with_cursor(mut self, ray: CursorRay) -> Self {
        self.cursor = Some(ray);
        self
    }

    pub fn press(mut self, action: InputAction) -> Self {
        self.pressed.push(action);
        self
    }
}

/// One peer's view of a match
pub struct Session<T: Transport> {
    battle: Battle,
    seat: Seat,
    transport: T,
    remote_ready: bool,
    remote_quit: bool,
    paused: bool,
    outcome: Option<MatchOutcome>,
}

impl<T: Transport> Session<T> {
    /// Start a session; networked peers announce that they are ready
    pub fn new(battle: Battle, seat: Seat, transport: T) -> Self {
        let mut session = Self {
            battle,
            seat,
            transport,
            remote_ready: seat == Seat::Hotseat,
            remote_quit: false,
            paused: false,
            outcome: None,
        };
        if seat != Seat::Hotseat {
            session.send(Command::PlayerReady);
        }
        session
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_remote_ready(&self) -> bool {
        self.remote_ready
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// May this machine issue commands right now?
    pub fn is_local_turn(&self) -> bool {
        self.seat.controls(self.battle.current_player())
    }

    /// Leave the match; the peer is told so it can declare a winner
    pub fn quit(&mut self) {
        self.send(Command::PlayerQuit);
    }

    /// Apply a local command and, if it changed anything, send it to the peer
    pub fn submit(&mut self, command: Command) -> ApplyOutcome {
        let outcome = CommandExecutor::apply(&mut self.battle, command);
        if outcome.is_applied() {
            self.send(command);
        }
        outcome
    }

    /// Run one frame
    pub fn update(&mut self, input: &FrameInput) -> FrameView {
        self.receive();
        self.check_end();

        if self.outcome.is_none() {
            self.handle_input(input);
            self.battle.advance_waiting();
            self.battle.ensure_selection();
        }

        self.battle.refresh_field();
        FrameView::build(&self.battle, self.battle.turn.selected_tile, self.outcome, self.paused)
    }

    fn send(&mut self, command: Command) {
        self.transport.enqueue_outbound(command.to_string());
    }

    fn receive(&mut self) {
        for line in self.transport.drain_inbound() {
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    tracing::warn!("Dropping remote command '{}': {}", line, e);
                    continue;
                }
            };

            match command {
                Command::PlayerReady => {
                    tracing::info!("Remote player is ready");
                    self.remote_ready = true;
                }
                Command::PlayerQuit => {
                    tracing::info!("Remote player quit");
                    self.remote_quit = true;
                }
                _ => {
                    if !CommandExecutor::apply(&mut self.battle, command).is_applied() {
                        tracing::warn!("Remote command '{}' changed nothing here", line);
                    }
                }
            }
        }
    }

    fn check_end(&mut self) {
        if self.outcome.is_some() {
            return;
        }

        let outcome = if self.remote_quit {
            let winner = self
                .seat
                .local_player()
                .unwrap_or_else(|| self.battle.current_player());
            Some(MatchOutcome {
                winner,
                reason: EndReason::OpponentQuit,
            })
        } else {
            self.battle.check_match_end()
        };

        if let Some(outcome) = outcome {
            tracing::info!("{} wins ({:?})", outcome.winner, outcome.reason);
            self.outcome = Some(outcome);
        }
    }

    fn handle_input(&mut self, input: &FrameInput) {
        let local_turn = self.is_local_turn() && self.remote_ready;

        // Out of turn the only thing a player can do is pause
        if !local_turn {
            for action in &input.pressed {
                if matches!(action, InputAction::Pause | InputAction::Cancel) {
                    self.toggle_pause();
                }
            }
            return;
        }

        if !self.paused {
            self.update_hover(input.cursor);
        }

        for action in &input.pressed {
            let intent = InputResolver::new(&self.battle).resolve(*action);
            match intent {
                Some(Intent::TogglePause) => self.toggle_pause(),
                Some(Intent::Command(command)) if !self.paused => {
                    self.submit(command);
                }
                _ => {}
            }
        }
    }

    /// Replicate the hovered tile, only when it changes
    fn update_hover(&mut self, cursor: Option<CursorRay>) {
        let Some(ray) = cursor else {
            return;
        };

        let hovered = pick_tile(&self.battle.map, &ray).unwrap_or(HexCoord::INVALID);
        if hovered == self.battle.turn.selected_tile {
            return;
        }

        let tile_index = self
            .battle
            .map
            .tile_index(hovered)
            .map_or(-1, |index| index as i32);
        self.submit(Command::SelectHex { tile_index });
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        tracing::debug!("Paused: {}", self.paused);
    }
}
