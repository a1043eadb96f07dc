use thiserror::Error;

use crate::collision::evaluate;
use crate::constants::{
    FALLBACK_SPAWN, MSG_CAPTURED, MSG_ENTER_NAME, MSG_ESCAPED, MSG_PRESS_RESTART, PLAYER_START,
    SPAWN_BLOCK_SPAN,
};
use crate::grid::GridConfig;
use crate::movement::{resolve_player_move, resolve_pursued_move};
use crate::rng::Rng;
use crate::server_utils::validate_player_name;
use crate::types::{Collision, Direction, OutcomeRecord, Phase, SessionSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("please enter your name first")]
    EmptyName,

    #[error("no player to restart; start a session first")]
    NoPlayer,
}

/// Single-player chase state. Every mutation goes through this type; the
/// async controller only decides when to call it.
#[derive(Clone, Debug)]
pub struct GameSession {
    grid: GridConfig,
    rng: Rng,
    phase: Phase,
    epoch: u64,
    player_name: String,
    player_pos: usize,
    pursued_pos: usize,
    trail: Vec<usize>,
    score: u32,
    message: String,
    history: Vec<OutcomeRecord>,
}

impl GameSession {
    pub fn new(grid: GridConfig, rng: Rng) -> Self {
        Self {
            grid,
            rng,
            phase: Phase::Idle,
            epoch: 0,
            player_name: String::new(),
            player_pos: PLAYER_START,
            pursued_pos: FALLBACK_SPAWN,
            trail: Vec::new(),
            score: 0,
            message: String::new(),
            history: Vec::new(),
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn player_pos(&self) -> usize {
        self.player_pos
    }

    pub fn pursued_pos(&self) -> usize {
        self.pursued_pos
    }

    pub fn trail(&self) -> &[usize] {
        &self.trail
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn history(&self) -> &[OutcomeRecord] {
        &self.history
    }

    /// Starts a fresh round for `name`. Returns the epoch the timer must carry.
    pub fn start(&mut self, name: &str) -> Result<u64, SessionError> {
        let Some(name) = validate_player_name(name) else {
            if self.phase == Phase::Idle {
                self.message = MSG_ENTER_NAME.to_string();
            }
            return Err(SessionError::EmptyName);
        };
        self.player_name = name;
        Ok(self.begin_round())
    }

    /// Starts another round for the current player without asking for a name.
    pub fn restart(&mut self) -> Result<u64, SessionError> {
        if self.phase == Phase::Idle || self.player_name.is_empty() {
            return Err(SessionError::NoPlayer);
        }
        Ok(self.begin_round())
    }

    pub fn exit(&mut self) {
        self.epoch += 1;
        self.phase = Phase::Idle;
        self.player_name.clear();
        self.score = 0;
        self.trail.clear();
        self.message.clear();
        self.player_pos = PLAYER_START;
    }

    /// Moves the player one step. Returns the outcome if the round ended.
    pub fn apply_input(&mut self, dir: Direction) -> Option<OutcomeRecord> {
        if !self.is_active() {
            return None;
        }
        let next = resolve_player_move(&self.grid, self.player_pos, dir);
        if next != self.player_pos {
            self.trail.push(self.player_pos);
            self.player_pos = next;
        }
        self.resolve_collision()
    }

    /// Advances the pursued entity one step. Ticks from an older round are ignored.
    pub fn tick(&mut self, epoch: u64) -> Option<OutcomeRecord> {
        if !self.is_active() || epoch != self.epoch {
            return None;
        }
        self.pursued_pos =
            resolve_pursued_move(&self.grid, self.pursued_pos, self.grid.exit_cell());
        self.resolve_collision()
    }

    /// Swaps the end-of-round banner for the restart hint, if the round is still over.
    pub fn show_restart_prompt(&mut self, epoch: u64) -> bool {
        if self.phase != Phase::Ended || epoch != self.epoch {
            return false;
        }
        self.message = MSG_PRESS_RESTART.to_string();
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            grid_size: self.grid.size(),
            player_pos: self.player_pos,
            pursued_pos: self.pursued_pos,
            exit_pos: self.grid.exit_cell(),
            trail: self.trail.clone(),
            active: self.is_active(),
            message: self.message.clone(),
            score: self.score,
            player_name: self.player_name.clone(),
        }
    }

    fn begin_round(&mut self) -> u64 {
        self.epoch += 1;
        self.phase = Phase::Active;
        self.message.clear();
        self.trail.clear();
        self.player_pos = PLAYER_START;
        self.pursued_pos = self.spawn_pursued();
        self.epoch
    }

    /// Random cell in the 2x2 block around the player's start, never the
    /// start itself or the exit.
    fn spawn_pursued(&mut self) -> usize {
        let (start_row, start_col) = self.grid.to_row_col(PLAYER_START);
        let exit = self.grid.exit_cell();
        let row_end = (start_row + SPAWN_BLOCK_SPAN).min(self.grid.size());
        let col_end = (start_col + SPAWN_BLOCK_SPAN).min(self.grid.size());

        let mut candidates = Vec::with_capacity(SPAWN_BLOCK_SPAN * SPAWN_BLOCK_SPAN);
        for row in start_row..row_end {
            for col in start_col..col_end {
                let pos = self.grid.to_index(row, col);
                if pos != PLAYER_START && pos != exit {
                    candidates.push(pos);
                }
            }
        }
        self.rng
            .pick(&candidates)
            .copied()
            .unwrap_or(FALLBACK_SPAWN)
    }

    fn resolve_collision(&mut self) -> Option<OutcomeRecord> {
        let collision = evaluate(self.player_pos, self.pursued_pos, self.grid.exit_cell());
        let outcome = collision.outcome()?;

        self.phase = Phase::Ended;
        if collision == Collision::Captured {
            self.score += 1;
            self.message = MSG_CAPTURED.to_string();
        } else {
            self.message = MSG_ESCAPED.to_string();
        }
        let record = OutcomeRecord {
            player_name: self.player_name.clone(),
            outcome,
            score: self.score,
        };
        self.history.push(record.clone());
        Some(record)
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, player_pos: usize, pursued_pos: usize) {
        self.player_pos = player_pos;
        self.pursued_pos = pursued_pos;
    }
}
