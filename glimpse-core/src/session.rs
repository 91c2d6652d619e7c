//! Game session controller
//!
//! Owns all per-session state and mediates between the player's actions and
//! the collection service. Lifecycle:
//!
//! ```text
//! Uninitialized → Active → Finalizing → (Active' | Uninitialized)
//! ```
//!
//! Commits are two-phase: a turn is posted to the recorder first and the local
//! reveal happens only once the service acknowledges it, so a failed call
//! leaves the session exactly as it was and the same commit can be retried.
//! Taking `&mut self` across the await serializes commits — a second commit
//! cannot start while one is in flight.

use chrono::{DateTime, Utc};

use crate::client::{CollectorBackend, EndGameRequest, RecordTurnRequest};
use crate::error::GlimpseError;
use crate::models::belief::Belief;
use crate::models::puzzle::{Mask, PixelGrid};
use crate::models::turn::{Trajectory, TurnRecord};

/// Where the controller is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Active,
    Finalizing,
}

/// All state owned by one game session. Replaced wholesale on finish or skip;
/// nothing crosses session boundaries.
#[derive(Debug)]
pub struct GameSession {
    pub id: String,
    pub grid: PixelGrid,
    pub mask: Mask,
    pub belief: Belief,
    pub selected: Option<(usize, usize)>,
    pub reasoning: String,
    pub trajectory: Trajectory,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    fn new(id: String, grid: PixelGrid) -> Self {
        let side = grid.side();
        Self {
            id,
            grid,
            mask: Mask::all_hidden(side),
            belief: Belief::uniform(),
            selected: None,
            reasoning: String::new(),
            trajectory: Trajectory::new(),
            started_at: Utc::now(),
        }
    }

    /// Committed turns so far. Equal to the trajectory length by construction.
    pub fn turns(&self) -> u32 {
        self.trajectory.len() as u32
    }
}

/// Drives sessions against a [`CollectorBackend`].
pub struct SessionController {
    backend: Box<dyn CollectorBackend>,
    user_id: String,
    phase: Phase,
    session: Option<GameSession>,
    finished_games: u32,
}

impl SessionController {
    pub fn new(backend: Box<dyn CollectorBackend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
            phase: Phase::Uninitialized,
            session: None,
            finished_games: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn finished_games(&self) -> u32 {
        self.finished_games
    }

    fn session_in(&mut self, expected: Phase) -> Result<&mut GameSession, GlimpseError> {
        if self.phase != expected {
            return Err(GlimpseError::Phase {
                expected,
                actual: self.phase,
            });
        }
        self.session.as_mut().ok_or(GlimpseError::Phase {
            expected,
            actual: Phase::Uninitialized,
        })
    }

    /// Request a fresh puzzle and enter Active.
    ///
    /// Valid only with no session in progress; `skip` and `confirm_finish`
    /// re-enter through here. A malformed or unreachable puzzle leaves the
    /// controller Uninitialized.
    pub async fn start(&mut self) -> Result<(), GlimpseError> {
        if self.phase != Phase::Uninitialized {
            return Err(GlimpseError::Phase {
                expected: Phase::Uninitialized,
                actual: self.phase,
            });
        }

        let opened = self.backend.start_game(&self.user_id).await?;
        let grid = PixelGrid::from_flat(opened.image)?;
        tracing::info!(game_id = %opened.game_id, side = grid.side(), "Session started");

        self.session = Some(GameSession::new(opened.game_id, grid));
        self.phase = Phase::Active;
        Ok(())
    }

    /// Mark a masked cell as the pending reveal. Does not touch the mask.
    pub fn select(&mut self, row: usize, col: usize) -> Result<(), GlimpseError> {
        let session = self.session_in(Phase::Active)?;
        if !session.mask.is_hidden(row, col)? {
            return Err(GlimpseError::AlreadyRevealed { row, col });
        }
        session.selected = Some((row, col));
        Ok(())
    }

    /// Assign one class's raw weight and renormalize the belief.
    pub fn set_weight(&mut self, class: usize, value: f64) -> Result<(), GlimpseError> {
        self.session_in(Phase::Active)?.belief.set_weight(class, value)
    }

    /// Replace the pending reasoning text for the next commit.
    pub fn set_reasoning(&mut self, text: impl Into<String>) -> Result<(), GlimpseError> {
        self.session_in(Phase::Active)?.reasoning = text.into();
        Ok(())
    }

    /// Commit the pending reveal.
    ///
    /// Preconditions: a masked cell is selected and the reasoning text is
    /// non-empty. The turn is posted to the recorder first; only on its
    /// acknowledgment do the local effects apply (record appended, mask bit
    /// cleared, selection and reasoning cleared). Returns the turn number.
    pub async fn commit_turn(&mut self) -> Result<u32, GlimpseError> {
        let session = self.session_in(Phase::Active)?;
        let (row, col) = session.selected.ok_or(GlimpseError::NoSelection)?;
        if !session.mask.is_hidden(row, col)? {
            return Err(GlimpseError::AlreadyRevealed { row, col });
        }
        let reasoning = session.reasoning.trim();
        if reasoning.is_empty() {
            return Err(GlimpseError::EmptyReasoning);
        }

        let number = session.turns() + 1;
        let pending = TurnRecord {
            number,
            row,
            col,
            belief: session.belief.clone(),
            reasoning: reasoning.to_string(),
        };
        let request = RecordTurnRequest {
            game_id: session.id.clone(),
            turn_number: pending.number,
            pixel_row: row,
            pixel_col: col,
            probability_distribution: pending.belief.to_vec(),
            thought_process: pending.reasoning.clone(),
        };

        // Two-phase: nothing below runs unless the recorder takes the turn.
        self.backend.record_turn(&request).await?;

        let session = self.session_in(Phase::Active)?;
        session.mask.reveal(row, col)?;
        session.trajectory.push(pending);
        session.selected = None;
        session.reasoning.clear();
        tracing::debug!(turn = number, row, col, "Turn committed");
        Ok(number)
    }

    /// Open the finish confirmation gate. No session state changes.
    pub fn request_finish(&mut self) -> Result<(), GlimpseError> {
        self.session_in(Phase::Active)?;
        self.phase = Phase::Finalizing;
        Ok(())
    }

    /// Close the gate and keep playing.
    pub fn cancel_finish(&mut self) -> Result<(), GlimpseError> {
        self.session_in(Phase::Finalizing)?;
        self.phase = Phase::Active;
        Ok(())
    }

    /// Submit the finished session and start the next one.
    ///
    /// The final guess is the current top-belief class. On a failed
    /// submission the controller stays in Finalizing with the session intact.
    pub async fn confirm_finish(&mut self) -> Result<usize, GlimpseError> {
        let session = self.session_in(Phase::Finalizing)?;
        let final_guess = session.belief.top_class();
        let request = EndGameRequest {
            game_id: session.id.clone(),
            final_guess,
            num_turns: session.turns(),
            trajectory: session.trajectory.reveal_path(),
            thought_trajectory: session.trajectory.reasonings(),
            probability_distribution_trajectory: session.trajectory.belief_path(),
        };

        self.backend.end_game(&request).await?;
        tracing::info!(
            game_id = %request.game_id,
            final_guess,
            turns = request.num_turns,
            "Session finalized"
        );

        self.finished_games += 1;
        self.session = None;
        self.phase = Phase::Uninitialized;
        self.start().await?;
        Ok(final_guess)
    }

    /// Throw the current session away without submitting, then start fresh.
    pub async fn skip(&mut self) -> Result<(), GlimpseError> {
        let session = self.session_in(Phase::Finalizing)?;
        tracing::info!(game_id = %session.id, "Session skipped");
        self.session = None;
        self.phase = Phase::Uninitialized;
        self.start().await
    }
}

// ============================================================================
// TESTS
// ============================================================================
