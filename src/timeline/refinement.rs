//! Two-phase refinement of a timeline
//!
//! A refinement goes `Settled -> Pending -> Settled`:
//!
//! 1. [`Timeline::begin_refinement`] validates the instruction, appends the user message
//!    optimistically and hands back a [`PendingRefinement`] token
//! 2. [`Timeline::settle`] consumes the token with the server outcome and appends either a
//!    new snapshot plus the acknowledgement, or an `Error: ...` message
//!
//! Failures never leave a snapshot behind and never escape as errors: they end up in the
//! chat, and the timeline is ready for the next attempt.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::builder::{refinement_label, snapshot_from_content};
use super::{RefinementPhase, Timeline};
use crate::models::{ChatMessage, RefinementEvent};

/// Why a refinement could not be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefinementRejected {
    #[error("instruction is empty")]
    EmptyInstruction,
    #[error("a refinement is already in progress")]
    AlreadyPending,
}

/// Token for the refinement currently in flight; must be passed back to [`Timeline::settle`]
#[derive(Debug)]
#[must_use = "a pending refinement must be settled"]
pub struct PendingRefinement {
    question_id: String,
    instruction: String,
}

impl PendingRefinement {
    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    /// Trimmed instruction to send to the backend
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// How a refinement ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    Refined { version: u32 },
    Failed { reason: String },
}

impl Timeline {
    /// Start a refinement: append the user message and enter the pending phase
    ///
    /// # Errors
    ///
    /// - [`RefinementRejected::EmptyInstruction`] if the instruction is blank
    /// - [`RefinementRejected::AlreadyPending`] if another refinement has not settled yet
    ///
    /// A rejected call leaves the timeline untouched.
    pub fn begin_refinement(
        &mut self,
        instruction: &str,
    ) -> Result<PendingRefinement, RefinementRejected> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(RefinementRejected::EmptyInstruction);
        }
        if self.is_pending() {
            return Err(RefinementRejected::AlreadyPending);
        }

        self.push_message(ChatMessage::user(instruction));
        self.phase = RefinementPhase::Pending;
        debug!(question_id = %self.question_id, instruction, "refinement pending");

        Ok(PendingRefinement {
            question_id: self.question_id.clone(),
            instruction: instruction.to_string(),
        })
    }

    /// Settle the pending refinement with the server outcome
    ///
    /// On success the event's snapshot is appended, the acknowledgement follows and only the
    /// new snapshot stays expanded. A result that would break the timeline's invariants (a
    /// version that does not follow the latest one, or an answer about another question) is
    /// reported like any other failure.
    pub fn settle<E: fmt::Display>(
        &mut self,
        pending: PendingRefinement,
        outcome: Result<RefinementEvent, E>,
    ) -> Settled {
        self.phase = RefinementPhase::Settled;

        let result = outcome.map_err(|e| e.to_string()).and_then(|event| {
            if !event.question_id.eq_ignore_ascii_case(&pending.question_id) {
                return Err(format!(
                    "server answered for question {} instead of {}",
                    event.question_id, pending.question_id
                ));
            }
            let latest = self.latest().version;
            if event.version <= latest {
                return Err(format!(
                    "server returned version {} but the latest is {}",
                    event.version, latest
                ));
            }
            Ok(event)
        });

        match result {
            Ok(event) => {
                let version = event.version;
                self.push_snapshot(snapshot_from_content(
                    &event.question_id,
                    &event.content,
                    version,
                    refinement_label(version),
                ));
                self.push_message(ChatMessage::acknowledgement());
                self.focus_latest();
                debug!(question_id = %self.question_id, version, "refinement applied");
                Settled::Refined { version }
            }
            Err(reason) => {
                warn!(question_id = %self.question_id, %reason, "refinement failed");
                self.push_message(ChatMessage::error(&reason));
                Settled::Failed { reason }
            }
        }
    }

    /// Run both phases at once for callers that already hold the server outcome
    pub fn append_refinement<E: fmt::Display>(
        &mut self,
        instruction: &str,
        outcome: Result<RefinementEvent, E>,
    ) -> Result<Settled, RefinementRejected> {
        let pending = self.begin_refinement(instruction)?;
        Ok(self.settle(pending, outcome))
    }
}
