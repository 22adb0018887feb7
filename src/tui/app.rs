//! Studio application state and event handling.
//!
//! This module implements the interactive refinement studio. It manages:
//!
//! - **Timeline**: The question's versions and chat, grown through the two-phase refinement API
//! - **Instruction input**: A single-line editor with F1–F4 quick actions
//! - **Background refinement**: Requests run on the backend's runtime; results come back over a
//!   channel that the UI loop polls, so the terminal never blocks on the network
//! - **Status messages**: Transient feedback for clipboard operations and rejected input
//! - **Dirty state tracking**: Rendering only when state changes
//!
//! # Architecture
//!
//! [`StudioApp`] owns all state and runs the loop via `run()`. At most one refinement is in
//! flight; while it is, input is frozen and Enter only reports that the studio is busy.
//! Quitting with a request in flight abandons it: the late reply is dropped with the channel.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::debug;

use super::backend::{RefinementBackend, RefinementOutcome};
use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::api::validation::INSTRUCTION_CHARS;
use crate::clipboard::copy_snapshot;
use crate::timeline::{PendingRefinement, RefinementRejected, Settled, Timeline};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;

/// Instructions inserted by F1–F4
pub const QUICK_ACTIONS: [&str; 4] = [
    "Add a solution explanation",
    "Simplify wording",
    "Make it harder",
    "Convert to multiple choice",
];

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// The refinement currently waiting for the server
struct InFlight {
    pending: PendingRefinement,
    reply: Receiver<RefinementOutcome>,
}

pub struct StudioApp {
    timeline: Timeline,
    backend: Box<dyn RefinementBackend>,
    input: String,
    selected_idx: usize,
    in_flight: Option<InFlight>,
    should_quit: bool,
    status_message: Option<StatusMessage>,
    // Spinner frame while a refinement is in flight
    tick: usize,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl StudioApp {
    pub fn new(timeline: Timeline, backend: Box<dyn RefinementBackend>) -> Self {
        let selected_idx = timeline.snapshots().len() - 1;
        Self {
            timeline,
            backend,
            input: String::new(),
            selected_idx,
            in_flight: None,
            should_quit: false,
            status_message: None,
            tick: 0,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected_idx(&self) -> usize {
        self.selected_idx
    }

    pub fn is_refining(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Check and clear expired status messages
    fn check_and_clear_expired_status(&mut self) {
        let should_clear = self
            .status_message
            .as_ref()
            .map(|msg| Instant::now() >= msg.expires_at)
            .unwrap_or(false);
        if should_clear {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();
            self.poll_refinement();

            if self.is_refining() {
                self.tick = self.tick.wrapping_add(1);
                self.needs_redraw = true;
            }

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                terminal.draw(|f| {
                    let state = RenderState {
                        timeline: &self.timeline,
                        selected_idx: self.selected_idx,
                        input: &self.input,
                        refining: self.is_refining(),
                        tick: self.tick,
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    /// Settle the in-flight refinement if its outcome has arrived
    fn poll_refinement(&mut self) {
        let outcome = match &self.in_flight {
            None => return,
            Some(in_flight) => match in_flight.reply.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    Err("refinement was interrupted before the server answered".to_string())
                }
            },
        };

        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        match self.timeline.settle(in_flight.pending, outcome) {
            Settled::Refined { version } => {
                self.selected_idx = self.timeline.snapshots().len() - 1;
                self.set_status(
                    format!("✓ Refined to version {}", version),
                    MessageType::Success,
                    STATUS_SUCCESS_DURATION_MS,
                );
            }
            Settled::Failed { .. } => {
                self.set_status("✗ Refinement failed", MessageType::Error, STATUS_ERROR_DURATION_MS);
            }
        }
        self.needs_redraw = true;
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearInput => {
                if self.input.is_empty() {
                    self.should_quit = true;
                } else if !self.is_refining() {
                    self.input.clear();
                    self.needs_redraw = true;
                }
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::Submit => self.submit(),
            Action::ToggleExpand => {
                self.timeline.toggle_expanded(self.selected_idx);
                self.needs_redraw = true;
            }
            Action::CopyToClipboard => self.copy_selected(),
            Action::QuickAction(index) => {
                if let Some(text) = QUICK_ACTIONS.get(index)
                    && !self.is_refining()
                {
                    self.input = text.to_string();
                    self.needs_redraw = true;
                }
            }
            Action::InsertChar(c) => self.insert_char(c),
            Action::DeleteChar => {
                if !self.is_refining() && self.input.pop().is_some() {
                    self.needs_redraw = true;
                }
            }
            Action::None => {}
        }
    }

    fn submit(&mut self) {
        if self.is_refining() {
            self.set_status(
                "✗ Wait for the current refinement to finish",
                MessageType::Error,
                STATUS_ERROR_DURATION_MS,
            );
            return;
        }

        let pending = match self.timeline.begin_refinement(&self.input) {
            Ok(pending) => pending,
            Err(RefinementRejected::EmptyInstruction) => {
                self.set_status("✗ Type an instruction first", MessageType::Error, STATUS_ERROR_DURATION_MS);
                return;
            }
            Err(e @ RefinementRejected::AlreadyPending) => {
                self.set_status(format!("✗ {}", e), MessageType::Error, STATUS_ERROR_DURATION_MS);
                return;
            }
        };

        debug!(question_id = pending.question_id(), "submitting refinement");
        let (reply_tx, reply_rx) = mpsc::channel();
        self.backend.submit(pending.question_id(), pending.instruction(), reply_tx);
        self.in_flight = Some(InFlight { pending, reply: reply_rx });
        self.input.clear();
        self.needs_redraw = true;
    }

    fn copy_selected(&mut self) {
        let Some(snapshot) = self.timeline.snapshots().get(self.selected_idx) else {
            self.set_status("✗ Invalid selection", MessageType::Error, STATUS_ERROR_DURATION_MS);
            return;
        };

        match copy_snapshot(snapshot) {
            Ok(()) => {
                let label = snapshot.version_label.clone();
                self.set_status(
                    format!("✓ Copied {} to clipboard", label),
                    MessageType::Success,
                    STATUS_SUCCESS_DURATION_MS,
                );
            }
            Err(e) => {
                self.set_status(
                    format!("✗ Clipboard error: {}", e),
                    MessageType::Error,
                    STATUS_ERROR_DURATION_MS,
                );
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let total = self.timeline.snapshots().len();
        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn insert_char(&mut self, c: char) {
        // Input is frozen while a refinement is in flight
        if self.is_refining() {
            return;
        }
        if self.input.chars().count() < *INSTRUCTION_CHARS.end() {
            self.input.push(c);
            self.needs_redraw = true;
        }
    }
}
