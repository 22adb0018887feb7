//! Version timeline of one question in the studio
//!
//! A [`Timeline`] merges a base question with its ordered refinement history into two
//! derived sequences: the question snapshots (version 0, 1, 2, ...) and the chat exchange
//! that produced them. It is built once per question with [`build_initial`] and then only
//! ever grows at the tail through the two-phase refinement API in [`refinement`].
//!
//! # Invariants
//!
//! - There is always at least one snapshot (the base question, version 0)
//! - Snapshot versions are strictly increasing in display order
//! - Snapshots are never reordered or mutated in place
//! - At most one refinement is pending at a time
//!
//! The set of expanded snapshots is presentation state carried alongside the data: every
//! successful refinement collapses all earlier snapshots and expands the new one.

pub mod builder;
pub mod refinement;

use std::collections::BTreeSet;

use crate::models::{ChatMessage, QuestionSnapshot};

pub use builder::{build_initial, refinement_label, snapshot_from_content};
pub use refinement::{PendingRefinement, RefinementRejected, Settled};

pub const INITIAL_VERSION_LABEL: &str = "INITIAL VERSION";
pub const DEFAULT_SUBJECT: &str = "QUESTION";
pub const DEFAULT_TOPIC: &str = "STUDIO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementPhase {
    /// No request in flight, input accepted
    Settled,
    /// User message shown, waiting for the server
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    question_id: String,
    snapshots: Vec<QuestionSnapshot>,
    messages: Vec<ChatMessage>,
    expanded: BTreeSet<usize>,
    phase: RefinementPhase,
}

impl Timeline {
    pub(crate) fn new(question_id: String, base: QuestionSnapshot) -> Self {
        let mut expanded = BTreeSet::new();
        expanded.insert(0);
        Self {
            question_id,
            snapshots: vec![base],
            messages: Vec::new(),
            expanded,
            phase: RefinementPhase::Settled,
        }
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn snapshots(&self) -> &[QuestionSnapshot] {
        &self.snapshots
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent version (the base question when nothing was refined yet)
    pub fn latest(&self) -> &QuestionSnapshot {
        // Invariant: never empty, the base snapshot is pushed by `new`
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn phase(&self) -> RefinementPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == RefinementPhase::Pending
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn expanded_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.expanded.iter().copied()
    }

    /// Flip the expanded state of one snapshot; returns the new state.
    /// Out-of-range indices are ignored.
    pub fn toggle_expanded(&mut self, index: usize) -> bool {
        if index >= self.snapshots.len() {
            return false;
        }
        if self.expanded.remove(&index) {
            false
        } else {
            self.expanded.insert(index);
            true
        }
    }

    fn push_snapshot(&mut self, snapshot: QuestionSnapshot) {
        debug_assert!(snapshot.version > self.latest().version);
        self.snapshots.push(snapshot);
    }

    fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    fn focus_latest(&mut self) {
        self.expanded.clear();
        self.expanded.insert(self.snapshots.len() - 1);
    }
}
