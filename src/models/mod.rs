//! Data models for the question studio.
//!
//! This module defines the data structures used throughout the application:
//!
//! - [`QuestionContent`] / [`QuestionRecord`] - Question bodies as stored by the backend
//! - [`QuestionSnapshot`] - One version of a question inside a studio timeline
//! - [`RefinementEvent`] - A server-reported version produced by a refinement instruction
//! - [`ChatMessage`] - The instruction/acknowledgement exchange shown next to the versions
//! - [`RecentSession`] / [`GenerationResult`] - Dashboard and upload results
//!
//! These models are strongly typed; loosely-typed backend payloads are validated into
//! them by the `parsers` module before anything else sees them.

pub mod chat;
pub mod question;
pub mod refinement;
pub mod session;

pub use chat::{ACKNOWLEDGEMENT, ChatMessage, Role};
pub use question::{QuestionContent, QuestionKind, QuestionRecord, QuestionSnapshot, SourceType};
pub use refinement::{Instruction, RefinementEvent, SEED_INSTRUCTION};
pub use session::{Difficulty, GenerationResult, RecentSession, User};
