//! Question Studio - generate exam questions and refine them version by version
//!
//! This library is the client side of an AI question-generation backend. It supports:
//!
//! - Generating questions from a PDF or from an image of a similar question
//! - Browsing recent generation sessions and stored questions
//! - Building the version timeline of a question from its refinement history
//! - Refining a question through a chat-style exchange, one version at a time
//!
//! # Example
//!
//! ```no_run
//! use question_studio::StudioClient;
//! use question_studio::auth::Credentials;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = StudioClient::new("http://localhost:8000", Some(Credentials::from_token("...")))?;
//! let mut timeline = client.load_timeline("550e8400-e29b-41d4-a716-446655440000").await?;
//!
//! let pending = timeline.begin_refinement("Make the distractors more plausible")?;
//! let outcome = client.refine(pending.question_id(), pending.instruction()).await;
//! timeline.settle(pending, outcome);
//! println!("Now at {}", timeline.latest().version_label);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod clipboard;
pub mod models;
pub mod parsers;
pub mod timeline;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use api::{ApiError, StudioClient};
pub use models::{ChatMessage, QuestionRecord, QuestionSnapshot, RefinementEvent};
pub use parsers::{parse_question_record, parse_version_history};
pub use timeline::{Timeline, build_initial};
