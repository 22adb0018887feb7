//! Initial timeline construction from fetched data
//!
//! The builder is a pure transform: the same base question and history always produce the
//! same timeline, whatever order the history arrived in.

use tracing::warn;

use super::{DEFAULT_SUBJECT, DEFAULT_TOPIC, INITIAL_VERSION_LABEL, Timeline};
use crate::models::{
    ChatMessage, Instruction, QuestionContent, QuestionRecord, QuestionSnapshot, RefinementEvent,
};

/// Label of the snapshot produced by a refinement, e.g. `REFINEMENT V3.0`
pub fn refinement_label(version: u32) -> String {
    format!("REFINEMENT V{}.0", version)
}

fn or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Freeze question content into a display snapshot, applying subject/topic defaults
pub fn snapshot_from_content(
    id: &str,
    content: &QuestionContent,
    version: u32,
    version_label: String,
) -> QuestionSnapshot {
    QuestionSnapshot {
        id: id.to_string(),
        kind: content.kind,
        text: content.text.clone(),
        options: content.options.clone(),
        correct_answer: content.correct_answer.clone(),
        explanation: content.explanation.clone(),
        version_label,
        version,
        subject: or_default(content.subject.as_deref(), DEFAULT_SUBJECT),
        topic: or_default(content.topic.as_deref(), DEFAULT_TOPIC),
    }
}

/// Build the timeline of `base` from its refinement history
///
/// Processing:
/// 1. Stable-sort `events` by version (the server's order is not trusted)
/// 2. Emit the base question as version 0, labelled `INITIAL VERSION`
/// 3. For every event: emit the user instruction and the assistant acknowledgement unless
///    the event is the seed, then emit its snapshot labelled `REFINEMENT V{n}.0`
///
/// Events whose version does not increase on the previous snapshot (duplicates, a stray
/// version 0) are skipped with a warning so versions stay strictly increasing.
///
/// # Examples
///
/// ```
/// use question_studio::parsers::parse_question_record;
/// use question_studio::timeline::build_initial;
///
/// let base = parse_question_record(serde_json::json!({
///     "id": "550e8400-e29b-41d4-a716-446655440000",
///     "question_type": "open",
///     "question_text": "2+2=?"
/// }))?;
/// let timeline = build_initial(&base, &[]);
/// assert_eq!(timeline.snapshots().len(), 1);
/// assert_eq!(timeline.snapshots()[0].version_label, "INITIAL VERSION");
/// assert!(timeline.messages().is_empty());
/// # Ok::<(), question_studio::parsers::SchemaError>(())
/// ```
pub fn build_initial(base: &QuestionRecord, events: &[RefinementEvent]) -> Timeline {
    let mut sorted: Vec<&RefinementEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.version);

    let base_snapshot =
        snapshot_from_content(&base.id, &base.content, 0, INITIAL_VERSION_LABEL.to_string());
    let mut timeline = Timeline::new(base.id.clone(), base_snapshot);

    for event in sorted {
        let last_version = timeline.latest().version;
        if event.version <= last_version {
            warn!(
                question_id = %base.id,
                version = event.version,
                last_version,
                "skipping version that does not follow the previous one"
            );
            continue;
        }

        if let Instruction::User(text) = &event.instruction {
            timeline.push_message(ChatMessage::user(text.clone()));
            timeline.push_message(ChatMessage::acknowledgement());
        }

        timeline.push_snapshot(snapshot_from_content(
            &event.question_id,
            &event.content,
            event.version,
            refinement_label(event.version),
        ));
    }

    timeline.focus_latest();
    timeline
}
