//! Plain-text rendering of backend data for the command line
//!
//! Every string that came from the backend goes through [`strip_ansi_codes`] here, so the
//! command handlers can print the results as is.

use std::fmt::Write;

use crate::auth::TokenSource;
use crate::models::{ChatMessage, GenerationResult, QuestionRecord, QuestionSnapshot, RecentSession, Role, User};
use crate::timeline::Timeline;
use crate::utils::{format_optional_timestamp, strip_ansi_codes};

const RULE: &str = "────────────────────────────────────────";

fn clean(text: &str) -> String {
    strip_ansi_codes(text.trim())
}

/// Question text, options (correct one marked), answer and explanation
fn question_body(
    out: &mut String,
    text: &str,
    options: Option<&std::collections::BTreeMap<String, String>>,
    correct_answer: Option<&str>,
    explanation: &str,
) {
    let _ = writeln!(out, "{}", clean(text));
    match options {
        Some(options) => {
            for (label, option) in options {
                let mark = if correct_answer == Some(label.as_str()) { "  ✓" } else { "" };
                let _ = writeln!(out, "  {}. {}{}", clean(label), clean(option), mark);
            }
        }
        None => {
            if let Some(answer) = correct_answer.filter(|a| !a.trim().is_empty()) {
                let _ = writeln!(out, "  Answer: {}", clean(answer));
            }
        }
    }
    if !explanation.trim().is_empty() {
        let _ = writeln!(out, "  Explanation: {}", clean(explanation));
    }
}

/// One stored question, as listed by `session`, `generate-*` and `show`
pub fn question_card(record: &QuestionRecord, number: Option<usize>) -> String {
    let content = &record.content;
    let mut out = String::new();

    let prefix = number.map(|n| format!("{}. ", n)).unwrap_or_default();
    let _ = writeln!(out, "{}[{}] {}", prefix, content.kind.display_name(), record.id);
    question_body(
        &mut out,
        &content.text,
        content.options.as_ref(),
        content.correct_answer.as_deref(),
        &content.explanation,
    );
    if let Some(score) = content.confidence_score {
        let _ = writeln!(out, "  Confidence: {:.0}%", score * 100.0);
    }
    out
}

/// Full detail view for `show`
pub fn question_detail(record: &QuestionRecord) -> String {
    let mut out = question_card(record, None);
    let content = &record.content;

    let source = record.source_type.map(|s| s.display_name()).unwrap_or("-");
    let _ = writeln!(out, "  Source: {}", source);
    if let Some(session_id) = &record.session_id {
        let _ = writeln!(out, "  Session: {}", session_id);
    }
    if let Some(subject) = &content.subject {
        let _ = writeln!(out, "  Subject: {}", clean(subject));
    }
    if let Some(topic) = &content.topic {
        let _ = writeln!(out, "  Topic: {}", clean(topic));
    }
    if let Some(tags) = content.tags.as_ref().filter(|t| !t.is_empty()) {
        let tags: Vec<String> = tags
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("{}={}", clean(key), clean(s)),
                other => format!("{}={}", clean(key), clean(&other.to_string())),
            })
            .collect();
        let _ = writeln!(out, "  Tags: {}", tags.join(", "));
    }
    let _ = writeln!(out, "  Created: {}", format_optional_timestamp(record.created_at.as_ref()));
    out
}

fn snapshot_block(out: &mut String, snapshot: &QuestionSnapshot) {
    let _ = writeln!(
        out,
        "{} · {} · {} · {}",
        snapshot.version_label,
        snapshot.kind.display_name(),
        clean(&snapshot.subject),
        clean(&snapshot.topic)
    );
    question_body(
        out,
        &snapshot.text,
        snapshot.options.as_ref(),
        snapshot.correct_answer.as_deref(),
        &snapshot.explanation,
    );
}

fn chat_line(message: &ChatMessage) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "studio",
    };
    format!("  {:>6}: {}", speaker, clean(&message.content))
}

/// Every version of a question followed by the refinement chat (`history`)
pub fn timeline_report(timeline: &Timeline) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Question {} ({} versions)", timeline.question_id(), timeline.snapshots().len());

    for snapshot in timeline.snapshots() {
        let _ = writeln!(out, "{}", RULE);
        snapshot_block(&mut out, snapshot);
    }

    let _ = writeln!(out, "{}", RULE);
    if timeline.messages().is_empty() {
        let _ = writeln!(out, "No refinements yet.");
    } else {
        let _ = writeln!(out, "Chat:");
        for message in timeline.messages() {
            let _ = writeln!(out, "{}", chat_line(message));
        }
    }
    out
}

/// Outcome of a one-shot `refine`: the chat exchange and, on success, the new version
pub fn refinement_report(timeline: &Timeline, refined: bool) -> String {
    let mut out = String::new();
    // The exchange is the user message plus the reply appended by this refinement
    let messages = timeline.messages();
    for message in &messages[messages.len().saturating_sub(2)..] {
        let _ = writeln!(out, "{}", chat_line(message));
    }
    if refined {
        let _ = writeln!(out, "{}", RULE);
        snapshot_block(&mut out, timeline.latest());
    }
    out
}

/// Dashboard listing for `recent`
pub fn session_list(sessions: &[RecentSession]) -> String {
    if sessions.is_empty() {
        return "No question sessions yet. Generate some with `generate-doc` or `generate-similar`.\n"
            .to_string();
    }

    let mut out = String::new();
    for session in sessions {
        let _ = writeln!(
            out,
            "{:<12} {:<18} {:<16} {:>3} questions  {}",
            format_optional_timestamp(session.created_at.as_ref()),
            session.source_type.display_name(),
            session.kind.display_name(),
            session.questions.len(),
            session.session_id
        );
    }
    out
}

/// Questions produced by a generation request
pub fn generation_summary(result: &GenerationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Generated {} questions (session {})", result.questions.len(), result.session_id);
    for (i, record) in result.questions.iter().enumerate() {
        let _ = writeln!(out);
        out.push_str(&question_card(record, Some(i + 1)));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Refine one with: question-studio studio <question-id>");
    out
}

pub fn user_line(user: &User, source: TokenSource) -> String {
    match &user.display_name {
        Some(name) => format!("Logged in as {} <{}> (via {})", clean(name), clean(&user.email), source),
        None => format!("Logged in as {} (via {})", clean(&user.email), source),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Instruction, QuestionContent, QuestionKind, RefinementEvent, SourceType};
    use crate::timeline::build_initial;

    fn record() -> QuestionRecord {
        QuestionRecord {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            session_id: None,
            source_type: Some(SourceType::Document),
            content: QuestionContent {
                kind: QuestionKind::SingleSelect,
                text: "Which planet is \x1b[31mlargest\x1b[0m?".to_string(),
                options: Some(BTreeMap::from([
                    ("A".to_string(), "Mars".to_string()),
                    ("B".to_string(), "Jupiter".to_string()),
                ])),
                correct_answer: Some("B".to_string()),
                explanation: "Gas giant.".to_string(),
                subject: None,
                topic: None,
                tags: None,
                confidence_score: Some(0.9),
            },
            created_at: None,
        }
    }

    #[test]
    fn test_question_card() {
        let card = question_card(&record(), Some(1));
        assert_eq!(
            card,
            "1. [MULTIPLE CHOICE] 550e8400-e29b-41d4-a716-446655440000\n\
             Which planet is largest?\n  A. Mars\n  B. Jupiter  ✓\n  Explanation: Gas giant.\n  Confidence: 90%\n"
        );
    }

    #[test]
    fn test_question_detail_includes_source() {
        let detail = question_detail(&record());
        assert!(detail.contains("Source: PDF WORKSPACE"));
        assert!(detail.contains("Created: -"));
    }

    #[test]
    fn test_timeline_report() {
        let mut refined = record().content;
        refined.text = "Which planet is the largest gas giant?".to_string();
        let event = RefinementEvent {
            question_id: record().id,
            version: 1,
            instruction: Instruction::User("be specific".to_string()),
            content: refined,
            created_at: None,
        };
        let report = timeline_report(&build_initial(&record(), &[event]));

        assert!(report.contains("(2 versions)"));
        assert!(report.contains("INITIAL VERSION · MULTIPLE CHOICE · QUESTION · STUDIO"));
        assert!(report.contains("REFINEMENT V1.0"));
        assert!(report.contains("   you: be specific"));
        assert!(report.contains("studio: I've updated the question"));
    }

    #[test]
    fn test_timeline_report_without_refinements() {
        let report = timeline_report(&build_initial(&record(), &[]));
        assert!(report.contains("No refinements yet."));
    }

    #[test]
    fn test_refinement_report_failure() {
        let mut timeline = build_initial(&record(), &[]);
        timeline
            .append_refinement("add option", Err::<RefinementEvent, _>("rate limited"))
            .unwrap();
        let report = refinement_report(&timeline, false);
        assert_eq!(report, "     you: add option\n  studio: Error: rate limited\n");
    }

    #[test]
    fn test_session_list_empty() {
        assert!(session_list(&[]).starts_with("No question sessions yet."));
    }

    #[test]
    fn test_user_line() {
        let user = User {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            display_name: Some("Ada".to_string()),
        };
        assert_eq!(
            user_line(&user, TokenSource::File),
            "Logged in as Ada <ada@example.com> (via credentials file)"
        );
    }
}
