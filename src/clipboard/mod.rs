use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::models::QuestionSnapshot;

/// Maximum clipboard size (10MB) to prevent DoS attacks
const MAX_CLIPBOARD_SIZE: usize = 10 * 1024 * 1024;

/// Trait for clipboard operations (allows mocking in tests)
trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Real clipboard implementation using arboard
struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }
}

/// Validates clipboard text without accessing system clipboard
fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Cannot copy empty text to clipboard");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        anyhow::bail!(
            "Text too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_SIZE
        );
    }

    Ok(())
}

/// Plain-text rendition of one question version, as pasted into a document
///
/// ```text
/// Which planet is largest?
///
/// A. Mars
/// B. Jupiter
///
/// Answer: B
/// Explanation: Jupiter is the largest planet in the solar system.
/// ```
pub fn snapshot_text(snapshot: &QuestionSnapshot) -> String {
    let mut text = snapshot.text.trim().to_string();

    if let Some(options) = &snapshot.options {
        text.push('\n');
        for (label, option) in options {
            text.push_str(&format!("\n{}. {}", label, option.trim()));
        }
    }

    let answer = snapshot.correct_answer.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let explanation = snapshot.explanation.trim();
    if answer.is_some() || !explanation.is_empty() {
        text.push('\n');
    }
    if let Some(answer) = answer {
        text.push_str(&format!("\nAnswer: {}", answer));
    }
    if !explanation.is_empty() {
        text.push_str(&format!("\nExplanation: {}", explanation));
    }

    text
}

fn copy_with_provider(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_clipboard_text(text)?;
    provider.set_text(text)?;
    Ok(())
}

/// Copy text to the system clipboard.
///
/// # Errors
/// Returns error if:
/// - Text is empty or whitespace-only
/// - Text is too large for clipboard (>10MB)
/// - Clipboard is locked by another process
/// - System clipboard is unavailable (headless environment)
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    // Validate first, before initializing clipboard (for better error messages in CI)
    validate_clipboard_text(text)?;

    let mut clipboard = SystemClipboard::new()?;
    copy_with_provider(text, &mut clipboard)
}

/// Copy a question version to the system clipboard
pub fn copy_snapshot(snapshot: &QuestionSnapshot) -> Result<()> {
    copy_to_clipboard(&snapshot_text(snapshot))
}
