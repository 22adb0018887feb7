//! Sanitizing server text for the terminal
//!
//! Question text, explanations, chat replies and error details come from the backend, and most
//! of them were written by a language model or another user. None of it may drive the terminal:
//! every CLI printer and the studio renderer pass it through [`strip_ansi_codes`] first.
//!
//! Removed:
//!
//! - CSI sequences (`ESC [ … final`), e.g. colors, cursor moves, screen clears
//! - OSC sequences (`ESC ] … BEL` or `ESC ] … ESC \`), e.g. window titles and hyperlinks
//! - Other escape sequences (`ESC` plus one character)
//! - C0 and C1 control characters other than tab and newline
//!
//! A carriage return that is not part of `\r\n` would let a line overwrite the one before it,
//! so it becomes a newline; `\r\n` collapses to `\n`.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Remove terminal control sequences from backend text
///
/// # Examples
///
/// ```
/// use question_studio::utils::terminal::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mJupiter\x1b[0m"), "Jupiter");
/// assert_eq!(strip_ansi_codes("A\rB"), "A\nB");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ESC => match chars.next() {
                // CSI: parameter and intermediate bytes up to a final byte in @..~
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: terminated by BEL or ST (ESC \)
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC {
                            if chars.peek() == Some(&'\\') {
                                chars.next();
                            }
                            break;
                        }
                    }
                }
                // Two-character sequences (ESC c, ESC 7, ...) or a trailing ESC
                _ => {}
            },
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    result.push('\n');
                }
            }
            '\t' | '\n' => result.push(ch),
            c if c.is_control() => {}
            c => result.push(c),
        }
    }

    result
}
