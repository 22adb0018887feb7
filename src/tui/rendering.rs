use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::app::{MessageType, StatusMessage};
use super::layout::AppLayout;
use crate::models::{ChatMessage, QuestionSnapshot, Role};
use crate::timeline::Timeline;
use crate::utils::strip_ansi_codes;

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129); // Emerald
const WARN: Color = Color::Rgb(245, 158, 11); // Amber
const DANGER: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Everything the renderer needs from the app for one frame
pub struct RenderState<'a> {
    pub timeline: &'a Timeline,
    pub selected_idx: usize,
    pub input: &'a str,
    pub refining: bool,
    pub tick: usize,
    pub status_message: Option<&'a StatusMessage>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_chat(frame, layout.chat_area, state.timeline.messages(), state.refining, state.tick);
    render_versions(frame, layout.versions_area, state.timeline, state.selected_idx);
    render_question(frame, layout.question_area, state.timeline.snapshots().get(state.selected_idx));
    render_input(frame, layout.input_area, state.input, state.refining);
    render_status_bar(frame, layout.status_area, state);
}

fn pane(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(title)
}

/// Rows `text` occupies once wrapped to `width` columns (approximate: counts chars)
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    text.lines()
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum::<usize>()
        .try_into()
        .unwrap_or(u16::MAX)
}

fn render_chat(frame: &mut Frame, area: Rect, messages: &[ChatMessage], refining: bool, tick: usize) {
    let inner_width = area.width.saturating_sub(2);
    let mut lines = Vec::new();
    let mut height: u16 = 0;

    if messages.is_empty() && !refining {
        lines.push(Line::styled("No refinements yet.", Style::default().fg(MUTED)));
        lines.push(Line::styled("Type an instruction below.", Style::default().fg(MUTED)));
    }

    for message in messages {
        let (speaker, style) = match message.role {
            Role::User => ("YOU", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Role::Assistant if message.is_error() => {
                ("STUDIO", Style::default().fg(DANGER).add_modifier(Modifier::BOLD))
            }
            Role::Assistant => ("STUDIO", Style::default().fg(MUTED).add_modifier(Modifier::BOLD)),
        };
        let body = strip_ansi_codes(&message.content);
        let body_style = if message.is_error() {
            Style::default().fg(DANGER)
        } else {
            Style::default()
        };

        lines.push(Line::styled(speaker, style));
        height = height.saturating_add(1);
        for line in body.lines() {
            lines.push(Line::styled(line.to_string(), body_style));
        }
        height = height.saturating_add(wrapped_height(&body, inner_width));
        lines.push(Line::from(""));
        height = height.saturating_add(1);
    }

    if refining {
        lines.push(Line::styled(
            format!("{} refining...", SPINNER[tick % SPINNER.len()]),
            Style::default().fg(WARN),
        ));
        height = height.saturating_add(1);
    }

    // Keep the newest messages in view
    let visible = area.height.saturating_sub(2);
    let scroll = height.saturating_sub(visible);

    let paragraph = Paragraph::new(Text::from(lines))
        .block(pane(" Chat "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_versions(frame: &mut Frame, area: Rect, timeline: &Timeline, selected_idx: usize) {
    let preview_width = usize::from(area.width.saturating_sub(6).max(10));

    let items: Vec<ListItem> = timeline
        .snapshots()
        .iter()
        .enumerate()
        .map(|(idx, snapshot)| {
            let expanded = timeline.is_expanded(idx);
            let marker = if expanded { "▾" } else { "▸" };
            let style = if idx == selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };

            let mut lines =
                vec![Line::styled(format!("{} {}", marker, snapshot.version_label), style)];
            if expanded {
                let preview: String = strip_ansi_codes(&snapshot.text)
                    .lines()
                    .next()
                    .unwrap_or("")
                    .chars()
                    .take(preview_width)
                    .collect();
                lines.push(Line::from(format!("  {}", preview)));
                lines.push(Line::styled(
                    format!("  {} · {}", snapshot.kind.display_name(), snapshot.topic),
                    Style::default().fg(MUTED),
                ));
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    let title = format!(" Versions ({}) ", timeline.snapshots().len());
    frame.render_widget(List::new(items).block(pane(&title)), area);
}

fn question_lines(snapshot: &QuestionSnapshot) -> Vec<Line<'static>> {
    let label = Style::default().fg(MUTED);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(strip_ansi_codes(&snapshot.subject), label.add_modifier(Modifier::BOLD)),
            Span::styled(" · ", label),
            Span::styled(strip_ansi_codes(&snapshot.topic), label),
            Span::styled(" · ", label),
            Span::styled(snapshot.kind.display_name(), label),
        ]),
        Line::styled(snapshot.version_label.clone(), Style::default().fg(ACCENT)),
        Line::from(""),
    ];

    for line in strip_ansi_codes(&snapshot.text).lines() {
        lines.push(Line::styled(line.to_string(), Style::default().add_modifier(Modifier::BOLD)));
    }

    if let Some(options) = &snapshot.options {
        lines.push(Line::from(""));
        for (key, option) in options {
            let correct = snapshot.correct_answer.as_deref() == Some(key.as_str());
            let style = if correct { Style::default().fg(ACCENT) } else { Style::default() };
            let check = if correct { " ✓" } else { "" };
            lines.push(Line::styled(
                format!("{}. {}{}", key, strip_ansi_codes(option), check),
                style,
            ));
        }
    } else if let Some(answer) = &snapshot.correct_answer {
        lines.push(Line::from(""));
        lines.push(Line::styled("Answer", label));
        for line in strip_ansi_codes(answer).lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    if !snapshot.explanation.trim().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled("Explanation", label));
        for line in strip_ansi_codes(&snapshot.explanation).lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    lines
}

fn render_question(frame: &mut Frame, area: Rect, snapshot: Option<&QuestionSnapshot>) {
    let content = match snapshot {
        Some(snapshot) => Text::from(question_lines(snapshot)),
        None => Text::from("No version selected"),
    };

    let paragraph =
        Paragraph::new(content).block(pane(" Question ")).wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, input: &str, refining: bool) {
    let (title, text, style) = if refining {
        (" Instruction (WORKING...) ", "waiting for the server...".to_string(), Style::default().fg(MUTED))
    } else if input.is_empty() {
        (
            " Instruction (READY) ",
            "e.g. 'Add a solution explanation' or 'Simplify wording'".to_string(),
            Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        )
    } else {
        (" Instruction (READY) ", format!("{}█", input), Style::default().fg(BRIGHT))
    };

    // Show the tail of long instructions
    let width = usize::from(area.width.saturating_sub(2));
    let count = text.chars().count();
    let visible: String = text.chars().skip(count.saturating_sub(width)).collect();

    frame.render_widget(Paragraph::new(visible).style(style).block(pane(title)), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = if let Some(message) = state.status_message {
        let fg = match message.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => DANGER,
        };
        (format!(" {} ", message.text), Style::default().fg(fg).bg(BAR_BG))
    } else {
        let mut parts = vec![if state.refining { "[WORKING]" } else { "[READY]" }.to_string()];
        parts.push(format!(
            "version {}/{}",
            state.selected_idx + 1,
            state.timeline.snapshots().len()
        ));
        parts.push("Enter: refine".to_string());
        parts.push("F1-F4: quick actions".to_string());
        parts.push("Tab: expand".to_string());
        parts.push("Ctrl+Y: copy".to_string());
        parts.push(if state.input.is_empty() { "Esc: quit" } else { "Esc: clear" }.to_string());

        (format!(" {} ", parts.join(" | ")), Style::default().fg(BRIGHT).bg(BAR_BG))
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}
