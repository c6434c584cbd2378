use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::format::format_bytes;
use crate::ui::theme::Theme;
use crate::watch::{Sample, SessionInfo, SessionState};

/// Branding, the watched process and its latest reading on one line.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    session: Option<&SessionInfo>,
    latest: Option<&Sample>,
    theme: &Theme,
) {
    let mut spans = vec![
        Span::styled(
            " procwatch ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    match session {
        Some(info) => {
            spans.push(Span::styled(
                format!("{} [{}] (T={})", info.name, info.pid, info.interval),
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ));
            if let Some(sample) = latest {
                spans.push(Span::styled(
                    format!("  mem {}", format_bytes(sample.memory)),
                    Style::default().fg(theme.memory_line),
                ));
                if let Some(cpu) = sample.cpu {
                    spans.push(Span::styled(
                        format!("  cpu {cpu:.1}%"),
                        Style::default().fg(theme.cpu_line),
                    ));
                }
            }
            if info.state != SessionState::Collecting {
                spans.push(Span::styled(
                    format!("  ({})", info.state.label()),
                    Style::default().fg(theme.status_err),
                ));
            }
        }
        None => spans.push(Span::styled(
            "no process selected",
            Style::default().fg(theme.text_secondary),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
