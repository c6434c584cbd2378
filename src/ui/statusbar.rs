use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, ResolvedKeybinds, StatusMessage, key_label};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    input_mode: InputMode,
    status_message: Option<&StatusMessage>,
    keybinds: &ResolvedKeybinds,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Status message takes priority
    if let Some(msg) = status_message {
        let color = if msg.is_error {
            theme.status_err
        } else {
            theme.status_ok
        };
        let line = Line::from(Span::styled(
            format!(" {}", msg.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let mut spans = Vec::new();
    match input_mode {
        InputMode::Picker => {
            spans.extend(pill_spans("Enter", "Watch", theme));
            spans.extend(pill_spans("Tab", "Interval", theme));
            spans.extend(pill_spans("\u{2191}\u{2193}", "Move", theme));
            spans.extend(pill_spans("Esc", "Cancel", theme));
        }
        InputMode::Help => {
            spans.extend(pill_spans("Esc", "Close", theme));
        }
        InputMode::Normal => {
            spans.extend(pill_spans(&key_label(keybinds.quit), "Quit", theme));
            spans.extend(pill_spans(&key_label(keybinds.pick), "Process", theme));
            spans.extend(pill_spans(&key_label(keybinds.export), "Export", theme));
            spans.extend(pill_spans(&key_label(keybinds.cycle_theme), "Theme", theme));
            spans.extend(pill_spans(&key_label(keybinds.help), "Help", theme));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans(key: &str, desc: &str, theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
