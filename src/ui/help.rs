//! Help overlay: configured keys, picker keys and the interval presets.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::ResolvedKeybinds;
use crate::ui::centered_rect;
use crate::ui::theme::Theme;
use crate::watch::Interval;

const PICKER_KEYS: [(&str, &str); 4] = [
    ("Enter", "Watch selected process"),
    ("Tab", "Next sampling interval"),
    ("\u{2191}\u{2193}", "Move selection"),
    ("Esc", "Close picker"),
];

pub fn render(
    frame: &mut Frame,
    area: Rect,
    keybinds: &ResolvedKeybinds,
    default_interval: Interval,
    theme: &Theme,
) {
    let mut lines = vec![section("Chart", theme)];
    lines.extend(
        keybinds
            .help_entries()
            .iter()
            .map(|(key, desc)| key_line(key, desc, theme)),
    );
    lines.push(Line::default());
    lines.push(section("Process picker", theme));
    lines.extend(PICKER_KEYS.iter().map(|(key, desc)| key_line(key, desc, theme)));
    lines.push(Line::default());
    lines.push(interval_line(default_interval, theme));

    let width = 52u16.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Help ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Clear, overlay);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().bg(theme.surface_bg)),
        overlay,
    );
}

fn section(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {title}"),
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line(key: &str, desc: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {key:>7} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {desc}"), Style::default().fg(theme.pill_desc_fg)),
    ])
}

/// Presets offered by the picker, with the startup interval called out.
fn interval_line(default_interval: Interval, theme: &Theme) -> Line<'static> {
    let presets: Vec<String> = Interval::PRESETS.iter().map(|p| p.to_string()).collect();
    Line::from(vec![
        Span::styled(" Intervals ", Style::default().fg(theme.text_secondary)),
        Span::styled(presets.join(" / "), Style::default().fg(theme.text_primary)),
        Span::styled(
            format!("  (start {default_interval})"),
            Style::default().fg(theme.text_secondary),
        ),
    ])
}
