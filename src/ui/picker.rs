//! Process picker overlay: filter line, interval choice and a process table.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState};

use crate::app::Picker;
use crate::format::truncate_unicode;
use crate::ui::centered_rect;
use crate::ui::theme::Theme;
use crate::watch::Interval;

const NAME_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, area: Rect, picker: &Picker, theme: &Theme) {
    let width = 64u16.min(area.width.saturating_sub(4));
    let height = 20u16.min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Choose process ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme.surface_bg));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let [filter_area, interval_area, table_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .areas(inner);

    let filter = Line::from(vec![
        Span::styled(" Filter: ", Style::default().fg(theme.text_secondary)),
        Span::styled(picker.filter.clone(), Style::default().fg(theme.text_primary)),
        Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
    ]);
    frame.render_widget(Paragraph::new(filter), filter_area);
    frame.render_widget(Paragraph::new(interval_line(picker, theme)), interval_area);

    let visible = picker.visible();
    let rows: Vec<Row> = visible
        .iter()
        .map(|entry| {
            Row::new(vec![
                truncate_unicode(&entry.name, NAME_WIDTH),
                entry.user.clone(),
                entry.pid.to_string(),
            ])
        })
        .collect();

    let header = Row::new(vec!["Name", "User", "PID"]).style(
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .style(Style::default().fg(theme.text_primary))
    .row_highlight_style(Style::default().bg(theme.selection_bg).add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(picker.selected.min(visible.len() - 1)));
    }
    frame.render_stateful_widget(table, table_area, &mut state);
}

/// All presets with the chosen one highlighted.
fn interval_line(picker: &Picker, theme: &Theme) -> Line<'static> {
    let chosen = picker.interval();
    let mut spans = vec![Span::styled(
        " Interval:",
        Style::default().fg(theme.text_secondary),
    )];
    for preset in Interval::PRESETS {
        let style = if preset == chosen {
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.pill_desc_fg)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {preset} "), style));
    }
    Line::from(spans)
}
