use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::chart;
use crate::ui::theme::Theme;
use crate::watch::{SessionInfo, Snapshot};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    session: Option<&SessionInfo>,
    samples: &Snapshot,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(info) = session else {
        placeholder(frame, inner, "Select a process to start", theme);
        return;
    };

    match chart::render(samples, &theme.chart_options(inner.width, inner.height)) {
        Ok(image) => frame
            .buffer_mut()
            .merge(image.at(inner.x, inner.y).buffer()),
        Err(_) if info.state.is_terminal() => {
            let text = format!("{} [{}]: {}", info.name, info.pid, info.state.label());
            placeholder(frame, inner, &text, theme);
        }
        Err(_) => {
            let text = format!(
                "Collecting data for: {} [{}] (T={})\u{2026}",
                info.name, info.pid, info.interval
            );
            placeholder(frame, inner, &text, theme);
        }
    }
}

fn placeholder(frame: &mut Frame, area: Rect, text: &str, theme: &Theme) {
    let middle = Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    };
    frame.render_widget(
        Paragraph::new(text.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text_secondary)),
        middle,
    );
}
