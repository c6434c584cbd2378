pub mod chart_view;
pub mod header;
pub mod help;
pub mod picker;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

use crate::app::{App, InputMode};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let session = app.watcher.session_info();
    let samples = app.watcher.samples();

    header::render(frame, chunks[0], session.as_ref(), samples.last(), &app.theme);
    chart_view::render(frame, chunks[1], session.as_ref(), &samples, &app.theme);
    statusbar::render(
        frame,
        chunks[2],
        app.input_mode,
        app.status_message.as_ref(),
        &app.keybinds,
        &app.theme,
    );

    // Overlays are rendered last to appear on top
    match app.input_mode {
        InputMode::Picker => picker::render(frame, frame.area(), &app.picker, &app.theme),
        InputMode::Help => help::render(
            frame,
            frame.area(),
            &app.keybinds,
            app.default_interval,
            &app.theme,
        ),
        InputMode::Normal => {}
    }
}

/// A `width` x `height` rect centered in `area`, for overlays.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}
