//! Line chart of a sample series, rendered off-screen into a cell raster.
//!
//! Rendering is a pure function of its inputs: relative time labels are
//! measured from the newest sample, never from the wall clock.

pub mod scale;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Widget};

use crate::error::{Result, WatchError};
use crate::watch::Sample;
use scale::{Scales, seconds_between};

pub const MIN_SAMPLES: usize = 2;
const CPU_AXIS_WIDTH: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub width: u16,
    pub height: u16,
    /// Axes, labels and titles.
    pub foreground: Color,
    pub memory_color: Color,
    pub cpu_color: Color,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 30,
            foreground: Color::White,
            memory_color: Color::Cyan,
            cpu_color: Color::Yellow,
        }
    }
}

/// Rendered chart. The buffer's area starts at the origin; callers move it
/// with [`ChartImage::at`] before merging it into a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    buffer: Buffer,
}

impl ChartImage {
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.buffer.area.x = x;
        self.buffer.area.y = y;
        self
    }

    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }

    /// One line per row of cell symbols, styles dropped.
    pub fn to_text(&self) -> String {
        let area = self.buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = self.buffer.cell((x, y)) {
                    out.push_str(cell.symbol());
                }
            }
            if y + 1 < area.bottom() {
                out.push('\n');
            }
        }
        out
    }
}

pub fn render(samples: &[Sample], options: &ChartOptions) -> Result<ChartImage> {
    if samples.len() < MIN_SAMPLES {
        return Err(WatchError::InsufficientData {
            have: samples.len(),
            need: MIN_SAMPLES,
        });
    }

    let area = Rect::new(0, 0, options.width, options.height);
    let mut buffer = Buffer::empty(area);
    let scales = Scales::from_samples(samples);
    let cpu_labels = scales.cpu_labels();

    let plot_area = if cpu_labels.is_some() && area.width > CPU_AXIS_WIDTH * 3 && area.height >= 4 {
        Rect {
            width: area.width - CPU_AXIS_WIDTH,
            ..area
        }
    } else {
        area
    };

    let first = &samples[0];
    let memory_points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (seconds_between(first, s), s.memory as f64))
        .collect();
    let cpu_points: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| s.cpu.map(|c| (seconds_between(first, s), scales.cpu_to_plot(c))))
        .collect();

    let text_style = Style::default().fg(options.foreground);
    let mut datasets = vec![
        Dataset::default()
            .name("Memory")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(options.memory_color))
            .data(&memory_points),
    ];
    if cpu_labels.is_some() {
        datasets.push(
            Dataset::default()
                .name("CPU")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(options.cpu_color))
                .data(&cpu_points),
        );
    }

    let chart = Chart::new(datasets)
        .style(text_style)
        .x_axis(
            Axis::default()
                .title("Time")
                .style(text_style)
                .bounds([0.0, scales.x_span])
                .labels(scales.x_labels()),
        )
        .y_axis(
            Axis::default()
                .title("Bytes")
                .style(text_style)
                .bounds([0.0, scales.memory_top])
                .labels(scales.memory_labels()),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
    chart.render(plot_area, &mut buffer);

    if let Some([bottom, middle, top]) = cpu_labels
        && plot_area.width < area.width
    {
        draw_cpu_axis(&mut buffer, area, plot_area, [bottom, middle, top], options);
    }

    Ok(ChartImage { buffer })
}

/// Secondary axis in the right-hand column, aligned with the plot rows.
fn draw_cpu_axis(
    buffer: &mut Buffer,
    area: Rect,
    plot_area: Rect,
    [bottom, middle, top]: [String; 3],
    options: &ChartOptions,
) {
    let x = plot_area.right() + 1;
    let style = Style::default().fg(options.foreground);
    let label_style = Style::default().fg(options.cpu_color);
    let width = (area.right() - x) as usize;

    // Bottom two rows hold the x-axis line and its labels.
    let plot_top = area.top() + 1;
    let plot_bottom = area.bottom().saturating_sub(3).max(plot_top);
    let plot_middle = plot_top + (plot_bottom - plot_top) / 2;

    buffer.set_stringn(x, area.top(), "CPU%", width, style);
    buffer.set_stringn(x, plot_top, &top, width, label_style);
    buffer.set_stringn(x, plot_middle, &middle, width, label_style);
    buffer.set_stringn(x, plot_bottom, &bottom, width, label_style);
}
