use chrono::TimeDelta;

use crate::format::{format_age, format_bytes, format_percent};
use crate::watch::Sample;

/// Axis bounds and labels derived from a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    /// Seconds from the first to the last sample; at least one.
    pub x_span: f64,
    pub memory_top: f64,
    /// `None` when no sample carries a CPU reading.
    pub cpu_top: Option<f64>,
}

impl Scales {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let x_span = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => seconds_between(first, last).max(1.0),
            _ => 1.0,
        };

        let max_memory = samples.iter().map(|s| s.memory).max().unwrap_or(0);
        let memory_top = nice_ceiling(max_memory as f64 * 1.1).max(1.0);

        let cpu_top = samples
            .iter()
            .filter_map(|s| s.cpu)
            .map(f64::from)
            .reduce(f64::max)
            .map(|max| ((max / 10.0).ceil() * 10.0).max(10.0));

        Scales {
            x_span,
            memory_top,
            cpu_top,
        }
    }

    /// Left, middle and right labels, relative to the newest sample.
    pub fn x_labels(&self) -> [String; 3] {
        let span = self.x_span.round() as i64;
        [
            format_age(TimeDelta::seconds(span)),
            format_age(TimeDelta::seconds(span / 2)),
            format_age(TimeDelta::zero()),
        ]
    }

    pub fn memory_labels(&self) -> [String; 3] {
        [
            format_bytes(0),
            format_bytes((self.memory_top / 2.0) as u64),
            format_bytes(self.memory_top as u64),
        ]
    }

    /// Bottom, middle and top CPU labels.
    pub fn cpu_labels(&self) -> Option<[String; 3]> {
        self.cpu_top.map(|top| {
            [
                format_percent(0.0),
                format_percent(top / 2.0),
                format_percent(top),
            ]
        })
    }

    /// Maps a CPU percent onto the memory axis so both share one plot.
    pub fn cpu_to_plot(&self, cpu: f32) -> f64 {
        match self.cpu_top {
            Some(top) => f64::from(cpu) / top * self.memory_top,
            None => 0.0,
        }
    }
}

pub fn seconds_between(from: &Sample, to: &Sample) -> f64 {
    let delta = to.timestamp - from.timestamp;
    delta.num_milliseconds() as f64 / 1000.0
}

/// Rounds up to 1, 2 or 5 times a power of ten.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let step = value / magnitude;
    let nice = if step <= 1.0 {
        1.0
    } else if step <= 2.0 {
        2.0
    } else if step <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
