use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{Result, WatchError};

/// One reading of the watched process. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    /// Resident memory minus shared memory, in bytes.
    pub memory: u64,
    /// CPU percent normalized per logical core; `None` when CPU sampling is off.
    pub cpu: Option<f32>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Local>, memory: u64, cpu: Option<f32>) -> Self {
        Self {
            timestamp,
            memory,
            cpu,
        }
    }
}

/// Divide a raw CPU reading (100 = one core fully busy) by the logical core count.
pub fn normalize_cpu(raw_percent: f32, logical_cores: usize) -> f32 {
    let cores = logical_cores.max(1) as f32;
    (raw_percent / cores).max(0.0)
}

/// Sampling period of a watch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval(Duration);

impl Interval {
    /// Periods offered by the process picker.
    pub const PRESETS: [Interval; 4] = [
        Interval(Duration::from_secs(1)),
        Interval(Duration::from_secs(10)),
        Interval(Duration::from_secs(30)),
        Interval(Duration::from_secs(60)),
    ];

    pub const DEFAULT_SECS: u64 = 3;

    pub fn from_secs(secs: u64) -> Result<Self> {
        if secs == 0 {
            return Err(WatchError::InvalidInterval(secs));
        }
        Ok(Interval(Duration::from_secs(secs)))
    }

    /// Sub-second periods, used by tests and benchmarks driving a fake source.
    pub fn from_duration(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(WatchError::InvalidInterval(0));
        }
        Ok(Interval(period))
    }

    pub fn duration(self) -> Duration {
        self.0
    }

    pub fn preset_index(self) -> Option<usize> {
        Self::PRESETS.iter().position(|p| *p == self)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval(Duration::from_secs(Self::DEFAULT_SECS))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        if self.0.subsec_millis() != 0 || secs == 0 {
            write!(f, "{}ms", self.0.as_millis())
        } else if secs >= 60 && secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{secs}s")
        }
    }
}
