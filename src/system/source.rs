use crate::error::Result;

use super::process::ProcessEntry;

/// Memory figures for one process at query time, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryReading {
    pub rss: u64,
    pub shared: u64,
}

impl MemoryReading {
    /// Memory attributed to the process itself: resident minus shared.
    pub fn private_bytes(self) -> u64 {
        self.rss.saturating_sub(self.shared)
    }
}

/// OS-level process introspection consumed by the watcher.
///
/// Calls are synchronous; the watcher runs them on the blocking pool.
pub trait MetricsSource: Send + Sync {
    /// Fails with `ProcessNotFound` when `pid` does not exist.
    fn resolve_name(&self, pid: u32) -> Result<String>;

    fn memory_sample(&self, pid: u32) -> Result<MemoryReading>;

    /// Raw CPU percent where 100 means one logical core fully busy.
    fn cpu_percent(&self, pid: u32) -> Result<f32>;

    fn logical_cores(&self) -> usize;

    /// All visible processes, sorted case-insensitively by name.
    fn list_processes(&self) -> Vec<ProcessEntry>;
}
