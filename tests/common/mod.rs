#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use procwatch::system::{MemoryReading, MetricsSource, ProcessEntry};
use procwatch::watch::{Interval, NoopHook, SamplerOptions, Watcher};
use procwatch::{Result, WatchError};

/// How one fake process answers queries.
#[derive(Debug, Clone)]
pub struct FakeProcess {
    pub name: String,
    pub rss: u64,
    pub shared: u64,
    pub cpu_raw: f32,
    /// Successful memory queries left before the process "exits".
    pub lifetime: Option<usize>,
    /// Every memory query blocks for this long.
    pub stall: Option<Duration>,
}

impl FakeProcess {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rss: 8 * 1024 * 1024,
            shared: 1024 * 1024,
            cpu_raw: 0.0,
            lifetime: None,
            stall: None,
        }
    }

    pub fn rss(mut self, rss: u64, shared: u64) -> Self {
        self.rss = rss;
        self.shared = shared;
        self
    }

    pub fn cpu(mut self, raw: f32) -> Self {
        self.cpu_raw = raw;
        self
    }

    pub fn exits_after(mut self, samples: usize) -> Self {
        self.lifetime = Some(samples);
        self
    }

    pub fn stalls_for(mut self, stall: Duration) -> Self {
        self.stall = Some(stall);
        self
    }
}

/// Scripted [`MetricsSource`] with a fixed core count.
pub struct FakeSource {
    processes: Mutex<HashMap<u32, FakeProcess>>,
    cores: usize,
    memory_queries: AtomicUsize,
    /// When set, every query takes one shared lock, like a source wrapping a
    /// single OS handle.
    shared_lock: Option<Mutex<()>>,
}

impl FakeSource {
    pub fn new(cores: usize) -> Self {
        Self {
            processes: Mutex::new(HashMap::new()),
            cores,
            memory_queries: AtomicUsize::new(0),
            shared_lock: None,
        }
    }

    pub fn single_handle(mut self) -> Self {
        self.shared_lock = Some(Mutex::new(()));
        self
    }

    fn exclusive(&self) -> Option<std::sync::MutexGuard<'_, ()>> {
        self.shared_lock.as_ref().map(|lock| lock.lock().unwrap())
    }

    pub fn with(self, pid: u32, process: FakeProcess) -> Self {
        self.processes.lock().unwrap().insert(pid, process);
        self
    }

    pub fn kill(&self, pid: u32) {
        self.processes.lock().unwrap().remove(&pid);
    }

    pub fn memory_queries(&self) -> usize {
        self.memory_queries.load(Ordering::SeqCst)
    }

    fn alive(&self, pid: u32) -> Result<FakeProcess> {
        match self.processes.lock().unwrap().get(&pid) {
            Some(p) if p.lifetime != Some(0) => Ok(p.clone()),
            _ => Err(WatchError::ProcessNotFound(pid)),
        }
    }
}

impl MetricsSource for FakeSource {
    fn resolve_name(&self, pid: u32) -> Result<String> {
        let _handle = self.exclusive();
        self.alive(pid).map(|p| p.name)
    }

    fn memory_sample(&self, pid: u32) -> Result<MemoryReading> {
        let _handle = self.exclusive();
        let process = self.alive(pid)?;
        if let Some(stall) = process.stall {
            std::thread::sleep(stall);
        }
        if let Some(p) = self.processes.lock().unwrap().get_mut(&pid)
            && let Some(left) = p.lifetime.as_mut()
        {
            *left -= 1;
        }
        self.memory_queries.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryReading {
            rss: process.rss,
            shared: process.shared,
        })
    }

    fn cpu_percent(&self, pid: u32) -> Result<f32> {
        self.processes
            .lock()
            .unwrap()
            .get(&pid)
            .map(|p| p.cpu_raw)
            .ok_or(WatchError::ProcessNotFound(pid))
    }

    fn logical_cores(&self) -> usize {
        self.cores
    }

    fn list_processes(&self) -> Vec<ProcessEntry> {
        let mut entries: Vec<ProcessEntry> = self
            .processes
            .lock()
            .unwrap()
            .iter()
            .map(|(pid, p)| ProcessEntry {
                pid: *pid,
                name: p.name.clone(),
                user: "tester".to_string(),
            })
            .collect();
        entries.sort_by_key(|e| e.pid);
        entries
    }
}

pub fn watcher_for(source: Arc<FakeSource>, options: SamplerOptions) -> Watcher {
    Watcher::new(
        source,
        Arc::new(NoopHook),
        options,
        tokio::runtime::Handle::current(),
    )
}

pub fn millis(ms: u64) -> Interval {
    Interval::from_duration(Duration::from_millis(ms)).unwrap()
}

/// Polls `check` every few milliseconds until it holds or `within` elapses.
pub async fn eventually(within: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// Keeps every notification for later inspection.
#[derive(Default)]
pub struct RecordingHook {
    events: Mutex<Vec<procwatch::watch::RefreshEvent>>,
}

impl RecordingHook {
    pub fn events(&self) -> Vec<procwatch::watch::RefreshEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl procwatch::watch::RefreshHook for RecordingHook {
    fn notify(&self, event: procwatch::watch::RefreshEvent) {
        self.events.lock().unwrap().push(event);
    }
}
