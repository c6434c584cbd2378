use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind, Users};

use super::platform;
use super::process::{ProcessEntry, sort_entries};
use super::source::{MemoryReading, MetricsSource};
use crate::error::{Result, WatchError};
use crate::sync::lock_or_recover;

/// [`MetricsSource`] backed by `sysinfo`.
///
/// Each watched pid gets its own `System` so a refresh stuck on one process
/// never holds up queries for another. Name lookups and listings use a
/// throwaway `System`.
pub struct Collector {
    per_pid: Mutex<HashMap<u32, Arc<Mutex<System>>>>,
    logical_cores: usize,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let logical_cores = sys.cpus().len().max(1);
        Collector {
            per_pid: Mutex::new(HashMap::new()),
            logical_cores,
        }
    }

    /// The `System` that tracks `pid` across samples; CPU usage is computed
    /// between consecutive refreshes of the same instance.
    fn system_for(&self, pid: u32) -> Arc<Mutex<System>> {
        let mut map = lock_or_recover(&self.per_pid);
        Arc::clone(
            map.entry(pid)
                .or_insert_with(|| Arc::new(Mutex::new(System::new()))),
        )
    }

    fn forget(&self, pid: u32) {
        lock_or_recover(&self.per_pid).remove(&pid);
    }

    /// Refreshes one pid and runs `read` on it, mapping a vanished or zombie
    /// process to `ProcessNotFound`.
    fn with_process<T>(
        &self,
        pid: u32,
        refresh: ProcessRefreshKind,
        read: impl FnOnce(&sysinfo::Process) -> T,
    ) -> Result<T> {
        let system = self.system_for(pid);
        let mut sys = lock_or_recover(&system);
        let found = read_process(&mut sys, pid, refresh, read);
        drop(sys);
        if found.is_err() {
            self.forget(pid);
        }
        found
    }
}

fn read_process<T>(
    sys: &mut System,
    pid: u32,
    refresh: ProcessRefreshKind,
    read: impl FnOnce(&sysinfo::Process) -> T,
) -> Result<T> {
    let sys_pid = Pid::from_u32(pid);
    sys.refresh_processes_specifics(ProcessesToUpdate::Some(&[sys_pid]), true, refresh);
    match sys.process(sys_pid) {
        Some(process) if process.status() != ProcessStatus::Zombie => Ok(read(process)),
        _ => Err(WatchError::ProcessNotFound(pid)),
    }
}

impl MetricsSource for Collector {
    fn resolve_name(&self, pid: u32) -> Result<String> {
        let mut sys = System::new();
        read_process(&mut sys, pid, ProcessRefreshKind::nothing(), |p| {
            p.name().to_string_lossy().into_owned()
        })
    }

    fn memory_sample(&self, pid: u32) -> Result<MemoryReading> {
        let rss = self.with_process(pid, ProcessRefreshKind::nothing().with_memory(), |p| {
            p.memory()
        })?;
        let shared = platform::shared_memory(pid).unwrap_or(0);
        Ok(MemoryReading { rss, shared })
    }

    fn cpu_percent(&self, pid: u32) -> Result<f32> {
        self.with_process(pid, ProcessRefreshKind::nothing().with_cpu(), |p| {
            p.cpu_usage()
        })
    }

    fn logical_cores(&self) -> usize {
        self.logical_cores
    }

    fn list_processes(&self) -> Vec<ProcessEntry> {
        let users = Users::new_with_refreshed_list();
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_user(UpdateKind::OnlyIfNotSet),
        );

        let mut entries: Vec<ProcessEntry> = sys
            .processes()
            .iter()
            .filter(|(_, p)| p.thread_kind().is_none())
            .map(|(pid, p)| {
                let user = p
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|u| u.name().to_string())
                    .unwrap_or_default();
                ProcessEntry {
                    pid: pid.as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    user,
                }
            })
            .collect();
        sort_entries(&mut entries);
        entries
    }
}
