use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Local;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::notify::{RefreshEvent, RefreshHook};
use super::sample::{Interval, Sample, normalize_cpu};
use super::session::{SessionInfo, SessionState, WatchSession};
use super::store::Snapshot;
use crate::error::{Result, WatchError};
use crate::export;
use crate::sync::{lock_or_recover, read_or_recover, write_or_recover};
use crate::system::source::MetricsSource;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct SamplerOptions {
    /// Sample CPU utilization alongside memory.
    pub cpu: bool,
    /// Upper bound for one metrics query before the session is abandoned.
    pub query_timeout: Duration,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            cpu: true,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Owns the single active watch session and its sampling loop.
pub struct Watcher {
    source: Arc<dyn MetricsSource>,
    hook: Arc<dyn RefreshHook>,
    options: SamplerOptions,
    runtime: Handle,
    active: RwLock<Option<Arc<WatchSession>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    // Serializes retarget calls; readers only touch `active`.
    retarget_lock: Mutex<()>,
    next_id: AtomicU64,
}

impl Watcher {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        hook: Arc<dyn RefreshHook>,
        options: SamplerOptions,
        runtime: Handle,
    ) -> Self {
        Self {
            source,
            hook,
            options,
            runtime,
            active: RwLock::new(None),
            task: Mutex::new(None),
            retarget_lock: Mutex::new(()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> SamplerOptions {
        self.options
    }

    /// Switches to watching `pid` every `interval`.
    ///
    /// The pid lookup is bounded by the query timeout and fails with
    /// `QueryTimeout` when the source does not answer in time.
    ///
    /// On error nothing changes and any running session keeps sampling. On
    /// success the previous session is sealed before the new one becomes
    /// visible, so `samples()` never mixes the two.
    pub fn retarget(&self, pid: u32, interval: Interval) -> Result<SessionInfo> {
        let _guard = lock_or_recover(&self.retarget_lock);

        let name = self.resolve_name(pid)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let session = Arc::new(WatchSession::new(id, pid, name, interval));

        let previous = {
            let mut active = write_or_recover(&self.active);
            if let Some(old) = active.as_ref() {
                old.finish(SessionState::Cancelled);
            }
            active.replace(Arc::clone(&session))
        };
        if let Some(old) = previous {
            info!(
                session = old.id,
                pid = old.pid,
                samples = old.store.len(),
                "watch session superseded"
            );
        }

        let handle = self.runtime.spawn(run_session(
            Arc::clone(&session),
            Arc::clone(&self.source),
            Arc::clone(&self.hook),
            self.options,
        ));
        // The old loop is already cancelled; dropping its handle detaches it.
        *lock_or_recover(&self.task) = Some(handle);

        info!(
            session = id,
            pid,
            name = %session.name,
            interval = %interval,
            "watch session started"
        );
        Ok(session.info())
    }

    pub fn current_name(&self) -> Result<String> {
        self.active_session()
            .map(|s| s.name.clone())
            .ok_or(WatchError::NoActiveSession)
    }

    pub fn session_info(&self) -> Option<SessionInfo> {
        self.active_session().map(|s| s.info())
    }

    /// Point-in-time copy of the active series; empty when nothing is watched.
    pub fn samples(&self) -> Snapshot {
        self.active_session()
            .map(|s| s.snapshot())
            .unwrap_or_default()
    }

    /// Writes the active series to `dir` and returns the file name.
    pub fn export_to(&self, dir: &Path) -> Result<String> {
        let session = self.active_session().ok_or(WatchError::NoActiveSession)?;
        export::export(dir, &session.name, &session.snapshot())
    }

    /// Stops sampling and waits for the loop to exit. The collected series
    /// stays readable until the next retarget.
    pub async fn stop(&self) {
        if let Some(session) = self.active_session() {
            session.finish(SessionState::Cancelled);
        }
        let handle = lock_or_recover(&self.task).take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            error!(error = %err, "sampling loop did not exit cleanly");
        }
    }

    /// Looks up `pid` on the blocking pool, waiting at most the query
    /// timeout so a hung source cannot stall the caller.
    fn resolve_name(&self, pid: u32) -> Result<String> {
        let (tx, rx) = std_mpsc::sync_channel(1);
        let source = Arc::clone(&self.source);
        self.runtime.spawn_blocking(move || {
            // Receiver is gone once the caller gave up waiting.
            let _ = tx.send(source.resolve_name(pid));
        });

        match rx.recv_timeout(self.options.query_timeout) {
            Ok(resolved) => resolved,
            Err(RecvTimeoutError::Timeout) => {
                warn!(pid, after = ?self.options.query_timeout, "process lookup timed out");
                Err(WatchError::QueryTimeout {
                    pid,
                    after: self.options.query_timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                error!(pid, "process lookup panicked");
                Err(WatchError::ProcessNotFound(pid))
            }
        }
    }

    fn active_session(&self) -> Option<Arc<WatchSession>> {
        read_or_recover(&self.active).clone()
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if let Some(session) = read_or_recover(&self.active).as_ref() {
            session.finish(SessionState::Cancelled);
        }
    }
}

async fn run_session(
    session: Arc<WatchSession>,
    source: Arc<dyn MetricsSource>,
    hook: Arc<dyn RefreshHook>,
    options: SamplerOptions,
) {
    let mut ticker = time::interval(session.interval.duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = session.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match take_sample(session.pid, &source, options).await {
            Ok(sample) => match session.store.append(sample) {
                Some(len) => {
                    debug!(session = session.id, pid = session.pid, len, "sample appended");
                    hook.notify(RefreshEvent::Appended {
                        session: session.id,
                        len,
                    });
                }
                // Sealed while the query was in flight.
                None => break,
            },
            Err(err) => {
                let state = match err {
                    WatchError::QueryTimeout { .. } => SessionState::TimedOut,
                    _ => SessionState::Ended,
                };
                if session.finish(state) {
                    warn!(
                        session = session.id,
                        pid = session.pid,
                        samples = session.store.len(),
                        error = %err,
                        "watch session ended"
                    );
                    hook.notify(RefreshEvent::Finished {
                        session: session.id,
                        state,
                    });
                }
                break;
            }
        }
    }

    debug!(session = session.id, "sampling loop exited");
}

async fn take_sample(
    pid: u32,
    source: &Arc<dyn MetricsSource>,
    options: SamplerOptions,
) -> Result<Sample> {
    let source = Arc::clone(source);
    let query = task::spawn_blocking(move || -> Result<Sample> {
        let memory = source.memory_sample(pid)?;
        let cpu = if options.cpu {
            let raw = source.cpu_percent(pid)?;
            Some(normalize_cpu(raw, source.logical_cores()))
        } else {
            None
        };
        Ok(Sample::new(Local::now(), memory.private_bytes(), cpu))
    });

    match time::timeout(options.query_timeout, query).await {
        Ok(Ok(Ok(sample))) => Ok(sample),
        Ok(Ok(Err(WatchError::ProcessNotFound(_)))) => Err(WatchError::ProcessEnded(pid)),
        Ok(Ok(Err(err))) => Err(err),
        Ok(Err(join_err)) => {
            error!(pid, error = %join_err, "metrics query panicked");
            Err(WatchError::ProcessEnded(pid))
        }
        Err(_) => Err(WatchError::QueryTimeout {
            pid,
            after: options.query_timeout,
        }),
    }
}
