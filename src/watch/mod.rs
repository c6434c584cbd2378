//! Watch sessions: the sampling loop, its series store and the retarget
//! hand-off between consecutive sessions.

pub mod notify;
pub mod sample;
pub mod session;
pub mod store;
pub mod watcher;

pub use notify::{NoopHook, RefreshEvent, RefreshHook};
pub use sample::{Interval, Sample, normalize_cpu};
pub use session::{SessionInfo, SessionState};
pub use store::{SampleStore, Snapshot};
pub use watcher::{DEFAULT_QUERY_TIMEOUT, SamplerOptions, Watcher};
