use tokio::sync::mpsc;

use super::session::SessionState;

/// What changed in the watched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEvent {
    /// A sample was appended; `len` is the session's new series length.
    Appended { session: u64, len: usize },
    /// The session stopped sampling for good.
    Finished { session: u64, state: SessionState },
}

/// Receives sampler notifications. Implementations must return promptly and
/// never wait on the receiving side; the sampler calls this inline.
pub trait RefreshHook: Send + Sync {
    fn notify(&self, event: RefreshEvent);
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl RefreshHook for NoopHook {
    fn notify(&self, _event: RefreshEvent) {}
}

impl RefreshHook for mpsc::UnboundedSender<RefreshEvent> {
    fn notify(&self, event: RefreshEvent) {
        // Receiver gone means the shell is shutting down.
        let _ = self.send(event);
    }
}
