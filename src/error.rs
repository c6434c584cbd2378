use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("process {0} not found")]
    ProcessNotFound(u32),

    #[error("process {0} ended")]
    ProcessEnded(u32),

    #[error("no process is being watched")]
    NoActiveSession,

    #[error("not enough data points yet ({have} of {need})")]
    InsufficientData { have: usize, need: usize },

    #[error("no data to export")]
    NoDataToExport,

    #[error("failed to write export {}: {source}", path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics query for process {pid} did not answer within {after:?}")]
    QueryTimeout { pid: u32, after: Duration },

    #[error("sampling interval must be greater than zero, got {0}")]
    InvalidInterval(u64),

    #[error("malformed export row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

pub type Result<T, E = WatchError> = std::result::Result<T, E>;
