pub mod collector;
pub mod platform;
pub mod process;
pub mod source;

pub use collector::Collector;
pub use process::ProcessEntry;
pub use source::{MemoryReading, MetricsSource};
