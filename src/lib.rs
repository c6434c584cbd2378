//! Live memory and CPU sampling for a single process.
//!
//! The [`watch`] module owns the sampling loop; [`chart`] and [`export`]
//! consume the series it produces. Everything terminal-facing lives in
//! [`app`] and [`ui`].

pub mod action;
pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod format;
pub mod logging;
mod sync;
pub mod system;
pub mod ui;
pub mod watch;

pub use error::{Result, WatchError};
