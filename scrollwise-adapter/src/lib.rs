//! Host-facing glue for the `scrollwise` crate.
//!
//! `scrollwise` is UI-agnostic and purely synchronous. This crate adds the pieces a host needs
//! around it:
//!
//! - [`InfiniteScrollController`]: drives page fetches from an async [`DataSource`] on a
//!   single-threaded executor (any [`futures::task::LocalSpawn`])
//! - [`Optimizer`]: owns profiler, windower, limiters and controller for one list and routes
//!   `on_scroll_changed` / `on_resized` / `tick` events to them
//! - [`PerformanceMonitor`], [`RenderStats`] and [`MemoryWatch`] for diagnostics
//! - [`DebouncedSearch`] for search-as-you-type inputs
//!
//! Like the core crate, nothing here owns a timer: the host passes `now_ms` in.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod error;
mod optimizer;
mod perf;
mod search;
mod source;

#[cfg(test)]
mod tests;

pub use controller::{InfiniteScrollController, OnLoadCallback};
pub use error::AdapterError;
pub use optimizer::Optimizer;
pub use perf::{
    DiagnosticRecord, DiagnosticsSink, FnMemoryProbe, MEMORY_WATCH_INTERVAL_MS, Measurement,
    MemoryGrowth, MemoryProbe, MemoryWatch, NoMemoryProbe, PerformanceMonitor, ProcStatmProbe,
    RENDER_WINDOW, RenderStats, SLOW_RENDER_MS,
};
pub use search::{DebouncedSearch, SEARCH_DEBOUNCE_MS, SearchRequest};
pub use source::{DataSource, PageRequest};
