//! Headless building blocks for rendering long, incrementally loaded record lists on
//! memory- and bandwidth-constrained devices.
//!
//! For async fetch driving, performance measurement and host event routing, see the
//! `scrollwise-adapter` crate.
//!
//! This crate is the pure computation layer:
//! - device classification ([`DeviceProfiler`]) from an injected [`HostEnvironment`]
//! - host-clocked debounce/throttle ([`Debouncer`], [`Throttler`])
//! - fixed-height windowing and memory trimming ([`DatasetWindower`], [`trim_to_window`])
//! - the infinite-scroll state machine ([`InfiniteScroll`])
//! - eager/deferred image scheduling ([`ImageLoadScheduler`])
//!
//! It is UI-agnostic and owns no timers or threads. A host layer is expected to provide:
//! - viewport size and scroll offset
//! - a monotonic clock (`now_ms`) for rate limiting
//! - the actual page fetches and image loads
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod collection;
mod device;
mod error;
mod image;
mod key;
mod options;
mod paginate;
mod rate_limit;
mod scroll;
mod state;
mod types;
mod windower;


pub use collection::OrderedCollection;
pub use device::{
    DeviceProfile, DeviceProfiler, FixedHost, HostEnvironment, MEDIUM_BATCH_SIZE, SLOW_BATCH_SIZE,
};
pub use error::{ConfigError, FetchError};
pub use image::{ImageLoadScheduler, VisibilityEntry};
pub use options::OptimizerConfig;
pub use paginate::{DatasetPage, Optimization, Paginator, paginate_for_profile};
pub use rate_limit::{Debounced, Debouncer, Throttled, Throttler};
pub use scroll::{FetchTicket, InfiniteScroll};
pub use state::{LoadState, ScrollSnapshot, ScrollState};
pub use types::{LoadPriority, NetworkClass, ViewportSize, VisibleWindow};
pub use windower::{
    DEFAULT_BUFFER_ROWS, DatasetWindower, Materialized, compute_visible_window, materialize,
    optimize_memory_usage, scroll_progress, should_trim, total_scroll_extent, trim_to_window,
};

#[doc(hidden)]
pub use key::EntryKey;
