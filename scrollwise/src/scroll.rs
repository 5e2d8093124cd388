use alloc::vec::Vec;

use crate::options::validate_scroll_threshold;
use crate::windower::{optimize_memory_usage, scroll_progress};
use crate::{
    ConfigError, DeviceProfile, FetchError, LoadState, OptimizerConfig, OrderedCollection,
    ScrollState,
};

/// Permission to run exactly one page fetch.
///
/// Returned when the state machine enters [`LoadState::Loading`]; hand it back to
/// [`InfiniteScroll::complete`] with the fetch result. Tickets from before a `dispose` are
/// rejected, so late results never reach a torn-down list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    page: usize,
    generation: u64,
}

impl FetchTicket {
    /// The 1-based page number to request from the data source.
    pub fn page(&self) -> usize {
        self.page
    }
}

/// The synchronous core of an infinite list: decides when to fetch and merges results.
///
/// At most one fetch is in flight. Requests made while loading, after exhaustion, or after
/// dispose return `None`. Fetch I/O itself happens outside: the caller receives a
/// [`FetchTicket`], performs the request, and reports back via [`Self::complete`].
#[derive(Clone, Debug)]
pub struct InfiniteScroll<T> {
    state: ScrollState<T>,
    phase: LoadState,
    scroll_threshold: f32,
    in_flight: Option<FetchTicket>,
    generation: u64,
    disposed: bool,
}

impl<T> InfiniteScroll<T> {
    pub fn new(scroll_threshold: f32) -> Result<Self, ConfigError> {
        validate_scroll_threshold(scroll_threshold)?;
        Ok(Self {
            state: ScrollState::default(),
            phase: LoadState::Idle,
            scroll_threshold,
            in_flight: None,
            generation: 0,
            disposed: false,
        })
    }

    pub fn from_config(config: &OptimizerConfig) -> Result<Self, ConfigError> {
        Self::new(config.scroll_threshold)
    }

    pub fn phase(&self) -> LoadState {
        self.phase
    }

    pub fn state(&self) -> &ScrollState<T> {
        &self.state
    }

    pub fn items(&self) -> &OrderedCollection<T> {
        &self.state.items
    }

    pub fn scroll_threshold(&self) -> f32 {
        self.scroll_threshold
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Automatic trigger from a (rate-limited) scroll sample.
    ///
    /// Starts a fetch when `progress >= scroll_threshold` and the list is idle.
    pub fn on_scroll_progress(&mut self, progress: f32) -> Option<FetchTicket> {
        if self.phase != LoadState::Idle || progress < self.scroll_threshold {
            return None;
        }
        self.begin()
    }

    /// Same as [`Self::on_scroll_progress`], computing progress from raw geometry.
    pub fn on_scroll_changed(
        &mut self,
        scroll_offset: u64,
        viewport_height: u32,
        scroll_extent: u64,
    ) -> Option<FetchTicket> {
        self.on_scroll_progress(scroll_progress(
            scroll_offset,
            viewport_height,
            scroll_extent,
        ))
    }

    /// Manual request for the next page (e.g. a "load more" control or the initial load).
    ///
    /// Also leaves [`LoadState::Error`], retrying the page that failed.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        match self.phase {
            LoadState::Idle | LoadState::Error => self.begin(),
            LoadState::Loading | LoadState::Exhausted => None,
        }
    }

    /// Retries the page that failed. Only valid in [`LoadState::Error`].
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if self.phase != LoadState::Error {
            return None;
        }
        swdebug!(page = self.state.page + 1, "retry");
        self.begin()
    }

    fn begin(&mut self) -> Option<FetchTicket> {
        if self.disposed || self.in_flight.is_some() || !self.state.has_more {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        let ticket = FetchTicket {
            page: self.state.page + 1,
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        self.phase = LoadState::Loading;
        self.state.loading = true;
        self.state.error = None;
        swdebug!(page = ticket.page, "fetch requested");
        Some(ticket)
    }

    /// Applies a fetch result.
    ///
    /// Returns `false` (and changes nothing) when the ticket is stale: the list was disposed or
    /// the ticket does not belong to the fetch in flight.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<T>, FetchError>) -> bool {
        if self.disposed || self.in_flight != Some(ticket) {
            swdebug!(page = ticket.page, "discarding late fetch result");
            return false;
        }
        self.in_flight = None;
        self.state.loading = false;

        match result {
            Ok(batch) if batch.is_empty() => {
                self.state.has_more = false;
                self.phase = LoadState::Exhausted;
                swdebug!(page = ticket.page, "data source exhausted");
            }
            Ok(batch) => {
                let n = batch.len();
                self.state.items.append(batch);
                self.state.page += 1;
                self.state.total_count = self.state.items.len();
                self.phase = LoadState::Idle;
                swdebug!(page = ticket.page, appended = n, "page loaded");
            }
            Err(err) => {
                swwarn!(page = ticket.page, error = %err, "fetch failed");
                self.state.error = Some(err.into_message());
                self.phase = LoadState::Error;
            }
        }
        true
    }

    /// Trims loaded records around `visible_indices` when the device is constrained and the
    /// list is large (see [`crate::optimize_memory_usage`]). Returns `true` if anything was dropped.
    ///
    /// While more pages may arrive the tail is kept up to the last loaded record, so the next
    /// batch lands directly after retained data. Only records above the window are dropped then.
    pub fn trim_to_visible(
        &mut self,
        visible_indices: impl IntoIterator<Item = usize>,
        config: &OptimizerConfig,
        profile: &DeviceProfile,
    ) -> bool {
        let mut bounds: Option<(usize, usize)> = None;
        for i in visible_indices {
            bounds = Some(match bounds {
                None => (i, i),
                Some((lo, hi)) => (lo.min(i), hi.max(i)),
            });
        }
        let Some((lo, mut hi)) = bounds else {
            return false;
        };
        if self.state.has_more {
            hi = hi.max(self.state.items.len().saturating_sub(1));
        }

        let before = self.state.items.retained_len();
        let items = core::mem::take(&mut self.state.items);
        self.state.items = optimize_memory_usage(items, [lo, hi], config, profile);
        self.state.items.retained_len() != before
    }

    /// Tears the list down. Pending fetches resolve into nothing and no new ones start.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        swdebug!(page = self.state.page, "dispose");
        self.disposed = true;
        self.in_flight = None;
        self.state.loading = false;
        if self.phase == LoadState::Loading {
            self.phase = LoadState::Idle;
        }
        self.state.items.clear();
    }
}
