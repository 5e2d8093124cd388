use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};
use scrollwise::{
    DeviceProfile, FetchError, FetchTicket, InfiniteScroll, LoadState, OptimizerConfig,
    ScrollSnapshot, ScrollState,
};

use crate::{AdapterError, DataSource, PageRequest};

/// A callback fired after a fetch result has been merged into the list.
///
/// It receives a snapshot taken after the state borrow was released, so it may call back into
/// the controller (e.g. `load_more` to prefetch).
pub type OnLoadCallback = Rc<dyn Fn(&ScrollSnapshot)>;

/// Drives an [`InfiniteScroll`] against an async [`DataSource`] on a single-threaded executor.
///
/// Fetches are spawned onto the host's [`LocalSpawn`] and run concurrently with scroll and
/// resize handling. The state machine guarantees at most one fetch in flight; triggers that
/// arrive meanwhile are dropped, not queued.
///
/// Call [`Self::dispose`] when the list goes away. Results that resolve afterwards (or after the
/// controller is dropped) are discarded.
pub struct InfiniteScrollController<T> {
    machine: Rc<RefCell<InfiniteScroll<T>>>,
    source: Rc<dyn DataSource<T>>,
    spawner: Rc<dyn LocalSpawn>,
    batch_size: Cell<usize>,
    on_load: Option<OnLoadCallback>,
}

impl<T: 'static> InfiniteScrollController<T> {
    pub fn new(
        config: &OptimizerConfig,
        source: impl DataSource<T> + 'static,
        spawner: impl LocalSpawn + 'static,
    ) -> Result<Self, AdapterError> {
        config.validate()?;
        Ok(Self {
            machine: Rc::new(RefCell::new(InfiniteScroll::from_config(config)?)),
            source: Rc::new(source),
            spawner: Rc::new(spawner),
            batch_size: Cell::new(config.batch_size),
            on_load: None,
        })
    }

    pub fn with_on_load(mut self, on_load: impl Fn(&ScrollSnapshot) + 'static) -> Self {
        self.on_load = Some(Rc::new(on_load));
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Sets the page size requested from now on (usually `recommended_batch_size`).
    pub fn set_batch_size(&self, batch_size: usize) {
        self.batch_size.set(batch_size.max(1));
    }

    pub fn apply_profile(&self, profile: &DeviceProfile) {
        self.set_batch_size(profile.recommended_batch_size);
    }

    pub fn phase(&self) -> LoadState {
        self.machine.borrow().phase()
    }

    /// Borrows the current list state.
    ///
    /// Do not hold the returned guard across an `.await`: fetch completions need to borrow the
    /// state mutably.
    pub fn state(&self) -> Ref<'_, ScrollState<T>> {
        Ref::map(self.machine.borrow(), |m| m.state())
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        self.machine.borrow().state().snapshot()
    }

    pub fn is_disposed(&self) -> bool {
        self.machine.borrow().is_disposed()
    }

    /// Rate-limited scroll sample. Returns `true` if a fetch was started.
    pub fn on_scroll_changed(
        &self,
        scroll_offset: u64,
        viewport_height: u32,
        scroll_extent: u64,
    ) -> Result<bool, AdapterError> {
        let ticket =
            self.machine
                .borrow_mut()
                .on_scroll_changed(scroll_offset, viewport_height, scroll_extent);
        self.dispatch(ticket)
    }

    /// Requests the next page regardless of scroll position (initial load, "load more").
    pub fn load_more(&self) -> Result<bool, AdapterError> {
        let ticket = self.machine.borrow_mut().load_more();
        self.dispatch(ticket)
    }

    /// Re-requests the page that failed.
    pub fn retry(&self) -> Result<bool, AdapterError> {
        let ticket = self.machine.borrow_mut().retry();
        self.dispatch(ticket)
    }

    /// See [`InfiniteScroll::trim_to_visible`].
    pub fn trim_to_visible(
        &self,
        visible_indices: impl IntoIterator<Item = usize>,
        config: &OptimizerConfig,
        profile: &DeviceProfile,
    ) -> bool {
        self.machine
            .borrow_mut()
            .trim_to_visible(visible_indices, config, profile)
    }

    pub fn dispose(&self) {
        self.machine.borrow_mut().dispose();
    }

    fn dispatch(&self, ticket: Option<FetchTicket>) -> Result<bool, AdapterError> {
        let Some(ticket) = ticket else {
            return Ok(false);
        };
        let request = PageRequest {
            page: ticket.page(),
            batch_size: self.batch_size.get(),
        };
        swdebug!(page = request.page, batch_size = request.batch_size, "fetch_page");

        let fetch = self.source.fetch_page(request);
        let machine: Weak<RefCell<InfiniteScroll<T>>> = Rc::downgrade(&self.machine);
        let on_load = self.on_load.clone();
        let task = async move {
            let result = fetch.await;
            let Some(machine) = machine.upgrade() else {
                swdebug!(page = request.page, "controller dropped; fetch result ignored");
                return;
            };
            let applied = machine.borrow_mut().complete(ticket, result);
            if !applied {
                return;
            }
            if let Some(cb) = on_load {
                let snapshot = machine.borrow().state().snapshot();
                cb(&snapshot);
            }
        };

        if let Err(err) = self.spawner.spawn_local(task) {
            swwarn!(page = request.page, error = %err, "could not spawn fetch");
            self.machine
                .borrow_mut()
                .complete(ticket, Err(FetchError::new(&err)));
            return Err(err.into());
        }
        Ok(true)
    }
}

impl<T> fmt::Debug for InfiniteScrollController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let machine = self.machine.borrow();
        f.debug_struct("InfiniteScrollController")
            .field("phase", &machine.phase())
            .field("snapshot", &machine.state().snapshot())
            .field("batch_size", &self.batch_size.get())
            .finish_non_exhaustive()
    }
}
