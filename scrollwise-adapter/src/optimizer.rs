use futures::task::LocalSpawn;
use scrollwise::{
    DatasetWindower, Debouncer, DeviceProfile, DeviceProfiler, HostEnvironment,
    ImageLoadScheduler, LoadState, Materialized, OptimizerConfig, ScrollSnapshot, Throttler,
    ViewportSize, VisibleWindow,
};

use crate::{AdapterError, DataSource, InfiniteScrollController};

/// Owns every optimizer component for one list and routes host events to them.
///
/// This type does not hold any UI objects. Hosts drive it by calling:
/// - [`Self::on_scroll_changed`] / [`Self::on_resized`] when UI events occur
/// - [`Self::tick`] from their frame/timer tick, so trailing scroll samples and debounced
///   resizes get applied
///
/// Scroll samples are throttled to `throttle_ms`; a sample dropped by the throttle is kept as the
/// trailing position and applied from `tick` once the stream goes quiet, so the final offset is
/// never lost. Resizes are debounced by `debounce_ms` and re-profile the device.
pub struct Optimizer<T> {
    config: OptimizerConfig,
    profiler: DeviceProfiler,
    host: Box<dyn HostEnvironment>,
    profile: DeviceProfile,
    windower: DatasetWindower,
    scroll: InfiniteScrollController<T>,
    images: ImageLoadScheduler<String>,
    scroll_throttle: Throttler,
    trailing_scroll: Debouncer<u64>,
    resize: Debouncer<ViewportSize>,
    disposed: bool,
}

impl<T: 'static> Optimizer<T> {
    pub fn new(
        config: OptimizerConfig,
        host: impl HostEnvironment + 'static,
        source: impl DataSource<T> + 'static,
        spawner: impl LocalSpawn + 'static,
    ) -> Result<Self, AdapterError> {
        config.validate()?;
        let profiler = DeviceProfiler::new(&config);
        let profile = profiler.compute_profile(&host);
        let windower = DatasetWindower::from_config(&config, profile.viewport_height)?;
        let scroll = InfiniteScrollController::new(&config, source, spawner)?;
        scroll.apply_profile(&profile);
        swdebug!(
            constrained = profile.is_constrained,
            batch_size = profile.recommended_batch_size,
            "optimizer created"
        );

        Ok(Self {
            profiler,
            host: Box::new(host),
            profile,
            windower,
            scroll,
            images: ImageLoadScheduler::new().with_lazy_loading(config.lazy_load_images),
            scroll_throttle: Throttler::new(config.throttle_ms),
            trailing_scroll: Debouncer::new(config.throttle_ms),
            resize: Debouncer::new(config.debounce_ms),
            disposed: false,
            config,
        })
    }

    /// Issues the initial page request.
    pub fn start(&mut self) -> Result<bool, AdapterError> {
        if self.disposed {
            return Ok(false);
        }
        self.scroll.load_more()
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn window(&self) -> VisibleWindow {
        self.windower.window()
    }

    pub fn windower(&self) -> &DatasetWindower {
        &self.windower
    }

    pub fn scroll(&self) -> &InfiniteScrollController<T> {
        &self.scroll
    }

    pub fn phase(&self) -> LoadState {
        self.scroll.phase()
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        self.scroll.snapshot()
    }

    pub fn images(&self) -> &ImageLoadScheduler<String> {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageLoadScheduler<String> {
        &mut self.images
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Call this when the UI reports a scroll offset change.
    ///
    /// Returns `true` if the sample started a page fetch.
    pub fn on_scroll_changed(
        &mut self,
        scroll_offset: u64,
        now_ms: u64,
    ) -> Result<bool, AdapterError> {
        if self.disposed {
            return Ok(false);
        }
        if !self.scroll_throttle.admit(now_ms) {
            self.trailing_scroll.call(scroll_offset, now_ms);
            return Ok(false);
        }
        self.trailing_scroll.cancel();
        self.apply_scroll(scroll_offset)
    }

    /// Call this when the host viewport changes size. Applied from `tick` after `debounce_ms`.
    pub fn on_resized(&mut self, viewport: ViewportSize, now_ms: u64) {
        if self.disposed {
            return;
        }
        self.resize.call(viewport, now_ms);
    }

    /// Advances pending work: a debounced resize, the trailing scroll sample, newly loaded
    /// records and memory trimming.
    ///
    /// Returns `true` if a page fetch was started.
    pub fn tick(&mut self, now_ms: u64) -> Result<bool, AdapterError> {
        if self.disposed {
            return Ok(false);
        }
        if let Some(viewport) = self.resize.poll(now_ms) {
            self.apply_resize(viewport);
        }
        let mut started = false;
        if let Some(offset) = self.trailing_scroll.poll(now_ms) {
            started = self.apply_scroll(offset)?;
        } else if self.sync() {
            self.trim();
        }
        Ok(started)
    }

    /// Requests the next page regardless of scroll position.
    pub fn load_more(&mut self) -> Result<bool, AdapterError> {
        if self.disposed {
            return Ok(false);
        }
        self.scroll.load_more()
    }

    /// Retries after a failed page.
    pub fn retry(&mut self) -> Result<bool, AdapterError> {
        if self.disposed {
            return Ok(false);
        }
        self.scroll.retry()
    }

    /// Runs `f` over the records that should currently be rendered.
    pub fn with_visible<R>(&self, f: impl FnOnce(Materialized<'_, T>) -> R) -> R {
        let state = self.scroll.state();
        f(self.windower.materialize(&state.items))
    }

    /// Stops every component. Pending debounces are dropped and late fetch results are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        swdebug!("optimizer disposed");
        self.disposed = true;
        self.scroll_throttle.dispose();
        self.trailing_scroll.dispose();
        self.resize.dispose();
        self.images.reset();
        self.scroll.dispose();
    }

    fn apply_scroll(&mut self, scroll_offset: u64) -> Result<bool, AdapterError> {
        self.sync();
        self.windower.on_scroll_changed(scroll_offset);
        self.trim();
        self.scroll.on_scroll_changed(
            self.windower.scroll_offset(),
            self.windower.viewport_height(),
            self.windower.total_scroll_extent(),
        )
    }

    fn apply_resize(&mut self, viewport: ViewportSize) {
        let host = ResizedHost {
            inner: self.host.as_ref(),
            viewport,
        };
        self.profile = self.profiler.compute_profile(&host);
        self.scroll.apply_profile(&self.profile);
        self.windower.on_resized(viewport);
        swdebug!(
            width = viewport.width,
            height = viewport.height,
            constrained = self.profile.is_constrained,
            batch_size = self.profile.recommended_batch_size,
            "re-profiled after resize"
        );
    }

    /// Picks up records appended since the last call. Returns `true` if the count changed.
    fn sync(&mut self) -> bool {
        let total = self.scroll.state().total_count;
        if total == self.windower.total_count() {
            return false;
        }
        self.windower.set_total_count(total);
        true
    }

    fn trim(&mut self) {
        let window = self.windower.window();
        if window.is_empty() {
            return;
        }
        if self.scroll.trim_to_visible(
            window.start_index..window.end_index,
            &self.config,
            &self.profile,
        ) {
            swdebug!(
                start = window.start_index,
                end = window.end_index,
                "trimmed records outside the window"
            );
        }
    }
}

impl<T> core::fmt::Debug for Optimizer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Optimizer")
            .field("config", &self.config)
            .field("profile", &self.profile)
            .field("windower", &self.windower)
            .field("scroll", &self.scroll)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

/// The host as seen after a resize: the new viewport, everything else unchanged.
struct ResizedHost<'a> {
    inner: &'a dyn HostEnvironment,
    viewport: ViewportSize,
}

impl HostEnvironment for ResizedHost<'_> {
    fn viewport_size(&self) -> Option<ViewportSize> {
        Some(self.viewport)
    }

    fn network_hint(&self) -> Option<&str> {
        self.inner.network_hint()
    }

    fn pointer_capable(&self) -> bool {
        self.inner.pointer_capable()
    }

    fn pixel_density(&self) -> Option<f32> {
        self.inner.pixel_density()
    }

    fn platform_hint(&self) -> Option<&str> {
        self.inner.platform_hint()
    }
}
