use crate::ConfigError;

/// Configuration shared by every scrollwise component.
///
/// All fields are plain data so the config is cheap to copy; update a few fields with the
/// `with_*` builders and hand the result to the component that needs it.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// Above this many records a constrained device only renders one page of a local dataset.
    pub max_initial_render: usize,
    /// Base number of records requested per fetch (before network adjustment).
    pub batch_size: usize,
    /// Fraction of the scrollable extent that must be reached before the next page is requested.
    pub scroll_threshold: f32,
    /// Trailing delay for resize handling.
    pub debounce_ms: u64,
    /// Minimum interval between scroll samples.
    pub throttle_ms: u64,
    pub enable_virtualization: bool,
    pub lazy_load_images: bool,

    /// Fixed row height in logical pixels. Must be non-zero.
    pub item_height: u32,
    /// Extra rows materialized on each side of the visible rows.
    pub buffer_rows: usize,

    /// Collections shorter than this are never trimmed.
    pub trim_threshold: usize,
    /// Records kept on each side of the visible indices when trimming.
    pub trim_buffer: usize,

    /// Viewports whose smaller side is at or below this width are treated as constrained.
    pub constrained_breakpoint: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_initial_render: 50,
            batch_size: 20,
            scroll_threshold: 0.8,
            debounce_ms: 150,
            throttle_ms: 100,
            enable_virtualization: true,
            lazy_load_images: true,
            item_height: 72,
            buffer_rows: 1,
            trim_threshold: 1000,
            trim_buffer: 50,
            constrained_breakpoint: 768,
        }
    }
}

impl OptimizerConfig {
    pub fn new(item_height: u32) -> Self {
        Self {
            item_height,
            ..Self::default()
        }
    }

    /// Checks the invariants every component relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_height == 0 {
            return Err(ConfigError::ZeroItemHeight);
        }
        validate_scroll_threshold(self.scroll_threshold)?;
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    pub fn with_max_initial_render(mut self, max_initial_render: usize) -> Self {
        self.max_initial_render = max_initial_render;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_scroll_threshold(mut self, scroll_threshold: f32) -> Self {
        self.scroll_threshold = scroll_threshold;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_throttle_ms(mut self, throttle_ms: u64) -> Self {
        self.throttle_ms = throttle_ms;
        self
    }

    pub fn with_enable_virtualization(mut self, enable_virtualization: bool) -> Self {
        self.enable_virtualization = enable_virtualization;
        self
    }

    pub fn with_lazy_load_images(mut self, lazy_load_images: bool) -> Self {
        self.lazy_load_images = lazy_load_images;
        self
    }

    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = item_height;
        self
    }

    pub fn with_buffer_rows(mut self, buffer_rows: usize) -> Self {
        self.buffer_rows = buffer_rows;
        self
    }

    /// Sets when trimming kicks in and how many records it keeps around the visible indices.
    pub fn with_trim(mut self, trim_threshold: usize, trim_buffer: usize) -> Self {
        self.trim_threshold = trim_threshold;
        self.trim_buffer = trim_buffer;
        self
    }

    pub fn with_constrained_breakpoint(mut self, constrained_breakpoint: u32) -> Self {
        self.constrained_breakpoint = constrained_breakpoint;
        self
    }
}

pub(crate) fn validate_scroll_threshold(threshold: f32) -> Result<(), ConfigError> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScrollThreshold(threshold))
    }
}
