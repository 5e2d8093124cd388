use core::cmp;

use crate::{
    ConfigError, DeviceProfile, OptimizerConfig, OrderedCollection, ViewportSize, VisibleWindow,
};

/// Default number of buffer rows on each side of the visible rows.
pub const DEFAULT_BUFFER_ROWS: usize = 1;

/// Computes the rows to materialize for a fixed-height list.
///
/// - `start = max(0, floor(scroll_offset / item_height) - buffer_rows)`
/// - `end = min(total, start + ceil(viewport_height / item_height) + 2 * buffer_rows)`
///
/// Offsets past the end of the list are treated as "scrolled to the bottom", so the window
/// always covers at least a viewport's worth of rows when the list has that many.
///
/// Fails with [`ConfigError::ZeroItemHeight`] when `item_height` is zero.
pub fn compute_visible_window(
    scroll_offset: u64,
    item_height: u32,
    viewport_height: u32,
    total_item_count: usize,
    buffer_rows: usize,
) -> Result<VisibleWindow, ConfigError> {
    if item_height == 0 {
        return Err(ConfigError::ZeroItemHeight);
    }

    let visible_count = viewport_height.div_ceil(item_height) as usize;
    let first_row = usize::try_from(scroll_offset / item_height as u64).unwrap_or(usize::MAX);
    let first_row = cmp::min(first_row, total_item_count.saturating_sub(visible_count));

    let start_index = first_row.saturating_sub(buffer_rows);
    let end_index = cmp::min(
        total_item_count,
        start_index
            .saturating_add(visible_count)
            .saturating_add(buffer_rows.saturating_mul(2)),
    );

    Ok(VisibleWindow {
        start_index,
        end_index,
    })
}

/// Height of the scrollable region needed for `total_item_count` rows.
pub fn total_scroll_extent(total_item_count: usize, item_height: u32) -> u64 {
    (total_item_count as u64).saturating_mul(item_height as u64)
}

/// The retained records inside a [`VisibleWindow`], ready to be drawn.
#[derive(Debug)]
pub struct Materialized<'a, T> {
    window: VisibleWindow,
    item_height: u32,
    first_index: usize,
    items: &'a [T],
}

impl<'a, T> Materialized<'a, T> {
    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    /// Index of the first record in [`Self::items`].
    pub fn first_index(&self) -> usize {
        self.first_index
    }

    pub fn items(&self) -> &'a [T] {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distance from the top of the list to the row at `index`.
    pub fn offset_for_index(&self, index: usize) -> u64 {
        (index as u64).saturating_mul(self.item_height as u64)
    }

    /// Records paired with their stable index and vertical offset.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64, &'a T)> + '_ {
        self.items.iter().enumerate().map(move |(i, item)| {
            let index = self.first_index + i;
            (index, self.offset_for_index(index), item)
        })
    }
}

/// Slices the retained part of `collection` covered by `window`.
///
/// Rows that fall in the window but were trimmed away are simply absent.
pub fn materialize<'a, T>(
    collection: &'a OrderedCollection<T>,
    window: VisibleWindow,
    item_height: u32,
) -> Materialized<'a, T> {
    let (first_index, items) = collection.slice(window.start_index..window.end_index);
    Materialized {
        window,
        item_height,
        first_index,
        items,
    }
}

/// Drops records outside `[min(visible) - buffer_size, max(visible) + buffer_size]`.
///
/// Indices of the kept records do not change. An empty `visible_indices` leaves the collection
/// untouched.
pub fn trim_to_window<T>(
    mut collection: OrderedCollection<T>,
    visible_indices: impl IntoIterator<Item = usize>,
    buffer_size: usize,
) -> OrderedCollection<T> {
    let mut bounds: Option<(usize, usize)> = None;
    for i in visible_indices {
        bounds = Some(match bounds {
            None => (i, i),
            Some((lo, hi)) => (lo.min(i), hi.max(i)),
        });
    }
    let Some((lo, hi)) = bounds else {
        return collection;
    };

    let keep_start = lo.saturating_sub(buffer_size);
    let keep_end = hi.saturating_add(buffer_size).saturating_add(1);
    swdebug!(
        len = collection.len(),
        keep_start,
        keep_end,
        "trim_to_window"
    );
    collection.retain_range(keep_start..keep_end);
    collection
}

/// Whether [`optimize_memory_usage`] would trim a collection of `len` records.
pub fn should_trim(len: usize, config: &OptimizerConfig, profile: &DeviceProfile) -> bool {
    profile.is_constrained && len >= config.trim_threshold
}

/// Trims `collection` around `visible_indices` on constrained devices holding large collections.
///
/// On every other device this returns the input unchanged: keeping the whole collection avoids
/// refetching when the user scrolls back.
pub fn optimize_memory_usage<T>(
    collection: OrderedCollection<T>,
    visible_indices: impl IntoIterator<Item = usize>,
    config: &OptimizerConfig,
    profile: &DeviceProfile,
) -> OrderedCollection<T> {
    if !should_trim(collection.len(), config, profile) {
        return collection;
    }
    trim_to_window(collection, visible_indices, config.trim_buffer)
}

/// Tracks scroll offset and viewport for a fixed-height list and keeps its [`VisibleWindow`]
/// current.
///
/// The host calls [`Self::on_scroll_changed`] / [`Self::on_resized`] (typically through a rate
/// limiter); the windower only reads the collection it is asked to materialize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetWindower {
    item_height: u32,
    buffer_rows: usize,
    viewport_height: u32,
    scroll_offset: u64,
    total_count: usize,
    window: VisibleWindow,
}

impl DatasetWindower {
    pub fn new(item_height: u32, viewport_height: u32) -> Result<Self, ConfigError> {
        if item_height == 0 {
            return Err(ConfigError::ZeroItemHeight);
        }
        Ok(Self {
            item_height,
            buffer_rows: DEFAULT_BUFFER_ROWS,
            viewport_height,
            scroll_offset: 0,
            total_count: 0,
            window: VisibleWindow::default(),
        })
    }

    pub fn from_config(config: &OptimizerConfig, viewport_height: u32) -> Result<Self, ConfigError> {
        Ok(Self::new(config.item_height, viewport_height)?.with_buffer_rows(config.buffer_rows))
    }

    pub fn with_buffer_rows(mut self, buffer_rows: usize) -> Self {
        self.buffer_rows = buffer_rows;
        self.recompute();
        self
    }

    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    pub fn buffer_rows(&self) -> usize {
        self.buffer_rows
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    pub fn on_scroll_changed(&mut self, scroll_offset: u64) -> VisibleWindow {
        self.scroll_offset = scroll_offset;
        self.recompute()
    }

    pub fn on_resized(&mut self, viewport: ViewportSize) -> VisibleWindow {
        self.viewport_height = viewport.height;
        self.recompute()
    }

    /// Updates the number of rows (e.g. after a page was appended).
    pub fn set_total_count(&mut self, total_count: usize) -> VisibleWindow {
        self.total_count = total_count;
        self.recompute()
    }

    pub fn total_scroll_extent(&self) -> u64 {
        total_scroll_extent(self.total_count, self.item_height)
    }

    /// How far through the scrollable extent the bottom of the viewport is, in `[0, 1]`.
    ///
    /// An empty list reports `1.0`: there is nothing left to scroll through.
    pub fn scroll_progress(&self) -> f32 {
        scroll_progress(
            self.scroll_offset,
            self.viewport_height,
            self.total_scroll_extent(),
        )
    }

    pub fn offset_for_index(&self, index: usize) -> u64 {
        (index as u64).saturating_mul(self.item_height as u64)
    }

    pub fn materialize<'a, T>(&self, collection: &'a OrderedCollection<T>) -> Materialized<'a, T> {
        materialize(collection, self.window, self.item_height)
    }

    fn recompute(&mut self) -> VisibleWindow {
        // item_height is validated in `new`.
        self.window = compute_visible_window(
            self.scroll_offset,
            self.item_height,
            self.viewport_height,
            self.total_count,
            self.buffer_rows,
        )
        .unwrap_or_default();
        swtrace!(
            start = self.window.start_index,
            end = self.window.end_index,
            "window recomputed"
        );
        self.window
    }
}

/// `(scroll_offset + viewport_height) / scroll_extent`, clamped to `[0, 1]`.
pub fn scroll_progress(scroll_offset: u64, viewport_height: u32, scroll_extent: u64) -> f32 {
    if scroll_extent == 0 {
        return 1.0;
    }
    let reached = scroll_offset.saturating_add(viewport_height as u64);
    (reached as f64 / scroll_extent as f64).min(1.0) as f32
}
