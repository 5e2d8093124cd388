use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::ops::Range;

use crate::{ConfigError, DeviceProfile, OptimizerConfig};

/// Above this many records virtualization is reported as active.
const VIRTUALIZATION_MIN_LEN: usize = 100;

/// What [`paginate_for_profile`] did to a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Optimization {
    /// Unconstrained device: the whole dataset is rendered.
    NoOptimizationDesktop,
    /// Only one page of the dataset is rendered.
    PaginationApplied,
    /// The dataset is large enough to be windowed.
    VirtualizationEnabled,
}

#[derive(Debug)]
pub struct DatasetPage<'a, T> {
    pub visible_items: &'a [T],
    pub total_pages: usize,
    pub has_more: bool,
    pub applied: Vec<Optimization>,
}

/// Picks the slice of an in-memory dataset to render for `page` (1-based).
///
/// Unconstrained devices get everything. Constrained devices with more than
/// `max_initial_render` records get one `batch_size` page.
pub fn paginate_for_profile<'a, T>(
    dataset: &'a [T],
    page: usize,
    config: &OptimizerConfig,
    profile: &DeviceProfile,
) -> DatasetPage<'a, T> {
    if !profile.is_constrained {
        return DatasetPage {
            visible_items: dataset,
            total_pages: 1,
            has_more: false,
            applied: alloc::vec![Optimization::NoOptimizationDesktop],
        };
    }

    let batch = config.batch_size.max(1);
    let page = page.max(1);
    let mut applied = Vec::new();
    let mut visible_items = dataset;

    if dataset.len() > config.max_initial_render {
        let start = ((page - 1).saturating_mul(batch)).min(dataset.len());
        let end = start.saturating_add(batch).min(dataset.len());
        visible_items = &dataset[start..end];
        applied.push(Optimization::PaginationApplied);
    }

    let total_pages = dataset.len().div_ceil(batch);
    if config.enable_virtualization && dataset.len() > VIRTUALIZATION_MIN_LEN {
        applied.push(Optimization::VirtualizationEnabled);
    }

    DatasetPage {
        visible_items,
        total_pages,
        has_more: page < total_pages,
        applied,
    }
}

/// Page navigation over a local dataset, remembering which pages around the current one have
/// been marked for preloading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginator {
    len: usize,
    items_per_page: usize,
    preload_pages: usize,
    current_page: usize,
    loaded_pages: BTreeSet<usize>,
}

impl Paginator {
    pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;
    pub const DEFAULT_PRELOAD_PAGES: usize = 2;

    pub fn new(len: usize, items_per_page: usize, preload_pages: usize) -> Result<Self, ConfigError> {
        if items_per_page == 0 {
            return Err(ConfigError::ZeroItemsPerPage);
        }
        Ok(Self::build(len, items_per_page, preload_pages))
    }

    pub fn with_defaults(len: usize) -> Self {
        Self::build(
            len,
            Self::DEFAULT_ITEMS_PER_PAGE,
            Self::DEFAULT_PRELOAD_PAGES,
        )
    }

    fn build(len: usize, items_per_page: usize, preload_pages: usize) -> Self {
        let mut p = Self {
            len,
            items_per_page,
            preload_pages,
            current_page: 1,
            loaded_pages: BTreeSet::from([1]),
        };
        p.preload();
        p
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Updates the dataset length, pulling the current page back in range if needed.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
        self.preload();
    }

    pub fn total_pages(&self) -> usize {
        self.len.div_ceil(self.items_per_page)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    /// Moves to `page` (1-based). Out-of-range pages are ignored and return `false`.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        self.preload();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Index range of the current page.
    pub fn current_range(&self) -> Range<usize> {
        let start = ((self.current_page - 1) * self.items_per_page).min(self.len);
        let end = (start + self.items_per_page).min(self.len);
        start..end
    }

    pub fn current_items<'a, T>(&self, data: &'a [T]) -> &'a [T] {
        let range = self.current_range();
        let end = range.end.min(data.len());
        &data[range.start.min(end)..end]
    }

    /// Pages marked for preloading so far, ascending.
    pub fn loaded_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.loaded_pages.iter().copied()
    }

    pub fn is_page_loaded(&self, page: usize) -> bool {
        self.loaded_pages.contains(&page)
    }

    fn preload(&mut self) {
        let total = self.total_pages();
        let first = self.current_page.saturating_sub(self.preload_pages).max(1);
        let last = self.current_page.saturating_add(self.preload_pages).min(total);
        for page in first..=last {
            self.loaded_pages.insert(page);
        }
    }
}
