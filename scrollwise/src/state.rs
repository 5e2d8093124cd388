use alloc::string::String;

use crate::OrderedCollection;

/// Phase of an [`crate::InfiniteScroll`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    /// The last fetch failed. Scroll triggers are ignored until `retry`/`load_more`.
    Error,
    /// The data source returned an empty page. Terminal.
    Exhausted,
}

/// Everything the rendering layer needs to draw a list and its loading/error affordances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollState<T> {
    pub items: OrderedCollection<T>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Number of pages loaded successfully.
    pub page: usize,
    pub total_count: usize,
}

impl<T> Default for ScrollState<T> {
    fn default() -> Self {
        Self {
            items: OrderedCollection::new(),
            has_more: true,
            loading: false,
            error: None,
            page: 0,
            total_count: 0,
        }
    }
}

impl<T> ScrollState<T> {
    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            has_more: self.has_more,
            loading: self.loading,
            error: self.error.clone(),
            page: self.page,
            total_count: self.total_count,
        }
    }
}

/// [`ScrollState`] without the records, e.g. for diagnostics or persisting UI state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub page: usize,
    pub total_count: usize,
}
