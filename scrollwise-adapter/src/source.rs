use std::future::Future;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use scrollwise::FetchError;

/// One page request issued by [`crate::InfiniteScrollController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Records the device profile recommends per page.
    pub batch_size: usize,
}

/// The external collaborator that supplies pages of records.
///
/// A source must resolve to an empty `Vec` to signal that no pages remain, and to `Err` on
/// failure. Sentinel values are not recognized.
///
/// Any `Fn(PageRequest) -> impl Future<Output = Result<Vec<T>, FetchError>>` closure is a
/// data source.
pub trait DataSource<T> {
    fn fetch_page(&self, request: PageRequest) -> LocalBoxFuture<'static, Result<Vec<T>, FetchError>>;
}

impl<T, F, Fut> DataSource<T> for F
where
    F: Fn(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<T>, FetchError>> + 'static,
{
    fn fetch_page(&self, request: PageRequest) -> LocalBoxFuture<'static, Result<Vec<T>, FetchError>> {
        self(request).boxed_local()
    }
}
