use crate::LoadPriority;
use crate::key::{EntryKey, KeySet};

/// A visibility notification for one deferred image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityEntry<'a, K> {
    pub key: K,
    /// Source to load once the entry becomes visible.
    pub src: &'a str,
    pub is_visible: bool,
}

/// Decides which images load eagerly and triggers deferred loads once per entry.
///
/// Loading itself is delegated to the `load` callback passed to each call, so the scheduler
/// never holds host objects.
#[derive(Clone, Debug)]
pub struct ImageLoadScheduler<K> {
    lazy: bool,
    triggered: KeySet<K>,
}

impl<K: EntryKey> Default for ImageLoadScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntryKey> ImageLoadScheduler<K> {
    pub fn new() -> Self {
        Self {
            lazy: true,
            triggered: KeySet::<K>::new(),
        }
    }

    /// With lazy loading disabled every image is classified as critical.
    pub fn with_lazy_loading(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn lazy_loading(&self) -> bool {
        self.lazy
    }

    /// An image whose top edge is above the fold (`top < viewport_height`) is critical.
    pub fn classify(&self, top: i64, viewport_height: u32) -> LoadPriority {
        if !self.lazy || top < viewport_height as i64 {
            LoadPriority::Critical
        } else {
            LoadPriority::Lazy
        }
    }

    /// Starts loading the first `count` URLs. Fire-and-forget; returns how many were started.
    pub fn preload_critical<S: AsRef<str>>(
        &self,
        urls: &[S],
        count: usize,
        mut load: impl FnMut(&str),
    ) -> usize {
        let critical = &urls[..count.min(urls.len())];
        for url in critical {
            load(url.as_ref());
        }
        swtrace!(count = critical.len(), "preload_critical");
        critical.len()
    }

    /// Triggers the deferred load of every entry that just became visible.
    ///
    /// Each key triggers at most once; repeated visibility events for it are no-ops.
    /// Returns how many loads were triggered by this call.
    pub fn on_visibility_change<'a>(
        &mut self,
        entries: impl IntoIterator<Item = VisibilityEntry<'a, K>>,
        mut load: impl FnMut(&K, &str),
    ) -> usize {
        let mut started = 0usize;
        for entry in entries {
            if !entry.is_visible || self.triggered.contains(&entry.key) {
                continue;
            }
            load(&entry.key, entry.src);
            self.triggered.insert(entry.key);
            started += 1;
        }
        started
    }

    pub fn is_triggered(&self, key: &K) -> bool {
        self.triggered.contains(key)
    }

    pub fn triggered_count(&self) -> usize {
        self.triggered.len()
    }

    /// Forgets a key so that its next visibility event loads again (e.g. a recycled row).
    pub fn forget(&mut self, key: &K) -> bool {
        self.triggered.remove(key)
    }

    pub fn reset(&mut self) {
        self.triggered.clear();
    }
}
