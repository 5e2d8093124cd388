use alloc::vec::Vec;
use core::ops::Range;

/// An append-only sequence of records with stable indices.
///
/// Records are addressed by the index they were appended at. Trimming drops records from either
/// end without renumbering the rest: after a trim, [`Self::len`] still reports every index ever
/// assigned while [`Self::retained_range`] reports which of them are still held in memory.
///
/// The retained records always form one contiguous range. A batch appended after the tail was
/// trimmed cannot join that range, so the collection rebases onto the new batch: the previously
/// retained records are released and the batch is kept at its own indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedCollection<T> {
    base: usize,
    items: Vec<T>,
    dropped_tail: usize,
}

impl<T> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedCollection<T> {
    pub fn new() -> Self {
        Self {
            base: 0,
            items: Vec::new(),
            dropped_tail: 0,
        }
    }

    /// Number of indices assigned so far, including trimmed ones.
    pub fn len(&self) -> usize {
        self.base + self.items.len() + self.dropped_tail
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records currently held in memory.
    pub fn retained_len(&self) -> usize {
        self.items.len()
    }

    pub fn retained_range(&self) -> Range<usize> {
        self.base..self.base + self.items.len()
    }

    pub fn is_trimmed(&self) -> bool {
        self.base > 0 || self.dropped_tail > 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        index
            .checked_sub(self.base)
            .and_then(|local| self.items.get(local))
    }

    /// Retained records in index order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Retained records in `range` (clamped to what is retained), with the index of the first one.
    pub fn slice(&self, range: Range<usize>) -> (usize, &[T]) {
        let retained = self.retained_range();
        let start = range.start.clamp(retained.start, retained.end);
        let end = range.end.clamp(start, retained.end);
        (start, &self.items[start - self.base..end - self.base])
    }

    /// Iterates retained records together with their stable index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        let base = self.base;
        self.items.iter().enumerate().map(move |(i, t)| (base + i, t))
    }

    pub(crate) fn append(&mut self, batch: Vec<T>) {
        if self.dropped_tail > 0 {
            swdebug!(
                released = self.items.len(),
                appended = batch.len(),
                "append past a trimmed tail; rebasing onto the new batch"
            );
            self.base = self.len();
            self.items.clear();
            self.dropped_tail = 0;
        } else if self.items.is_empty() {
            self.base = self.len();
        }
        self.items.extend(batch);
    }

    /// Keeps only the records whose index falls in `keep`. Indices of kept records are unchanged.
    pub(crate) fn retain_range(&mut self, keep: Range<usize>) {
        let retained = self.retained_range();
        let start = keep.start.clamp(retained.start, retained.end);
        let end = keep.end.clamp(start, retained.end);
        let total = self.len();

        self.items.truncate(end - self.base);
        self.items.drain(..start - self.base);
        self.base = start;
        self.dropped_tail = total - end;
    }

    pub(crate) fn clear(&mut self) {
        self.base = 0;
        self.items.clear();
        self.dropped_tail = 0;
    }
}

impl<T> From<Vec<T>> for OrderedCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            base: 0,
            items,
            dropped_tail: 0,
        }
    }
}

impl<T> FromIterator<T> for OrderedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
