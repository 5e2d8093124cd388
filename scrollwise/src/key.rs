#[cfg(not(feature = "std"))]
use alloc::collections::BTreeSet;
#[cfg(feature = "std")]
use std::collections::HashSet;

#[cfg(feature = "std")]
pub(crate) type KeySet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySet<K> = BTreeSet<K>;

/// Identity of an entry tracked by [`crate::ImageLoadScheduler`].
#[cfg(feature = "std")]
pub trait EntryKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> EntryKey for K {}

/// Identity of an entry tracked by [`crate::ImageLoadScheduler`].
#[cfg(not(feature = "std"))]
pub trait EntryKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> EntryKey for K {}
