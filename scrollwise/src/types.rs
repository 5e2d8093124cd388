/// Coarse network quality reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkClass {
    #[default]
    Unknown,
    Slow,
    Medium,
    Fast,
}

impl NetworkClass {
    /// Maps an effective-connection-type hint (`"slow-2g"`, `"2g"`, `"3g"`, `"4g"`, ...) to a class.
    ///
    /// Unrecognized hints map to [`NetworkClass::Unknown`].
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim();
        let is = |s: &str| hint.eq_ignore_ascii_case(s);
        if is("slow-2g") || is("2g") {
            Self::Slow
        } else if is("3g") {
            Self::Medium
        } else if is("4g") || is("5g") || is("wifi") || is("ethernet") {
            Self::Fast
        } else {
            Self::Unknown
        }
    }
}

/// Viewport dimensions in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    /// Fallback used when the host cannot report its viewport.
    pub const FALLBACK: Self = Self {
        width: 375,
        height: 667,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub start_index: usize,
    pub end_index: usize, // exclusive, includes buffer rows
}

impl VisibleWindow {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
    }
}

/// Whether an image should be fetched right away or deferred until it nears the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadPriority {
    Critical,
    Lazy,
}
