use alloc::string::String;

use crate::{NetworkClass, OptimizerConfig, ViewportSize};

/// Batch size used on slow (or unknown and constrained) networks.
pub const SLOW_BATCH_SIZE: usize = 10;
/// Batch size used on medium networks.
pub const MEDIUM_BATCH_SIZE: usize = 15;

/// Platform families that are always treated as constrained, matched case-insensitively
/// against the host's platform hint (typically a user-agent string).
const CONSTRAINED_PLATFORMS: &[&str] = &[
    "Android",
    "webOS",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

/// Read-only view of the host capabilities the profiler cares about.
///
/// Every method may report "unknown"; the profiler degrades to a documented default instead of
/// failing. Test doubles can use [`FixedHost`].
pub trait HostEnvironment {
    /// Current viewport size, or `None` when no viewport exists (e.g. headless rendering).
    fn viewport_size(&self) -> Option<ViewportSize>;

    /// Effective connection type hint such as `"3g"`.
    fn network_hint(&self) -> Option<&str>;

    /// Whether the host accepts direct pointer/touch input.
    fn pointer_capable(&self) -> bool;

    fn pixel_density(&self) -> Option<f32> {
        None
    }

    /// Free-form platform identification (e.g. a user-agent string).
    fn platform_hint(&self) -> Option<&str> {
        None
    }
}

impl<H: HostEnvironment + ?Sized> HostEnvironment for &H {
    fn viewport_size(&self) -> Option<ViewportSize> {
        (**self).viewport_size()
    }

    fn network_hint(&self) -> Option<&str> {
        (**self).network_hint()
    }

    fn pointer_capable(&self) -> bool {
        (**self).pointer_capable()
    }

    fn pixel_density(&self) -> Option<f32> {
        (**self).pixel_density()
    }

    fn platform_hint(&self) -> Option<&str> {
        (**self).platform_hint()
    }
}

/// A [`HostEnvironment`] with fixed answers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixedHost {
    pub viewport: Option<ViewportSize>,
    pub network_hint: Option<String>,
    pub pointer_capable: bool,
    pub pixel_density: Option<f32>,
    pub platform_hint: Option<String>,
}

impl FixedHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Some(ViewportSize::new(width, height)),
            ..Self::default()
        }
    }

    pub fn with_network_hint(mut self, hint: impl Into<String>) -> Self {
        self.network_hint = Some(hint.into());
        self
    }

    pub fn with_pointer_capable(mut self, pointer_capable: bool) -> Self {
        self.pointer_capable = pointer_capable;
        self
    }

    pub fn with_pixel_density(mut self, pixel_density: f32) -> Self {
        self.pixel_density = Some(pixel_density);
        self
    }

    pub fn with_platform_hint(mut self, hint: impl Into<String>) -> Self {
        self.platform_hint = Some(hint.into());
        self
    }
}

impl HostEnvironment for FixedHost {
    fn viewport_size(&self) -> Option<ViewportSize> {
        self.viewport
    }

    fn network_hint(&self) -> Option<&str> {
        self.network_hint.as_deref()
    }

    fn pointer_capable(&self) -> bool {
        self.pointer_capable
    }

    fn pixel_density(&self) -> Option<f32> {
        self.pixel_density
    }

    fn platform_hint(&self) -> Option<&str> {
        self.platform_hint.as_deref()
    }
}

/// Device classification used to parameterize windowing and loading.
///
/// Profiles are replaced wholesale when the host changes (e.g. on resize), never patched.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceProfile {
    pub is_constrained: bool,
    pub supports_pointer: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub pixel_density: f32,
    pub network_class: NetworkClass,
    pub recommended_batch_size: usize,
}

impl DeviceProfile {
    pub fn viewport(&self) -> ViewportSize {
        ViewportSize::new(self.viewport_width, self.viewport_height)
    }
}

/// Computes [`DeviceProfile`]s from a [`HostEnvironment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceProfiler {
    breakpoint: u32,
    base_batch_size: usize,
}

impl Default for DeviceProfiler {
    fn default() -> Self {
        Self::new(&OptimizerConfig::default())
    }
}

impl DeviceProfiler {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            breakpoint: config.constrained_breakpoint,
            base_batch_size: config.batch_size.max(1),
        }
    }

    /// Reads the host once and classifies it.
    ///
    /// Missing signals never fail: no viewport means 375x667, no pixel density means `1.0`, and
    /// no network hint means [`NetworkClass::Unknown`].
    pub fn compute_profile(&self, host: &(impl HostEnvironment + ?Sized)) -> DeviceProfile {
        let viewport = host.viewport_size().unwrap_or(ViewportSize::FALLBACK);
        let network_class = host
            .network_hint()
            .map(NetworkClass::from_hint)
            .unwrap_or_default();
        let pixel_density = host
            .pixel_density()
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(1.0);

        let narrow = viewport.min_dimension() <= self.breakpoint;
        let constrained_platform = host.platform_hint().is_some_and(is_constrained_platform);
        let is_constrained = narrow || constrained_platform;

        let profile = DeviceProfile {
            is_constrained,
            supports_pointer: host.pointer_capable(),
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            pixel_density,
            network_class,
            recommended_batch_size: self.batch_size_for(network_class, is_constrained),
        };
        swdebug!(
            is_constrained = profile.is_constrained,
            network = ?profile.network_class,
            batch_size = profile.recommended_batch_size,
            "compute_profile"
        );
        profile
    }

    /// Unknown networks are only treated as slow when the device itself is constrained.
    pub fn batch_size_for(&self, network: NetworkClass, is_constrained: bool) -> usize {
        let base = self.base_batch_size;
        match network {
            NetworkClass::Slow => base.min(SLOW_BATCH_SIZE),
            NetworkClass::Unknown if is_constrained => base.min(SLOW_BATCH_SIZE),
            NetworkClass::Medium => base.min(MEDIUM_BATCH_SIZE),
            NetworkClass::Unknown | NetworkClass::Fast => base,
        }
    }
}

fn is_constrained_platform(hint: &str) -> bool {
    CONSTRAINED_PLATFORMS
        .iter()
        .any(|family| contains_ignore_ascii_case(hint, family))
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return true;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle))
}
