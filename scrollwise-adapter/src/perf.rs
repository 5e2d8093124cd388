use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use scrollwise::Throttler;

/// Durations above one 60 Hz frame count as slow renders.
pub const SLOW_RENDER_MS: f64 = 16.0;
/// Number of samples kept by [`RenderStats`].
pub const RENDER_WINDOW: usize = 10;
/// Default interval between [`MemoryWatch`] samples.
pub const MEMORY_WATCH_INTERVAL_MS: u64 = 30_000;

/// Host heap-usage introspection.
///
/// Return `None` when the platform cannot report usage; measurements then carry no memory figure.
pub trait MemoryProbe {
    fn used_bytes(&self) -> Option<u64>;
}

impl<P: MemoryProbe + ?Sized> MemoryProbe for &P {
    fn used_bytes(&self) -> Option<u64> {
        (**self).used_bytes()
    }
}

impl<P: MemoryProbe + ?Sized> MemoryProbe for Box<P> {
    fn used_bytes(&self) -> Option<u64> {
        (**self).used_bytes()
    }
}

/// A probe for hosts without heap introspection.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn used_bytes(&self) -> Option<u64> {
        None
    }
}

/// Adapts a closure into a [`MemoryProbe`].
pub struct FnMemoryProbe<F> {
    read: F,
}

impl<F: Fn() -> Option<u64>> FnMemoryProbe<F> {
    pub fn new(read: F) -> Self {
        Self { read }
    }
}

impl<F: Fn() -> Option<u64>> MemoryProbe for FnMemoryProbe<F> {
    fn used_bytes(&self) -> Option<u64> {
        (self.read)()
    }
}

impl<F> fmt::Debug for FnMemoryProbe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMemoryProbe").finish_non_exhaustive()
    }
}

/// Resident set size from `/proc/self/statm`. Reports `None` off Linux.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcStatmProbe;

// statm counts pages; 4 KiB on the x86_64/aarch64 targets we care about.
const STATM_PAGE_SIZE: u64 = 4096;

impl MemoryProbe for ProcStatmProbe {
    fn used_bytes(&self) -> Option<u64> {
        #[cfg(target_os = "linux")]
        {
            let content = std::fs::read_to_string("/proc/self/statm").ok()?;
            let resident: u64 = content.split_whitespace().nth(1)?.parse().ok()?;
            Some(resident * STATM_PAGE_SIZE)
        }
        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }
}

/// The outcome of [`PerformanceMonitor::measure`].
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement<R> {
    pub result: R,
    pub duration_ms: f64,
    /// `None` when the probe cannot report heap usage.
    pub memory_delta_bytes: Option<i64>,
}

impl<R> Measurement<R> {
    pub fn record(&self, operation: &str) -> DiagnosticRecord {
        DiagnosticRecord {
            operation: operation.to_owned(),
            duration_ms: self.duration_ms,
            memory_delta_bytes: self.memory_delta_bytes,
        }
    }
}

/// The shape forwarded to a telemetry collaborator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DiagnosticRecord {
    pub operation: String,
    pub duration_ms: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub memory_delta_bytes: Option<i64>,
}

/// Receives one [`DiagnosticRecord`] per measured operation.
pub trait DiagnosticsSink {
    fn record(&mut self, record: DiagnosticRecord);
}

impl DiagnosticsSink for Vec<DiagnosticRecord> {
    fn record(&mut self, record: DiagnosticRecord) {
        self.push(record);
    }
}

/// Wall-clock and heap-delta measurement of synchronous operations.
pub struct PerformanceMonitor<P = NoMemoryProbe> {
    probe: P,
    sink: Option<Box<dyn DiagnosticsSink>>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(NoMemoryProbe)
    }
}

impl<P: MemoryProbe> PerformanceMonitor<P> {
    pub fn new(probe: P) -> Self {
        Self { probe, sink: None }
    }

    pub fn with_sink(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Runs `operation`, timing it and diffing heap usage around it.
    ///
    /// Emits one `info` diagnostic and forwards a [`DiagnosticRecord`] to the sink, if any. The
    /// operation's result is returned untouched.
    pub fn measure<R>(&mut self, operation: impl FnOnce() -> R, label: &str) -> Measurement<R> {
        let before = self.probe.used_bytes();
        let start = Instant::now();
        let result = operation();
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        let after = self.probe.used_bytes();

        let memory_delta_bytes = match (before, after) {
            (Some(before), Some(after)) => Some(after as i64 - before as i64),
            _ => None,
        };

        swinfo!(
            operation = label,
            duration_ms,
            memory_delta_bytes = ?memory_delta_bytes,
            "measured"
        );

        let measurement = Measurement {
            result,
            duration_ms,
            memory_delta_bytes,
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.record(measurement.record(label));
        }
        measurement
    }
}

impl<P: fmt::Debug> fmt::Debug for PerformanceMonitor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("probe", &self.probe)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Rolling render timings for one component.
#[derive(Clone, Debug)]
pub struct RenderStats {
    component: String,
    render_ms: VecDeque<f64>,
    memory_bytes: VecDeque<u64>,
}

impl RenderStats {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            render_ms: VecDeque::with_capacity(RENDER_WINDOW),
            memory_bytes: VecDeque::with_capacity(RENDER_WINDOW),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Records one render. Returns `true` if it was slower than [`SLOW_RENDER_MS`].
    pub fn record(&mut self, render_ms: f64, memory_bytes: Option<u64>) -> bool {
        push_bounded(&mut self.render_ms, render_ms);
        if let Some(bytes) = memory_bytes {
            push_bounded(&mut self.memory_bytes, bytes);
        }
        let slow = render_ms > SLOW_RENDER_MS;
        if slow {
            swwarn!(component = %self.component, render_ms, "slow render");
        }
        slow
    }

    pub fn render_times(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.render_ms.iter().copied()
    }

    pub fn memory_samples(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        self.memory_bytes.iter().copied()
    }

    pub fn last_render_ms(&self) -> f64 {
        self.render_ms.back().copied().unwrap_or(0.0)
    }

    pub fn avg_render_ms(&self) -> f64 {
        if self.render_ms.is_empty() {
            return 0.0;
        }
        self.render_ms.iter().sum::<f64>() / self.render_ms.len() as f64
    }

    pub fn avg_memory_bytes(&self) -> f64 {
        if self.memory_bytes.is_empty() {
            return 0.0;
        }
        self.memory_bytes.iter().map(|&b| b as f64).sum::<f64>() / self.memory_bytes.len() as f64
    }
}

fn push_bounded<V>(buf: &mut VecDeque<V>, value: V) {
    if buf.len() == RENDER_WINDOW {
        buf.pop_front();
    }
    buf.push_back(value);
}

/// A suspected leak reported by [`MemoryWatch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryGrowth {
    pub initial_bytes: u64,
    pub current_bytes: u64,
    pub increase_percent: f64,
}

/// Periodic heap sampling that flags sustained growth.
///
/// The first sample is the baseline. Once more than `min_samples` (10) samples have been taken,
/// any sample more than `growth_percent` (50 %) above the baseline is reported.
#[derive(Debug)]
pub struct MemoryWatch<P> {
    probe: P,
    interval: Throttler,
    initial_bytes: Option<u64>,
    samples: u32,
    min_samples: u32,
    growth_percent: f64,
}

impl<P: MemoryProbe> MemoryWatch<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            interval: Throttler::new(MEMORY_WATCH_INTERVAL_MS),
            initial_bytes: None,
            samples: 0,
            min_samples: 10,
            growth_percent: 50.0,
        }
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval = Throttler::new(interval_ms);
        self
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn initial_bytes(&self) -> Option<u64> {
        self.initial_bytes
    }

    /// Samples the probe if the interval has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> Option<MemoryGrowth> {
        if !self.interval.admit(now_ms) {
            return None;
        }
        let current = self.probe.used_bytes()?;
        self.observe(current)
    }

    /// Feeds one sample directly, bypassing the interval.
    pub fn observe(&mut self, current_bytes: u64) -> Option<MemoryGrowth> {
        let initial = *self.initial_bytes.get_or_insert(current_bytes);
        self.samples = self.samples.saturating_add(1);
        if initial == 0 {
            return None;
        }

        let increase_percent =
            (current_bytes as f64 - initial as f64) / initial as f64 * 100.0;
        if self.samples <= self.min_samples || increase_percent <= self.growth_percent {
            return None;
        }
        swwarn!(
            initial_bytes = initial,
            current_bytes,
            increase_percent,
            "potential memory leak"
        );
        Some(MemoryGrowth {
            initial_bytes: initial,
            current_bytes,
            increase_percent,
        })
    }

    /// Stops sampling. `tick` becomes a no-op.
    pub fn dispose(&mut self) {
        self.interval.dispose();
    }
}
