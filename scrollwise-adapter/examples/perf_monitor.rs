use scrollwise_adapter::{MemoryWatch, PerformanceMonitor, ProcStatmProbe, RenderStats};

fn main() {
    // Example: timing renders and watching heap growth. Enable a tracing subscriber in a real host
    // to see the `info`/`warn` diagnostics.
    let mut monitor = PerformanceMonitor::new(ProcStatmProbe);
    let mut stats = RenderStats::new("feed");
    let mut watch = MemoryWatch::new(ProcStatmProbe).with_interval_ms(100);

    let mut retained: Vec<Vec<u8>> = Vec::new();
    for frame in 0..20u64 {
        let m = monitor.measure(
            || {
                retained.push(vec![0u8; 256 * 1024]);
                retained.len()
            },
            "render",
        );
        stats.record(m.duration_ms, None);
        if let Some(growth) = watch.tick(frame * 100) {
            println!("frame {frame}: memory grew {:.0}%", growth.increase_percent);
        }
        println!(
            "frame {frame}: rows={} {:.3}ms delta={:?}",
            m.result, m.duration_ms, m.memory_delta_bytes
        );
    }
    println!(
        "avg={:.3}ms last={:.3}ms",
        stats.avg_render_ms(),
        stats.last_render_ms()
    );
}
