// Example: shaping a burst of scroll and resize events with host-clocked limiters.
use scrollwise::{DatasetWindower, Debouncer, Throttler, ViewportSize};

fn main() {
    let mut w = DatasetWindower::new(40, 600).expect("non-zero row height");
    w.set_total_count(10_000);

    let mut scroll = Throttler::new(100);
    let mut resize = Debouncer::new(150);

    // Simulate a 60fps scroll gesture with a window resize in the middle.
    let mut offset = 0u64;
    for frame in 0..60u64 {
        let now_ms = frame * 16;
        offset += 120;

        if scroll.admit(now_ms) {
            println!("t={now_ms}ms scroll -> {:?}", w.on_scroll_changed(offset));
        }
        if (20..25).contains(&frame) {
            resize.call(ViewportSize::new(390, 600 + frame as u32), now_ms);
        }
        if let Some(size) = resize.poll(now_ms) {
            println!("t={now_ms}ms resize {size:?} -> {:?}", w.on_resized(size));
        }
    }
}
