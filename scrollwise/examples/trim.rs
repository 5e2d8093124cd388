// Example: keeping memory bounded on a constrained device.
use scrollwise::{
    DeviceProfiler, FixedHost, InfiniteScroll, OptimizerConfig, VisibleWindow,
};

fn main() {
    let config = OptimizerConfig::default();
    let profile = DeviceProfiler::new(&config)
        .compute_profile(&FixedHost::new(390, 844).with_network_hint("3g"));
    println!("profile={profile:?}");

    let mut list = InfiniteScroll::<u32>::from_config(&config).expect("valid config");
    let mut next = 0u32;
    while list.items().len() < 2_000 {
        let Some(ticket) = list.load_more() else {
            break;
        };
        let batch: Vec<u32> = (next..next + profile.recommended_batch_size as u32).collect();
        next += batch.len() as u32;
        list.complete(ticket, Ok(batch));
    }

    let window = VisibleWindow {
        start_index: 500,
        end_index: 521,
    };
    list.trim_to_visible(window.start_index..window.end_index, &config, &profile);
    println!(
        "len={} retained={:?}",
        list.items().len(),
        list.items().retained_range()
    );
}
