use futures::executor::LocalPool;
use futures::future;
use scrollwise::{FetchError, FixedHost, OptimizerConfig};
use scrollwise_adapter::{Optimizer, PageRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: an optimizer driven by a simulated host loop.
    //
    // A host would:
    // - forward scroll/resize events as they arrive
    // - call tick(now_ms) from its frame/timer loop
    // - run its local executor so page fetches make progress
    // - render whatever with_visible() hands back
    let mut pool = LocalPool::new();
    let host = FixedHost::new(390, 844)
        .with_network_hint("3g")
        .with_platform_hint("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)");

    // Five pages of posts, then nothing.
    let source = |req: PageRequest| {
        let page: Result<Vec<String>, FetchError> = Ok(if req.page <= 5 {
            (0..req.batch_size)
                .map(|i| format!("post {}", (req.page - 1) * req.batch_size + i))
                .collect()
        } else {
            Vec::new()
        });
        future::ready(page)
    };

    let config = OptimizerConfig::new(72).with_trim(60, 10);
    let mut opt = Optimizer::new(config, host, source, pool.spawner())?;
    println!("profile={:?}", opt.profile());

    opt.start()?;
    let mut now_ms = 0u64;
    let mut offset = 0u64;
    while now_ms < 3_000 {
        now_ms += 16;
        offset += 120;
        opt.on_scroll_changed(offset, now_ms)?;
        pool.run_until_stalled();
        opt.tick(now_ms)?;

        if now_ms % 400 == 0 {
            let first = opt.with_visible(|m| m.iter().next().map(|(i, _, post)| (i, post.clone())));
            println!(
                "t={now_ms} window={:?} first={first:?} state={:?}",
                opt.window(),
                opt.snapshot()
            );
        }
    }

    opt.dispose();
    Ok(())
}
