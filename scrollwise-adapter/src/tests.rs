use crate::*;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use scrollwise::{FetchError, FixedHost, LoadState, OptimizerConfig, ViewportSize};

type Reply = Result<Vec<u32>, FetchError>;

/// A data source whose fetches stay pending until the test answers them, in request order.
#[derive(Clone, Default)]
struct Scripted {
    requests: Rc<RefCell<Vec<PageRequest>>>,
    pending: Rc<RefCell<VecDeque<oneshot::Sender<Reply>>>>,
}

impl Scripted {
    fn source(&self) -> impl DataSource<u32> + 'static {
        let this = self.clone();
        move |request: PageRequest| {
            this.requests.borrow_mut().push(request);
            let (tx, rx) = oneshot::channel();
            this.pending.borrow_mut().push_back(tx);
            async move { rx.await.unwrap_or_else(|_| Err(FetchError::from("cancelled"))) }
        }
    }

    fn reply(&self, reply: Reply) {
        let tx = self.pending.borrow_mut().pop_front().expect("no fetch pending");
        let _ = tx.send(reply);
    }

    fn pages(&self) -> Vec<usize> {
        self.requests.borrow().iter().map(|r| r.page).collect()
    }

    fn last_request(&self) -> PageRequest {
        *self.requests.borrow().last().expect("no request issued")
    }
}

fn batch(range: core::ops::Range<u32>) -> Reply {
    Ok(range.collect())
}

struct RefusingSpawner;

impl LocalSpawn for RefusingSpawner {
    fn spawn_local_obj(&self, _future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        Err(SpawnError::shutdown())
    }
}

fn controller(pool: &LocalPool, script: &Scripted) -> InfiniteScrollController<u32> {
    InfiniteScrollController::new(&OptimizerConfig::new(72), script.source(), pool.spawner())
        .unwrap()
}

#[test]
fn pages_load_until_the_source_runs_dry() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    assert!(ctl.load_more().unwrap());
    assert_eq!(ctl.phase(), LoadState::Loading);
    assert!(ctl.state().loading);
    script.reply(batch(0..20));
    pool.run_until_stalled();
    assert_eq!(ctl.phase(), LoadState::Idle);

    assert!(ctl.load_more().unwrap());
    script.reply(batch(20..40));
    pool.run_until_stalled();

    assert!(ctl.load_more().unwrap());
    script.reply(Ok(Vec::new()));
    pool.run_until_stalled();

    assert_eq!(ctl.phase(), LoadState::Exhausted);
    {
        let state = ctl.state();
        assert_eq!(state.page, 2);
        assert_eq!(state.items.len(), 40);
        assert_eq!(state.total_count, 40);
        assert!(!state.has_more);
        assert!(!state.loading);
        assert_eq!(state.items.get(39), Some(&39));
    }
    assert_eq!(script.pages(), vec![1, 2, 3]);
    assert_eq!(script.last_request().batch_size, 20);

    assert!(!ctl.load_more().unwrap());
    assert!(!ctl.on_scroll_changed(0, 600, 0).unwrap());
    assert_eq!(script.pages().len(), 3);
}

#[test]
fn failed_page_is_retried_with_the_same_number() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    ctl.load_more().unwrap();
    script.reply(Err(FetchError::from("boom")));
    pool.run_until_stalled();

    assert_eq!(ctl.phase(), LoadState::Error);
    assert_eq!(ctl.state().error.as_deref(), Some("boom"));
    assert_eq!(ctl.state().page, 0);

    // Scroll triggers do not leave the error state.
    assert!(!ctl.on_scroll_changed(10_000, 600, 0).unwrap());

    assert!(ctl.retry().unwrap());
    assert_eq!(script.pages(), vec![1, 1]);
    assert_eq!(ctl.state().error, None);

    script.reply(batch(0..20));
    pool.run_until_stalled();
    assert_eq!(ctl.phase(), LoadState::Idle);
    assert_eq!(ctl.state().page, 1);
}

#[test]
fn empty_error_message_gets_the_default_text() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    ctl.load_more().unwrap();
    script.reply(Err(FetchError::from("")));
    pool.run_until_stalled();
    assert_eq!(
        ctl.state().error.as_deref(),
        Some(FetchError::DEFAULT_MESSAGE)
    );
}

#[test]
fn rapid_triggers_issue_a_single_fetch() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    assert!(ctl.on_scroll_changed(0, 600, 0).unwrap());
    for _ in 0..5 {
        assert!(!ctl.on_scroll_changed(0, 600, 0).unwrap());
        assert!(!ctl.load_more().unwrap());
    }
    pool.run_until_stalled();
    assert_eq!(script.pages(), vec![1]);

    script.reply(batch(0..20));
    pool.run_until_stalled();
    assert_eq!(ctl.state().items.len(), 20);
}

#[test]
fn scroll_below_threshold_does_not_fetch() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    ctl.load_more().unwrap();
    script.reply(batch(0..20));
    pool.run_until_stalled();

    // 20 rows of 72px: (0 + 600) / 1440 < 0.8.
    assert!(!ctl.on_scroll_changed(0, 600, 1440).unwrap());
    // (600 + 600) / 1440 >= 0.8.
    assert!(ctl.on_scroll_changed(600, 600, 1440).unwrap());
    assert_eq!(script.pages(), vec![1, 2]);
}

#[test]
fn dispose_discards_late_results() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    ctl.load_more().unwrap();
    ctl.dispose();
    script.reply(batch(0..20));
    pool.run_until_stalled();

    assert!(ctl.is_disposed());
    assert!(ctl.state().items.is_empty());
    assert_ne!(ctl.phase(), LoadState::Loading);
    assert!(!ctl.load_more().unwrap());
    assert_eq!(script.pages(), vec![1]);
}

#[test]
fn dropped_controller_ignores_results() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    ctl.load_more().unwrap();
    drop(ctl);
    script.reply(batch(0..20));
    pool.run_until_stalled();
}

#[test]
fn on_load_sees_the_merged_state() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let seen = Rc::new(Cell::new(0usize));
    let seen_cb = Rc::clone(&seen);
    let ctl =
        controller(&pool, &script).with_on_load(move |snapshot| seen_cb.set(snapshot.total_count));

    ctl.load_more().unwrap();
    script.reply(batch(0..20));
    pool.run_until_stalled();
    assert_eq!(seen.get(), 20);
}

#[test]
fn on_load_can_request_the_next_page() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let handle: Rc<RefCell<Option<Rc<InfiniteScrollController<u32>>>>> = Rc::default();
    let handle_cb = Rc::clone(&handle);
    let ctl = Rc::new(controller(&pool, &script).with_on_load(move |snapshot| {
        if snapshot.page >= 2 {
            return;
        }
        if let Some(ctl) = handle_cb.borrow().as_ref() {
            assert!(ctl.load_more().unwrap());
            ctl.trim_to_visible(0..10, &OptimizerConfig::new(72), &ctl_profile());
        }
    }));
    *handle.borrow_mut() = Some(Rc::clone(&ctl));

    ctl.load_more().unwrap();
    script.reply(batch(0..20));
    pool.run_until_stalled();
    assert_eq!(script.pages(), vec![1, 2]);
    assert_eq!(ctl.phase(), LoadState::Loading);

    script.reply(batch(20..40));
    pool.run_until_stalled();
    assert_eq!(script.pages(), vec![1, 2]);
    assert_eq!(ctl.phase(), LoadState::Idle);
    assert_eq!(ctl.state().items.len(), 40);

    handle.borrow_mut().take();
}

fn ctl_profile() -> scrollwise::DeviceProfile {
    scrollwise::DeviceProfiler::default().compute_profile(&FixedHost::new(1920, 1080))
}

#[test]
fn batch_size_follows_the_profile() {
    let pool = LocalPool::new();
    let script = Scripted::default();
    let ctl = controller(&pool, &script);

    ctl.set_batch_size(0);
    assert_eq!(ctl.batch_size(), 1);
    ctl.set_batch_size(15);
    ctl.load_more().unwrap();
    assert_eq!(script.last_request().batch_size, 15);
}

#[test]
fn spawn_failure_moves_the_list_to_error() {
    let script = Scripted::default();
    let ctl =
        InfiniteScrollController::new(&OptimizerConfig::new(72), script.source(), RefusingSpawner)
            .unwrap();

    let err = ctl.load_more().unwrap_err();
    assert!(matches!(err, AdapterError::Spawn(_)));
    assert_eq!(ctl.phase(), LoadState::Error);
    assert!(ctl.state().error.is_some());
}

#[test]
fn invalid_config_is_rejected() {
    let pool = LocalPool::new();
    let script = Scripted::default();
    let err = InfiniteScrollController::new(
        &OptimizerConfig::new(72).with_scroll_threshold(1.5),
        script.source(),
        pool.spawner(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Config(scrollwise::ConfigError::InvalidScrollThreshold(_))
    ));
}

fn optimizer(
    pool: &LocalPool,
    script: &Scripted,
    config: OptimizerConfig,
    host: FixedHost,
) -> Optimizer<u32> {
    Optimizer::new(config, host, script.source(), pool.spawner()).unwrap()
}

#[test]
fn optimizer_loads_and_fetches_on_scroll() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let host = FixedHost::new(1280, 900).with_network_hint("4g");
    let mut opt = optimizer(&pool, &script, OptimizerConfig::new(72), host);

    assert!(!opt.profile().is_constrained);
    assert!(opt.start().unwrap());
    script.reply(batch(0..20));
    pool.run_until_stalled();
    opt.tick(0).unwrap();

    assert_eq!(opt.windower().total_count(), 20);
    // 900px holds 13 rows of 72px, plus one buffer row each side, clipped at the top.
    assert_eq!(opt.window().start_index, 0);
    assert_eq!(opt.window().end_index, 15);
    let rendered = opt.with_visible(|m| m.iter().map(|(i, _, v)| (i, *v)).collect::<Vec<_>>());
    assert_eq!(rendered.len(), 15);
    assert_eq!(rendered[3], (3, 3));

    // (600 + 900) / 1440 >= 0.8.
    assert!(opt.on_scroll_changed(600, 1_000).unwrap());
    assert_eq!(script.pages(), vec![1, 2]);
    assert_eq!(script.last_request().batch_size, 20);
}

#[test]
fn optimizer_applies_the_trailing_scroll_sample() {
    let pool = LocalPool::new();
    let script = Scripted::default();
    let config = OptimizerConfig::new(72).with_throttle_ms(100);
    let mut opt = optimizer(&pool, &script, config, FixedHost::new(1280, 720));

    opt.on_scroll_changed(0, 0).unwrap();
    opt.on_scroll_changed(100, 10).unwrap();
    opt.on_scroll_changed(200, 20).unwrap();
    assert_eq!(opt.windower().scroll_offset(), 0);

    opt.tick(50).unwrap();
    assert_eq!(opt.windower().scroll_offset(), 0);
    opt.tick(120).unwrap();
    assert_eq!(opt.windower().scroll_offset(), 200);

    // Past the cooldown the next sample applies immediately.
    opt.on_scroll_changed(300, 200).unwrap();
    assert_eq!(opt.windower().scroll_offset(), 300);
}

#[test]
fn optimizer_reprofiles_after_debounced_resize() {
    let pool = LocalPool::new();
    let script = Scripted::default();
    let mut opt = optimizer(
        &pool,
        &script,
        OptimizerConfig::new(72),
        FixedHost::new(1280, 900),
    );
    assert!(!opt.profile().is_constrained);
    assert_eq!(opt.profile().recommended_batch_size, 20);

    opt.on_resized(ViewportSize::new(800, 600), 0);
    opt.on_resized(ViewportSize::new(375, 667), 50);
    opt.tick(150).unwrap();
    assert_eq!(opt.profile().viewport_width, 1280);

    opt.tick(200).unwrap();
    assert!(opt.profile().is_constrained);
    assert_eq!(opt.profile().viewport(), ViewportSize::new(375, 667));
    assert_eq!(opt.windower().viewport_height(), 667);
    assert_eq!(opt.profile().recommended_batch_size, scrollwise::SLOW_BATCH_SIZE);

    opt.start().unwrap();
    assert_eq!(script.last_request().batch_size, scrollwise::SLOW_BATCH_SIZE);
}

#[test]
fn optimizer_trims_large_lists_on_constrained_devices() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let config = OptimizerConfig::new(72).with_trim(30, 5);
    let host = FixedHost::new(375, 720).with_network_hint("4g");
    let mut opt = optimizer(&pool, &script, config, host);
    assert!(opt.profile().is_constrained);

    opt.start().unwrap();
    script.reply(batch(0..20));
    pool.run_until_stalled();
    opt.tick(0).unwrap();

    opt.load_more().unwrap();
    script.reply(batch(20..40));
    pool.run_until_stalled();
    opt.tick(10).unwrap();

    // More pages may follow, so nothing below the window is released.
    assert_eq!(opt.scroll().state().items.retained_range(), 0..40);

    // Scrolling to the bottom releases the rows above the window and asks for page 3.
    assert!(opt.on_scroll_changed(30 * 72, 1_000).unwrap());
    assert_eq!(opt.window().start_index, 29);
    assert_eq!(opt.window().end_index, 40);
    assert_eq!(opt.scroll().state().items.retained_range(), 24..40);
    assert_eq!(opt.with_visible(|m| m.len()), 11);

    script.reply(batch(40..60));
    pool.run_until_stalled();
    opt.tick(1_010).unwrap();
    {
        let state = opt.scroll().state();
        assert_eq!(state.items.len(), 60);
        assert_eq!(state.items.get(45), Some(&45));
        assert_eq!(state.items.retained_range().end, 60);
    }

    // The newly fetched page is rendered once the window reaches it.
    opt.on_scroll_changed(50 * 72, 1_200).unwrap();
    assert_eq!(opt.window().start_index, 49);
    assert_eq!(opt.window().end_index, 60);
    let rendered = opt.with_visible(|m| m.iter().map(|(i, _, v)| (i, *v)).collect::<Vec<_>>());
    assert_eq!(rendered.len(), 11);
    assert_eq!(rendered.first(), Some(&(49, 49)));
    assert_eq!(rendered.last(), Some(&(59, 59)));
    assert_eq!(opt.scroll().state().items.retained_range(), 44..60);
}

#[test]
fn optimizer_keeps_everything_on_desktop() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let config = OptimizerConfig::new(72).with_trim(30, 5);
    let mut opt = optimizer(&pool, &script, config, FixedHost::new(1920, 1080));

    for start in [0u32, 20] {
        opt.load_more().unwrap();
        script.reply(batch(start..start + 20));
        pool.run_until_stalled();
        opt.tick(0).unwrap();
    }
    assert!(!opt.scroll().state().items.is_trimmed());
    assert_eq!(opt.scroll().state().items.retained_len(), 40);
}

#[test]
fn disposed_optimizer_ignores_events() {
    let mut pool = LocalPool::new();
    let script = Scripted::default();
    let mut opt = optimizer(
        &pool,
        &script,
        OptimizerConfig::new(72),
        FixedHost::new(1920, 1080),
    );

    opt.start().unwrap();
    opt.on_resized(ViewportSize::new(375, 667), 0);
    opt.dispose();
    script.reply(batch(0..20));
    pool.run_until_stalled();

    assert!(opt.is_disposed());
    assert!(!opt.on_scroll_changed(10_000, 500).unwrap());
    assert!(!opt.tick(1_000).unwrap());
    assert!(!opt.start().unwrap());
    assert!(!opt.profile().is_constrained);
    assert!(opt.scroll().state().items.is_empty());
    assert_eq!(script.pages(), vec![1]);
}

struct SharedSink(Rc<RefCell<Vec<DiagnosticRecord>>>);

impl DiagnosticsSink for SharedSink {
    fn record(&mut self, record: DiagnosticRecord) {
        self.0.borrow_mut().push(record);
    }
}

#[test]
fn measure_reports_memory_delta_and_keeps_result() {
    let used = Cell::new(1_000u64);
    let probe = FnMemoryProbe::new(|| {
        let v = used.get();
        used.set(v + 500);
        Some(v)
    });
    let records = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = PerformanceMonitor::new(&probe).with_sink(SharedSink(Rc::clone(&records)));

    let m = monitor.measure(|| (1..=10).sum::<u32>(), "sum");
    assert_eq!(m.result, 55);
    assert!(m.duration_ms >= 0.0);
    assert_eq!(m.memory_delta_bytes, Some(500));

    let records = records.borrow();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation, "sum");
    assert_eq!(records[0].memory_delta_bytes, Some(500));
}

#[test]
fn measure_without_probe_has_no_memory_figure() {
    let mut monitor = PerformanceMonitor::default();
    let m = monitor.measure(|| "done", "noop");
    assert_eq!(m.result, "done");
    assert_eq!(m.memory_delta_bytes, None);
    assert_eq!(m.record("noop").memory_delta_bytes, None);
}

#[test]
fn vec_collects_diagnostic_records() {
    let mut sink: Vec<DiagnosticRecord> = Vec::new();
    let m = PerformanceMonitor::default().measure(|| (), "op");
    sink.record(m.record("op"));
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].operation, "op");
}

#[test]
fn render_stats_keep_a_rolling_window() {
    let mut stats = RenderStats::new("list");
    assert_eq!(stats.avg_render_ms(), 0.0);
    assert_eq!(stats.last_render_ms(), 0.0);

    for i in 0..12 {
        assert!(!stats.record(i as f64, Some(1_000)));
    }
    assert_eq!(stats.render_times().len(), RENDER_WINDOW);
    assert_eq!(stats.render_times().next(), Some(2.0));
    assert_eq!(stats.last_render_ms(), 11.0);
    assert_eq!(stats.avg_render_ms(), 6.5);
    assert_eq!(stats.avg_memory_bytes(), 1_000.0);

    assert!(!stats.record(SLOW_RENDER_MS, None));
    assert!(stats.record(16.5, None));
    assert_eq!(stats.memory_samples().len(), RENDER_WINDOW);
}

#[test]
fn memory_watch_flags_sustained_growth() {
    let mut watch = MemoryWatch::new(NoMemoryProbe);
    assert_eq!(watch.observe(100), None);
    for _ in 0..9 {
        assert_eq!(watch.observe(200), None);
    }
    assert_eq!(watch.samples(), 10);

    // Eleventh sample, only 40% up.
    assert_eq!(watch.observe(140), None);
    let growth = watch.observe(160).unwrap();
    assert_eq!(growth.initial_bytes, 100);
    assert_eq!(growth.current_bytes, 160);
    assert!((growth.increase_percent - 60.0).abs() < 1e-9);
}

#[test]
fn memory_watch_samples_on_its_interval() {
    let mut watch = MemoryWatch::new(FnMemoryProbe::new(|| Some(4096))).with_interval_ms(1_000);

    watch.tick(0);
    assert_eq!(watch.samples(), 1);
    assert_eq!(watch.initial_bytes(), Some(4096));
    watch.tick(500);
    assert_eq!(watch.samples(), 1);
    watch.tick(1_000);
    assert_eq!(watch.samples(), 2);

    watch.dispose();
    watch.tick(5_000);
    assert_eq!(watch.samples(), 2);
}

#[test]
fn search_issues_only_the_settled_query() {
    let mut search: DebouncedSearch<Vec<&str>> = DebouncedSearch::default();
    search.set_query("ru", 0);
    search.set_query("rust", 100);

    assert_eq!(search.poll(399), None);
    let req = search.poll(400).unwrap();
    assert_eq!(
        req,
        SearchRequest {
            seq: 1,
            query: "rust".to_owned()
        }
    );
    assert!(search.is_loading());

    assert!(search.complete(req.seq, Ok::<_, FetchError>(vec!["rustc"])));
    assert!(!search.is_loading());
    assert_eq!(search.results(), Some(&vec!["rustc"]));
}

#[test]
fn search_drops_stale_results() {
    let mut search: DebouncedSearch<u32> = DebouncedSearch::new(300);
    search.set_query("a", 0);
    let first = search.poll(300).unwrap();
    search.set_query("ab", 310);
    let second = search.poll(610).unwrap();
    assert_eq!(second.seq, first.seq + 1);

    assert!(!search.complete(first.seq, Ok::<_, FetchError>(1)));
    assert_eq!(search.results(), None);

    assert!(search.complete(second.seq, Err("")));
    assert_eq!(search.error(), Some("Search failed"));
}

#[test]
fn blank_query_clears_immediately() {
    let mut search: DebouncedSearch<u32> = DebouncedSearch::new(300);
    search.set_query("a", 0);
    let req = search.poll(300).unwrap();
    assert!(search.complete(req.seq, Ok::<_, FetchError>(7)));

    search.set_query("ab", 400);
    search.set_query("   ", 410);
    assert!(!search.is_pending());
    assert_eq!(search.results(), None);
    assert_eq!(search.error(), None);
    assert_eq!(search.poll(10_000), None);
}
