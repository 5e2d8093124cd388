// Example: windowing a long list and materializing the visible rows.
use scrollwise::{DatasetWindower, OrderedCollection};

fn main() {
    let companies: OrderedCollection<String> =
        (0..100_000).map(|i| format!("Company #{i}")).collect();

    let mut w = DatasetWindower::new(72, 800)
        .expect("non-zero row height")
        .with_buffer_rows(2);
    w.set_total_count(companies.len());
    w.on_scroll_changed(123_456);

    println!("total_scroll_extent={}", w.total_scroll_extent());
    println!("window={:?}", w.window());
    for (index, offset, name) in w.materialize(&companies).iter() {
        println!("{index:>6} @ {offset:>8}px  {name}");
    }
}
