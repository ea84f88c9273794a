use rowmotion::VisualElement;
use rowmotion_adapter::sim::SimItems;
use rowmotion_adapter::{Recycler, Timeline};
use tracing_subscriber::EnvFilter;

fn main() {
    // Example: a 10k-row list with 24px rows in a 240px viewport.
    //
    // Run with `RUST_LOG=rowmotion=trace` and `--features tracing` to see every bind.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let timeline = Timeline::new();
    let rows = (0..10_000).map(|i| format!("item #{i}")).collect();
    let items = SimItems::new(timeline.clone(), rows)
        .with_delay_ms(60)
        .with_duration_ms(250)
        .with_slide_px(16.0);
    let mut list = Recycler::new(items, (), 10_000, 24, 240).with_timeline(timeline.clone());

    let mut now_ms = 0u64;
    let bound = list.layout(now_ms);
    println!("initial layout bound {bound} rows");

    // Slow scroll: new rows fade in one after another.
    for _ in 0..20 {
        now_ms += 16;
        timeline.tick(now_ms);
        list.scroll_by(12, now_ms);
    }

    // Fling far down: the stagger collapses to the fixed per-row delay.
    now_ms += 16;
    timeline.tick(now_ms);
    list.scroll_to(120_000, now_ms);

    while timeline.tick(now_ms) > 0 {
        if now_ms % 80 == 0 {
            let faded: Vec<String> = list
                .attached()
                .map(|(p, e)| format!("{p}:{:.2}", e.opacity()))
                .collect();
            println!("t={now_ms} {}", faded.join(" "));
        }
        now_ms += 16;
    }

    for (position, element) in list.attached() {
        println!(
            "pos={position} element={} tag={:?} text={:?}",
            element.id(),
            element.tag(),
            element.text()
        );
    }
    println!(
        "done: created={} scrap={} last_animated={:?}",
        list.scheduler().items().created(),
        list.scrap_len(),
        list.scheduler().last_animated_position()
    );
}
