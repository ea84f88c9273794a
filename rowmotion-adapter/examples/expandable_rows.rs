use rowmotion::{ContentRegion, ExpandCollapseController, ExpandOptions};
use rowmotion_adapter::sim::{
    Record, RecordContent, SimHolder, SimRegion, TimelineTransitions, sim_holder,
};
use rowmotion_adapter::{Easing, Timeline};
use tracing_subscriber::EnvFilter;

fn main() {
    // Example: a person table where at most one row shows its details at a time.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let people = [
        ("Ada", "born 1815\nmathematician"),
        ("Grace", "born 1906\nrear admiral\ncompiler pioneer"),
        ("Linus", "born 1969\nkernel maintainer"),
    ];
    let records: Vec<Record> = people
        .iter()
        .enumerate()
        .map(|(i, (name, body))| Record {
            id: i as u64 + 1,
            title: name.to_string(),
            body: body.to_string(),
        })
        .collect();

    let timeline = Timeline::new();
    let mut controller = ExpandCollapseController::with_options(
        RecordContent::default(),
        TimelineTransitions::new(timeline.clone(), 180).with_easing(Easing::EaseOutCubic),
        ExpandOptions::new().with_max_expanded(1),
    );
    controller.set_on_toggle(|region: &SimRegion, was_visible| {
        println!(
            "toggled row {:?}: {}",
            region.row_key(),
            if was_visible { "collapsing" } else { "expanding" }
        );
    });

    let mut holders: Vec<SimHolder> = records.iter().map(|_| sim_holder(18)).collect();
    for (position, (holder, record)) in holders.iter_mut().zip(&records).enumerate() {
        controller.bind(holder, position, record.id, record);
    }

    let mut now_ms = 0u64;
    for tap in [0usize, 1, 1, 2] {
        timeline.tick(now_ms);
        let region = holders[tap].content_region().clone();
        controller.toggle(&region);

        while timeline.tick(now_ms) > 0 {
            now_ms += 16;
        }
        let heights: Vec<u32> = holders.iter().map(|h| h.content_region().height()).collect();
        println!(
            "t={now_ms} heights={heights:?} expanded={:?}",
            controller.expanded_rows().collect::<Vec<_>>()
        );
        now_ms += 500;
    }
}
