use crate::*;

use proptest::prelude::*;
use std::boxed::Box;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::format;
use std::rc::Rc;
use std::string::String;
use std::vec;
use std::vec::Vec;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Event {
    Provided(usize),
    Ended(usize),
}

type Log = Rc<RefCell<Vec<Event>>>;

#[derive(Default)]
struct TrackerState {
    state: AnimationState,
    delay_ms: Option<u64>,
    ends: usize,
    cancels: usize,
    finish: Vec<FinishCallback>,
}

#[derive(Clone, Default)]
struct Tracker(Rc<RefCell<TrackerState>>);

impl Tracker {
    fn state(&self) -> AnimationState {
        self.0.borrow().state
    }

    fn delay_ms(&self) -> Option<u64> {
        self.0.borrow().delay_ms
    }

    fn ends(&self) -> usize {
        self.0.borrow().ends
    }

    fn cancels(&self) -> usize {
        self.0.borrow().cancels
    }

    /// Simulates the animation running to completion on its own.
    fn complete(&self) {
        let callbacks = {
            let mut s = self.0.borrow_mut();
            if s.state.is_finished() {
                return;
            }
            s.state = AnimationState::Ended;
            core::mem::take(&mut s.finish)
        };
        for cb in callbacks {
            cb();
        }
    }
}

struct FakeAnim {
    tracker: Tracker,
    label: Option<usize>,
    log: Option<Log>,
    on_end: Option<Box<dyn FnMut()>>,
}

impl FakeAnim {
    fn new(tracker: Tracker) -> Self {
        Self {
            tracker,
            label: None,
            log: None,
            on_end: None,
        }
    }
}

impl AnimationHandle for FakeAnim {
    fn start(&mut self, delay_ms: u64) {
        let mut s = self.tracker.0.borrow_mut();
        if s.state != AnimationState::Idle {
            return;
        }
        s.state = AnimationState::Running;
        s.delay_ms = Some(delay_ms);
    }

    fn end(&mut self) {
        if self.tracker.state().is_finished() {
            return;
        }
        if let Some(f) = self.on_end.as_mut() {
            f();
        }
        if let (Some(log), Some(label)) = (&self.log, self.label) {
            log.borrow_mut().push(Event::Ended(label));
        }
        self.tracker.0.borrow_mut().ends += 1;
        self.tracker.complete();
    }

    fn cancel(&mut self) {
        let mut s = self.tracker.0.borrow_mut();
        if s.state.is_finished() {
            return;
        }
        s.state = AnimationState::Cancelled;
        s.cancels += 1;
        s.finish.clear();
    }

    fn state(&self) -> AnimationState {
        self.tracker.state()
    }

    fn on_finish(&mut self, callback: FinishCallback) {
        self.tracker.0.borrow_mut().finish.push(callback);
    }
}

// ---------------------------------------------------------------------------------------------
// AnimationScheduler fakes
// ---------------------------------------------------------------------------------------------

#[derive(Debug)]
struct FakeElement {
    id: usize,
    tag: Option<ElementTag>,
    opacity: f32,
}

impl VisualElement for FakeElement {
    fn tag(&self) -> Option<ElementTag> {
        self.tag
    }

    fn set_tag(&mut self, tag: ElementTag) {
        self.tag = Some(tag);
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}

struct FakeItems {
    log: Log,
    next_id: usize,
    delay_ms: u64,
    extra_animators: usize,
    /// One tracker per fade-in, keyed by the position it was created for.
    fades: Vec<(usize, Tracker)>,
}

impl FakeItems {
    fn new(delay_ms: u64) -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            next_id: 0,
            delay_ms,
            extra_animators: 0,
            fades: Vec::new(),
        }
    }

    fn fade(&self, position: usize) -> Option<&Tracker> {
        self.fades
            .iter()
            .rev()
            .find(|(p, _)| *p == position)
            .map(|(_, tracker)| tracker)
    }

    fn anim(&self, position: usize) -> FakeAnim {
        FakeAnim {
            tracker: Tracker::default(),
            label: Some(position),
            log: Some(Rc::clone(&self.log)),
            on_end: None,
        }
    }
}

impl AnimatedItems for FakeItems {
    type Element = FakeElement;
    type Parent = ();
    type Animation = FakeAnim;

    fn item_element(
        &mut self,
        position: usize,
        reusable: Option<FakeElement>,
        _parent: &(),
    ) -> FakeElement {
        self.log.borrow_mut().push(Event::Provided(position));
        reusable.unwrap_or_else(|| {
            self.next_id += 1;
            FakeElement {
                id: self.next_id,
                tag: None,
                opacity: 1.0,
            }
        })
    }

    fn animators(&mut self, _parent: &(), element: &FakeElement) -> Vec<FakeAnim> {
        let position = element.tag.map_or(usize::MAX, |t| t.position);
        (0..self.extra_animators).map(|_| self.anim(position)).collect()
    }

    fn fade_in(&mut self, element: &FakeElement) -> FakeAnim {
        let position = element.tag.map_or(usize::MAX, |t| t.position);
        let anim = self.anim(position);
        self.fades.push((position, anim.tracker.clone()));
        anim
    }

    fn animation_delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

fn scheduler(first: usize, last: usize) -> AnimationScheduler<FakeItems> {
    let mut s = AnimationScheduler::new(FakeItems::new(50));
    s.set_host(VisibleWindow::new(first, last));
    s
}

#[test]
fn first_screen_animates_each_position_with_staggered_delay() {
    let mut s = scheduler(0, 2);

    let mut elements = Vec::new();
    for (i, now) in [1000u64, 1001, 1002].into_iter().enumerate() {
        elements.push(s.request_element(i, None, &(), now));
    }

    assert_eq!(s.animation_start_ms(), Some(1000));
    assert_eq!(s.last_animated_position(), Some(2));
    assert_eq!(s.registry().len(), 3);

    // start(1000) + initial(150) + n * 50 - now
    let delays: Vec<u64> = (0..3)
        .map(|p| s.items().fade(p).unwrap().delay_ms().unwrap())
        .collect();
    assert_eq!(delays, vec![150, 199, 248]);
    assert!(delays.windows(2).all(|w| w[0] <= w[1]));

    for e in &elements {
        assert_eq!(e.opacity, 0.0);
    }
}

#[test]
fn rebinding_an_already_animated_position_does_not_animate() {
    let mut s = scheduler(0, 5);
    let e = s.request_element(3, None, &(), 0);
    assert_eq!(s.last_animated_position(), Some(3));

    let mut fresh = s.request_element(2, None, &(), 10);
    assert!(s.items().fade(2).is_none());
    assert_eq!(fresh.opacity, 1.0);

    fresh.opacity = 0.5;
    let fresh_id = fresh.id;
    let again = s.request_element(3, Some(fresh), &(), 20);
    assert_eq!(again.id, fresh_id);
    assert_eq!(again.opacity, 0.5);
    assert_eq!(s.items().fades.len(), 1);
    assert_eq!(e.tag.unwrap().position, 3);
}

#[test]
fn reused_element_ends_its_animation_before_rebinding() {
    let mut s = scheduler(0, 10);
    s.set_animate_from_position(5);

    let e = s.request_element(5, None, &(), 0);
    let h = s.items().fade(5).unwrap().clone();
    assert_eq!(h.state(), AnimationState::Running);
    s.items().log.borrow_mut().clear();

    let e = s.request_element(9, Some(e), &(), 5);

    assert_eq!(h.state(), AnimationState::Ended);
    assert!(!s.registry().contains(5));
    assert!(s.registry().contains(9));
    assert_eq!(e.tag.unwrap().position, 9);

    // The old handle is ended before the provider is asked for position 9.
    let log = s.items().log.borrow().clone();
    assert_eq!(log.first(), Some(&Event::Ended(5)));
    let ended = log.iter().position(|ev| *ev == Event::Ended(5)).unwrap();
    let provided = log.iter().position(|ev| *ev == Event::Provided(9)).unwrap();
    assert!(ended < provided);
}

#[test]
fn reuse_for_lower_position_ends_animation_without_registering() {
    let mut s = scheduler(0, 10);
    for p in 0..6 {
        let _ = s.request_element(p, None, &(), 0);
    }
    let e = s.request_element(6, None, &(), 0);
    let h = s.items().fade(6).unwrap().clone();

    let e = s.request_element(2, Some(e), &(), 1);
    assert_eq!(h.state(), AnimationState::Ended);
    assert!(!s.registry().contains(6));
    // Position 2 keeps the entry of the element that first showed it; nothing new is registered.
    let tag = e.tag.unwrap();
    assert_eq!(tag.position, 2);
    assert!(s.registry().contains(2));
    assert_ne!(s.registry().generation(2), Some(tag.generation));
    assert_eq!(s.last_animated_position(), Some(6));
}

#[test]
fn far_from_first_screen_uses_fixed_delay() {
    let mut s = scheduler(0, 4); // span = 4
    for p in 0..=6 {
        let _ = s.request_element(p, None, &(), 0);
    }
    // last animated (6) is beyond span + 1 => the per-item delay is used as is.
    let _ = s.request_element(40, None, &(), 0);
    assert_eq!(s.items().fade(40).unwrap().delay_ms(), Some(50));

    // Positions 0..=5 were all staggered from the start timestamp.
    assert_eq!(s.items().fade(5).unwrap().delay_ms(), Some(150 + 5 * 50));
}

#[test]
fn staggered_delay_is_clamped_to_zero_when_late() {
    let mut s = scheduler(0, 10);
    let _ = s.request_element(0, None, &(), 0);
    let _ = s.request_element(1, None, &(), 10_000);
    assert_eq!(s.items().fade(1).unwrap().delay_ms(), Some(0));
}

#[test]
#[should_panic(expected = "set_host")]
fn request_without_host_panics() {
    let mut s: AnimationScheduler<FakeItems> = AnimationScheduler::new(FakeItems::new(50));
    let _ = s.request_element(0, None, &(), 0);
}

#[test]
fn try_request_without_host_errors_before_touching_provider() {
    let mut s: AnimationScheduler<FakeItems> = AnimationScheduler::new(FakeItems::new(50));
    let r = s.try_request_element(0, None, &(), 0);
    assert_eq!(r.unwrap_err(), Error::HostNotConfigured);
    assert!(s.items().log.borrow().is_empty());
}

#[test]
fn disabled_scheduler_binds_without_animating() {
    let mut s = scheduler(0, 10);
    s.set_enabled(false);
    let e = s.request_element(0, None, &(), 0);
    assert_eq!(e.opacity, 1.0);
    assert!(s.registry().is_empty());
    assert_eq!(s.last_animated_position(), None);
    assert_eq!(e.tag.unwrap().position, 0);

    s.set_enabled(true);
    let _ = s.request_element(1, None, &(), 0);
    assert!(s.registry().contains(1));
}

#[test]
fn reset_ends_everything_and_starts_a_new_activation() {
    let mut s = scheduler(0, 10);
    let _ = s.request_element(0, None, &(), 0);
    let _ = s.request_element(1, None, &(), 0);
    let h0 = s.items().fade(0).unwrap().clone();

    s.reset();
    assert_eq!(h0.state(), AnimationState::Ended);
    assert!(s.registry().is_empty());
    assert_eq!(s.last_animated_position(), None);
    assert_eq!(s.animation_start_ms(), None);

    let _ = s.request_element(0, None, &(), 500);
    assert!(s.registry().contains(0));
    assert_eq!(s.animation_start_ms(), Some(500));
}

#[test]
fn stale_generation_does_not_end_another_elements_animation() {
    let mut s = scheduler(0, 10);
    let a = s.request_element(5, None, &(), 0);
    s.reset();

    // A fresh element takes position 5 in the new activation.
    let _b = s.request_element(5, None, &(), 0);
    let hb = s.items().fade(5).unwrap().clone();
    assert_eq!(hb.state(), AnimationState::Running);

    // `a` still carries its tag from the previous activation.
    let _ = s.request_element(6, Some(a), &(), 0);
    assert_eq!(hb.state(), AnimationState::Running);
    assert!(s.registry().contains(5));
}

#[test]
fn extra_animators_play_together_with_fade() {
    let mut s = scheduler(0, 10);
    s.items_mut().extra_animators = 2;
    let _ = s.request_element(0, None, &(), 0);
    assert_eq!(s.registry().get(0).unwrap().len(), 3);
    assert!(s.is_animating(0));
}

#[test]
fn prune_drops_finished_entries() {
    let mut s = scheduler(0, 10);
    let _ = s.request_element(0, None, &(), 0);
    let _ = s.request_element(1, None, &(), 0);
    s.items().fade(0).unwrap().complete();

    assert!(!s.is_animating(0));
    assert_eq!(s.prune_finished(), 1);
    assert!(!s.registry().contains(0));
    assert!(s.registry().contains(1));
}

#[test]
fn animate_from_position_skips_lower_positions() {
    let opts = AnimationOptions::new().with_animate_from_position(Some(3));
    let mut s = AnimationScheduler::with_options(FakeItems::new(50), opts);
    s.set_host(VisibleWindow::new(0, 10));
    for p in 0..5 {
        let _ = s.request_element(p, None, &(), 0);
    }
    let animated: Vec<usize> = s.items().fades.iter().map(|(p, _)| *p).collect();
    assert_eq!(animated, vec![3, 4]);

    s.reset();
    assert_eq!(s.last_animated_position(), Some(2));
}

#[test]
fn host_window_can_move_between_binds() {
    let mut s: AnimationScheduler<FakeItems, Rc<core::cell::Cell<VisibleWindow>>> =
        AnimationScheduler::new(FakeItems::new(50));
    let window = Rc::new(core::cell::Cell::new(VisibleWindow::new(0, 2)));
    s.set_host(Rc::clone(&window));

    for p in 0..3 {
        let _ = s.request_element(p, None, &(), 0);
    }
    window.set(VisibleWindow::new(1, 3));
    let _ = s.request_element(3, None, &(), 0);
    assert_eq!(s.items().fade(3).unwrap().delay_ms(), Some(150 + 3 * 50));
    assert_eq!(s.host().unwrap().visible_window(), VisibleWindow::new(1, 3));
}

// ---------------------------------------------------------------------------------------------
// AnimationSet / registry
// ---------------------------------------------------------------------------------------------

#[test]
fn ending_twice_is_a_no_op() {
    let trackers: Vec<Tracker> = (0..2).map(|_| Tracker::default()).collect();
    let mut set: AnimationSet<FakeAnim> = trackers.iter().cloned().map(FakeAnim::new).collect();
    set.start(0);
    set.end();
    set.end();
    set.cancel();
    assert_eq!(set.state(), AnimationState::Ended);
    assert!(trackers.iter().all(|p| p.ends() == 1));

    let mut r = AnimationRegistry::new();
    let tag = ElementTag {
        position: 1,
        generation: 7,
    };
    r.insert(tag, FakeAnim::new(Tracker::default()));
    assert!(r.end_for_tag(tag));
    assert!(!r.end_for_tag(tag));
    assert!(!r.end_position(1));
}

#[test]
fn set_finishes_once_every_member_finished() {
    let trackers: Vec<Tracker> = (0..3).map(|_| Tracker::default()).collect();
    let mut set: AnimationSet<FakeAnim> = trackers.iter().cloned().map(FakeAnim::new).collect();
    let fired = Rc::new(core::cell::Cell::new(0));
    let f = Rc::clone(&fired);
    set.on_finish(Box::new(move || f.set(f.get() + 1)));
    set.start(20);
    assert!(trackers.iter().all(|p| p.delay_ms() == Some(20)));

    trackers[0].complete();
    trackers[1].complete();
    assert_eq!(fired.get(), 0);
    assert_eq!(set.state(), AnimationState::Running);

    trackers[2].complete();
    assert_eq!(fired.get(), 1);
    assert_eq!(set.state(), AnimationState::Ended);
}

#[test]
fn cancelled_set_never_fires_finish() {
    let trackers: Vec<Tracker> = (0..2).map(|_| Tracker::default()).collect();
    let mut set: AnimationSet<FakeAnim> = trackers.iter().cloned().map(FakeAnim::new).collect();
    let fired = Rc::new(core::cell::Cell::new(false));
    let f = Rc::clone(&fired);
    set.on_finish(Box::new(move || f.set(true)));
    set.start(0);
    set.cancel();
    set.end();
    assert!(!fired.get());
    assert_eq!(set.state(), AnimationState::Cancelled);
    assert!(trackers.iter().all(|p| p.cancels() == 1 && p.ends() == 0));
}

#[test]
fn registry_insert_replaces_existing_entry_for_position() {
    let first = Tracker::default();
    let mut r = AnimationRegistry::new();
    r.insert(
        ElementTag {
            position: 4,
            generation: 1,
        },
        FakeAnim::new(first.clone()),
    );
    r.insert(
        ElementTag {
            position: 4,
            generation: 2,
        },
        FakeAnim::new(Tracker::default()),
    );
    assert_eq!(first.state(), AnimationState::Ended);
    assert_eq!(r.len(), 1);
    assert_eq!(r.generation(4), Some(2));
}

proptest! {
    #[test]
    fn increasing_binds_animate_every_position_exactly_once(
        steps in prop::collection::vec(1usize..4, 1..40),
        span in 0usize..8,
    ) {
        let mut s = scheduler(0, span);
        let mut position = 0usize;
        let mut last = None;
        for (i, step) in steps.iter().enumerate() {
            let _ = s.request_element(position, None, &(), i as u64 * 16);
            prop_assert!(s.last_animated_position() >= last);
            last = s.last_animated_position();
            prop_assert_eq!(last, Some(position));
            position += step;
        }
        let mut animated: Vec<usize> = s.items().fades.iter().map(|(p, _)| *p).collect();
        let n = animated.len();
        animated.dedup();
        prop_assert_eq!(animated.len(), n);
        prop_assert_eq!(n, steps.len());
    }

    #[test]
    fn reuse_always_ends_old_handle_before_new_bind(
        binds in prop::collection::vec((0usize..30, 0usize..6), 1..80),
    ) {
        let mut s = scheduler(0, 5);
        let mut pool: Vec<Option<FakeElement>> = (0..6).map(|_| None).collect();

        for (position, slot) in binds {
            let reused = pool[slot].take();
            let old = reused.as_ref().and_then(|e| e.tag);
            let old_running = old.and_then(|t| {
                let ours = s.registry().generation(t.position) == Some(t.generation);
                ours.then(|| s.items().fade(t.position).cloned()).flatten()
            });
            s.items().log.borrow_mut().clear();

            let e = s.request_element(position, reused, &(), 0);

            if let Some(t) = old {
                if let Some(h) = old_running {
                    prop_assert!(h.state().is_finished());
                    let log = s.items().log.borrow().clone();
                    let provided = log.iter().position(|ev| *ev == Event::Provided(position));
                    let ended = log.iter().position(|ev| *ev == Event::Ended(t.position));
                    prop_assert!(ended.unwrap() < provided.unwrap());
                }
                if t.position != position {
                    prop_assert!(
                        s.registry().generation(t.position) != Some(t.generation)
                    );
                }
            }
            prop_assert_eq!(e.tag.map(|t| t.position), Some(position));
            pool[slot] = Some(e);
        }

        let mut positions: Vec<usize> = s.registry().positions().collect();
        let n = positions.len();
        positions.sort_unstable();
        positions.dedup();
        prop_assert_eq!(positions.len(), n);
    }
}

// ---------------------------------------------------------------------------------------------
// ExpandCollapseController fakes
// ---------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RegionState {
    visible: bool,
    key: Option<u64>,
    height: u32,
    content_height: u32,
    requested: RegionHeight,
    replaced: usize,
}

#[derive(Clone, Debug, Default)]
struct FakeRegion(Rc<RefCell<RegionState>>);

impl FakeRegion {
    fn with_content_height(content_height: u32) -> Self {
        let r = Self::default();
        r.0.borrow_mut().content_height = content_height;
        r
    }

    fn replaced(&self) -> usize {
        self.0.borrow().replaced
    }
}

impl ContentRegion<u64> for FakeRegion {
    fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    fn set_visible(&self, visible: bool) {
        self.0.borrow_mut().visible = visible;
    }

    fn row_key(&self) -> Option<u64> {
        self.0.borrow().key
    }

    fn set_row_key(&self, key: u64) {
        self.0.borrow_mut().key = Some(key);
    }

    fn height(&self) -> u32 {
        self.0.borrow().height
    }

    fn measure_unconstrained(&self) -> u32 {
        self.0.borrow().content_height
    }

    fn set_height(&self, height: RegionHeight) {
        let mut s = self.0.borrow_mut();
        s.requested = height;
        s.height = match height {
            RegionHeight::WrapContent => s.content_height,
            RegionHeight::Fixed(h) => h,
        };
    }

    fn same_region(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

type View = Rc<String>;

impl ViewParent<View> for FakeRegion {
    fn replace_child(&self, _child: &View) {
        self.0.borrow_mut().replaced += 1;
    }
}

#[derive(Clone, Debug, Default)]
struct FakeParent(Rc<core::cell::Cell<usize>>);

impl ViewParent<View> for FakeParent {
    fn replace_child(&self, _child: &View) {
        self.0.set(self.0.get() + 1);
    }
}

/// Keeps views when asked to; otherwise builds a new one on every bind.
struct FakeContent {
    reuse: bool,
}

impl RowContent for FakeContent {
    type Key = u64;
    type Row = str;
    type View = View;
    type TitleParent = FakeParent;
    type Region = FakeRegion;

    fn render_title(&mut self, convert: Option<&View>, _parent: &FakeParent, row: &str) -> View {
        match convert {
            Some(v) if self.reuse => Rc::clone(v),
            _ => Rc::new(format!("title {row}")),
        }
    }

    fn render_content(&mut self, convert: Option<&View>, _parent: &FakeRegion, row: &str) -> View {
        match convert {
            Some(v) if self.reuse => Rc::clone(v),
            _ => Rc::new(format!("content {row}")),
        }
    }
}

#[derive(Default)]
struct FakeTransitions {
    created: Vec<(u32, u32, Tracker)>,
}

impl HeightTransitions<FakeRegion> for FakeTransitions {
    type Animation = FakeAnim;

    fn height_animation(&mut self, region: &FakeRegion, from: u32, to: u32) -> FakeAnim {
        let tracker = Tracker::default();
        self.created.push((from, to, tracker.clone()));
        let region = region.clone();
        let mut anim = FakeAnim::new(tracker);
        anim.on_end = Some(Box::new(move || region.set_height(RegionHeight::Fixed(to))));
        anim
    }
}

type Ctrl = ExpandCollapseController<FakeContent, FakeTransitions>;

struct Row {
    holder: RowHolder<FakeContent>,
}

impl Row {
    fn new(content_height: u32) -> Self {
        Self {
            holder: HolderBinding::new(
                FakeParent::default(),
                FakeRegion::with_content_height(content_height),
            ),
        }
    }

    fn region(&self) -> FakeRegion {
        self.holder.content_region().clone()
    }
}

fn controller(limit: usize) -> Ctrl {
    ExpandCollapseController::with_options(
        FakeContent { reuse: true },
        FakeTransitions::default(),
        ExpandOptions::new().with_max_expanded(limit),
    )
}

fn bind(c: &mut Ctrl, row: &mut Row, position: usize, key: u64) -> BindOutcome {
    c.bind(&mut row.holder, position, key, &format!("{key}"))
}

fn expanded(c: &Ctrl) -> Vec<u64> {
    c.expanded_rows().copied().collect()
}

#[test]
fn limit_of_one_collapses_previous_row() {
    let mut c = controller(1);
    let mut a = Row::new(40);
    let mut b = Row::new(60);
    bind(&mut c, &mut a, 0, 100);
    bind(&mut c, &mut b, 1, 200);

    assert_eq!(c.toggle(&a.region()), Some(true));
    assert_eq!(expanded(&c), vec![100]);
    assert!(a.region().is_visible());

    assert_eq!(c.toggle(&b.region()), Some(true));
    assert_eq!(expanded(&c), vec![200]);
    assert_eq!(c.expansion_state(&100), ExpansionState::Collapsing);

    c.end_transitions();
    assert!(!a.region().is_visible());
    assert!(b.region().is_visible());
    assert_eq!(b.region().height(), 60);
    assert_eq!(c.expansion_state(&100), ExpansionState::Collapsed);
    assert_eq!(c.expansion_state(&200), ExpansionState::Expanded);
}

#[test]
fn eviction_is_fifo_by_expansion_order() {
    let mut c = controller(2);
    let mut rows: Vec<Row> = (0..4).map(|_| Row::new(10)).collect();
    for (i, row) in rows.iter_mut().enumerate() {
        bind(&mut c, row, i, i as u64);
    }

    c.toggle(&rows[2].region());
    c.toggle(&rows[0].region());
    c.toggle(&rows[3].region());
    assert_eq!(expanded(&c), vec![0, 3]);
    c.toggle(&rows[1].region());
    assert_eq!(expanded(&c), vec![3, 1]);

    c.end_transitions();
    let visible: Vec<bool> = rows.iter().map(|r| r.region().is_visible()).collect();
    assert_eq!(visible, vec![false, true, false, true]);
}

#[test]
fn unbounded_controller_never_evicts() {
    let mut c = controller(0);
    let mut rows: Vec<Row> = (0..10).map(|_| Row::new(10)).collect();
    for (i, row) in rows.iter_mut().enumerate() {
        bind(&mut c, row, i, i as u64);
        c.toggle(&row.region());
    }
    assert_eq!(c.expanded_len(), 10);
    assert!(c.cached_region(&0).is_none());
    c.end_transitions();
    assert!(rows.iter().all(|r| r.region().is_visible()));
}

#[test]
fn eviction_of_recycled_row_leaves_the_new_row_alone() {
    let mut c = controller(1);
    let mut r1 = Row::new(10);
    let mut r2 = Row::new(10);
    bind(&mut c, &mut r1, 0, 1);
    bind(&mut c, &mut r2, 1, 2);
    c.toggle(&r1.region());
    c.end_transitions();

    // r1 scrolls away and is recycled for row 3 (collapsed).
    bind(&mut c, &mut r1, 5, 3);
    assert!(c.cached_region(&1).is_none());
    assert!(!r1.region().is_visible());
    let transitions = c.transitions().created.len();

    c.toggle(&r2.region());
    assert_eq!(expanded(&c), vec![2]);
    // Only the expand transition for row 2 was created.
    assert_eq!(c.transitions().created.len(), transitions + 1);
    assert!(!r1.region().is_visible());
    assert_eq!(r1.region().row_key(), Some(3));
}

#[test]
fn stale_cache_entry_is_checked_against_the_region_tag() {
    let mut c = controller(1);
    let mut r1 = Row::new(10);
    let mut r2 = Row::new(10);
    bind(&mut c, &mut r1, 0, 1);
    bind(&mut c, &mut r2, 1, 2);
    c.toggle(&r1.region());
    c.end_transitions();

    // The host reassigned the region without going through bind.
    r1.region().set_row_key(9);
    c.toggle(&r2.region());
    assert_eq!(expanded(&c), vec![2]);
    assert!(r1.region().is_visible());
}

#[test]
fn set_limit_clears_expanded_rows_and_invalidates() {
    let mut c = controller(0);
    let invalidated = Rc::new(core::cell::Cell::new(0));
    let i = Rc::clone(&invalidated);
    c.set_on_invalidate(move || i.set(i.get() + 1));

    let mut a = Row::new(10);
    let mut b = Row::new(10);
    bind(&mut c, &mut a, 0, 1);
    bind(&mut c, &mut b, 1, 2);
    c.toggle(&a.region());
    c.toggle(&b.region());
    assert_eq!(c.expanded_len(), 2);

    c.set_limit(0);
    assert_eq!(c.expanded_len(), 0);
    assert_eq!(invalidated.get(), 1);

    // The host re-renders.
    assert!(!bind(&mut c, &mut a, 0, 1).expanded);
    assert!(!bind(&mut c, &mut b, 1, 2).expanded);
    assert!(!a.region().is_visible());
    assert!(!b.region().is_visible());
}

#[test]
fn bind_rebuilds_only_when_views_change() {
    let mut c = controller(0);
    let mut row = Row::new(10);

    let first = bind(&mut c, &mut row, 0, 1);
    assert!(first.title_rebuilt && first.content_rebuilt);
    let second = bind(&mut c, &mut row, 0, 1);
    assert!(!second.title_rebuilt && !second.content_rebuilt);
    assert_eq!(row.holder.title_parent().0.get(), 1);
    assert_eq!(row.region().replaced(), 1);

    c.content_mut().reuse = false;
    let third = bind(&mut c, &mut row, 0, 1);
    assert!(third.title_rebuilt && third.content_rebuilt);
    assert_eq!(row.holder.title_parent().0.get(), 2);
    assert_eq!(row.holder.title_view().unwrap().as_str(), "title 1");
}

#[test]
fn bind_resets_region_to_wrap_content_and_tags_it() {
    let mut c = controller(0);
    let mut row = Row::new(30);
    row.region().set_height(RegionHeight::Fixed(3));
    bind(&mut c, &mut row, 4, 77);
    let region = row.region();
    assert_eq!(region.row_key(), Some(77));
    assert_eq!(region.0.borrow().requested, RegionHeight::WrapContent);
}

#[test]
fn collapse_hides_region_only_if_it_still_shows_the_row() {
    let mut c = controller(0);
    let mut row = Row::new(10);
    bind(&mut c, &mut row, 0, 1);
    c.toggle(&row.region());
    c.end_transitions();

    c.toggle(&row.region());
    let (from, to, tracker) = c.transitions().created.last().cloned().unwrap();
    assert_eq!((from, to), (10, 0));
    assert!(row.region().is_visible());

    // Recycled for another row mid-collapse; the finish callback must not hide it.
    row.region().set_row_key(2);
    row.region().set_visible(true);
    tracker.complete();
    assert!(row.region().is_visible());
}

#[test]
fn rebinding_region_to_another_row_ends_the_running_transition() {
    let mut c = controller(0);
    let mut row = Row::new(25);
    bind(&mut c, &mut row, 0, 1);
    c.toggle(&row.region());
    let (_, _, tracker) = c.transitions().created.last().cloned().unwrap();
    assert_eq!(tracker.state(), AnimationState::Running);

    bind(&mut c, &mut row, 0, 2);
    assert_eq!(tracker.state(), AnimationState::Ended);
    assert!(!row.region().is_visible());
    assert!(c.is_expanded(&1));
}

#[test]
fn toggle_listener_gets_visibility_before_toggle() {
    let mut c = controller(0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    c.set_on_toggle(move |r: &FakeRegion, was_visible: bool| {
        s.borrow_mut().push((r.row_key(), was_visible));
    });

    let mut row = Row::new(10);
    bind(&mut c, &mut row, 0, 5);
    c.toggle(&row.region());
    c.end_transitions();
    c.toggle(&row.region());
    assert_eq!(*seen.borrow(), vec![(Some(5), false), (Some(5), true)]);
}

#[test]
fn cleared_listeners_are_not_called() {
    let mut c = controller(0);
    let calls = Rc::new(core::cell::Cell::new(0));
    let t = Rc::clone(&calls);
    c.set_on_toggle(move |_: &FakeRegion, _| t.set(t.get() + 1));
    let i = Rc::clone(&calls);
    c.set_on_invalidate(move || i.set(i.get() + 10));

    let mut row = Row::new(10);
    bind(&mut c, &mut row, 0, 5);
    c.toggle(&row.region());
    assert_eq!(calls.get(), 1);

    c.clear_on_toggle();
    c.clear_on_invalidate();
    c.end_transitions();
    c.toggle(&row.region());
    c.notify_data_set_changed();
    c.set_limit(3);
    assert_eq!(calls.get(), 1);
}

#[test]
fn expand_measures_and_animates_from_zero() {
    let mut c = controller(0);
    let mut row = Row::new(48);
    bind(&mut c, &mut row, 0, 1);
    c.toggle(&row.region());
    let (from, to, tracker) = c.transitions().created.last().cloned().unwrap();
    assert_eq!((from, to), (0, 48));
    assert_eq!(row.region().height(), 0);
    assert_eq!(c.expansion_state(&1), ExpansionState::Expanding);

    tracker.complete();
    assert_eq!(c.expansion_state(&1), ExpansionState::Expanded);
    assert_eq!(c.prune_transitions(), 1);
}

#[test]
fn toggle_on_unbound_region_is_ignored() {
    let mut c = controller(1);
    let region = FakeRegion::default();
    assert_eq!(c.toggle(&region), None);
    assert_eq!(c.expanded_len(), 0);
}

#[test]
fn forgetting_rows_drops_their_state() {
    let mut c = controller(2);
    let mut rows: Vec<Row> = (0..3).map(|_| Row::new(10)).collect();
    for (i, row) in rows.iter_mut().enumerate() {
        bind(&mut c, row, i, i as u64);
    }
    c.toggle(&rows[0].region());
    c.toggle(&rows[1].region());

    c.forget_row(&0);
    assert_eq!(expanded(&c), vec![1]);
    assert!(c.cached_region(&0).is_none());

    c.retain_rows(|k| *k != 1);
    assert_eq!(c.expanded_len(), 0);
    assert_eq!(c.expansion_state(&1), ExpansionState::Collapsed);
}

proptest! {
    #[test]
    fn expanded_set_respects_limit_and_evicts_oldest(
        toggles in prop::collection::vec(0usize..8, 1..64),
        limit in 0usize..4,
    ) {
        let mut c = controller(limit);
        let mut rows: Vec<Row> = (0..8).map(|_| Row::new(10)).collect();
        for (i, row) in rows.iter_mut().enumerate() {
            bind(&mut c, row, i, i as u64);
        }

        let mut model: VecDeque<u64> = VecDeque::new();
        for i in toggles {
            let key = i as u64;
            if let Some(at) = model.iter().position(|k| *k == key) {
                model.remove(at);
            } else {
                if limit > 0 && model.len() >= limit {
                    model.pop_front();
                }
                model.push_back(key);
            }

            c.toggle(&rows[i].region());
            c.end_transitions();

            prop_assert_eq!(expanded(&c), model.iter().copied().collect::<Vec<_>>());
            if limit > 0 {
                prop_assert!(c.expanded_len() <= limit);
            }
            for (j, row) in rows.iter().enumerate() {
                prop_assert_eq!(row.region().is_visible(), model.contains(&(j as u64)));
            }
        }
    }
}
