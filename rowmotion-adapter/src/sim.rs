//! In-memory stand-ins for toolkit objects.
//!
//! Every type here is a cheap shared handle (`Rc<RefCell<..>>`), the same shape real toolkit
//! bindings tend to have, so they can be captured by animation callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use rowmotion::{
    AnimatedItems, ContentRegion, ElementTag, HeightTransitions, HolderBinding, RegionHeight,
    RowContent, ViewParent, VisualElement,
};

use crate::{Easing, Timeline, TweenAnimation};

/// A leaf view. Identity is the `Rc` allocation.
pub type SimView = Rc<str>;

#[derive(Debug, Default)]
struct ElementState {
    id: usize,
    tag: Option<ElementTag>,
    opacity: f32,
    translation_y: f32,
    text: String,
}

/// A pooled row element.
#[derive(Clone, Debug, Default)]
pub struct SimElement(Rc<RefCell<ElementState>>);

impl SimElement {
    pub fn new(id: usize) -> Self {
        Self(Rc::new(RefCell::new(ElementState {
            id,
            opacity: 1.0,
            ..ElementState::default()
        })))
    }

    pub fn id(&self) -> usize {
        self.0.borrow().id
    }

    pub fn opacity(&self) -> f32 {
        self.0.borrow().opacity
    }

    pub fn translation_y(&self) -> f32 {
        self.0.borrow().translation_y
    }

    pub fn set_translation_y(&self, y: f32) {
        self.0.borrow_mut().translation_y = y;
    }

    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.0.borrow_mut().text = text.into();
    }
}

impl VisualElement for SimElement {
    fn tag(&self) -> Option<ElementTag> {
        self.0.borrow().tag
    }

    fn set_tag(&mut self, tag: ElementTag) {
        self.0.borrow_mut().tag = Some(tag);
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.0.borrow_mut().opacity = opacity;
    }
}

/// Entrance animations for a plain list of text rows: a slide up plus the fade-in.
#[derive(Debug)]
pub struct SimItems {
    timeline: Timeline,
    rows: Vec<String>,
    next_id: usize,
    delay_ms: u64,
    duration_ms: u64,
    slide_px: f32,
}

impl SimItems {
    pub fn new(timeline: Timeline, rows: Vec<String>) -> Self {
        Self {
            timeline,
            rows,
            next_id: 0,
            delay_ms: 100,
            duration_ms: 300,
            slide_px: 0.0,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Adds a `translation_y` animation from `slide_px` to zero.
    pub fn with_slide_px(mut self, slide_px: f32) -> Self {
        self.slide_px = slide_px;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of elements built so far (reuse does not count).
    pub fn created(&self) -> usize {
        self.next_id
    }
}

impl AnimatedItems for SimItems {
    type Element = SimElement;
    type Parent = ();
    type Animation = TweenAnimation;

    fn item_element(
        &mut self,
        position: usize,
        reusable: Option<SimElement>,
        _parent: &(),
    ) -> SimElement {
        let element = reusable.unwrap_or_else(|| {
            self.next_id += 1;
            SimElement::new(self.next_id)
        });
        element.set_text(self.rows.get(position).cloned().unwrap_or_default());
        element
    }

    fn animators(&mut self, _parent: &(), element: &SimElement) -> Vec<TweenAnimation> {
        if self.slide_px == 0.0 {
            return Vec::new();
        }
        let target = element.clone();
        vec![self.timeline.animate(
            self.slide_px,
            0.0,
            self.duration_ms,
            Easing::EaseOutCubic,
            move |y| target.set_translation_y(y),
        )]
    }

    fn fade_in(&mut self, element: &SimElement) -> TweenAnimation {
        let mut target = element.clone();
        self.timeline.animate(
            0.0,
            1.0,
            self.duration_ms,
            Easing::Linear,
            move |a| target.set_opacity(a),
        )
    }

    fn animation_delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

/// A container holding a single child view.
#[derive(Clone, Debug, Default)]
pub struct SimParent(Rc<RefCell<Option<SimView>>>);

impl SimParent {
    pub fn child(&self) -> Option<SimView> {
        self.0.borrow().clone()
    }
}

impl ViewParent<SimView> for SimParent {
    fn replace_child(&self, child: &SimView) {
        *self.0.borrow_mut() = Some(Rc::clone(child));
    }
}

#[derive(Debug)]
struct RegionState {
    visible: bool,
    key: Option<u64>,
    height: u32,
    requested: RegionHeight,
    line_height: u32,
    child: Option<SimView>,
}

/// A collapsible content container. Its natural height is one `line_height` per text line.
#[derive(Clone, Debug)]
pub struct SimRegion(Rc<RefCell<RegionState>>);

impl SimRegion {
    pub fn new(line_height: u32) -> Self {
        Self(Rc::new(RefCell::new(RegionState {
            visible: false,
            key: None,
            height: 0,
            requested: RegionHeight::WrapContent,
            line_height,
            child: None,
        })))
    }

    pub fn child(&self) -> Option<SimView> {
        self.0.borrow().child.clone()
    }

    pub fn requested_height(&self) -> RegionHeight {
        self.0.borrow().requested
    }

    fn natural_height(state: &RegionState) -> u32 {
        let lines = state.child.as_ref().map_or(0, |c| c.lines().count()) as u32;
        lines.saturating_mul(state.line_height)
    }
}

impl ContentRegion<u64> for SimRegion {
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
        let state = self.0.borrow();
        if state.visible { state.height } else { 0 }
    }

    fn measure_unconstrained(&self) -> u32 {
        Self::natural_height(&self.0.borrow())
    }

    fn set_height(&self, height: RegionHeight) {
        let mut state = self.0.borrow_mut();
        state.requested = height;
        state.height = match height {
            RegionHeight::WrapContent => Self::natural_height(&state),
            RegionHeight::Fixed(h) => h,
        };
    }

    fn same_region(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ViewParent<SimView> for SimRegion {
    fn replace_child(&self, child: &SimView) {
        self.0.borrow_mut().child = Some(Rc::clone(child));
    }
}

/// The holder the simulated host keeps next to each expandable row element.
pub type SimHolder = HolderBinding<SimView, SimParent, SimRegion>;

pub fn sim_holder(line_height: u32) -> SimHolder {
    HolderBinding::new(SimParent::default(), SimRegion::new(line_height))
}

/// A database-style row: a stable id, a title and a multi-line body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Renders [`Record`]s. The title is rebuilt on every bind; the body view is reused when its
/// text did not change.
#[derive(Debug, Default)]
pub struct RecordContent {
    titles_built: usize,
    bodies_built: usize,
}

impl RecordContent {
    pub fn titles_built(&self) -> usize {
        self.titles_built
    }

    pub fn bodies_built(&self) -> usize {
        self.bodies_built
    }
}

impl RowContent for RecordContent {
    type Key = u64;
    type Row = Record;
    type View = SimView;
    type TitleParent = SimParent;
    type Region = SimRegion;

    fn render_title(
        &mut self,
        _convert: Option<&SimView>,
        _parent: &SimParent,
        row: &Record,
    ) -> SimView {
        self.titles_built += 1;
        Rc::from(row.title.as_str())
    }

    fn render_content(
        &mut self,
        convert: Option<&SimView>,
        _parent: &SimRegion,
        row: &Record,
    ) -> SimView {
        match convert {
            Some(view) if **view == *row.body => Rc::clone(view),
            _ => {
                self.bodies_built += 1;
                Rc::from(row.body.as_str())
            }
        }
    }
}

/// Height transitions driven by a [`Timeline`].
#[derive(Clone, Debug)]
pub struct TimelineTransitions {
    timeline: Timeline,
    duration_ms: u64,
    easing: Easing,
}

impl TimelineTransitions {
    pub fn new(timeline: Timeline, duration_ms: u64) -> Self {
        Self {
            timeline,
            duration_ms,
            easing: Easing::SmoothStep,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl HeightTransitions<SimRegion> for TimelineTransitions {
    type Animation = TweenAnimation;

    fn height_animation(&mut self, region: &SimRegion, from: u32, to: u32) -> TweenAnimation {
        let target = region.clone();
        self.timeline.animate(
            from as f32,
            to as f32,
            self.duration_ms,
            self.easing,
            move |h| target.set_height(RegionHeight::Fixed(h.round().max(0.0) as u32)),
        )
    }
}
