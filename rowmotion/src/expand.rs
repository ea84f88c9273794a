use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::key::KeyMap;
use crate::{
    AnimationHandle, BindOutcome, ExpandOptions, ExpansionState, HolderBinding, RegionHeight,
    RowKey, SameView, ViewParent,
};

/// The collapsible part of a row.
///
/// Regions are shared handles: collapse transitions keep a clone and hide the region when they
/// finish, long after the bind call returned. The row key stored on the region is the lookup
/// tag used to tell whether a cached region still represents the same row.
pub trait ContentRegion<K>: Clone + 'static {
    fn is_visible(&self) -> bool;
    fn set_visible(&self, visible: bool);
    fn row_key(&self) -> Option<K>;
    fn set_row_key(&self, key: K);
    /// Current laid-out height.
    fn height(&self) -> u32;
    /// Measures the region with unconstrained width and height and returns the height.
    fn measure_unconstrained(&self) -> u32;
    fn set_height(&self, height: RegionHeight);
    fn same_region(&self, other: &Self) -> bool;
}

/// Builds the title/content views of one row kind.
///
/// Returning the `convert` view itself means "already up to date, no rebuild".
pub trait RowContent {
    type Key: RowKey + 'static;
    type Row: ?Sized;
    type View: SameView;
    type TitleParent: ViewParent<Self::View>;
    type Region: ContentRegion<Self::Key> + ViewParent<Self::View>;

    fn render_title(
        &mut self,
        convert: Option<&Self::View>,
        parent: &Self::TitleParent,
        row: &Self::Row,
    ) -> Self::View;

    fn render_content(
        &mut self,
        convert: Option<&Self::View>,
        parent: &Self::Region,
        row: &Self::Row,
    ) -> Self::View;
}

/// Factory for height transitions on a content region.
///
/// The returned handle animates the region's height from `from` to `to`.
pub trait HeightTransitions<C> {
    type Animation: AnimationHandle;

    fn height_animation(&mut self, region: &C, from: u32, to: u32) -> Self::Animation;
}

/// The holder type used by a [`RowContent`] implementation.
pub type RowHolder<P> = HolderBinding<
    <P as RowContent>::View,
    <P as RowContent>::TitleParent,
    <P as RowContent>::Region,
>;

/// Fired after a toggle started its transition. The flag is the visibility before the toggle.
pub type OnToggleCallback<C> = Rc<dyn Fn(&C, bool)>;

/// Fired when every bound row has to be rendered again.
pub type InvalidateCallback = Rc<dyn Fn()>;

/// Tracks which rows are expanded and drives their height transitions.
///
/// State lives on logical row keys, not on pooled elements: the expanded set survives
/// scrolling, and a region is only ever touched while its row key still matches.
///
/// With a limit (`max_expanded > 0`) expanding one more row collapses the row that was
/// expanded first.
pub struct ExpandCollapseController<P: RowContent, T: HeightTransitions<P::Region>> {
    content: P,
    transitions: T,
    options: ExpandOptions,
    expanded: Vec<P::Key>,
    expanded_regions: KeyMap<P::Key, P::Region>,
    active: KeyMap<P::Key, T::Animation>,
    on_toggle: Option<OnToggleCallback<P::Region>>,
    on_invalidate: Option<InvalidateCallback>,
}

impl<P: RowContent, T: HeightTransitions<P::Region>> ExpandCollapseController<P, T> {
    pub fn new(content: P, transitions: T) -> Self {
        Self::with_options(content, transitions, ExpandOptions::default())
    }

    pub fn with_options(content: P, transitions: T, options: ExpandOptions) -> Self {
        Self {
            content,
            transitions,
            options,
            expanded: Vec::new(),
            expanded_regions: KeyMap::new(),
            active: KeyMap::new(),
            on_toggle: None,
            on_invalidate: None,
        }
    }

    pub fn content(&self) -> &P {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut P {
        &mut self.content
    }

    pub fn transitions(&self) -> &T {
        &self.transitions
    }

    pub fn transitions_mut(&mut self) -> &mut T {
        &mut self.transitions
    }

    pub fn limit(&self) -> usize {
        self.options.max_expanded
    }

    /// Called after every toggle with the region and its visibility before the toggle.
    pub fn set_on_toggle(&mut self, on_toggle: impl Fn(&P::Region, bool) + 'static) {
        self.on_toggle = Some(Rc::new(on_toggle));
    }

    pub fn clear_on_toggle(&mut self) {
        self.on_toggle = None;
    }

    /// Called whenever the host must re-render every row.
    pub fn set_on_invalidate(&mut self, on_invalidate: impl Fn() + 'static) {
        self.on_invalidate = Some(Rc::new(on_invalidate));
    }

    pub fn clear_on_invalidate(&mut self) {
        self.on_invalidate = None;
    }

    pub fn notify_data_set_changed(&self) {
        if let Some(cb) = &self.on_invalidate {
            cb();
        }
    }

    pub fn is_expanded(&self, key: &P::Key) -> bool {
        self.expanded.contains(key)
    }

    /// Expanded rows, oldest first.
    pub fn expanded_rows(&self) -> impl Iterator<Item = &P::Key> + '_ {
        self.expanded.iter()
    }

    pub fn expanded_len(&self) -> usize {
        self.expanded.len()
    }

    /// The region last known to show `key` while expanded. Only maintained with a limit.
    pub fn cached_region(&self, key: &P::Key) -> Option<&P::Region> {
        self.expanded_regions.get(key)
    }

    pub fn expansion_state(&self, key: &P::Key) -> ExpansionState {
        let running = self
            .active
            .get(key)
            .is_some_and(|a| a.state().is_running());
        match (self.is_expanded(key), running) {
            (true, true) => ExpansionState::Expanding,
            (true, false) => ExpansionState::Expanded,
            (false, true) => ExpansionState::Collapsing,
            (false, false) => ExpansionState::Collapsed,
        }
    }

    /// Binds row content into `holder` and applies the row's expansion state to its region.
    ///
    /// Title and content views are only re-parented when the content callbacks hand back a
    /// different view than the holder already shows.
    pub fn bind(
        &mut self,
        holder: &mut RowHolder<P>,
        position: usize,
        key: P::Key,
        row: &P::Row,
    ) -> BindOutcome {
        let region = holder.content_region().clone();
        let previous = region.row_key();
        rtrace!(position, key = ?key, previous = ?previous, "ExpandCollapseController::bind");
        let _ = position; // only logged
        if let Some(previous) = previous.filter(|p| *p != key) {
            self.end_transition(&previous);
        }

        let expanded = self.is_expanded(&key);
        if self.options.max_expanded > 0 {
            self.expanded_regions
                .retain(|k, r| *k == key || !r.same_region(&region));
            if expanded {
                self.expanded_regions.insert(key.clone(), region.clone());
            } else {
                self.expanded_regions.remove(&key);
            }
        }

        let title = self
            .content
            .render_title(holder.title_view(), holder.title_parent(), row);
        let title_rebuilt = holder.bind_title(title);

        let content = self
            .content
            .render_content(holder.content_view(), holder.content_region(), row);
        let content_rebuilt = holder.bind_content(content);

        region.set_visible(expanded);
        region.set_row_key(key);
        region.set_height(RegionHeight::WrapContent);

        BindOutcome {
            title_rebuilt,
            content_rebuilt,
            expanded,
        }
    }

    /// Toggles the row shown by `region` (the host's tap handler calls this).
    ///
    /// Returns whether the row is expanded afterwards, or `None` if the region was never bound.
    pub fn toggle(&mut self, region: &P::Region) -> Option<bool> {
        let Some(key) = region.row_key() else {
            rwarn!("ExpandCollapseController::toggle on a region without a row key");
            return None;
        };
        let was_visible = region.is_visible();
        rtrace!(key = ?key, was_visible, "ExpandCollapseController::toggle");

        if was_visible {
            self.collapse_region(region, key);
        } else {
            let limit = self.options.max_expanded;
            while limit > 0 && self.expanded.len() >= limit {
                self.evict_oldest();
            }
            self.expand_region(region, key);
        }

        if let Some(cb) = &self.on_toggle {
            cb(region, was_visible);
        }
        Some(!was_visible)
    }

    /// Replaces the limit and collapses every row logically.
    ///
    /// Open regions are not animated; the invalidate callback asks the host to re-render.
    pub fn set_limit(&mut self, max_expanded: usize) {
        rdebug!(
            max_expanded,
            expanded = self.expanded.len(),
            "ExpandCollapseController::set_limit"
        );
        self.options.max_expanded = max_expanded;
        self.expanded.clear();
        self.expanded_regions.clear();
        self.end_transitions();
        self.notify_data_set_changed();
    }

    /// Drops all state for a row removed from the data source.
    pub fn forget_row(&mut self, key: &P::Key) {
        self.end_transition(key);
        self.expanded.retain(|k| k != key);
        self.expanded_regions.remove(key);
    }

    /// Keeps only rows for which `keep` returns `true`.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&P::Key) -> bool) {
        let gone: Vec<P::Key> = self
            .expanded
            .iter()
            .chain(self.active.keys())
            .filter(|k| !keep(k))
            .cloned()
            .collect();
        for key in &gone {
            self.forget_row(key);
        }
    }

    /// Ends every running height transition.
    pub fn end_transitions(&mut self) {
        for (_, mut animation) in core::mem::take(&mut self.active) {
            animation.end();
        }
    }

    /// Drops transitions that already finished.
    pub fn prune_transitions(&mut self) -> usize {
        let before = self.active.len();
        self.active.retain(|_, a| !a.state().is_finished());
        before - self.active.len()
    }

    fn evict_oldest(&mut self) {
        if self.expanded.is_empty() {
            return;
        }
        let oldest = self.expanded.remove(0);
        let region = self.expanded_regions.remove(&oldest);
        rdebug!(
            key = ?oldest,
            live = region.is_some(),
            "ExpandCollapseController: evicting oldest expanded row"
        );
        let Some(region) = region else {
            return;
        };
        if region.row_key().as_ref() == Some(&oldest) && region.is_visible() {
            self.collapse_region(&region, oldest);
        }
    }

    fn expand_region(&mut self, region: &P::Region, key: P::Key) {
        self.end_transition(&key);

        region.set_visible(true);
        let target = region.measure_unconstrained();
        region.set_height(RegionHeight::Fixed(0));
        let animation = self.transitions.height_animation(region, 0, target);
        self.start_transition(key.clone(), animation);

        if !self.expanded.contains(&key) {
            self.expanded.push(key.clone());
        }
        if self.options.max_expanded > 0 {
            self.expanded_regions.insert(key, region.clone());
        }
    }

    fn collapse_region(&mut self, region: &P::Region, key: P::Key) {
        self.end_transition(&key);

        let from = region.height();
        let mut animation = self.transitions.height_animation(region, from, 0);
        let target = region.clone();
        let owner = key.clone();
        animation.on_finish(Box::new(move || {
            if target.row_key().as_ref() == Some(&owner) {
                target.set_visible(false);
            }
        }));
        self.start_transition(key.clone(), animation);

        self.expanded.retain(|k| *k != key);
        self.expanded_regions.remove(&key);
    }

    fn start_transition(&mut self, key: P::Key, mut animation: T::Animation) {
        animation.start(0);
        self.active.insert(key, animation);
    }

    fn end_transition(&mut self, key: &P::Key) {
        if let Some(mut animation) = self.active.remove(key) {
            animation.end();
        }
    }
}

impl<P: RowContent, T: HeightTransitions<P::Region>> core::fmt::Debug
    for ExpandCollapseController<P, T>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExpandCollapseController")
            .field("options", &self.options)
            .field("expanded", &self.expanded)
            .field("active_transitions", &self.active.len())
            .finish_non_exhaustive()
    }
}
