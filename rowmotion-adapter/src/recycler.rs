use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rowmotion::{AnimatedItems, AnimationOptions, AnimationScheduler, HostViewport, VisibleWindow};

use crate::Timeline;

/// A fixed-row-height list host that recycles elements by scroll position.
///
/// Elements that scroll out of the viewport go to a scrap pool and are handed back to the
/// scheduler for the next position that scrolls in, exactly like a toolkit list view would.
/// The visible window is shared with the scheduler through a `Cell`.
///
/// Entrance delays are computed against the `now_ms` passed to [`Recycler::layout`], while a
/// [`Timeline`] starts tweens from its own clock. Attach the timeline with
/// [`Recycler::with_timeline`] so both agree, or tick it to `now_ms` before every layout.
pub struct Recycler<P>
where
    P: AnimatedItems,
    P::Parent: Sized,
{
    scheduler: AnimationScheduler<P, Rc<Cell<VisibleWindow>>>,
    window: Rc<Cell<VisibleWindow>>,
    parent: P::Parent,
    count: usize,
    row_height: u32,
    viewport_height: u32,
    scroll_offset: u64,
    attached: BTreeMap<usize, P::Element>,
    scrap: Vec<P::Element>,
    timeline: Option<Timeline>,
}

impl<P> Recycler<P>
where
    P: AnimatedItems,
    P::Parent: Sized,
{
    pub fn new(
        items: P,
        parent: P::Parent,
        count: usize,
        row_height: u32,
        viewport_height: u32,
    ) -> Self {
        Self::with_options(
            items,
            parent,
            count,
            row_height,
            viewport_height,
            AnimationOptions::default(),
        )
    }

    pub fn with_options(
        items: P,
        parent: P::Parent,
        count: usize,
        row_height: u32,
        viewport_height: u32,
        options: AnimationOptions,
    ) -> Self {
        let window = Rc::new(Cell::new(VisibleWindow::default()));
        let mut scheduler = AnimationScheduler::with_options(items, options);
        scheduler.set_host(Rc::clone(&window));
        Self {
            scheduler,
            window,
            parent,
            count,
            row_height: row_height.max(1),
            viewport_height,
            scroll_offset: 0,
            attached: BTreeMap::new(),
            scrap: Vec::new(),
            timeline: None,
        }
    }

    /// Syncs `timeline`'s clock to the frame time before every bind pass.
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub fn scheduler(&self) -> &AnimationScheduler<P, Rc<Cell<VisibleWindow>>> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut AnimationScheduler<P, Rc<Cell<VisibleWindow>>> {
        &mut self.scheduler
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn max_scroll_offset(&self) -> u64 {
        let total = self.count as u64 * self.row_height as u64;
        total.saturating_sub(self.viewport_height as u64)
    }

    /// Visible positions (both ends inclusive), `None` when nothing is visible.
    pub fn visible_range(&self) -> Option<(usize, usize)> {
        if self.count == 0 || self.viewport_height == 0 {
            return None;
        }
        let rh = self.row_height as u64;
        let last_index = self.count - 1;
        let first = ((self.scroll_offset / rh) as usize).min(last_index);
        let end = self
            .scroll_offset
            .saturating_add(self.viewport_height as u64 - 1);
        let last = ((end / rh) as usize).min(last_index);
        Some((first, last))
    }

    pub fn element_at(&self, position: usize) -> Option<&P::Element> {
        self.attached.get(&position)
    }

    /// Attached elements in position order.
    pub fn attached(&self) -> impl Iterator<Item = (usize, &P::Element)> + '_ {
        self.attached.iter().map(|(p, e)| (*p, e))
    }

    pub fn scrap_len(&self) -> usize {
        self.scrap.len()
    }

    /// Scrolls to `offset` (clamped) and binds whatever scrolled in.
    ///
    /// Returns the number of binds performed.
    pub fn scroll_to(&mut self, offset: u64, now_ms: u64) -> usize {
        self.scroll_offset = offset.min(self.max_scroll_offset());
        self.layout(now_ms)
    }

    pub fn scroll_by(&mut self, delta: i64, now_ms: u64) -> usize {
        let target = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_to(target, now_ms)
    }

    /// Detaches rows that left the viewport and binds rows that entered it.
    pub fn layout(&mut self, now_ms: u64) -> usize {
        self.sync_clock(now_ms);
        let Some((first, last)) = self.visible_range() else {
            self.scrap.extend(core::mem::take(&mut self.attached).into_values());
            return 0;
        };
        self.window.set(VisibleWindow::new(first, last));

        let gone: Vec<usize> = self
            .attached
            .keys()
            .copied()
            .filter(|p| !(first..=last).contains(p))
            .collect();
        for position in gone {
            if let Some(element) = self.attached.remove(&position) {
                self.scrap.push(element);
            }
        }

        let mut bound = 0;
        for position in first..=last {
            if self.attached.contains_key(&position) {
                continue;
            }
            let reusable = self.scrap.pop();
            let element = self
                .scheduler
                .request_element(position, reusable, &self.parent, now_ms);
            self.attached.insert(position, element);
            bound += 1;
        }
        adebug!(first, last, bound, scrap = self.scrap.len(), "Recycler::layout");
        bound
    }

    /// Re-binds every visible row in place, as a toolkit does after its data changed.
    pub fn notify_data_set_changed(&mut self, count: usize, now_ms: u64) -> usize {
        self.sync_clock(now_ms);
        self.count = count;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        let mut previous = core::mem::take(&mut self.attached);

        let Some((first, last)) = self.visible_range() else {
            self.scrap.extend(previous.into_values());
            return 0;
        };
        self.window.set(VisibleWindow::new(first, last));

        for position in first..=last {
            let reusable = previous.remove(&position).or_else(|| self.scrap.pop());
            let element = self
                .scheduler
                .request_element(position, reusable, &self.parent, now_ms);
            self.attached.insert(position, element);
        }
        self.scrap.extend(previous.into_values());
        last - first + 1
    }

    fn sync_clock(&self, now_ms: u64) {
        if let Some(timeline) = &self.timeline {
            timeline.sync_clock(now_ms);
        }
    }
}

impl<P> HostViewport for Recycler<P>
where
    P: AnimatedItems,
    P::Parent: Sized,
{
    fn first_visible_position(&self) -> usize {
        self.window.get().first
    }

    fn last_visible_position(&self) -> usize {
        self.window.get().last
    }
}

impl<P> core::fmt::Debug for Recycler<P>
where
    P: AnimatedItems,
    P::Parent: Sized,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Recycler")
            .field("count", &self.count)
            .field("row_height", &self.row_height)
            .field("viewport_height", &self.viewport_height)
            .field("scroll_offset", &self.scroll_offset)
            .field("attached", &self.attached.len())
            .field("scrap", &self.scrap.len())
            .field("timeline", &self.timeline)
            .finish_non_exhaustive()
    }
}
