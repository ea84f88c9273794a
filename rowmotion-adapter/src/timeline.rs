use std::cell::RefCell;
use std::rc::Rc;

use rowmotion::{AnimationHandle, AnimationState, FinishCallback};
use slotmap::{SlotMap, new_key_type};

use crate::{Easing, Tween};

new_key_type! {
    /// Handle to an animation registered on a [`Timeline`].
    pub struct AnimationId;
}

/// Receives every sampled value of an animation.
pub type ApplyFn = Box<dyn FnMut(f32)>;

struct Entry {
    from: f32,
    to: f32,
    duration_ms: u64,
    easing: Easing,
    tween: Option<Tween>,
    state: AnimationState,
    apply: Option<ApplyFn>,
    finish: Vec<FinishCallback>,
}

struct Inner {
    now_ms: u64,
    entries: SlotMap<AnimationId, Entry>,
}

/// A single-threaded animation driver.
///
/// The adapter calls [`Timeline::tick`] once per frame; every running [`TweenAnimation`] samples
/// its tween and pushes the value into its apply callback. Entries live in a generational slot
/// map, so a dropped handle's slot can be reused without an older id reaching the new entry.
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<RefCell<Inner>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                now_ms: 0,
                entries: SlotMap::with_key(),
            })),
        }
    }

    /// Timestamp of the last tick; delays are measured from here.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Moves the clock forward to `now_ms` without sampling anything.
    ///
    /// Animations started afterwards measure their delay from `now_ms`. The clock never moves
    /// backwards.
    pub fn sync_clock(&self, now_ms: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.now_ms = inner.now_ms.max(now_ms);
    }

    /// Creates an idle animation from `from` to `to`.
    pub fn animate(
        &self,
        from: f32,
        to: f32,
        duration_ms: u64,
        easing: Easing,
        apply: impl FnMut(f32) + 'static,
    ) -> TweenAnimation {
        let id = self.inner.borrow_mut().entries.insert(Entry {
            from,
            to,
            duration_ms,
            easing,
            tween: None,
            state: AnimationState::Idle,
            apply: Some(Box::new(apply)),
            finish: Vec::new(),
        });
        TweenAnimation {
            inner: Rc::clone(&self.inner),
            id,
        }
    }

    /// Advances every running animation to `now_ms`.
    ///
    /// Returns the number of animations still running afterwards.
    pub fn tick(&self, now_ms: u64) -> usize {
        let due: Vec<(AnimationId, f32, bool)> = {
            let mut inner = self.inner.borrow_mut();
            inner.now_ms = now_ms;
            inner
                .entries
                .iter()
                .filter(|(_, e)| e.state.is_running())
                .filter_map(|(id, e)| {
                    let tween = e.tween?;
                    tween
                        .has_started(now_ms)
                        .then(|| (id, tween.sample(now_ms), tween.is_done(now_ms)))
                })
                .collect()
        };

        for (id, value, done) in due {
            apply_value(&self.inner, id, value);
            if done {
                finish(&self.inner, id);
            }
        }
        self.running()
    }

    pub fn running(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .values()
            .filter(|e| e.state.is_running())
            .count()
    }

    /// Number of live handles (in any state).
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timeline")
            .field("now_ms", &inner.now_ms)
            .field("entries", &inner.entries.len())
            .finish()
    }
}

/// Calls the apply callback without holding the timeline borrow, so callbacks may touch the
/// timeline themselves.
fn apply_value(inner: &Rc<RefCell<Inner>>, id: AnimationId, value: f32) {
    let apply = inner
        .borrow_mut()
        .entries
        .get_mut(id)
        .and_then(|e| e.apply.take());
    let Some(mut apply) = apply else {
        return;
    };
    apply(value);
    if let Some(e) = inner.borrow_mut().entries.get_mut(id) {
        e.apply = Some(apply);
    }
}

fn finish(inner: &Rc<RefCell<Inner>>, id: AnimationId) {
    let callbacks = {
        let mut inner = inner.borrow_mut();
        let Some(e) = inner.entries.get_mut(id) else {
            return;
        };
        if e.state.is_finished() {
            return;
        }
        e.state = AnimationState::Ended;
        core::mem::take(&mut e.finish)
    };
    atrace!(?id, callbacks = callbacks.len(), "Timeline: animation finished");
    for cb in callbacks {
        cb();
    }
}

/// An [`AnimationHandle`] backed by a [`Timeline`] entry.
///
/// Dropping the handle removes the entry from the timeline.
pub struct TweenAnimation {
    inner: Rc<RefCell<Inner>>,
    id: AnimationId,
}

impl TweenAnimation {
    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// The scheduled tween, once started.
    pub fn tween(&self) -> Option<Tween> {
        self.inner.borrow().entries.get(self.id).and_then(|e| e.tween)
    }
}

impl AnimationHandle for TweenAnimation {
    fn start(&mut self, delay_ms: u64) {
        let mut inner = self.inner.borrow_mut();
        let now_ms = inner.now_ms;
        let Some(e) = inner.entries.get_mut(self.id) else {
            return;
        };
        if e.state != AnimationState::Idle {
            return;
        }
        e.tween = Some(Tween::new(
            e.from,
            e.to,
            now_ms.saturating_add(delay_ms),
            e.duration_ms,
            e.easing,
        ));
        e.state = AnimationState::Running;
    }

    fn end(&mut self) {
        let to = {
            let inner = self.inner.borrow();
            match inner.entries.get(self.id) {
                Some(e) if !e.state.is_finished() => e.to,
                _ => return,
            }
        };
        apply_value(&self.inner, self.id, to);
        finish(&self.inner, self.id);
    }

    fn cancel(&mut self) {
        let mut inner = self.inner.borrow_mut();
        let Some(e) = inner.entries.get_mut(self.id) else {
            return;
        };
        if e.state.is_finished() {
            return;
        }
        e.state = AnimationState::Cancelled;
        e.finish.clear();
    }

    fn state(&self) -> AnimationState {
        self.inner
            .borrow()
            .entries
            .get(self.id)
            .map_or(AnimationState::Ended, |e| e.state)
    }

    fn on_finish(&mut self, callback: FinishCallback) {
        let ended = {
            let mut inner = self.inner.borrow_mut();
            match inner.entries.get_mut(self.id) {
                Some(e) if e.state == AnimationState::Ended => true,
                Some(e) if e.state == AnimationState::Cancelled => return,
                Some(e) => {
                    e.finish.push(callback);
                    return;
                }
                None => true,
            }
        };
        if ended {
            callback();
        }
    }
}

impl Drop for TweenAnimation {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.entries.remove(self.id);
        }
    }
}

impl core::fmt::Debug for TweenAnimation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TweenAnimation")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
