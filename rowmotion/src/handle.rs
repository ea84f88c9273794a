use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::AnimationState;

/// Callback fired once when an animation reaches its end.
pub type FinishCallback = Box<dyn FnOnce()>;

/// An opaque, time-based visual transition owned by the caller.
///
/// Interpolation and ticking live behind this trait; the core only drives the lifecycle.
///
/// Contract:
/// - `start` is a no-op unless the handle is `Idle`.
/// - `end` jumps to the final value and fires the finish callback.
/// - `cancel` stops in place and does not fire the finish callback.
/// - Once `Ended` or `Cancelled`, `end` and `cancel` are no-ops.
pub trait AnimationHandle {
    fn start(&mut self, delay_ms: u64);
    fn end(&mut self);
    fn cancel(&mut self);
    fn state(&self) -> AnimationState;
    fn on_finish(&mut self, callback: FinishCallback);
}

impl<A: AnimationHandle + ?Sized> AnimationHandle for Box<A> {
    fn start(&mut self, delay_ms: u64) {
        (**self).start(delay_ms);
    }

    fn end(&mut self) {
        (**self).end();
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }

    fn state(&self) -> AnimationState {
        (**self).state()
    }

    fn on_finish(&mut self, callback: FinishCallback) {
        (**self).on_finish(callback);
    }
}

/// A group of handles played together with a shared start delay.
///
/// The set finishes when every member has ended; cancelling the set cancels every member.
pub struct AnimationSet<A> {
    members: Vec<A>,
    state: AnimationState,
    pending_finish: Option<FinishCallback>,
}

impl<A: AnimationHandle> AnimationSet<A> {
    pub fn new(members: Vec<A>) -> Self {
        Self {
            members,
            state: AnimationState::Idle,
            pending_finish: None,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[A] {
        &self.members
    }

    fn fire_pending(&mut self) {
        if let Some(cb) = self.pending_finish.take() {
            cb();
        }
    }
}

impl<A: AnimationHandle> FromIterator<A> for AnimationSet<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<A: AnimationHandle> AnimationHandle for AnimationSet<A> {
    fn start(&mut self, delay_ms: u64) {
        if self.state != AnimationState::Idle {
            return;
        }
        if self.members.is_empty() {
            self.state = AnimationState::Ended;
            self.fire_pending();
            return;
        }
        self.state = AnimationState::Running;
        for m in &mut self.members {
            m.start(delay_ms);
        }
    }

    fn end(&mut self) {
        if self.state.is_finished() {
            return;
        }
        self.state = AnimationState::Ended;
        for m in &mut self.members {
            m.end();
        }
        self.fire_pending();
    }

    fn cancel(&mut self) {
        if self.state.is_finished() {
            return;
        }
        self.state = AnimationState::Cancelled;
        self.pending_finish = None;
        for m in &mut self.members {
            m.cancel();
        }
    }

    fn state(&self) -> AnimationState {
        if self.state != AnimationState::Running {
            return self.state;
        }
        if !self.members.iter().all(|m| m.state().is_finished()) {
            return AnimationState::Running;
        }
        if self
            .members
            .iter()
            .all(|m| m.state() == AnimationState::Ended)
        {
            AnimationState::Ended
        } else {
            AnimationState::Cancelled
        }
    }

    fn on_finish(&mut self, callback: FinishCallback) {
        if self.members.is_empty() {
            self.pending_finish = Some(callback);
            return;
        }

        let shared = Rc::new(RefCell::new(Some(callback)));
        let remaining = Rc::new(Cell::new(self.members.len()));
        for m in &mut self.members {
            let shared = Rc::clone(&shared);
            let remaining = Rc::clone(&remaining);
            m.on_finish(Box::new(move || {
                let left = remaining.get().saturating_sub(1);
                remaining.set(left);
                if left == 0 {
                    let cb = shared.borrow_mut().take();
                    if let Some(cb) = cb {
                        cb();
                    }
                }
            }));
        }
    }
}

impl<A> core::fmt::Debug for AnimationSet<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimationSet")
            .field("members", &self.members.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
