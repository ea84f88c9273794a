use alloc::rc::Rc;
use alloc::sync::Arc;
use core::cell::Cell;

use crate::VisibleWindow;

/// The host list view, as far as the scheduler is concerned.
///
/// Positions are the host's render slots (both ends inclusive).
pub trait HostViewport {
    fn first_visible_position(&self) -> usize;
    fn last_visible_position(&self) -> usize;

    fn visible_window(&self) -> VisibleWindow {
        VisibleWindow::new(self.first_visible_position(), self.last_visible_position())
    }
}

impl HostViewport for VisibleWindow {
    fn first_visible_position(&self) -> usize {
        self.first
    }

    fn last_visible_position(&self) -> usize {
        self.last
    }
}

impl HostViewport for Cell<VisibleWindow> {
    fn first_visible_position(&self) -> usize {
        self.get().first
    }

    fn last_visible_position(&self) -> usize {
        self.get().last
    }
}

impl<T: HostViewport + ?Sized> HostViewport for &T {
    fn first_visible_position(&self) -> usize {
        (**self).first_visible_position()
    }

    fn last_visible_position(&self) -> usize {
        (**self).last_visible_position()
    }
}

impl<T: HostViewport + ?Sized> HostViewport for Rc<T> {
    fn first_visible_position(&self) -> usize {
        (**self).first_visible_position()
    }

    fn last_visible_position(&self) -> usize {
        (**self).last_visible_position()
    }
}

impl<T: HostViewport + ?Sized> HostViewport for Arc<T> {
    fn first_visible_position(&self) -> usize {
        (**self).first_visible_position()
    }

    fn last_visible_position(&self) -> usize {
        (**self).last_visible_position()
    }
}
