use alloc::rc::Rc;
use alloc::sync::Arc;

/// Identity comparison for sub-views.
///
/// A content callback that hands back the same instance it was given signals "no rebuild
/// needed"; anything else is treated as a new view.
pub trait SameView {
    fn same_view(&self, other: &Self) -> bool;
}

impl<T: ?Sized> SameView for Rc<T> {
    fn same_view(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> SameView for Arc<T> {
    fn same_view(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// A container that shows exactly one child view.
pub trait ViewParent<V> {
    /// Removes every child and attaches `child`.
    fn replace_child(&self, child: &V);
}

/// Per-element record of a row's title/content sub-views and their containers.
///
/// The host keeps one holder alongside each pooled element and passes it back on every bind,
/// so the controller can tell "already shows the right view" from "needs rebuild".
#[derive(Clone, Debug)]
pub struct HolderBinding<V, T, C> {
    title_parent: T,
    title_view: Option<V>,
    content_parent: C,
    content_view: Option<V>,
}

impl<V: SameView, T: ViewParent<V>, C: ViewParent<V>> HolderBinding<V, T, C> {
    pub fn new(title_parent: T, content_parent: C) -> Self {
        Self {
            title_parent,
            title_view: None,
            content_parent,
            content_view: None,
        }
    }

    pub fn title_parent(&self) -> &T {
        &self.title_parent
    }

    /// The content container; this is the region that expands and collapses.
    pub fn content_region(&self) -> &C {
        &self.content_parent
    }

    pub fn title_view(&self) -> Option<&V> {
        self.title_view.as_ref()
    }

    pub fn content_view(&self) -> Option<&V> {
        self.content_view.as_ref()
    }

    /// Stores `view` as the title, re-parenting it if it differs from the held one.
    ///
    /// Returns `true` when the title container had to be rebuilt.
    pub fn bind_title(&mut self, view: V) -> bool {
        let rebuilt = !is_same(self.title_view.as_ref(), &view);
        if rebuilt {
            self.title_parent.replace_child(&view);
        }
        self.title_view = Some(view);
        rebuilt
    }

    /// Stores `view` as the content, re-parenting it if it differs from the held one.
    ///
    /// Returns `true` when the content container had to be rebuilt.
    pub fn bind_content(&mut self, view: V) -> bool {
        let rebuilt = !is_same(self.content_view.as_ref(), &view);
        if rebuilt {
            self.content_parent.replace_child(&view);
        }
        self.content_view = Some(view);
        rebuilt
    }
}

fn is_same<V: SameView>(held: Option<&V>, view: &V) -> bool {
    held.is_some_and(|h| h.same_view(view))
}
