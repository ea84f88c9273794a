use alloc::vec::Vec;

use crate::{AnimationHandle, ElementTag};

/// A renderable unit handed out by the host's recycling pool.
///
/// Elements are usually cheap shared handles (an id, an `Rc`, ...). The scheduler stores the
/// last-bound position on the element through its tag.
pub trait VisualElement {
    fn tag(&self) -> Option<ElementTag>;
    fn set_tag(&mut self, tag: ElementTag);
    fn set_opacity(&mut self, opacity: f32);
}

/// Content provider and animation factory for an [`crate::AnimationScheduler`].
pub trait AnimatedItems {
    type Element: VisualElement;
    type Parent: ?Sized;
    type Animation: AnimationHandle;

    /// Returns a bound element for `position`, reusing `reusable` when possible.
    fn item_element(
        &mut self,
        position: usize,
        reusable: Option<Self::Element>,
        parent: &Self::Parent,
    ) -> Self::Element;

    /// Extra animations played together with the implicit fade-in.
    fn animators(&mut self, parent: &Self::Parent, element: &Self::Element)
    -> Vec<Self::Animation>;

    /// The implicit opacity `0 -> 1` animation for `element`.
    fn fade_in(&mut self, element: &Self::Element) -> Self::Animation;

    /// Stagger between consecutive entrance animations.
    fn animation_delay_ms(&self) -> u64;
}
