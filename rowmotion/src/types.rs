/// The bookkeeping tag attached to a visual element on every bind.
///
/// `position` is the slot the element was last bound to. `generation` is a per-scheduler bind
/// serial: a registry entry is only ever ended through a tag whose generation matches, so a
/// stale tag can never end an animation that belongs to a different element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementTag {
    pub position: usize,
    pub generation: u64,
}

/// A snapshot of the host list's visible window (both ends inclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub first: usize,
    pub last: usize,
}

impl VisibleWindow {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// `last - first`, saturating to zero for an inverted window.
    pub fn span(&self) -> usize {
        self.last.saturating_sub(self.first)
    }

    pub fn contains(&self, position: usize) -> bool {
        (self.first..=self.last).contains(&position)
    }
}

/// Lifecycle of an [`crate::AnimationHandle`].
///
/// `Idle -> Running -> (Ended | Cancelled)`. Both terminal states are final.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
    Ended,
    Cancelled,
}

impl AnimationState {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Per-row expand/collapse state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpansionState {
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
}

impl ExpansionState {
    /// `true` for `Expanding` and `Expanded`.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Expanding | Self::Expanded)
    }
}

/// Layout height request for a content region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegionHeight {
    /// Size to content.
    #[default]
    WrapContent,
    Fixed(u32),
}

/// What [`crate::ExpandCollapseController::bind`] had to rebuild.
///
/// Hosts typically (re)wire their tap handler only when `title_rebuilt` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindOutcome {
    pub title_rebuilt: bool,
    pub content_rebuilt: bool,
    pub expanded: bool,
}
