/// Default delay before the first entrance animation of an activation.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 150;

/// Configuration for [`crate::AnimationScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationOptions {
    /// When `false`, elements are bound and tagged but never animated.
    pub enabled: bool,
    /// Added once to the staggered delay, measured from the first animation.
    pub initial_delay_ms: u64,
    /// Positions below this never animate.
    pub animate_from_position: Option<usize>,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            animate_from_position: None,
        }
    }
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_initial_delay_ms(mut self, initial_delay_ms: u64) -> Self {
        self.initial_delay_ms = initial_delay_ms;
        self
    }

    pub fn with_animate_from_position(mut self, position: Option<usize>) -> Self {
        self.animate_from_position = position;
        self
    }
}

/// Configuration for [`crate::ExpandCollapseController`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpandOptions {
    /// Maximum number of simultaneously expanded rows. `0` means unbounded.
    pub max_expanded: usize,
}

impl ExpandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_expanded(mut self, max_expanded: usize) -> Self {
        self.max_expanded = max_expanded;
        self
    }
}
