//! Recycling-safe row animations for virtualized lists.
//!
//! A list view recycles its visual elements by scroll position, not by row identity. Any state
//! attached to "this row" has to follow the row as elements are reused, otherwise animations end
//! up on the wrong row. This crate provides two UI-agnostic components that do that bookkeeping:
//!
//! - [`AnimationScheduler`]: per-position entrance animations. Each position animates at most
//!   once per activation, delays are staggered while the first screen fills, and the animation
//!   of a reused element is ended before the element is bound again.
//! - [`ExpandCollapseController`]: rows that grow/shrink in place, keyed by a stable row id,
//!   with an optional limit on simultaneously expanded rows (the oldest is collapsed first).
//!
//! A host toolkit is expected to provide:
//! - the recycling pool and content callbacks ([`AnimatedItems`], [`RowContent`])
//! - the visible window of the list ([`HostViewport`])
//! - animation handles ([`AnimationHandle`]) and height transitions ([`HeightTransitions`])
//!
//! Everything runs on the render thread; time is passed in by the caller (`now_ms`).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod element;
mod error;
mod expand;
mod handle;
mod holder;
mod host;
mod key;
mod options;
mod registry;
mod scheduler;
mod types;

#[cfg(test)]
mod tests;

pub use element::{AnimatedItems, VisualElement};
pub use error::Error;
pub use expand::{
    ContentRegion, ExpandCollapseController, HeightTransitions, InvalidateCallback,
    OnToggleCallback, RowContent, RowHolder,
};
pub use handle::{AnimationHandle, AnimationSet, FinishCallback};
pub use holder::{HolderBinding, SameView, ViewParent};
pub use host::HostViewport;
pub use key::RowKey;
pub use options::{AnimationOptions, DEFAULT_INITIAL_DELAY_MS, ExpandOptions};
pub use registry::AnimationRegistry;
pub use scheduler::AnimationScheduler;
pub use types::{
    AnimationState, BindOutcome, ElementTag, ExpansionState, RegionHeight, VisibleWindow,
};
