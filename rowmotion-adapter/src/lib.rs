//! Reference collaborators for the `rowmotion` crate.
//!
//! `rowmotion` only drives lifecycles; it never interpolates values or owns a list view. This
//! crate fills those gaps with small, framework-neutral pieces:
//!
//! - [`Timeline`] / [`TweenAnimation`]: tween-backed animation handles, ticked by the adapter
//! - [`sim`]: in-memory elements, views and content regions implementing the core traits
//! - [`Recycler`]: a fixed-row-height list host that recycles elements by scroll position
//!
//! They are enough to run the full flow (scroll, recycle, animate, tap, expand, evict) without a
//! UI toolkit, and double as a template for real bindings.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod recycler;
pub mod sim;
mod timeline;
mod tween;


pub use recycler::Recycler;
pub use timeline::{AnimationId, ApplyFn, Timeline, TweenAnimation};
pub use tween::{Easing, Tween};
