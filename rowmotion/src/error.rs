/// Errors surfaced by the fallible entry points.
///
/// Stale references (recycled views, already-ended handles) are not errors and never show up
/// here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no host list configured: call set_host() on the AnimationScheduler before rendering")]
    HostNotConfigured,
}
