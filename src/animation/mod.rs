//! Easing curves, per-type interpolation and keyframe tracks.
//!
//! Only types implementing [`Animator`] can be animated, so an unsupported property type is a
//! compile error rather than a silently frozen value.

pub mod animator;
pub mod ease;
pub mod keyframes;

pub use animator::Animator;
pub use ease::{Ease, Spline};
pub use keyframes::{Animated, Clock, Keyframe, KeyframeTrack};
