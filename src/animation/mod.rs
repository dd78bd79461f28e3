//! Animation primitives: the show/hide status machine, easing curves and the
//! tween scheduler that drives them.

pub mod easing;
pub mod status;
pub mod tween;

pub use easing::Easing;
pub use status::{AnimationPhase, AnimationStatus, StatusError, Visibility};
pub use tween::{
    Scheduled, TweenEvent, TweenEventKind, TweenId, TweenScheduler, TweenSpec, TweenTarget,
    Tweener,
};
