//! Time-driven tween scheduling.
//!
//! A tween is a task with an id: it waits out its delay, starts, reports eased
//! progress on every frame and either completes or is cancelled. Cancellation
//! comes from [`TweenScheduler::remove_tweens`] (silent) or from a newer tween
//! on the same target whose time interval overlaps it (reported as
//! overwritten).

use std::time::Duration;

use super::easing::Easing;

/// Animated property of the dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenTarget {
    /// Horizontal position of the dock element.
    DockPosition,
    /// Opacity of the opaque backing behind the dock.
    BackgroundOpacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl TweenSpec {
    pub fn new(duration: Duration, delay: Duration) -> Self {
        Self {
            duration,
            delay,
            easing: Easing::EaseOutQuad,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Result of [`TweenScheduler::add_tween`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    pub id: TweenId,
    /// Tweens on the same target cancelled by this one, oldest first.
    pub overwritten: Vec<TweenId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEventKind {
    Started,
    /// Eased progress in `0..1`.
    Updated(f64),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenEvent {
    pub id: TweenId,
    pub target: TweenTarget,
    pub kind: TweenEventKind,
}

/// The animation engine the dock drives.
pub trait TweenScheduler {
    /// Current position on the scheduler's timeline.
    fn now(&self) -> Duration;

    /// Schedule a tween starting `spec.delay` after [`now`](Self::now).
    fn add_tween(&mut self, target: TweenTarget, spec: TweenSpec) -> Scheduled;

    /// Cancel every tween on `target` without reporting events. Returns how
    /// many were dropped.
    fn remove_tweens(&mut self, target: TweenTarget) -> usize;

    fn is_animating(&self, target: TweenTarget) -> bool;

    /// Move the timeline to `now` and report what happened, in scheduling
    /// order.
    fn advance(&mut self, now: Duration) -> Vec<TweenEvent>;
}

#[derive(Debug, Clone)]
struct Tween {
    id: TweenId,
    target: TweenTarget,
    easing: Easing,
    start_at: Duration,
    end_at: Duration,
    started: bool,
}

impl Tween {
    fn overlaps(&self, start_at: Duration, end_at: Duration) -> bool {
        (self.start_at < end_at && self.end_at > start_at)
            || (self.start_at == start_at && self.end_at == end_at)
    }

    fn linear_progress(&self, now: Duration) -> f64 {
        let span = self.end_at.saturating_sub(self.start_at);
        if span.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_at);
        (elapsed.as_secs_f64() / span.as_secs_f64()).min(1.0)
    }
}

/// In-process [`TweenScheduler`] driven by an external clock.
#[derive(Debug, Default)]
pub struct Tweener {
    now: Duration,
    next_id: u64,
    tweens: Vec<Tween>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}

impl TweenScheduler for Tweener {
    fn now(&self) -> Duration {
        self.now
    }

    fn add_tween(&mut self, target: TweenTarget, spec: TweenSpec) -> Scheduled {
        let start_at = self.now.saturating_add(spec.delay);
        let end_at = start_at.saturating_add(spec.duration);

        let mut overwritten = Vec::new();
        self.tweens.retain(|tween| {
            if tween.target == target && tween.overlaps(start_at, end_at) {
                overwritten.push(tween.id);
                false
            } else {
                true
            }
        });

        self.next_id += 1;
        let id = TweenId(self.next_id);
        self.tweens.push(Tween {
            id,
            target,
            easing: spec.easing,
            start_at,
            end_at,
            started: false,
        });
        tracing::trace!(?id, ?target, ?start_at, ?end_at, "tween scheduled");

        Scheduled { id, overwritten }
    }

    fn remove_tweens(&mut self, target: TweenTarget) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|tween| tween.target != target);
        before - self.tweens.len()
    }

    fn is_animating(&self, target: TweenTarget) -> bool {
        self.tweens.iter().any(|tween| tween.target == target)
    }

    fn advance(&mut self, now: Duration) -> Vec<TweenEvent> {
        // the timeline never runs backwards
        self.now = self.now.max(now);
        let now = self.now;

        let mut events = Vec::new();
        self.tweens.retain_mut(|tween| {
            if now < tween.start_at {
                return true;
            }
            if !tween.started {
                tween.started = true;
                events.push(TweenEvent {
                    id: tween.id,
                    target: tween.target,
                    kind: TweenEventKind::Started,
                });
            }
            let progress = tween.linear_progress(now);
            if progress >= 1.0 {
                events.push(TweenEvent {
                    id: tween.id,
                    target: tween.target,
                    kind: TweenEventKind::Completed,
                });
                false
            } else {
                events.push(TweenEvent {
                    id: tween.id,
                    target: tween.target,
                    kind: TweenEventKind::Updated(tween.easing.apply(progress)),
                });
                true
            }
        });
        events
    }
}
