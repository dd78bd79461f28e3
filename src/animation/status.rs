use std::collections::VecDeque;

use thiserror::Error;

/// Settled visibility of the dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }
}

/// The single predicate of [`AnimationStatus`] that currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationPhase {
    Shown,
    Hidden,
    Showing,
    Hiding,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatusError {
    #[error("an animation towards {pending:?} is already waiting to start")]
    Busy { pending: Visibility },
}

/// Tracks where the dock is heading while show/hide animations are queued or
/// running.
///
/// The queue holds at most the running target plus one target that has not
/// started yet; a second not-yet-started target is rejected by [`queue`].
///
/// [`queue`]: AnimationStatus::queue
#[derive(Debug, Clone)]
pub struct AnimationStatus {
    current: Visibility,
    pending: VecDeque<Visibility>,
    queued: bool,
    running: bool,
}

impl AnimationStatus {
    pub fn new(initial: Visibility) -> Self {
        Self {
            current: initial,
            pending: VecDeque::with_capacity(2),
            queued: false,
            running: false,
        }
    }

    pub fn current(&self) -> Visibility {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    /// Next target the dock is animating towards, if any.
    pub fn next_target(&self) -> Option<Visibility> {
        self.pending.front().copied()
    }

    // === Mutations ===

    /// Record a requested animation that has not started yet.
    pub fn queue(&mut self, target: Visibility) -> Result<(), StatusError> {
        if self.queued {
            let pending = self.pending.back().copied().unwrap_or(target);
            return Err(StatusError::Busy { pending });
        }
        self.pending.push_back(target);
        self.queued = true;
        Ok(())
    }

    /// The head of the queue began interpolating.
    pub fn start(&mut self) {
        if self.pending.len() == 1 {
            self.queued = false;
        }
        self.running = true;
    }

    /// The running animation reached its target.
    pub fn end(&mut self) {
        // end() may arrive without a start() for instant transitions
        if self.pending.len() == 1 {
            self.queued = false;
        }
        self.running = false;
        if let Some(next) = self.pending.pop_front() {
            self.current = next;
        }
    }

    /// Drop every queued or running target; the settled state does not move.
    pub fn clear(&mut self) {
        self.queued = false;
        self.running = false;
        self.pending.clear();
    }

    // === Predicates ===

    fn busy(&self) -> bool {
        self.running || self.queued
    }

    /// A show animation is running or queued.
    pub fn showing(&self) -> bool {
        self.busy() && self.next_target() == Some(Visibility::Shown)
    }

    /// A hide animation is running or queued.
    pub fn hiding(&self) -> bool {
        self.busy() && self.next_target() == Some(Visibility::Hidden)
    }

    pub fn shown(&self) -> bool {
        self.current == Visibility::Shown && !self.busy()
    }

    pub fn hidden(&self) -> bool {
        self.current == Visibility::Hidden && !self.busy()
    }

    pub fn phase(&self) -> AnimationPhase {
        if self.showing() {
            AnimationPhase::Showing
        } else if self.hiding() {
            AnimationPhase::Hiding
        } else if self.shown() {
            AnimationPhase::Shown
        } else {
            AnimationPhase::Hidden
        }
    }
}
