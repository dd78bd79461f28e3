use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::animation::{
    easing::lerp, AnimationPhase, AnimationStatus, StatusError, TweenEvent, TweenEventKind,
    TweenId, TweenScheduler, TweenSpec, TweenTarget, Visibility,
};
use crate::config::AnimationTiming;
use crate::geometry::{dock_clip, Rect};
use crate::shell::Shared;

use super::element::DockElement;

#[derive(Debug, Clone, Copy)]
struct SlideTrack {
    to: f64,
    /// Position captured when the tween starts.
    from: Option<f64>,
}

/// Slides the dock between its on-screen and off-screen positions.
///
/// On screen the dock sits at the monitor's left edge; off screen it is moved
/// left by its width minus one pixel, leaving a sliver the pointer can hit.
pub struct VisibilityAnimator {
    element: DockElement,
    status: AnimationStatus,
    scheduler: Shared<dyn TweenScheduler>,
    monitor: Rect,
    tracks: HashMap<TweenId, SlideTrack>,
}

impl VisibilityAnimator {
    pub fn new(
        scheduler: Shared<dyn TweenScheduler>,
        monitor: Rect,
        width: f64,
        initial: Visibility,
    ) -> Self {
        Self {
            element: DockElement::new(width),
            status: AnimationStatus::new(initial),
            scheduler,
            monitor,
            tracks: HashMap::new(),
        }
    }

    pub fn element(&self) -> &DockElement {
        &self.element
    }

    pub fn status(&self) -> &AnimationStatus {
        &self.status
    }

    pub fn phase(&self) -> AnimationPhase {
        self.status.phase()
    }

    pub fn shown_x(&self) -> f64 {
        self.monitor.x
    }

    pub fn hidden_x(&self) -> f64 {
        self.monitor.x - self.element.width + 1.0
    }

    /// Put the dock off screen without animating and make it visible.
    pub fn place_hidden(&mut self) {
        self.element.x = self.hidden_x();
        self.element.opacity = 1.0;
        self.update_clip();
    }

    pub fn set_width(&mut self, width: f64) {
        self.element.width = width;
    }

    /// Align the dock vertically with the overview viewport.
    pub fn set_vertical_extent(&mut self, y: f64, height: f64) {
        self.element.y = y;
        self.element.height = height;
        self.update_clip();
    }

    pub fn animate_in(&mut self, duration: Duration, delay: Duration) -> Result<bool, StatusError> {
        self.animate_to(Visibility::Shown, self.shown_x(), duration, delay)
    }

    pub fn animate_out(
        &mut self,
        duration: Duration,
        delay: Duration,
    ) -> Result<bool, StatusError> {
        self.animate_to(Visibility::Hidden, self.hidden_x(), duration, delay)
    }

    fn animate_to(
        &mut self,
        target: Visibility,
        to: f64,
        duration: Duration,
        delay: Duration,
    ) -> Result<bool, StatusError> {
        if to == self.element.x {
            return Ok(false);
        }
        self.status.queue(target)?;

        let scheduled = self
            .scheduler
            .borrow_mut()
            .add_tween(TweenTarget::DockPosition, TweenSpec::new(duration, delay));
        if !scheduled.overwritten.is_empty() {
            // Overwritten slides never complete; only the new target survives.
            for id in &scheduled.overwritten {
                self.tracks.remove(id);
            }
            self.status.clear();
            self.status.queue(target)?;
        }
        self.tracks
            .insert(scheduled.id, SlideTrack { to, from: None });

        debug!(?target, to, ?duration, ?delay, "dock: slide queued");
        Ok(true)
    }

    /// Cancel every pending or running slide.
    pub fn remove_animations(&mut self) {
        self.scheduler
            .borrow_mut()
            .remove_tweens(TweenTarget::DockPosition);
        self.tracks.clear();
        self.status.clear();
    }

    /// Bring the dock on screen, giving priority to showing.
    ///
    /// A hide that has not started yet is dropped. A hide already under way
    /// finishes first; the show then follows after the combined delay so the
    /// two slides never overlap.
    pub fn show(&mut self, timing: &AnimationTiming) -> Result<(), StatusError> {
        if self.status.hidden() {
            self.animate_in(timing.animation_time, timing.show_delay)?;
        } else if self.status.hiding() {
            if self.status.is_running() {
                self.animate_in(timing.animation_time, timing.deferred_delay())?;
            } else {
                self.remove_animations();
                self.animate_in(timing.animation_time, Duration::ZERO)?;
            }
        }
        Ok(())
    }

    /// Move the dock off screen. A running show is never interrupted.
    pub fn hide(&mut self, timing: &AnimationTiming) -> Result<(), StatusError> {
        if self.status.shown() {
            self.animate_out(timing.animation_time, timing.hide_delay)?;
        } else if self.status.showing() {
            if self.status.is_running() {
                self.animate_out(timing.animation_time, timing.deferred_delay())?;
            } else {
                // the pointer left before the show delay elapsed
                self.remove_animations();
                self.animate_out(timing.animation_time, Duration::ZERO)?;
            }
        }
        Ok(())
    }

    /// Re-place a settled dock after its width changed. A dock in motion is
    /// left alone.
    pub fn redisplay(&mut self, timing: &AnimationTiming) -> Result<(), StatusError> {
        if self.status.hidden() {
            self.remove_animations();
            self.animate_out(Duration::ZERO, Duration::ZERO)?;
        } else if self.status.shown() {
            self.remove_animations();
            self.animate_in(timing.animation_time, Duration::ZERO)?;
        }
        self.update_clip();
        Ok(())
    }

    pub fn handle_tween_event(&mut self, event: &TweenEvent) {
        let Some(track) = self.tracks.get(&event.id).copied() else {
            return;
        };
        match event.kind {
            TweenEventKind::Started => {
                self.tracks.insert(
                    event.id,
                    SlideTrack {
                        from: Some(self.element.x),
                        ..track
                    },
                );
                self.status.start();
            }
            TweenEventKind::Updated(progress) => {
                let from = track.from.unwrap_or(self.element.x);
                self.element.x = lerp(from, track.to, progress);
                self.update_clip();
            }
            TweenEventKind::Completed => {
                self.tracks.remove(&event.id);
                self.element.x = track.to;
                self.update_clip();
                self.status.end();
                debug!(phase = ?self.status.phase(), x = self.element.x, "dock: slide finished");
            }
        }
    }

    /// Keep the clip pinned to the monitor while the dock moves.
    pub fn update_clip(&mut self) {
        self.element.clip = Some(dock_clip(
            self.shown_x(),
            &self.monitor,
            self.element.x,
            self.element.y,
        ));
    }
}
