use std::time::Duration;

use tracing::debug;

use crate::animation::{
    easing::lerp, TweenEvent, TweenEventKind, TweenId, TweenScheduler, TweenSpec, TweenTarget,
};
use crate::config::DockSettings;
use crate::shell::Shared;

/// Whether the opaque backing should be faded in.
pub fn background_visible(opaque_background: bool, autohide: bool, always: bool) -> bool {
    opaque_background && (autohide || always)
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    id: TweenId,
    from: Option<f64>,
    to: f64,
}

/// Fades the opaque backing drawn behind the dock content.
///
/// The backing has its own opacity (animated) and a tint alpha taken from the
/// `background-opacity` setting; what reaches the screen is their product.
pub struct BackgroundOpacityController {
    scheduler: Shared<dyn TweenScheduler>,
    opacity: f64,
    tint: f64,
    box_visible: bool,
    fade: Option<Fade>,
}

impl BackgroundOpacityController {
    pub fn new(scheduler: Shared<dyn TweenScheduler>, settings: &DockSettings) -> Self {
        Self {
            scheduler,
            opacity: 1.0,
            tint: settings.background_opacity,
            box_visible: settings.opaque_background,
            fade: None,
        }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn tint(&self) -> f64 {
        self.tint
    }

    pub fn is_box_visible(&self) -> bool {
        self.box_visible
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Alpha of the backing as composited on screen.
    pub fn effective_alpha(&self) -> f64 {
        if self.box_visible {
            self.opacity * self.tint
        } else {
            0.0
        }
    }

    /// Re-evaluate the backing against the settings and the autohide state.
    pub fn apply(&mut self, settings: &DockSettings, autohide: bool) {
        let time = settings.timing().animation_time;
        if background_visible(
            settings.opaque_background,
            autohide,
            settings.opaque_background_always,
        ) {
            self.box_visible = true;
            self.fade_in(time, Duration::ZERO);
        } else {
            self.fade_out(time, Duration::ZERO);
        }
    }

    /// Show or hide the backing outright, without fading.
    pub fn sync_box(&mut self, opaque_background: bool) {
        self.box_visible = opaque_background;
    }

    pub fn set_tint(&mut self, alpha: f64) {
        self.tint = alpha.clamp(0.0, 1.0);
    }

    pub fn fade_in(&mut self, duration: Duration, delay: Duration) {
        self.fade_to(1.0, duration, delay);
    }

    pub fn fade_out(&mut self, duration: Duration, delay: Duration) {
        self.fade_to(0.0, duration, delay);
    }

    fn fade_to(&mut self, to: f64, duration: Duration, delay: Duration) {
        let mut scheduler = self.scheduler.borrow_mut();
        scheduler.remove_tweens(TweenTarget::BackgroundOpacity);
        self.fade = None;
        if self.opacity == to {
            return;
        }
        let scheduled = scheduler.add_tween(
            TweenTarget::BackgroundOpacity,
            TweenSpec::new(duration, delay),
        );
        debug!(from = self.opacity, to, ?duration, "dock: background fade");
        self.fade = Some(Fade {
            id: scheduled.id,
            from: None,
            to,
        });
    }

    pub fn handle_tween_event(&mut self, event: &TweenEvent) {
        let Some(fade) = self.fade.filter(|fade| fade.id == event.id) else {
            return;
        };
        match event.kind {
            TweenEventKind::Started => {
                self.fade = Some(Fade {
                    from: Some(self.opacity),
                    ..fade
                });
            }
            TweenEventKind::Updated(progress) => {
                let from = fade.from.unwrap_or(self.opacity);
                self.opacity = lerp(from, fade.to, progress);
            }
            TweenEventKind::Completed => {
                self.opacity = fade.to;
                self.fade = None;
            }
        }
    }

    /// Drop any fade in flight.
    pub fn remove_animations(&mut self) {
        self.scheduler
            .borrow_mut()
            .remove_tweens(TweenTarget::BackgroundOpacity);
        self.fade = None;
    }
}
