use std::time::Duration;

use tracing::debug;

use crate::animation::StatusError;
use crate::config::AnimationTiming;

use super::animator::VisibilityAnimator;

/// Who currently decides where the dock is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverPolicy {
    /// Pointer hover shows the dock, leaving hides it.
    #[default]
    Autohide,
    /// Always on screen; hover is ignored.
    Pinned,
    /// Locked off screen; hover is ignored.
    Concealed,
}

/// Turns pointer hover into show/hide requests on the animator.
#[derive(Debug, Default)]
pub struct HoverController {
    policy: HoverPolicy,
    hovering: bool,
}

impl HoverController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(&self) -> HoverPolicy {
        self.policy
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Whether the dock behaves as an autohiding one. A concealed dock counts.
    pub fn autohide(&self) -> bool {
        self.policy != HoverPolicy::Pinned
    }

    pub fn on_hover_changed(
        &mut self,
        hovering: bool,
        animator: &mut VisibilityAnimator,
        timing: &AnimationTiming,
    ) -> Result<(), StatusError> {
        self.hovering = hovering;
        if self.policy != HoverPolicy::Autohide {
            return Ok(());
        }
        if hovering {
            animator.show(timing)
        } else {
            animator.hide(timing)
        }
    }

    /// Re-check the pointer once a slide has finished. The pointer may have
    /// left or come back while the priority rules held the opposite slide.
    pub fn on_slide_finished(
        &mut self,
        animator: &mut VisibilityAnimator,
        timing: &AnimationTiming,
    ) -> Result<(), StatusError> {
        if self.policy != HoverPolicy::Autohide {
            return Ok(());
        }
        let (shown, hidden) = (animator.status().shown(), animator.status().hidden());
        if !self.hovering && shown {
            debug!("dock: pointer left during the slide");
            animator.hide(timing)
        } else if self.hovering && hidden {
            debug!("dock: pointer returned during the slide");
            animator.show(timing)
        } else {
            Ok(())
        }
    }

    /// Pin the dock on screen. Returns `false` when it already was.
    pub fn disable_autohide(
        &mut self,
        animator: &mut VisibilityAnimator,
        timing: &AnimationTiming,
    ) -> Result<bool, StatusError> {
        if self.policy == HoverPolicy::Pinned {
            return Ok(false);
        }
        debug!(from = ?self.policy, "dock: autohide disabled");
        self.policy = HoverPolicy::Pinned;
        animator.remove_animations();
        animator.animate_in(timing.animation_time, Duration::ZERO)?;
        Ok(true)
    }

    /// Hand the dock back to hover. A dock under the pointer stays put.
    pub fn enable_autohide(
        &mut self,
        animator: &mut VisibilityAnimator,
        timing: &AnimationTiming,
    ) -> Result<bool, StatusError> {
        if self.policy == HoverPolicy::Autohide {
            return Ok(false);
        }
        debug!(from = ?self.policy, "dock: autohide enabled");
        self.policy = HoverPolicy::Autohide;
        animator.remove_animations();
        if !self.hovering {
            animator.animate_out(timing.animation_time, Duration::ZERO)?;
        }
        Ok(true)
    }

    /// Lock the dock off screen until it is pinned or autohide is re-enabled.
    pub fn conceal(
        &mut self,
        animator: &mut VisibilityAnimator,
        timing: &AnimationTiming,
    ) -> Result<bool, StatusError> {
        if self.policy == HoverPolicy::Concealed {
            return Ok(false);
        }
        debug!(from = ?self.policy, "dock: concealed");
        self.policy = HoverPolicy::Concealed;
        animator.remove_animations();
        animator.animate_out(timing.animation_time, Duration::ZERO)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{TweenEventKind, TweenScheduler, Tweener, Visibility};
    use crate::dock::animator::tests::{timing, MONITOR};
    use crate::shell::{shared, Shared};

    struct Rig {
        tweener: Shared<Tweener>,
        animator: VisibilityAnimator,
        hover: HoverController,
        now: Duration,
    }

    impl Rig {
        fn new() -> Self {
            let tweener = shared(Tweener::new());
            let scheduler: Shared<dyn TweenScheduler> = tweener.clone();
            let mut animator =
                VisibilityAnimator::new(scheduler, MONITOR, 64.0, Visibility::Hidden);
            animator.place_hidden();
            Self {
                tweener,
                animator,
                hover: HoverController::new(),
                now: Duration::ZERO,
            }
        }

        fn hover(&mut self, hovering: bool) {
            self.hover
                .on_hover_changed(hovering, &mut self.animator, &timing())
                .unwrap();
        }

        fn run_for(&mut self, millis: u64) {
            let end = self.now + Duration::from_millis(millis);
            while self.now < end {
                self.now += Duration::from_millis(10);
                let events = self.tweener.borrow_mut().advance(self.now);
                for event in &events {
                    self.animator.handle_tween_event(event);
                    if event.kind == TweenEventKind::Completed {
                        self.hover
                            .on_slide_finished(&mut self.animator, &timing())
                            .unwrap();
                    }
                }
            }
        }
    }

    #[test]
    fn hover_shows_and_leaving_hides() {
        let mut rig = Rig::new();
        rig.hover(true);
        rig.run_for(800);
        assert!(rig.animator.status().shown());

        rig.hover(false);
        rig.run_for(600);
        assert!(rig.animator.status().hidden());
    }

    #[test]
    fn brief_hover_never_moves_the_dock() {
        let mut rig = Rig::new();
        rig.hover(true);
        rig.run_for(200);
        rig.hover(false);
        assert!(rig.animator.status().hidden());
        rig.run_for(1000);
        assert_eq!(rig.animator.element().x, -63.0);
    }

    #[test]
    fn pinned_dock_ignores_hover() {
        let mut rig = Rig::new();
        assert!(rig
            .hover
            .disable_autohide(&mut rig.animator, &timing())
            .unwrap());
        rig.run_for(300);
        assert!(rig.animator.status().shown());

        rig.hover(true);
        rig.hover(false);
        rig.run_for(2000);
        assert!(rig.animator.status().shown());
        assert!(!rig.hover.autohide());
    }

    #[test]
    fn toggles_are_idempotent() {
        let mut rig = Rig::new();
        assert!(!rig
            .hover
            .enable_autohide(&mut rig.animator, &timing())
            .unwrap());
        rig.hover.disable_autohide(&mut rig.animator, &timing()).unwrap();
        assert!(!rig
            .hover
            .disable_autohide(&mut rig.animator, &timing())
            .unwrap());
    }

    #[test]
    fn disable_then_enable_without_hover_ends_hidden() {
        let mut rig = Rig::new();
        rig.hover.disable_autohide(&mut rig.animator, &timing()).unwrap();
        rig.run_for(100);
        rig.hover.enable_autohide(&mut rig.animator, &timing()).unwrap();
        assert!(rig.animator.status().hiding());

        rig.run_for(300);
        assert!(rig.animator.status().hidden());
        assert_eq!(rig.animator.element().x, -63.0);
    }

    #[test]
    fn enable_under_pointer_leaves_dock_shown() {
        let mut rig = Rig::new();
        rig.hover.disable_autohide(&mut rig.animator, &timing()).unwrap();
        rig.hover(true);
        rig.run_for(300);

        rig.hover.enable_autohide(&mut rig.animator, &timing()).unwrap();
        rig.run_for(1000);
        assert!(rig.animator.status().shown());
    }

    #[test]
    fn concealed_dock_ignores_hover() {
        let mut rig = Rig::new();
        rig.hover.disable_autohide(&mut rig.animator, &timing()).unwrap();
        rig.run_for(300);

        rig.hover.conceal(&mut rig.animator, &timing()).unwrap();
        rig.run_for(300);
        assert!(rig.animator.status().hidden());

        rig.hover(true);
        rig.run_for(1000);
        assert!(rig.animator.status().hidden());
        assert_eq!(rig.hover.policy(), HoverPolicy::Concealed);
    }

    #[test]
    fn pointer_leaving_during_deferred_show_hides_again() {
        let mut rig = Rig::new();
        rig.hover(true);
        rig.run_for(800);
        assert!(rig.animator.status().shown());

        rig.hover(false);
        rig.run_for(300);
        assert!(rig.animator.status().hiding());
        assert!(rig.animator.status().is_running());

        // show deferred behind the running hide, then the pointer leaves again
        rig.hover(true);
        rig.hover(false);

        rig.run_for(1600);
        assert!(rig.animator.status().hiding());
        assert_eq!(rig.animator.element().x, 0.0);

        rig.run_for(500);
        assert!(rig.animator.status().hidden());
        assert_eq!(rig.animator.element().x, -63.0);
    }

    #[test]
    fn pointer_returning_during_deferred_hide_shows_again() {
        let mut rig = Rig::new();
        rig.hover(true);
        rig.run_for(600);
        assert!(rig.animator.status().showing());
        assert!(rig.animator.status().is_running());

        // hide deferred behind the running show, then the pointer comes back
        rig.hover(false);
        rig.hover(true);

        rig.run_for(1500);
        assert!(rig.animator.status().showing());

        rig.run_for(1000);
        assert!(rig.animator.status().shown());
        assert_eq!(rig.animator.element().x, 0.0);
    }
}
