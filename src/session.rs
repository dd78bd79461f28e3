//! Composition root: one dock view driven by one intellihide engine.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::animation::{AnimationPhase, TweenScheduler};
use crate::config::SettingsStore;
use crate::dock::DockView;
use crate::intellihide::{DockIntent, IntellihideEngine};
use crate::shell::{LayoutHost, OverviewHost, Shared, ShellEvent, WindowSystem};

/// Everything the session borrows from the host.
#[derive(Clone)]
pub struct Collaborators {
    pub windows: Shared<dyn WindowSystem>,
    pub overview: Shared<dyn OverviewHost>,
    pub layout: Shared<dyn LayoutHost>,
    pub scheduler: Shared<dyn TweenScheduler>,
    /// `None` runs on the compiled defaults.
    pub settings: Option<Shared<dyn SettingsStore>>,
}

pub struct DockSession {
    scheduler: Shared<dyn TweenScheduler>,
    dock: DockView,
    engine: IntellihideEngine,
}

impl DockSession {
    /// Create and initialize the dock, then let the engine take over.
    pub fn new(host: Collaborators, content_width: f64) -> Self {
        let mut dock = DockView::new(
            host.scheduler.clone(),
            host.layout,
            host.overview.clone(),
            host.settings.clone(),
            content_width,
        );
        dock.initialize();

        let mut engine = IntellihideEngine::new(host.windows, host.overview, host.settings);
        let intents = engine.start(content_width);

        let mut session = Self {
            scheduler: host.scheduler,
            dock,
            engine,
        };
        for intent in intents {
            session.apply(intent);
        }
        info!(phase = ?session.phase(), "dock session started");
        session
    }

    pub fn dock(&self) -> &DockView {
        &self.dock
    }

    pub fn engine(&self) -> &IntellihideEngine {
        &self.engine
    }

    pub fn phase(&self) -> AnimationPhase {
        self.dock.phase()
    }

    pub fn handle_event(&mut self, event: &ShellEvent) {
        if let ShellEvent::DockResized { width } = *event {
            if !(width.is_finite() && width > 0.0) {
                warn!(width, "session: ignoring invalid dock width");
                return;
            }
        }
        let handled = self.dock.handle_event(event);
        let intent = match *event {
            ShellEvent::DockResized { width } => self.engine.update_offset(width),
            _ => self.engine.handle_event(event),
        };
        if let Some(intent) = intent {
            self.apply(intent);
        } else if !handled {
            debug!(?event, "session: event had no effect");
        }
    }

    /// Advance the animation timeline to `now`. Returns how many tween
    /// events were delivered.
    pub fn tick(&mut self, now: Duration) -> usize {
        let events = self.scheduler.borrow_mut().advance(now);
        for event in &events {
            self.dock.handle_tween_event(event);
        }
        events.len()
    }

    pub fn now(&self) -> Duration {
        self.scheduler.borrow().now()
    }

    pub fn disable_autohide(&mut self) {
        self.dock.disable_autohide();
    }

    pub fn enable_autohide(&mut self) {
        self.dock.enable_autohide();
    }

    fn apply(&mut self, intent: DockIntent) {
        debug!(?intent, "session: applying intent");
        match intent {
            DockIntent::Show => self.dock.disable_autohide(),
            DockIntent::Hide => self.dock.enable_autohide(),
            DockIntent::Conceal => self.dock.conceal(),
        }
    }

    /// Tear down the engine, then the dock.
    pub fn destroy(self) {
        self.engine.destroy();
        self.dock.destroy();
        info!("dock session destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Tweener;
    use crate::config::{DockSettings, IntellihideMode, MemorySettings, SettingValue, SettingsKey};
    use crate::dock::HoverPolicy;
    use crate::geometry::Rect;
    use crate::shell::{shared, WindowInfo, WindowType};
    use crate::sim::SimulatedShell;

    struct Rig {
        shell: SimulatedShell,
        store: Shared<MemorySettings>,
        session: DockSession,
        now: Duration,
    }

    impl Rig {
        fn new(settings: DockSettings, edges: &[f64]) -> Self {
            let shell = SimulatedShell::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
            for &x in edges {
                shell.open_window(window_at(x));
            }
            let store = shared(MemorySettings::new(settings));
            let settings: Shared<dyn SettingsStore> = store.clone();
            let host = shell.collaborators(shared(Tweener::new()), Some(settings));
            let session = DockSession::new(host, 64.0);
            Self {
                shell,
                store,
                session,
                now: Duration::ZERO,
            }
        }

        fn run_for(&mut self, millis: u64) {
            let end = self.now + Duration::from_millis(millis);
            while self.now < end {
                self.now += Duration::from_millis(10);
                self.session.tick(self.now);
            }
        }

        fn send(&mut self, event: ShellEvent) {
            self.session.handle_event(&event);
        }
    }

    fn window_at(x: f64) -> WindowInfo {
        WindowInfo {
            outer_rect: Rect::new(x, 100.0, 600.0, 400.0),
            kind: WindowType::Normal,
            workspace: 0,
            monitor: 0,
            showing_on_workspace: true,
        }
    }

    #[test]
    fn free_edge_pins_dock_on_screen() {
        let mut rig = Rig::new(DockSettings::default(), &[]);
        assert_eq!(rig.session.phase(), AnimationPhase::Showing);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);
        assert_eq!(rig.session.dock().element().x, 0.0);
        assert_eq!(rig.session.dock().hover_policy(), HoverPolicy::Pinned);
    }

    #[test]
    fn overlapping_window_hands_dock_to_hover() {
        let mut rig = Rig::new(DockSettings::default(), &[20.0]);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);
        assert_eq!(rig.session.dock().hover_policy(), HoverPolicy::Autohide);

        rig.send(ShellEvent::HoverChanged(true));
        rig.run_for(800);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);
    }

    #[test]
    fn window_moving_away_brings_dock_back() {
        let mut rig = Rig::new(DockSettings::default(), &[20.0]);
        rig.run_for(300);

        let moved = rig.shell.move_window(crate::shell::WindowId(1), 400.0, 100.0);
        rig.send(moved.unwrap());
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);
    }

    #[test]
    fn disable_then_enable_without_hover_ends_hiding() {
        let mut rig = Rig::new(DockSettings::default(), &[20.0]);
        rig.run_for(300);

        rig.session.disable_autohide();
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);

        rig.session.enable_autohide();
        assert_eq!(rig.session.phase(), AnimationPhase::Hiding);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);
    }

    #[test]
    fn hide_during_running_show_waits_for_combined_delay() {
        let mut rig = Rig::new(DockSettings::default(), &[20.0]);
        rig.run_for(300);

        rig.send(ShellEvent::HoverChanged(true));
        rig.run_for(600);
        assert!(rig.session.dock().animator().status().is_running());

        rig.send(ShellEvent::HoverChanged(false));
        // 0.25 + 2 * 0.25 + 0.5 s after the pointer left
        rig.run_for(1240);
        assert_eq!(rig.session.phase(), AnimationPhase::Hiding);
        assert_eq!(rig.session.dock().element().x, 0.0);

        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);
    }

    #[test]
    fn autohide_mode_only_follows_hover() {
        let settings = DockSettings {
            normal_mode: IntellihideMode::Autohide,
            ..DockSettings::default()
        };
        let mut rig = Rig::new(settings, &[900.0]);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);

        let moved = rig.shell.move_window(crate::shell::WindowId(1), 0.0, 0.0);
        rig.send(moved.unwrap());
        rig.run_for(1000);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);

        rig.send(ShellEvent::HoverChanged(true));
        rig.run_for(800);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);
    }

    #[test]
    fn overview_show_mode_keeps_dock_visible() {
        let mut rig = Rig::new(DockSettings::default(), &[20.0]);
        rig.run_for(300);

        let entered = rig.shell.show_overview();
        rig.send(entered);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);

        for x in [0.0, 10.0, 700.0, 5.0] {
            let moved = rig.shell.move_window(crate::shell::WindowId(1), x, 0.0);
            rig.send(moved.unwrap());
            rig.run_for(100);
            assert_eq!(rig.session.phase(), AnimationPhase::Shown);
        }
    }

    #[test]
    fn hide_mode_conceals_dock() {
        let mut rig = Rig::new(DockSettings::default(), &[]);
        rig.run_for(300);

        rig.store
            .borrow_mut()
            .set(
                SettingsKey::NormalMode,
                SettingValue::Mode(IntellihideMode::Hide),
            )
            .unwrap();
        rig.send(ShellEvent::SettingsChanged(SettingsKey::NormalMode));
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);

        rig.send(ShellEvent::HoverChanged(true));
        rig.run_for(1000);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);
    }

    #[test]
    fn wider_dock_reaches_further() {
        let mut rig = Rig::new(DockSettings::default(), &[100.0]);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);

        rig.send(ShellEvent::DockResized { width: 128.0 });
        assert_eq!(rig.session.engine().offset(), 128.0);
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Hidden);
        assert_eq!(rig.session.dock().element().x, -127.0);
    }

    #[test]
    fn invalid_dock_width_is_ignored() {
        let mut rig = Rig::new(DockSettings::default(), &[100.0]);
        rig.run_for(300);

        for width in [0.0, -64.0, f64::NAN, f64::INFINITY] {
            rig.send(ShellEvent::DockResized { width });
            assert_eq!(rig.session.engine().offset(), 64.0);
        }
        rig.run_for(300);
        assert_eq!(rig.session.phase(), AnimationPhase::Shown);
        assert_eq!(rig.session.dock().element().x, 0.0);
    }

    #[test]
    fn destroy_leaves_no_connections() {
        let mut rig = Rig::new(DockSettings::default(), &[100.0, 300.0]);
        let (_, created) = rig.shell.open_window(window_at(500.0));
        rig.send(created);
        rig.run_for(100);

        rig.session.destroy();
        assert_eq!(rig.shell.connections(), 0);
        assert_eq!(rig.store.borrow().connections(), 0);
    }
}
