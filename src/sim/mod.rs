//! In-memory shell used by tests and the scenario player.
//!
//! A [`SimulatedShell`] is a cheap handle onto a shared [`SimWorld`]; every
//! collaborator trait is implemented on the handle, so one world can be handed
//! to the dock as window system, overview and layout host at once. Mutators
//! return the notifications a real shell would emit; delivering them is up to
//! the caller.

use std::sync::{Arc, RwLock};

use crate::animation::TweenScheduler;
use crate::config::SettingsStore;
use crate::geometry::{Monitor, Rect};
use crate::session::Collaborators;
use crate::shell::{
    shared, GlobalSignal, LayoutHost, LayoutSignal, OverviewHost, OverviewSignal, Shared,
    ShellEvent, SignalId, SignalRegistry, Topic, WindowActor, WindowId, WindowInfo, WindowSignal,
    WindowSystem,
};

pub mod scenario;

pub use scenario::{play, Scenario, ScenarioAction, ScenarioError, ScenarioPlayer, ScenarioStep};

#[derive(Debug)]
pub struct SimWorld {
    pub monitors: Vec<Monitor>,
    pub primary_monitor: usize,
    pub active_workspace: usize,
    /// Bottom to top.
    pub actors: Vec<WindowActor>,
    pub overview_visible: bool,
    pub viewport: Rect,
    signals: SignalRegistry,
    next_window: u64,
}

#[derive(Debug, Clone)]
pub struct SimulatedShell {
    world: Arc<RwLock<SimWorld>>,
}

impl SimulatedShell {
    /// A single-monitor shell with the overview viewport covering the monitor.
    pub fn new(monitor: Rect) -> Self {
        Self {
            world: Arc::new(RwLock::new(SimWorld {
                monitors: vec![Monitor {
                    index: 0,
                    geometry: monitor,
                }],
                primary_monitor: 0,
                active_workspace: 0,
                actors: Vec::new(),
                overview_visible: false,
                viewport: monitor,
                signals: SignalRegistry::new(),
                next_window: 0,
            })),
        }
    }

    /// Hand this shell to a session as window system, overview and layout
    /// host.
    pub fn collaborators(
        &self,
        scheduler: Shared<dyn TweenScheduler>,
        settings: Option<Shared<dyn SettingsStore>>,
    ) -> Collaborators {
        Collaborators {
            windows: shared(self.clone()),
            overview: shared(self.clone()),
            layout: shared(self.clone()),
            scheduler,
            settings,
        }
    }

    /// Add a secondary monitor, returning its index.
    pub fn add_monitor(&self, geometry: Rect) -> usize {
        let mut world = self.world.write().unwrap();
        let index = world.monitors.len();
        world.monitors.push(Monitor { index, geometry });
        index
    }

    pub fn open_window(&self, window: WindowInfo) -> (WindowId, ShellEvent) {
        let mut world = self.world.write().unwrap();
        world.next_window += 1;
        let id = WindowId(world.next_window);
        world.actors.push(WindowActor {
            id,
            window: Some(window),
        });
        (id, ShellEvent::WindowCreated(id))
    }

    /// An actor with no backing window, e.g. one being torn down.
    pub fn add_bare_actor(&self) -> WindowId {
        let mut world = self.world.write().unwrap();
        world.next_window += 1;
        let id = WindowId(world.next_window);
        world.actors.push(WindowActor { id, window: None });
        id
    }

    fn with_window(&self, id: WindowId, update: impl FnOnce(&mut WindowInfo)) -> bool {
        let mut world = self.world.write().unwrap();
        match world
            .actors
            .iter_mut()
            .find(|actor| actor.id == id)
            .and_then(|actor| actor.window.as_mut())
        {
            Some(window) => {
                update(window);
                true
            }
            None => false,
        }
    }

    pub fn move_window(&self, id: WindowId, x: f64, y: f64) -> Option<ShellEvent> {
        self.with_window(id, |window| {
            window.outer_rect.x = x;
            window.outer_rect.y = y;
        })
        .then_some(ShellEvent::WindowPositionChanged(id))
    }

    pub fn resize_window(&self, id: WindowId, width: f64, height: f64) -> Option<ShellEvent> {
        self.with_window(id, |window| {
            window.outer_rect.width = width;
            window.outer_rect.height = height;
        })
        .then_some(ShellEvent::WindowSizeChanged(id))
    }

    /// Minimize or restore a window; the stack is reported as changed.
    pub fn set_minimized(&self, id: WindowId, minimized: bool) -> Option<ShellEvent> {
        self.with_window(id, |window| window.showing_on_workspace = !minimized)
            .then_some(ShellEvent::Restacked)
    }

    pub fn move_window_to_workspace(&self, id: WindowId, workspace: usize) -> Option<ShellEvent> {
        self.with_window(id, |window| window.workspace = workspace)
            .then_some(ShellEvent::Restacked)
    }

    /// `unmanaged` is emitted while the window still exists, then the stack
    /// changes.
    pub fn close_window(&self, id: WindowId) -> Vec<ShellEvent> {
        let mut world = self.world.write().unwrap();
        let before = world.actors.len();
        world.actors.retain(|actor| actor.id != id);
        if world.actors.len() == before {
            return Vec::new();
        }
        vec![ShellEvent::WindowUnmanaged(id), ShellEvent::Restacked]
    }

    pub fn switch_workspace(&self, to: usize) -> ShellEvent {
        let mut world = self.world.write().unwrap();
        let from = std::mem::replace(&mut world.active_workspace, to);
        ShellEvent::WorkspaceSwitched { from, to }
    }

    pub fn show_overview(&self) -> ShellEvent {
        self.world.write().unwrap().overview_visible = true;
        ShellEvent::OverviewShowing
    }

    pub fn hide_overview(&self) -> ShellEvent {
        self.world.write().unwrap().overview_visible = false;
        ShellEvent::OverviewHiding
    }

    pub fn set_viewport(&self, viewport: Rect) -> ShellEvent {
        self.world.write().unwrap().viewport = viewport;
        ShellEvent::ViewportChanged
    }

    pub fn window(&self, id: WindowId) -> Option<WindowInfo> {
        let world = self.world.read().unwrap();
        world
            .actors
            .iter()
            .find(|actor| actor.id == id)
            .and_then(|actor| actor.window.clone())
    }

    /// Live connections across every signal the shell emits.
    pub fn connections(&self) -> usize {
        self.world.read().unwrap().signals.len()
    }

    pub fn listeners(&self, topic: &Topic) -> usize {
        self.world.read().unwrap().signals.listeners(topic)
    }

    fn connect_topic(&self, topic: Topic) -> SignalId {
        self.world.write().unwrap().signals.connect(topic)
    }

    fn disconnect_signal(&self, id: SignalId) {
        if self.world.write().unwrap().signals.disconnect(id).is_none() {
            tracing::warn!(?id, "sim: disconnect of unknown signal");
        }
    }
}

impl WindowSystem for SimulatedShell {
    fn window_actors(&self) -> Vec<WindowActor> {
        self.world.read().unwrap().actors.clone()
    }

    fn active_workspace(&self) -> usize {
        self.world.read().unwrap().active_workspace
    }

    fn primary_monitor_index(&self) -> usize {
        self.world.read().unwrap().primary_monitor
    }

    fn connect_window(&mut self, window: WindowId, signal: WindowSignal) -> SignalId {
        self.connect_topic(Topic::Window(window, signal))
    }

    fn connect_global(&mut self, signal: GlobalSignal) -> SignalId {
        self.connect_topic(Topic::Global(signal))
    }

    fn disconnect(&mut self, id: SignalId) {
        self.disconnect_signal(id);
    }
}

impl OverviewHost for SimulatedShell {
    fn viewport(&self) -> Rect {
        self.world.read().unwrap().viewport
    }

    fn is_visible(&self) -> bool {
        self.world.read().unwrap().overview_visible
    }

    fn connect(&mut self, signal: OverviewSignal) -> SignalId {
        self.connect_topic(Topic::Overview(signal))
    }

    fn disconnect(&mut self, id: SignalId) {
        self.disconnect_signal(id);
    }
}

impl LayoutHost for SimulatedShell {
    fn primary_monitor(&self) -> Monitor {
        let world = self.world.read().unwrap();
        world.monitors[world.primary_monitor]
    }

    fn connect(&mut self, signal: LayoutSignal) -> SignalId {
        self.connect_topic(Topic::Layout(signal))
    }

    fn disconnect(&mut self, id: SignalId) {
        self.disconnect_signal(id);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shell::WindowType;

    pub(crate) fn window_at(x: f64) -> WindowInfo {
        WindowInfo {
            outer_rect: Rect::new(x, 40.0, 800.0, 600.0),
            kind: WindowType::Normal,
            workspace: 0,
            monitor: 0,
            showing_on_workspace: true,
        }
    }

    #[test]
    fn mutators_report_events() {
        let shell = SimulatedShell::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        let (id, created) = shell.open_window(window_at(300.0));
        assert_eq!(created, ShellEvent::WindowCreated(id));

        assert_eq!(
            shell.move_window(id, 10.0, 20.0),
            Some(ShellEvent::WindowPositionChanged(id))
        );
        assert_eq!(shell.window(id).unwrap().outer_rect.x, 10.0);

        assert_eq!(
            shell.close_window(id),
            vec![ShellEvent::WindowUnmanaged(id), ShellEvent::Restacked]
        );
        assert!(shell.close_window(id).is_empty());
        assert_eq!(shell.move_window(id, 0.0, 0.0), None);
    }

    #[test]
    fn clones_share_the_world() {
        let shell = SimulatedShell::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        let mut windows = shell.clone();
        let id = windows.connect_global(GlobalSignal::Restacked);
        assert_eq!(shell.connections(), 1);

        assert_eq!(
            shell.switch_workspace(2),
            ShellEvent::WorkspaceSwitched { from: 0, to: 2 }
        );
        assert_eq!(windows.active_workspace(), 2);

        WindowSystem::disconnect(&mut windows, id);
        assert_eq!(shell.connections(), 0);
    }

    #[test]
    fn bare_actors_have_no_window() {
        let shell = SimulatedShell::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        let id = shell.add_bare_actor();
        let actors = shell.window_actors();
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].id, id);
        assert!(actors[0].window.is_none());
    }
}
