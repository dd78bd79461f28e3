//! Window-overlap driven dock visibility.
//!
//! The engine watches window geometry, workspace and overview changes and
//! decides whether the dock should be shown, hidden behind autohide, or
//! concealed. Decisions are returned as [`DockIntent`]s; applying them is up
//! to the caller.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::{IntellihideMode, SettingsKey, SettingsStore};
use crate::shell::{
    GlobalSignal, OverviewHost, OverviewSignal, Shared, ShellEvent, SignalId, SignalSource,
    Subscriptions, Topic, WindowId, WindowSignal, WindowSystem,
};

pub mod filter;

pub use filter::{is_interesting, min_left_edge};

/// What the engine wants the dock to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockIntent {
    /// Keep the dock on screen.
    Show,
    /// Hide the dock, leaving it to hover.
    Hide,
    /// Keep the dock off screen whatever the pointer does.
    Conceal,
}

const WINDOW_SIGNALS: [WindowSignal; 3] = [
    WindowSignal::PositionChanged,
    WindowSignal::SizeChanged,
    WindowSignal::Unmanaged,
];

pub struct IntellihideEngine {
    windows: Shared<dyn WindowSystem>,
    overview: Shared<dyn OverviewHost>,
    store: Option<Shared<dyn SettingsStore>>,
    normal_mode: IntellihideMode,
    overview_mode: IntellihideMode,
    in_overview: bool,
    /// Distance from the monitor edge below which a window hides the dock.
    offset: f64,
    decision: Option<DockIntent>,
    subscriptions: Subscriptions,
    /// Per-window connections, keyed by window.
    tracked: HashMap<WindowId, Vec<SignalId>>,
}

impl IntellihideEngine {
    pub fn new(
        windows: Shared<dyn WindowSystem>,
        overview: Shared<dyn OverviewHost>,
        store: Option<Shared<dyn SettingsStore>>,
    ) -> Self {
        let settings = store
            .as_ref()
            .map(|store| store.borrow().settings())
            .unwrap_or_default();

        let mut subscriptions = Subscriptions::new();
        for signal in [
            GlobalSignal::WindowCreated,
            GlobalSignal::SwitchWorkspace,
            GlobalSignal::Restacked,
        ] {
            let id = windows.borrow_mut().connect_global(signal);
            subscriptions.push(SignalSource::Windows, Topic::Global(signal), id);
        }
        for signal in [OverviewSignal::Showing, OverviewSignal::Hiding] {
            let id = overview.borrow_mut().connect(signal);
            subscriptions.push(SignalSource::Overview, Topic::Overview(signal), id);
        }
        if let Some(store) = &store {
            for key in [SettingsKey::NormalMode, SettingsKey::OverviewMode] {
                let id = store.borrow_mut().connect_changed(key);
                subscriptions.push(SignalSource::Settings, Topic::Settings(key), id);
            }
        }
        let in_overview = overview.borrow().is_visible();

        let mut engine = Self {
            windows,
            overview,
            store,
            normal_mode: settings.normal_mode,
            overview_mode: settings.overview_mode,
            in_overview,
            offset: 0.0,
            decision: None,
            subscriptions,
            tracked: HashMap::new(),
        };
        engine.track_existing_windows();
        engine
    }

    /// Force an initial show, then evaluate against the dock width.
    pub fn start(&mut self, dock_width: f64) -> Vec<DockIntent> {
        info!(
            normal = ?self.normal_mode,
            overview = ?self.overview_mode,
            "intellihide: started"
        );
        self.show(true)
            .into_iter()
            .chain(self.update_offset(dock_width))
            .collect()
    }

    pub fn decision(&self) -> Option<DockIntent> {
        self.decision
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn in_overview(&self) -> bool {
        self.in_overview
    }

    pub fn is_tracking(&self, window: WindowId) -> bool {
        self.tracked.contains_key(&window)
    }

    pub fn tracked_windows(&self) -> usize {
        self.tracked.len()
    }

    fn is_subscribed(&self, topic: &Topic) -> bool {
        match topic {
            Topic::Window(window, _) => self.tracked.contains_key(window),
            topic => self.subscriptions.contains(topic),
        }
    }

    pub fn handle_event(&mut self, event: &ShellEvent) -> Option<DockIntent> {
        if !self.is_subscribed(&event.topic()) {
            return None;
        }
        match *event {
            ShellEvent::WindowCreated(window) => {
                self.track_window(window);
                None
            }
            ShellEvent::WindowUnmanaged(window) => {
                self.untrack_window(window);
                self.update_dock_visibility()
            }
            ShellEvent::WindowPositionChanged(_)
            | ShellEvent::WindowSizeChanged(_)
            | ShellEvent::WorkspaceSwitched { .. }
            | ShellEvent::Restacked => self.update_dock_visibility(),
            ShellEvent::OverviewShowing => self.overview_enter(),
            ShellEvent::OverviewHiding => self.overview_exit(),
            ShellEvent::SettingsChanged(key) => self.settings_changed(key),
            _ => None,
        }
    }

    /// The dock width changed.
    pub fn update_offset(&mut self, dock_width: f64) -> Option<DockIntent> {
        self.offset = dock_width;
        self.update_dock_visibility()
    }

    pub fn update_dock_visibility(&mut self) -> Option<DockIntent> {
        if self.in_overview && self.overview_mode != IntellihideMode::Intellihide {
            return None;
        }
        let mode = if self.in_overview {
            self.overview_mode
        } else {
            self.normal_mode
        };
        match mode {
            IntellihideMode::Autohide => self.hide(false),
            IntellihideMode::Show => self.show(false),
            IntellihideMode::Hide => self.conceal(false),
            IntellihideMode::Intellihide => {
                let edge = {
                    let windows = self.windows.borrow();
                    min_left_edge(
                        &windows.window_actors(),
                        windows.active_workspace(),
                        windows.primary_monitor_index(),
                    )
                };
                match edge {
                    Some(edge) if edge < self.offset => self.hide(false),
                    _ => self.show(false),
                }
            }
        }
    }

    fn overview_enter(&mut self) -> Option<DockIntent> {
        self.in_overview = true;
        match self.overview_mode {
            IntellihideMode::Show | IntellihideMode::Intellihide => self.show(false),
            IntellihideMode::Autohide => self.hide(false),
            IntellihideMode::Hide => self.conceal(false),
        }
    }

    fn overview_exit(&mut self) -> Option<DockIntent> {
        self.in_overview = false;
        self.update_dock_visibility()
    }

    fn settings_changed(&mut self, key: SettingsKey) -> Option<DockIntent> {
        let settings = self.store.as_ref()?.borrow().settings();
        self.normal_mode = settings.normal_mode;
        self.overview_mode = settings.overview_mode;
        debug!(%key, normal = ?self.normal_mode, overview = ?self.overview_mode, "intellihide: modes reloaded");
        match key {
            SettingsKey::OverviewMode if self.in_overview => self.overview_enter(),
            _ => self.update_dock_visibility(),
        }
    }

    fn decide(&mut self, intent: DockIntent, force: bool) -> Option<DockIntent> {
        if self.decision == Some(intent) && !force {
            return None;
        }
        debug!(?intent, from = ?self.decision, force, "intellihide: decision");
        self.decision = Some(intent);
        Some(intent)
    }

    fn show(&mut self, force: bool) -> Option<DockIntent> {
        self.decide(DockIntent::Show, force)
    }

    fn hide(&mut self, force: bool) -> Option<DockIntent> {
        self.decide(DockIntent::Hide, force)
    }

    fn conceal(&mut self, force: bool) -> Option<DockIntent> {
        self.decide(DockIntent::Conceal, force)
    }

    fn track_existing_windows(&mut self) {
        let actors = self.windows.borrow().window_actors();
        for actor in actors.iter().filter(|actor| actor.window.is_some()) {
            self.track_window(actor.id);
        }
    }

    /// Connect the per-window signals, dropping any earlier connection first.
    fn track_window(&mut self, window: WindowId) {
        self.untrack_window(window);
        let mut windows = self.windows.borrow_mut();
        let ids = WINDOW_SIGNALS
            .iter()
            .map(|signal| windows.connect_window(window, *signal))
            .collect();
        self.tracked.insert(window, ids);
    }

    fn untrack_window(&mut self, window: WindowId) {
        if let Some(ids) = self.tracked.remove(&window) {
            let mut windows = self.windows.borrow_mut();
            for id in ids {
                windows.disconnect(id);
            }
        }
    }

    /// Disconnect everything the engine subscribed to.
    pub fn destroy(mut self) {
        let tracked: Vec<WindowId> = self.tracked.keys().copied().collect();
        for window in tracked {
            self.untrack_window(window);
        }

        let windows = &self.windows;
        let overview = &self.overview;
        let store = &self.store;
        self.subscriptions.drain(|source, id| match source {
            SignalSource::Windows => windows.borrow_mut().disconnect(id),
            SignalSource::Overview => overview.borrow_mut().disconnect(id),
            SignalSource::Settings => {
                if let Some(store) = store {
                    store.borrow_mut().disconnect(id);
                }
            }
            SignalSource::Layout => {}
        });
        info!("intellihide: destroyed");
    }
}
