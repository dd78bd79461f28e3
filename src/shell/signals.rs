use std::collections::BTreeMap;

use crate::config::SettingsKey;

use super::window::WindowId;

/// Handle returned by every `connect` call on a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WindowSignal {
    PositionChanged,
    SizeChanged,
    /// The window is about to be destroyed; its id becomes invalid afterwards.
    Unmanaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalSignal {
    WindowCreated,
    SwitchWorkspace,
    /// Stacking order changed, e.g. a window was closed.
    Restacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverviewSignal {
    Showing,
    Hiding,
    ViewportChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayoutSignal {
    /// Pointer entered or left the dock.
    DockHover,
    /// The dock content changed width.
    DockResized,
}

/// Anything a component can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Window(WindowId, WindowSignal),
    Global(GlobalSignal),
    Overview(OverviewSignal),
    Layout(LayoutSignal),
    Settings(SettingsKey),
}

/// Which collaborator a subscription was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalSource {
    Windows,
    Overview,
    Layout,
    Settings,
}

/// Notification delivered by the host to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellEvent {
    HoverChanged(bool),
    DockResized { width: f64 },
    WindowCreated(WindowId),
    WindowUnmanaged(WindowId),
    WindowPositionChanged(WindowId),
    WindowSizeChanged(WindowId),
    WorkspaceSwitched { from: usize, to: usize },
    Restacked,
    OverviewShowing,
    OverviewHiding,
    ViewportChanged,
    SettingsChanged(SettingsKey),
}

impl ShellEvent {
    pub fn topic(&self) -> Topic {
        match *self {
            ShellEvent::HoverChanged(_) => Topic::Layout(LayoutSignal::DockHover),
            ShellEvent::DockResized { .. } => Topic::Layout(LayoutSignal::DockResized),
            ShellEvent::WindowCreated(_) => Topic::Global(GlobalSignal::WindowCreated),
            ShellEvent::WindowUnmanaged(id) => Topic::Window(id, WindowSignal::Unmanaged),
            ShellEvent::WindowPositionChanged(id) => {
                Topic::Window(id, WindowSignal::PositionChanged)
            }
            ShellEvent::WindowSizeChanged(id) => Topic::Window(id, WindowSignal::SizeChanged),
            ShellEvent::WorkspaceSwitched { .. } => Topic::Global(GlobalSignal::SwitchWorkspace),
            ShellEvent::Restacked => Topic::Global(GlobalSignal::Restacked),
            ShellEvent::OverviewShowing => Topic::Overview(OverviewSignal::Showing),
            ShellEvent::OverviewHiding => Topic::Overview(OverviewSignal::Hiding),
            ShellEvent::ViewportChanged => Topic::Overview(OverviewSignal::ViewportChanged),
            ShellEvent::SettingsChanged(key) => Topic::Settings(key),
        }
    }
}

/// Connection table kept by a signal emitter.
#[derive(Debug, Default, Clone)]
pub struct SignalRegistry {
    next: u64,
    connected: BTreeMap<SignalId, Topic>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, topic: Topic) -> SignalId {
        self.next += 1;
        let id = SignalId(self.next);
        self.connected.insert(id, topic);
        id
    }

    pub fn disconnect(&mut self, id: SignalId) -> Option<Topic> {
        self.connected.remove(&id)
    }

    pub fn is_connected(&self, topic: &Topic) -> bool {
        self.connected.values().any(|t| t == topic)
    }

    /// Number of live connections for `topic`.
    pub fn listeners(&self, topic: &Topic) -> usize {
        self.connected.values().filter(|t| *t == topic).count()
    }

    pub fn len(&self) -> usize {
        self.connected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connected.is_empty()
    }
}

/// Connections held by a subscriber, kept so teardown is a plain traversal.
#[derive(Debug, Default)]
pub struct Subscriptions {
    handles: Vec<(SignalSource, Topic, SignalId)>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: SignalSource, topic: Topic, id: SignalId) {
        self.handles.push((source, topic, id));
    }

    pub fn contains(&self, topic: &Topic) -> bool {
        self.handles.iter().any(|(_, t, _)| t == topic)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Hand every handle to `disconnect` and forget them.
    pub fn drain(&mut self, mut disconnect: impl FnMut(SignalSource, SignalId)) {
        for (source, _, id) in self.handles.drain(..) {
            disconnect(source, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_connections() {
        let mut registry = SignalRegistry::new();
        let topic = Topic::Global(GlobalSignal::Restacked);
        let a = registry.connect(topic);
        let b = registry.connect(topic);
        assert_ne!(a, b);
        assert_eq!(registry.listeners(&topic), 2);

        assert_eq!(registry.disconnect(a), Some(topic));
        assert_eq!(registry.disconnect(a), None);
        assert!(registry.is_connected(&topic));
        registry.disconnect(b);
        assert!(registry.is_empty());
    }

    #[test]
    fn events_map_to_their_topic() {
        let id = WindowId(7);
        assert_eq!(
            ShellEvent::WindowSizeChanged(id).topic(),
            Topic::Window(id, WindowSignal::SizeChanged)
        );
        assert_eq!(
            ShellEvent::HoverChanged(true).topic(),
            Topic::Layout(LayoutSignal::DockHover)
        );
        assert_eq!(
            ShellEvent::SettingsChanged(SettingsKey::NormalMode).topic(),
            Topic::Settings(SettingsKey::NormalMode)
        );
    }

    #[test]
    fn drain_disconnects_everything() {
        let mut subscriptions = Subscriptions::new();
        let topic = Topic::Overview(OverviewSignal::Showing);
        subscriptions.push(SignalSource::Overview, topic, SignalId(1));
        subscriptions.push(SignalSource::Layout, Topic::Layout(LayoutSignal::DockHover), SignalId(2));
        assert!(subscriptions.contains(&topic));

        let mut seen = Vec::new();
        subscriptions.drain(|source, id| seen.push((source, id)));
        assert_eq!(
            seen,
            vec![
                (SignalSource::Overview, SignalId(1)),
                (SignalSource::Layout, SignalId(2))
            ]
        );
        assert!(subscriptions.is_empty());
    }
}
