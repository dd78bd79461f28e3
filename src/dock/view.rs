use tracing::{debug, info};

use crate::animation::{
    AnimationPhase, StatusError, TweenEvent, TweenEventKind, TweenScheduler, TweenTarget,
    Visibility,
};
use crate::config::{DockSettings, SettingsKey, SettingsStore};
use crate::shell::{
    LayoutHost, LayoutSignal, OverviewHost, OverviewSignal, Shared, ShellEvent, SignalSource,
    Subscriptions, Topic,
};

use super::animator::VisibilityAnimator;
use super::background::BackgroundOpacityController;
use super::element::DockElement;
use super::hover::{HoverController, HoverPolicy};

/// Settings the view reacts to; the mode keys belong to the intellihide engine.
const VIEW_KEYS: [SettingsKey; 6] = [
    SettingsKey::AnimationTime,
    SettingsKey::ShowDelay,
    SettingsKey::HideDelay,
    SettingsKey::OpaqueBackground,
    SettingsKey::BackgroundOpacity,
    SettingsKey::OpaqueBackgroundAlways,
];

fn skip_busy<T>(result: Result<T, StatusError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("dock: request skipped: {err}");
            None
        }
    }
}

/// The docked panel: element, slide animator, hover handling and backing.
pub struct DockView {
    animator: VisibilityAnimator,
    hover: HoverController,
    background: BackgroundOpacityController,
    settings: DockSettings,
    store: Option<Shared<dyn SettingsStore>>,
    layout: Shared<dyn LayoutHost>,
    overview: Shared<dyn OverviewHost>,
    subscriptions: Subscriptions,
}

impl DockView {
    /// Build the dock on the primary monitor. Without a settings store the
    /// compiled defaults apply.
    pub fn new(
        scheduler: Shared<dyn TweenScheduler>,
        layout: Shared<dyn LayoutHost>,
        overview: Shared<dyn OverviewHost>,
        store: Option<Shared<dyn SettingsStore>>,
        content_width: f64,
    ) -> Self {
        let settings = store
            .as_ref()
            .map(|store| store.borrow().settings())
            .unwrap_or_default();
        let monitor = layout.borrow().primary_monitor();

        let mut subscriptions = Subscriptions::new();
        for signal in [LayoutSignal::DockHover, LayoutSignal::DockResized] {
            let id = layout.borrow_mut().connect(signal);
            subscriptions.push(SignalSource::Layout, Topic::Layout(signal), id);
        }
        let signal = OverviewSignal::ViewportChanged;
        let id = overview.borrow_mut().connect(signal);
        subscriptions.push(SignalSource::Overview, Topic::Overview(signal), id);
        if let Some(store) = &store {
            for key in VIEW_KEYS {
                let id = store.borrow_mut().connect_changed(key);
                subscriptions.push(SignalSource::Settings, Topic::Settings(key), id);
            }
        }

        debug!(monitor = monitor.index, content_width, "dock: created");
        Self {
            // starts parked off screen, see `initialize`
            animator: VisibilityAnimator::new(
                scheduler.clone(),
                monitor.geometry,
                content_width,
                Visibility::Hidden,
            ),
            hover: HoverController::new(),
            background: BackgroundOpacityController::new(scheduler, &settings),
            settings,
            store,
            layout,
            overview,
            subscriptions,
        }
    }

    /// Align with the overview, park the dock off screen and redisplay it.
    pub fn initialize(&mut self) {
        self.update_vertical_extent();
        self.animator.place_hidden();
        self.redisplay();
        info!(width = self.animator.element().width, "dock: initialized");
    }

    pub fn element(&self) -> &DockElement {
        self.animator.element()
    }

    pub fn phase(&self) -> AnimationPhase {
        self.animator.phase()
    }

    pub fn animator(&self) -> &VisibilityAnimator {
        &self.animator
    }

    pub fn background(&self) -> &BackgroundOpacityController {
        &self.background
    }

    pub fn hover_policy(&self) -> HoverPolicy {
        self.hover.policy()
    }

    pub fn settings(&self) -> &DockSettings {
        &self.settings
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Apply a host notification. Returns `false` for events the view is not
    /// subscribed to.
    pub fn handle_event(&mut self, event: &ShellEvent) -> bool {
        if !self.subscriptions.contains(&event.topic()) {
            return false;
        }
        let timing = self.settings.timing();
        match *event {
            ShellEvent::HoverChanged(hovering) => {
                skip_busy(
                    self.hover
                        .on_hover_changed(hovering, &mut self.animator, &timing),
                );
            }
            ShellEvent::DockResized { width } => {
                self.animator.set_width(width);
                self.redisplay();
            }
            ShellEvent::ViewportChanged => self.update_vertical_extent(),
            ShellEvent::SettingsChanged(key) => self.settings_changed(key),
            _ => return false,
        }
        true
    }

    pub fn handle_tween_event(&mut self, event: &TweenEvent) {
        match event.target {
            TweenTarget::DockPosition => {
                self.animator.handle_tween_event(event);
                if event.kind == TweenEventKind::Completed {
                    let timing = self.settings.timing();
                    skip_busy(self.hover.on_slide_finished(&mut self.animator, &timing));
                }
            }
            TweenTarget::BackgroundOpacity => self.background.handle_tween_event(event),
        }
    }

    /// Pin the dock on screen.
    pub fn disable_autohide(&mut self) {
        let timing = self.settings.timing();
        if let Some(true) = skip_busy(self.hover.disable_autohide(&mut self.animator, &timing)) {
            self.background.apply(&self.settings, self.hover.autohide());
        }
    }

    /// Let hover drive the dock again.
    pub fn enable_autohide(&mut self) {
        let timing = self.settings.timing();
        if let Some(true) = skip_busy(self.hover.enable_autohide(&mut self.animator, &timing)) {
            self.background.apply(&self.settings, self.hover.autohide());
        }
    }

    /// Lock the dock off screen.
    pub fn conceal(&mut self) {
        let timing = self.settings.timing();
        if let Some(true) = skip_busy(self.hover.conceal(&mut self.animator, &timing)) {
            self.background.apply(&self.settings, self.hover.autohide());
        }
    }

    fn redisplay(&mut self) {
        skip_busy(self.animator.redisplay(&self.settings.timing()));
        self.background.sync_box(self.settings.opaque_background);
    }

    fn update_vertical_extent(&mut self) {
        let viewport = self.overview.borrow().viewport();
        self.animator.set_vertical_extent(viewport.y, viewport.height);
    }

    fn settings_changed(&mut self, key: SettingsKey) {
        let Some(store) = &self.store else {
            return;
        };
        self.settings = store.borrow().settings();
        match key {
            SettingsKey::OpaqueBackground | SettingsKey::OpaqueBackgroundAlways => {
                self.background.apply(&self.settings, self.hover.autohide());
            }
            SettingsKey::BackgroundOpacity => {
                self.background.set_tint(self.settings.background_opacity);
            }
            // durations are read from the settings on every request
            _ => {}
        }
    }

    /// Disconnect every signal and stop all animations.
    pub fn destroy(mut self) {
        self.animator.remove_animations();
        self.background.remove_animations();

        let layout = &self.layout;
        let overview = &self.overview;
        let store = &self.store;
        self.subscriptions.drain(|source, id| match source {
            SignalSource::Layout => layout.borrow_mut().disconnect(id),
            SignalSource::Overview => overview.borrow_mut().disconnect(id),
            SignalSource::Settings => {
                if let Some(store) = store {
                    store.borrow_mut().disconnect(id);
                }
            }
            SignalSource::Windows => {}
        });
        info!("dock: destroyed");
    }
}
