//! Event loop driving a [`DockSession`] from an async host.
//!
//! Host notifications arrive on an mpsc channel; a frame interval advances the
//! tween timeline. The session holds `Rc` handles, so the loop runs on the
//! task that owns it rather than on a spawned one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::animation::AnimationPhase;
use crate::config::{SettingValue, SettingsKey, SettingsStore};
use crate::session::DockSession;
use crate::shell::{Shared, ShellEvent};

/// Default frame period, about 60 Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    Shell(ShellEvent),
    DisableAutohide,
    EnableAutohide,
    /// Write a setting; a change is forwarded to the session.
    Set(SettingsKey, SettingValue),
    Shutdown,
}

impl From<ShellEvent> for RuntimeEvent {
    fn from(event: ShellEvent) -> Self {
        RuntimeEvent::Shell(event)
    }
}

/// What happened while the runtime was up.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub events: usize,
    pub frames: u64,
    /// Every phase the dock entered, in order.
    pub transitions: Vec<AnimationPhase>,
    pub final_phase: AnimationPhase,
}

pub struct DockRuntime {
    session: DockSession,
    settings: Option<Shared<dyn SettingsStore>>,
    events: mpsc::Receiver<RuntimeEvent>,
    frame_interval: Duration,
}

impl DockRuntime {
    pub fn new(
        session: DockSession,
        settings: Option<Shared<dyn SettingsStore>>,
        events: mpsc::Receiver<RuntimeEvent>,
    ) -> Self {
        Self {
            session,
            settings,
            events,
            frame_interval: FRAME_INTERVAL,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// Run until [`RuntimeEvent::Shutdown`] arrives or every sender is gone,
    /// then destroy the session.
    pub async fn run(mut self) -> RunSummary {
        let started = Instant::now();
        let mut frames = interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_phase = self.session.phase();
        let mut summary = RunSummary {
            events: 0,
            frames: 0,
            transitions: Vec::new(),
            final_phase: last_phase,
        };
        info!(frame_interval = ?self.frame_interval, "dock runtime started");

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(RuntimeEvent::Shutdown) | None => break,
                    Some(event) => {
                        summary.events += 1;
                        self.dispatch(event);
                    }
                },
                tick = frames.tick() => {
                    self.session.tick(tick.duration_since(started));
                    summary.frames += 1;
                }
            }

            let phase = self.session.phase();
            if phase != last_phase {
                info!(?phase, x = self.session.dock().element().x, "dock phase changed");
                summary.transitions.push(phase);
                last_phase = phase;
            }
        }

        summary.final_phase = self.session.phase();
        self.session.destroy();
        info!(
            events = summary.events,
            frames = summary.frames,
            "dock runtime stopped"
        );
        summary
    }

    fn dispatch(&mut self, event: RuntimeEvent) {
        debug!(?event, "runtime: event");
        match event {
            RuntimeEvent::Shell(event) => self.session.handle_event(&event),
            RuntimeEvent::DisableAutohide => self.session.disable_autohide(),
            RuntimeEvent::EnableAutohide => self.session.enable_autohide(),
            RuntimeEvent::Set(key, value) => {
                let Some(store) = &self.settings else {
                    warn!(%key, "no settings store, ignoring change");
                    return;
                };
                let result = store.borrow_mut().set(key, value);
                match result {
                    Ok(true) => self
                        .session
                        .handle_event(&ShellEvent::SettingsChanged(key)),
                    Ok(false) => {}
                    Err(err) => warn!("rejected setting: {err}"),
                }
            }
            RuntimeEvent::Shutdown => {}
        }
    }
}
