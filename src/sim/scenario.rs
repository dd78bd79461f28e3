//! Scripted sessions for the simulated shell.
//!
//! A scenario is a TOML file with timed steps:
//!
//! ```toml
//! name = "editor covers the dock"
//! dock-width = 64.0
//!
//! [[step]]
//! at = 0.5
//! action = "open-window"
//! window = "editor"
//! x = 20.0
//! y = 40.0
//! width = 800.0
//! height = 600.0
//!
//! [[step]]
//! at = 2.0
//! action = "hover"
//! inside = true
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::{SettingValue, SettingsKey};
use crate::geometry::Rect;
use crate::runtime::RuntimeEvent;
use crate::shell::{ShellEvent, WindowId, WindowInfo, WindowType};

use super::SimulatedShell;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("step {step}: time {at} must be within a day of the start, not before the previous step")]
    Time { step: usize, at: f64 },
    #[error("step {step}: unknown window `{window}`")]
    UnknownWindow { step: usize, window: String },
    #[error("step {step}: window `{window}` is already open")]
    DuplicateWindow { step: usize, window: String },
    #[error("step {step}: unknown setting `{key}`")]
    UnknownSetting { step: usize, key: String },
    #[error("dock width must be positive, got {0}")]
    DockWidth(f64),
    #[error("step {step}: dock width must be positive, got {width}")]
    StepDockWidth { step: usize, width: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_monitor")]
    pub monitor: Rect,
    #[serde(default = "default_dock_width")]
    pub dock_width: f64,
    /// Seconds to keep running after the last step.
    #[serde(default = "default_linger")]
    pub linger: f64,
    #[serde(default, rename = "step")]
    pub steps: Vec<ScenarioStep>,
}

/// Latest time a step or the trailing linger may reach, seconds.
const MAX_SCENARIO_SECS: f64 = 86_400.0;

fn in_range(secs: f64) -> bool {
    (0.0..=MAX_SCENARIO_SECS).contains(&secs)
}

fn seconds(secs: f64) -> Duration {
    if in_range(secs) {
        Duration::from_secs_f64(secs)
    } else if secs > MAX_SCENARIO_SECS {
        Duration::from_secs_f64(MAX_SCENARIO_SECS)
    } else {
        Duration::ZERO
    }
}

fn default_monitor() -> Rect {
    Rect::new(0.0, 0.0, 1920.0, 1080.0)
}

fn default_dock_width() -> f64 {
    64.0
}

fn default_linger() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioStep {
    /// Seconds from the start of playback.
    pub at: f64,
    #[serde(flatten)]
    pub action: ScenarioAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ScenarioAction {
    OpenWindow {
        window: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        kind: WindowType,
        #[serde(default)]
        workspace: usize,
        #[serde(default)]
        monitor: usize,
    },
    MoveWindow {
        window: String,
        x: f64,
        y: f64,
    },
    ResizeWindow {
        window: String,
        width: f64,
        height: f64,
    },
    CloseWindow {
        window: String,
    },
    Minimize {
        window: String,
    },
    Restore {
        window: String,
    },
    SwitchWorkspace {
        to: usize,
    },
    Hover {
        inside: bool,
    },
    ShowOverview,
    HideOverview,
    ResizeDock {
        width: f64,
    },
    Set {
        key: String,
        value: SettingValue,
    },
    DisableAutohide,
    EnableAutohide,
}

impl ScenarioAction {
    fn window(&self) -> Option<&str> {
        match self {
            ScenarioAction::MoveWindow { window, .. }
            | ScenarioAction::ResizeWindow { window, .. }
            | ScenarioAction::CloseWindow { window }
            | ScenarioAction::Minimize { window }
            | ScenarioAction::Restore { window } => Some(window),
            _ => None,
        }
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Check timing, window references and setting names.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !valid_width(self.dock_width) {
            return Err(ScenarioError::DockWidth(self.dock_width));
        }
        if !in_range(self.linger) {
            return Err(ScenarioError::Time {
                step: self.steps.len(),
                at: self.linger,
            });
        }

        let mut previous = 0.0;
        let mut open = HashSet::new();
        for (step, entry) in self.steps.iter().enumerate() {
            if !in_range(entry.at) || entry.at < previous {
                return Err(ScenarioError::Time { step, at: entry.at });
            }
            previous = entry.at;

            if let Some(window) = entry.action.window() {
                if !open.contains(window) {
                    return Err(ScenarioError::UnknownWindow {
                        step,
                        window: window.to_string(),
                    });
                }
            }
            match &entry.action {
                ScenarioAction::OpenWindow { window, .. } => {
                    if !open.insert(window.as_str()) {
                        return Err(ScenarioError::DuplicateWindow {
                            step,
                            window: window.clone(),
                        });
                    }
                }
                ScenarioAction::CloseWindow { window } => {
                    open.remove(window.as_str());
                }
                ScenarioAction::ResizeDock { width } if !valid_width(*width) => {
                    return Err(ScenarioError::StepDockWidth {
                        step,
                        width: *width,
                    });
                }
                ScenarioAction::Set { key, .. } if SettingsKey::from_name(key).is_none() => {
                    return Err(ScenarioError::UnknownSetting {
                        step,
                        key: key.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Playback length including the trailing linger.
    pub fn duration(&self) -> Duration {
        let last = self.steps.last().map_or(0.0, |step| step.at);
        seconds(last).saturating_add(seconds(self.linger))
    }
}

fn valid_width(width: f64) -> bool {
    width.is_finite() && width > 0.0
}

/// Applies scenario actions to a [`SimulatedShell`] and reports the
/// resulting runtime events.
pub struct ScenarioPlayer {
    shell: SimulatedShell,
    windows: HashMap<String, WindowId>,
}

impl ScenarioPlayer {
    pub fn new(shell: SimulatedShell) -> Self {
        Self {
            shell,
            windows: HashMap::new(),
        }
    }

    pub fn apply(&mut self, action: &ScenarioAction) -> Vec<RuntimeEvent> {
        let resolve = |name: &str| {
            let id = self.windows.get(name).copied();
            if id.is_none() {
                warn!(window = name, "scenario: unknown window");
            }
            id
        };

        let events: Vec<ShellEvent> = match action {
            ScenarioAction::OpenWindow {
                window,
                x,
                y,
                width,
                height,
                kind,
                workspace,
                monitor,
            } => {
                let (id, created) = self.shell.open_window(WindowInfo {
                    outer_rect: Rect::new(*x, *y, *width, *height),
                    kind: *kind,
                    workspace: *workspace,
                    monitor: *monitor,
                    showing_on_workspace: true,
                });
                self.windows.insert(window.clone(), id);
                // mapping a window changes the stacking order
                vec![created, ShellEvent::Restacked]
            }
            ScenarioAction::MoveWindow { window, x, y } => resolve(window)
                .and_then(|id| self.shell.move_window(id, *x, *y))
                .into_iter()
                .collect(),
            ScenarioAction::ResizeWindow {
                window,
                width,
                height,
            } => resolve(window)
                .and_then(|id| self.shell.resize_window(id, *width, *height))
                .into_iter()
                .collect(),
            ScenarioAction::CloseWindow { window } => match resolve(window) {
                Some(id) => {
                    self.windows.remove(window);
                    self.shell.close_window(id)
                }
                None => Vec::new(),
            },
            ScenarioAction::Minimize { window } => resolve(window)
                .and_then(|id| self.shell.set_minimized(id, true))
                .into_iter()
                .collect(),
            ScenarioAction::Restore { window } => resolve(window)
                .and_then(|id| self.shell.set_minimized(id, false))
                .into_iter()
                .collect(),
            ScenarioAction::SwitchWorkspace { to } => vec![self.shell.switch_workspace(*to)],
            ScenarioAction::Hover { inside } => vec![ShellEvent::HoverChanged(*inside)],
            ScenarioAction::ShowOverview => vec![self.shell.show_overview()],
            ScenarioAction::HideOverview => vec![self.shell.hide_overview()],
            ScenarioAction::ResizeDock { width } => {
                vec![ShellEvent::DockResized { width: *width }]
            }
            ScenarioAction::Set { key, value } => {
                return SettingsKey::from_name(key)
                    .map(|key| RuntimeEvent::Set(key, *value))
                    .into_iter()
                    .collect();
            }
            ScenarioAction::DisableAutohide => return vec![RuntimeEvent::DisableAutohide],
            ScenarioAction::EnableAutohide => return vec![RuntimeEvent::EnableAutohide],
        };
        events.into_iter().map(RuntimeEvent::Shell).collect()
    }
}

/// Replay `scenario` in real time against `shell`, then ask the runtime to
/// shut down.
pub async fn play(scenario: Scenario, shell: SimulatedShell, events: mpsc::Sender<RuntimeEvent>) {
    let started = Instant::now();
    let mut player = ScenarioPlayer::new(shell);
    info!(name = %scenario.name, steps = scenario.steps.len(), "scenario: playing");

    for (index, step) in scenario.steps.iter().enumerate() {
        sleep_until(started + seconds(step.at)).await;
        debug!(step = index, action = ?step.action, "scenario: step");
        for event in player.apply(&step.action) {
            if events.send(event).await.is_err() {
                warn!("scenario: runtime went away");
                return;
            }
        }
    }

    sleep_until(started + scenario.duration()).await;
    // the runtime may already be gone
    let _ = events.send(RuntimeEvent::Shutdown).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationPhase, Tweener};
    use crate::config::{DockSettings, IntellihideMode, MemorySettings, SettingsStore};
    use crate::runtime::DockRuntime;
    use crate::session::DockSession;
    use crate::shell::{shared, Shared};

    const SAMPLE: &str = r#"
        name = "editor covers the dock"
        dock-width = 48
        linger = 0.5

        [monitor]
        x = 0
        y = 0
        width = 1280
        height = 800

        [[step]]
        at = 0.0
        action = "open-window"
        window = "editor"
        x = 20
        y = 40
        width = 800
        height = 600

        [[step]]
        at = 0.5
        action = "hover"
        inside = true

        [[step]]
        at = 1.0
        action = "set"
        key = "normal-mode"
        value = "autohide"

        [[step]]
        at = 1.5
        action = "close-window"
        window = "editor"
    "#;

    #[test]
    fn parses_sample() {
        let scenario: Scenario = SAMPLE.parse().unwrap();
        assert_eq!(scenario.name, "editor covers the dock");
        assert_eq!(scenario.dock_width, 48.0);
        assert_eq!(scenario.monitor, Rect::new(0.0, 0.0, 1280.0, 800.0));
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(
            scenario.steps[1].action,
            ScenarioAction::Hover { inside: true }
        );
        assert_eq!(
            scenario.steps[2].action,
            ScenarioAction::Set {
                key: "normal-mode".into(),
                value: SettingValue::Mode(IntellihideMode::Autohide),
            }
        );
        assert_eq!(scenario.duration(), Duration::from_secs(2));
    }

    #[test]
    fn rejects_unknown_window() {
        let text = r#"
            [[step]]
            at = 1.0
            action = "move-window"
            window = "ghost"
            x = 0
            y = 0
        "#;
        assert!(matches!(
            text.parse::<Scenario>(),
            Err(ScenarioError::UnknownWindow { step: 0, .. })
        ));
    }

    #[test]
    fn rejects_steps_out_of_order() {
        let text = r#"
            [[step]]
            at = 2.0
            action = "show-overview"

            [[step]]
            at = 1.0
            action = "hide-overview"
        "#;
        assert!(matches!(
            text.parse::<Scenario>(),
            Err(ScenarioError::Time { step: 1, .. })
        ));
    }

    #[test]
    fn rejects_times_out_of_range() {
        let far = r#"
            [[step]]
            at = 1e30
            action = "show-overview"
        "#;
        assert!(matches!(
            far.parse::<Scenario>(),
            Err(ScenarioError::Time { step: 0, .. })
        ));

        let linger = "linger = 1e19\n";
        assert!(matches!(
            linger.parse::<Scenario>(),
            Err(ScenarioError::Time { step: 0, .. })
        ));

        let unchecked = Scenario {
            name: String::new(),
            monitor: default_monitor(),
            dock_width: 64.0,
            linger: f64::MAX,
            steps: Vec::new(),
        };
        assert_eq!(unchecked.duration(), Duration::from_secs(86_400));
    }

    #[test]
    fn rejects_bad_dock_resize() {
        for width in ["0.0", "-12.0", "nan"] {
            let text = format!(
                "[[step]]\nat = 1.0\naction = \"resize-dock\"\nwidth = {width}\n"
            );
            assert!(matches!(
                text.parse::<Scenario>(),
                Err(ScenarioError::StepDockWidth { step: 0, .. })
            ));
        }
    }

    #[test]
    fn rejects_unknown_setting_and_reopen() {
        let unknown = r#"
            [[step]]
            at = 0.0
            action = "set"
            key = "dock-size"
            value = 2.0
        "#;
        assert!(matches!(
            unknown.parse::<Scenario>(),
            Err(ScenarioError::UnknownSetting { .. })
        ));

        let reopened = r#"
            [[step]]
            at = 0.0
            action = "open-window"
            window = "a"
            x = 0
            y = 0
            width = 10
            height = 10

            [[step]]
            at = 0.1
            action = "open-window"
            window = "a"
            x = 0
            y = 0
            width = 10
            height = 10
        "#;
        assert!(matches!(
            reopened.parse::<Scenario>(),
            Err(ScenarioError::DuplicateWindow { step: 1, .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Read { .. }));
    }

    #[test]
    fn player_translates_actions() {
        let shell = SimulatedShell::new(default_monitor());
        let mut player = ScenarioPlayer::new(shell.clone());

        let events = player.apply(&ScenarioAction::OpenWindow {
            window: "term".into(),
            x: 5.0,
            y: 5.0,
            width: 300.0,
            height: 200.0,
            kind: WindowType::Normal,
            workspace: 0,
            monitor: 0,
        });
        let id = WindowId(1);
        assert_eq!(
            events,
            vec![
                RuntimeEvent::Shell(ShellEvent::WindowCreated(id)),
                RuntimeEvent::Shell(ShellEvent::Restacked),
            ]
        );

        let events = player.apply(&ScenarioAction::MoveWindow {
            window: "term".into(),
            x: 90.0,
            y: 5.0,
        });
        assert_eq!(
            events,
            vec![RuntimeEvent::Shell(ShellEvent::WindowPositionChanged(id))]
        );
        assert_eq!(shell.window(id).unwrap().outer_rect.x, 90.0);

        let events = player.apply(&ScenarioAction::CloseWindow {
            window: "term".into(),
        });
        assert_eq!(events.len(), 2);
        assert!(player
            .apply(&ScenarioAction::Minimize {
                window: "term".into()
            })
            .is_empty());
    }

    #[tokio::test]
    async fn plays_against_runtime() {
        let text = r#"
            linger = 0.1

            [[step]]
            at = 0.0
            action = "open-window"
            window = "editor"
            x = 10
            y = 0
            width = 800
            height = 600

            [[step]]
            at = 0.05
            action = "hover"
            inside = true
        "#;
        let scenario: Scenario = text.parse().unwrap();
        let shell = SimulatedShell::new(scenario.monitor);
        let store = shared(MemorySettings::new(DockSettings {
            animation_time: 0.0,
            show_delay: 0.0,
            hide_delay: 0.0,
            ..DockSettings::default()
        }));
        let settings: Shared<dyn SettingsStore> = store.clone();
        let session = DockSession::new(
            shell.collaborators(shared(Tweener::new()), Some(settings.clone())),
            scenario.dock_width,
        );

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(play(scenario, shell.clone(), tx));
        let summary = DockRuntime::new(session, Some(settings), rx)
            .with_frame_interval(Duration::from_millis(5))
            .run()
            .await;

        assert_eq!(summary.final_phase, AnimationPhase::Shown);
        assert!(summary.transitions.contains(&AnimationPhase::Hidden));
        assert_eq!(shell.connections(), 0);
    }
}
