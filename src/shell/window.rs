use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// Window kinds as reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    #[default]
    Normal,
    Desktop,
    Dock,
    Dialog,
    ModalDialog,
    Toolbar,
    Menu,
    Utility,
    Splashscreen,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Combo,
    Dnd,
    OverrideOther,
}

impl WindowType {
    /// Kinds that can cover the dock. Desktop and dock/panel windows never
    /// count, nor do transient override-redirect surfaces.
    pub fn is_handled(self) -> bool {
        matches!(
            self,
            WindowType::Normal
                | WindowType::Dialog
                | WindowType::ModalDialog
                | WindowType::Toolbar
                | WindowType::Menu
                | WindowType::Utility
                | WindowType::Splashscreen
        )
    }
}

/// Read-only view of a managed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub outer_rect: Rect,
    #[serde(default)]
    pub kind: WindowType,
    #[serde(default)]
    pub workspace: usize,
    #[serde(default)]
    pub monitor: usize,
    /// False while minimized or otherwise not showing on its workspace.
    #[serde(default = "default_showing")]
    pub showing_on_workspace: bool,
}

fn default_showing() -> bool {
    true
}

/// A compositor actor; `window` is `None` for actors with no backing window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowActor {
    pub id: WindowId,
    pub window: Option<WindowInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_and_docks_are_not_handled() {
        assert!(!WindowType::Desktop.is_handled());
        assert!(!WindowType::Dock.is_handled());
        assert!(!WindowType::Tooltip.is_handled());
        for kind in [
            WindowType::Normal,
            WindowType::Dialog,
            WindowType::ModalDialog,
            WindowType::Toolbar,
            WindowType::Menu,
            WindowType::Utility,
            WindowType::Splashscreen,
        ] {
            assert!(kind.is_handled(), "{kind:?}");
        }
    }

    #[test]
    fn window_info_defaults_from_toml() {
        let info: WindowInfo = toml::from_str(
            r#"
            outer_rect = { x = 10.0, y = 20.0, width = 300.0, height = 200.0 }
            kind = "modal-dialog"
            "#,
        )
        .expect("window should deserialize");
        assert_eq!(info.kind, WindowType::ModalDialog);
        assert_eq!(info.workspace, 0);
        assert!(info.showing_on_workspace);
    }
}
