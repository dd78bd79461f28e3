use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shift the rectangle by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A physical output as seen by the layout host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    pub index: usize,
    pub geometry: Rect,
}

/// Clip rectangle for the dock, in the dock's local coordinate space.
///
/// The clip covers the monitor starting at `anchor_x` (the dock's on-screen
/// position). While the dock slides, the clip moves the opposite way so that
/// its footprint on screen never changes: translating the result by
/// `(element_x, element_y)` always yields
/// `[anchor_x, monitor.y, anchor_x + monitor.width, monitor.y + monitor.height]`.
pub fn dock_clip(anchor_x: f64, monitor: &Rect, element_x: f64, element_y: f64) -> Rect {
    let screen = Rect::new(anchor_x, monitor.y, monitor.width, monitor.height);
    screen.translated(-element_x, -element_y)
}
