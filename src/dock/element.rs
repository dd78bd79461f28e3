use crate::geometry::Rect;

/// The dock's on-screen container. Only the animator writes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DockElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Normalised opacity, `0.0..=1.0`.
    pub opacity: f64,
    /// Visible sub-region in local coordinates; `None` before the first layout.
    pub clip: Option<Rect>,
}

impl DockElement {
    pub fn new(width: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height: 0.0,
            // invisible until positioned
            opacity: 0.0,
            clip: None,
        }
    }

    /// Clip translated back into screen space.
    pub fn screen_clip(&self) -> Option<Rect> {
        self.clip.map(|clip| clip.translated(self.x, self.y))
    }
}
