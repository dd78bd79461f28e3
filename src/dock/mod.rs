//! The docked panel and everything that moves it.

mod animator;
mod background;
mod element;
mod hover;
mod view;

pub use animator::VisibilityAnimator;
pub use background::{background_visible, BackgroundOpacityController};
pub use element::DockElement;
pub use hover::{HoverController, HoverPolicy};
pub use view::DockView;
