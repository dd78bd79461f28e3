//! Dock visibility controller: slides a dock panel in and out of the screen
//! edge from pointer hover and from overlap with other windows.

pub mod animation;
pub mod config;
pub mod dock;
pub mod geometry;
pub mod intellihide;
pub mod runtime;
pub mod session;
pub mod shell;
pub mod sim;

pub use dock::DockView;
pub use intellihide::{DockIntent, IntellihideEngine};
pub use runtime::{DockRuntime, RunSummary, RuntimeEvent};
pub use session::{Collaborators, DockSession};
