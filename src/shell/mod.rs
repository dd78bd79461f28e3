//! Interfaces to the host shell.
//!
//! The dock never reaches for global state: every collaborator is handed to
//! the component that needs it at construction time, so tests and the
//! simulator can stand in for the real shell.

use std::{cell::RefCell, rc::Rc};

use crate::geometry::{Monitor, Rect};

pub mod signals;
pub mod window;

pub use signals::{
    GlobalSignal, LayoutSignal, OverviewSignal, ShellEvent, SignalId, SignalRegistry,
    SignalSource, Subscriptions, Topic, WindowSignal,
};
pub use window::{WindowActor, WindowId, WindowInfo, WindowType};

/// Single-threaded shared handle to a collaborator.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Window manager state and its signals.
pub trait WindowSystem {
    /// All window actors, bottom to top.
    fn window_actors(&self) -> Vec<WindowActor>;
    fn active_workspace(&self) -> usize;
    fn primary_monitor_index(&self) -> usize;

    fn connect_window(&mut self, window: WindowId, signal: WindowSignal) -> SignalId;
    fn connect_global(&mut self, signal: GlobalSignal) -> SignalId;
    fn disconnect(&mut self, id: SignalId);
}

/// The overview: a separate shell mode with its own dock policy.
pub trait OverviewHost {
    /// Region of the overview the dock is aligned with.
    fn viewport(&self) -> Rect;
    fn is_visible(&self) -> bool;

    fn connect(&mut self, signal: OverviewSignal) -> SignalId;
    fn disconnect(&mut self, id: SignalId);
}

/// The chrome hosting the dock actor.
pub trait LayoutHost {
    fn primary_monitor(&self) -> Monitor;

    fn connect(&mut self, signal: LayoutSignal) -> SignalId;
    fn disconnect(&mut self, id: SignalId);
}
