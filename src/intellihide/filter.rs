use crate::shell::WindowActor;

/// Whether `actor` can overlap the dock: a handled window kind on the primary
/// monitor, on the active workspace and actually showing there.
pub fn is_interesting(actor: &WindowActor, active_workspace: usize, primary_monitor: usize) -> bool {
    let Some(window) = &actor.window else {
        return false;
    };
    window.kind.is_handled()
        && window.monitor == primary_monitor
        && window.workspace == active_workspace
        && window.showing_on_workspace
}

/// Leftmost outer edge among the interesting windows.
pub fn min_left_edge(
    actors: &[WindowActor],
    active_workspace: usize,
    primary_monitor: usize,
) -> Option<f64> {
    actors
        .iter()
        .filter(|actor| is_interesting(actor, active_workspace, primary_monitor))
        .filter_map(|actor| actor.window.as_ref())
        .map(|window| window.outer_rect.x)
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::shell::{WindowId, WindowInfo, WindowType};

    fn actor(id: u64, x: f64) -> WindowActor {
        WindowActor {
            id: WindowId(id),
            window: Some(WindowInfo {
                outer_rect: Rect::new(x, 0.0, 400.0, 300.0),
                kind: WindowType::Normal,
                workspace: 1,
                monitor: 0,
                showing_on_workspace: true,
            }),
        }
    }

    fn with(mut actor: WindowActor, update: impl FnOnce(&mut WindowInfo)) -> WindowActor {
        if let Some(window) = actor.window.as_mut() {
            update(window);
        }
        actor
    }

    #[test]
    fn minimum_edge_over_interesting_windows() {
        let actors = vec![actor(1, 300.0), actor(2, 50.0), actor(3, 120.0)];
        assert_eq!(min_left_edge(&actors, 1, 0), Some(50.0));
    }

    #[test]
    fn uninteresting_windows_are_skipped() {
        let actors = vec![
            actor(1, 500.0),
            with(actor(2, 0.0), |w| w.kind = WindowType::Desktop),
            with(actor(3, 0.0), |w| w.kind = WindowType::Dock),
            with(actor(4, 0.0), |w| w.workspace = 2),
            with(actor(5, 0.0), |w| w.monitor = 1),
            with(actor(6, 0.0), |w| w.showing_on_workspace = false),
            WindowActor {
                id: WindowId(7),
                window: None,
            },
        ];
        assert_eq!(min_left_edge(&actors, 1, 0), Some(500.0));
    }

    #[test]
    fn no_interesting_window() {
        assert_eq!(min_left_edge(&[], 0, 0), None);
        let dialog = with(actor(1, 10.0), |w| w.kind = WindowType::ModalDialog);
        assert!(is_interesting(&dialog, 1, 0));
        assert!(!is_interesting(&dialog, 0, 0));
    }

    #[test]
    fn negative_edges_compare_numerically() {
        let actors = vec![actor(1, 10.0), actor(2, -200.0)];
        assert_eq!(min_left_edge(&actors, 1, 0), Some(-200.0));
    }
}
