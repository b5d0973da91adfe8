//! Controls for user interaction with the plot.
use glam::DVec2;
use iced_core::mouse;

use crate::screen::ScreenMapper;

/// Configures user interaction behavior for [`crate::PlotView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotControls {
    /// Enables rotating 3D views by dragging with the left mouse button.
    pub drag_to_rotate: bool,

    /// Enables zooming 3D views with the mouse wheel.
    pub scroll_to_zoom: bool,

    /// Zoom applied per wheel notch; values above 1 enlarge the plot.
    pub zoom_step: f64,

    /// Enables point highlighting while hovering.
    pub highlight_on_hover: bool,

    /// Distance in pixels within which a point counts as hovered.
    pub hover_radius_px: f64,
}

// In keeping with our batteries-included philosophy, most everything is enabled by default.

impl Default for PlotControls {
    fn default() -> Self {
        Self {
            drag_to_rotate: true,
            scroll_to_zoom: true,
            zoom_step: 1.1,
            highlight_on_hover: true,
            hover_radius_px: 8.0,
        }
    }
}

/// Phase of a rotation gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        /// Cursor position at the last applied delta.
        last: DVec2,
    },
}

/// Turns raw mouse events into rotation deltas.
///
/// A left press inside the plot area starts a drag; every cursor move while
/// dragging yields the pixel delta since the previous move. Release or the
/// cursor leaving the canvas ends the drag. Deltas already handed out are not
/// rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationDrag {
    phase: DragPhase,
    cursor: Option<DVec2>,
}

impl RotationDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Last known cursor position over the canvas.
    pub fn cursor(&self) -> Option<DVec2> {
        self.cursor
    }

    /// Start dragging at `position` if it lies inside the plot area.
    pub fn press(&mut self, position: DVec2, mapper: &ScreenMapper) -> bool {
        if mapper.contains(position) {
            self.phase = DragPhase::Dragging { last: position };
            true
        } else {
            false
        }
    }

    /// Track the cursor; returns the delta to apply while dragging.
    pub fn moved(&mut self, position: DVec2) -> Option<DVec2> {
        self.cursor = Some(position);
        match &mut self.phase {
            DragPhase::Dragging { last } => {
                let delta = position - *last;
                *last = position;
                Some(delta)
            }
            DragPhase::Idle => None,
        }
    }

    pub fn release(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Feed one mouse event; returns a rotation delta when one should be applied.
    pub fn handle_event(&mut self, event: &mouse::Event, mapper: &ScreenMapper) -> Option<DVec2> {
        match event {
            mouse::Event::CursorMoved { position } => {
                self.moved(DVec2::new(position.x as f64, position.y as f64))
            }
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                if let Some(cursor) = self.cursor {
                    self.press(cursor, mapper);
                }
                None
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                self.release();
                None
            }
            mouse::Event::CursorLeft => {
                self.release();
                self.cursor = None;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced_core::Point;

    fn moved(x: f32, y: f32) -> mouse::Event {
        mouse::Event::CursorMoved {
            position: Point::new(x, y),
        }
    }

    #[test]
    fn drag_yields_deltas() {
        let mapper = ScreenMapper::default();
        let mut drag = RotationDrag::new();
        assert_eq!(drag.handle_event(&moved(100.0, 100.0), &mapper), None);
        drag.handle_event(&mouse::Event::ButtonPressed(mouse::Button::Left), &mapper);
        assert!(drag.is_dragging());
        assert_eq!(
            drag.handle_event(&moved(110.0, 95.0), &mapper),
            Some(DVec2::new(10.0, -5.0))
        );
        assert_eq!(
            drag.handle_event(&moved(111.0, 95.0), &mapper),
            Some(DVec2::new(1.0, 0.0))
        );
        drag.handle_event(&mouse::Event::ButtonReleased(mouse::Button::Left), &mapper);
        assert_eq!(drag.handle_event(&moved(150.0, 150.0), &mapper), None);
    }

    #[test]
    fn press_outside_plot_area_is_ignored() {
        let mapper = ScreenMapper::default();
        let mut drag = RotationDrag::new();
        drag.handle_event(&moved(5.0, 5.0), &mapper);
        drag.handle_event(&mouse::Event::ButtonPressed(mouse::Button::Left), &mapper);
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert_eq!(drag.handle_event(&moved(100.0, 100.0), &mapper), None);
    }

    #[test]
    fn leaving_canvas_cancels() {
        let mapper = ScreenMapper::default();
        let mut drag = RotationDrag::new();
        drag.handle_event(&moved(100.0, 100.0), &mapper);
        drag.handle_event(&mouse::Event::ButtonPressed(mouse::Button::Left), &mapper);
        drag.handle_event(&mouse::Event::CursorLeft, &mapper);
        assert!(!drag.is_dragging());
        assert_eq!(drag.cursor(), None);
        // A press without a known cursor cannot start a drag.
        drag.handle_event(&mouse::Event::ButtonPressed(mouse::Button::Left), &mapper);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn right_button_does_not_drag() {
        let mapper = ScreenMapper::default();
        let mut drag = RotationDrag::new();
        drag.handle_event(&moved(100.0, 100.0), &mapper);
        drag.handle_event(&mouse::Event::ButtonPressed(mouse::Button::Right), &mapper);
        assert!(!drag.is_dragging());
    }
}
