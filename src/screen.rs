use glam::DVec2;
use iced_core::{Padding, Point, Rectangle};

/// Canvas size used until the surrounding layer reports a real one.
pub const DEFAULT_CANVAS_SIZE: (f32, f32) = (640.0, 480.0);
/// Margin kept free around the plot area for axis labels, in pixels.
pub const DEFAULT_MARGIN_PX: f32 = 40.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
/// A projected point in canvas pixels, ready to be uploaded by a renderer.
pub struct ScreenVertex {
    /// Position in pixels, relative to the canvas origin (y down).
    pub position: [f32; 2],
    /// Normalised weight for aggregate plots (bin counts, grid values); zero otherwise.
    pub value: f32,
    /// Index of the source row, bin or cell in the owning plot.
    pub index: u32,
}

impl ScreenVertex {
    pub fn new(position: DVec2, value: f64, index: usize) -> Self {
        Self {
            position: position.as_vec2().to_array(),
            value: value as f32,
            index: index as u32,
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.position[0] as f64, self.position[1] as f64)
    }
}

/// Reinterpret vertices as raw bytes for a vertex buffer.
pub fn as_bytes(vertices: &[ScreenVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Maps normalised plot ratios onto canvas pixels.
///
/// The plot area is `bounds` shrunk by `margins`. Ratio `(0, 0)` is the lower
/// left corner of that area and `(1, 1)` the upper right; screen y grows
/// downwards, so the vertical ratio is flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapper {
    pub bounds: Rectangle,
    pub margins: Padding,
}

impl Default for ScreenMapper {
    fn default() -> Self {
        Self {
            bounds: Rectangle {
                x: 0.0,
                y: 0.0,
                width: DEFAULT_CANVAS_SIZE.0,
                height: DEFAULT_CANVAS_SIZE.1,
            },
            margins: Padding::new(DEFAULT_MARGIN_PX),
        }
    }
}

impl ScreenMapper {
    pub fn new(bounds: Rectangle, margins: Padding) -> Self {
        Self { bounds, margins }
    }

    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }

    /// Canvas area left for data once the margins are removed.
    pub fn plot_area(&self) -> Rectangle {
        let width = (self.bounds.width - self.margins.left - self.margins.right).max(0.0);
        let height = (self.bounds.height - self.margins.top - self.margins.bottom).max(0.0);
        Rectangle {
            x: self.bounds.x + self.margins.left,
            y: self.bounds.y + self.margins.top,
            width,
            height,
        }
    }

    /// Pixel position of a plot ratio.
    pub fn ratio_to_screen(&self, ratio: [f64; 2]) -> DVec2 {
        let area = self.plot_area();
        DVec2::new(
            area.x as f64 + ratio[0] * area.width as f64,
            area.y as f64 + (1.0 - ratio[1]) * area.height as f64,
        )
    }

    /// Plot ratio under a pixel position; `None` while the plot area is empty.
    pub fn screen_to_ratio(&self, position: DVec2) -> Option<[f64; 2]> {
        let area = self.plot_area();
        if area.width <= 0.0 || area.height <= 0.0 {
            return None;
        }
        Some([
            (position.x - area.x as f64) / area.width as f64,
            1.0 - (position.y - area.y as f64) / area.height as f64,
        ])
    }

    /// Whether a pixel position lies inside the plot area.
    pub fn contains(&self, position: DVec2) -> bool {
        self.plot_area()
            .contains(Point::new(position.x as f32, position.y as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> ScreenMapper {
        ScreenMapper::new(
            Rectangle {
                x: 10.0,
                y: 20.0,
                width: 220.0,
                height: 120.0,
            },
            Padding::new(10.0),
        )
    }

    #[test]
    fn corners_map_to_plot_area() {
        let m = mapper();
        assert_eq!(m.ratio_to_screen([0.0, 0.0]), DVec2::new(20.0, 130.0));
        assert_eq!(m.ratio_to_screen([1.0, 1.0]), DVec2::new(220.0, 30.0));
        assert_eq!(m.ratio_to_screen([0.5, 0.5]), DVec2::new(120.0, 80.0));
    }

    #[test]
    fn screen_to_ratio_inverts() {
        let m = mapper();
        let r = m.screen_to_ratio(DVec2::new(70.0, 105.0)).unwrap();
        assert!((r[0] - 0.25).abs() < 1e-12);
        assert!((r[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_area_has_no_ratio() {
        let m = ScreenMapper::new(
            Rectangle {
                x: 0.0,
                y: 0.0,
                width: 15.0,
                height: 100.0,
            },
            Padding::new(10.0),
        );
        assert_eq!(m.plot_area().width, 0.0);
        assert!(m.screen_to_ratio(DVec2::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn contains_excludes_margins() {
        let m = mapper();
        assert!(m.contains(DVec2::new(100.0, 80.0)));
        assert!(!m.contains(DVec2::new(15.0, 80.0)));
        assert!(!m.contains(DVec2::new(100.0, 135.0)));
    }

    #[test]
    fn vertices_cast_to_bytes() {
        let v = [ScreenVertex::new(DVec2::new(1.0, 2.0), 0.5, 3); 2];
        assert_eq!(as_bytes(&v).len(), 2 * std::mem::size_of::<ScreenVertex>());
        assert_eq!(v[0].position(), DVec2::new(1.0, 2.0));
        assert_eq!(v[0].index, 3);
    }
}
