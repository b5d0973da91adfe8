//! Data-space to normalised screen-ratio projections.
//!
//! A projection never owns the [`CoordinateBase`] it reads; the view passes it
//! in on every call so bounds changes are picked up immediately. Ratios are in
//! `[0, 1]²` for points inside the display bounds, with `(0, 0)` at the
//! lower-left of the plotting area.
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::{DVec2, DVec3};
use log::trace;

use crate::{
    coordinates::CoordinateBase,
    error::{PlotError, Result},
};

/// Default azimuth and elevation of a fresh 3D view, in radians.
pub const DEFAULT_ANGLE: f64 = FRAC_PI_4;
/// Default divisor applied to 3D ratios so the rotated box fits the canvas.
pub const DEFAULT_ZOOM_FACTOR: f64 = 1.7;
/// Screen pixels of drag that rotate the view by one radian.
pub const DEFAULT_DRAG_PIXELS_PER_RADIAN: f64 = 100.0;

// Below this, a rotation coefficient is treated as zero by the re-centering search.
const DEGENERATE_COEFFICIENT: f64 = 1e-9;

/// Tunables for the 3D projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSettings {
    pub theta: f64,
    pub phi: f64,
    pub zoom_factor: f64,
    /// Drag distance in pixels per radian of rotation.
    pub drag_pixels_per_radian: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            theta: DEFAULT_ANGLE,
            phi: DEFAULT_ANGLE,
            zoom_factor: DEFAULT_ZOOM_FACTOR,
            drag_pixels_per_radian: DEFAULT_DRAG_PIXELS_PER_RADIAN,
        }
    }
}

/// Orthogonal projection of axes 0 and 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projection2D;

impl Projection2D {
    pub fn new() -> Self {
        Self
    }

    /// `ratio[i] = (p[i] - min[i]) / (max[i] - min[i])` in plot-space.
    ///
    /// `None` if the point has fewer than two coordinates or a coordinate is not
    /// representable under its axis scale.
    pub fn project_ratio(&self, base: &CoordinateBase, point: &[f64]) -> Option<[f64; 2]> {
        if point.len() < 2 {
            return None;
        }
        Some([
            base.axis_fraction(0, point[0])?,
            base.axis_fraction(1, point[1])?,
        ])
    }

    /// Data-space `(x, y)` shown at `ratio`.
    pub fn unproject_ratio(&self, base: &CoordinateBase, ratio: [f64; 2]) -> Option<[f64; 2]> {
        Some([base.axis_value(0, ratio[0])?, base.axis_value(1, ratio[1])?])
    }
}

/// Axonometric (parallel, non-perspective) projection of axes 0, 1 and 2,
/// rotated by an azimuth `theta` and elevation `phi`.
///
/// The rotation pivot is tracked as a fraction of the display box so it stays
/// meaningful when bounds change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection3D {
    theta: f64,
    phi: f64,
    zoom_factor: f64,
    drag_pixels_per_radian: f64,
    center: DVec3,
}

impl Default for Projection3D {
    fn default() -> Self {
        Self::from_settings(ProjectionSettings::default())
    }
}

impl Projection3D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection with the given tunables, pivoting on the box center.
    ///
    /// Non-positive zoom factors or drag sensitivities fall back to the defaults.
    pub fn from_settings(settings: ProjectionSettings) -> Self {
        let positive = |v: f64, default: f64| if v.is_finite() && v > 0.0 { v } else { default };
        let mut projection = Self {
            theta: settings.theta,
            phi: settings.phi,
            zoom_factor: positive(settings.zoom_factor, DEFAULT_ZOOM_FACTOR),
            drag_pixels_per_radian: positive(
                settings.drag_pixels_per_radian,
                DEFAULT_DRAG_PIXELS_PER_RADIAN,
            ),
            center: box_center(),
        };
        projection.recenter();
        projection
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Rotation pivot as a fraction of the display box, each component in `[0, 1]`.
    pub fn center_fraction(&self) -> [f64; 3] {
        self.center.to_array()
    }

    /// Rotation pivot in data-space.
    pub fn center(&self, base: &CoordinateBase) -> Option<[f64; 3]> {
        Some([
            base.axis_value(0, self.center.x)?,
            base.axis_value(1, self.center.y)?,
            base.axis_value(2, self.center.z)?,
        ])
    }

    /// Screen-ratio of a 3D data point.
    ///
    /// Offsets from the pivot are normalised by each axis range, rotated, and
    /// divided by the zoom factor; the pivot lands on `(0.5, 0.5)`.
    pub fn project_ratio(&self, base: &CoordinateBase, point: &[f64]) -> Option<[f64; 2]> {
        if point.len() < 3 {
            return None;
        }
        let fraction = DVec3::new(
            base.axis_fraction(0, point[0])?,
            base.axis_fraction(1, point[1])?,
            base.axis_fraction(2, point[2])?,
        );
        Some(self.project_fraction(fraction).to_array())
    }

    fn project_fraction(&self, fraction: DVec3) -> DVec2 {
        let n = fraction - self.center;
        let (horizontal, vertical) = self.screen_rows();
        DVec2::splat(0.5) + DVec2::new(horizontal.dot(n), vertical.dot(n)) / self.zoom_factor
    }

    /// Rows of the rotation mapping a normalised offset to screen x and y.
    fn screen_rows(&self) -> (DVec3, DVec3) {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();
        (
            DVec3::new(-sin_t, cos_t, 0.0),
            DVec3::new(-sin_p * cos_t, -sin_p * sin_t, cos_p),
        )
    }

    /// Set absolute angles and re-center from the box center.
    pub fn rotate(&mut self, theta: f64, phi: f64) {
        self.theta = theta;
        self.phi = phi;
        self.center = box_center();
        self.recenter();
    }

    /// Rotate by a screen drag of `(dx, dy)` pixels, keeping the current pivot
    /// as the starting point of the search.
    pub fn rotate_by_drag(&mut self, dx: f64, dy: f64) {
        self.theta -= dx / self.drag_pixels_per_radian;
        self.phi += dy / self.drag_pixels_per_radian;
        self.recenter();
    }

    /// Pan the projected image by `(dx, dy)` in ratio units.
    ///
    /// The pivot moves within the box plane facing the viewer; the next
    /// rotation pulls the box back towards the canvas midpoint.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let (horizontal, vertical) = self.screen_rows();
        let shift = (horizontal * dx + vertical * dy) * self.zoom_factor;
        self.center = (self.center - shift).clamp(DVec3::ZERO, DVec3::ONE);
    }

    /// Set the zoom divisor; larger values shrink the projected box.
    pub fn set_zoom_factor(&mut self, zoom_factor: f64) -> Result<()> {
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 {
            return Err(PlotError::dimension(format!(
                "zoom factor must be positive, got {zoom_factor}"
            )));
        }
        self.zoom_factor = zoom_factor;
        Ok(())
    }

    /// Zoom in by `factor` (> 1 enlarges the projected box).
    pub fn zoom(&mut self, factor: f64) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PlotError::dimension(format!(
                "zoom step must be positive, got {factor}"
            )));
        }
        self.set_zoom_factor(self.zoom_factor / factor)
    }

    /// Back to default angles, zoom and pivot.
    pub fn reset(&mut self) {
        *self = Self {
            drag_pixels_per_radian: self.drag_pixels_per_radian,
            ..Self::default()
        };
    }

    /// Re-centering search.
    ///
    /// Moves the pivot so the box center projects onto the canvas midpoint. The
    /// pivot may slide freely along the viewing direction, which leaves one
    /// degree of freedom: the horizontal screen equation is solved for whichever
    /// of the x/y pivot components has the larger coefficient, keeping the other
    /// one from the previous pivot. The vertical equation then fixes z. Each
    /// component is clamped to the box.
    fn recenter(&mut self) {
        let target = box_center();
        let previous = self.center;
        let (sin_t, cos_t) = self.theta.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();

        let mut c = previous;
        // Horizontal: cos(t) * (b1 - c1) = sin(t) * (b0 - c0).
        if x_dominant(self.theta) {
            c.x = target.x - cos_t * (target.y - c.y) / sin_t;
        } else {
            c.y = target.y - sin_t * (target.x - c.x) / cos_t;
        }
        // Vertical: cos(p) * (b2 - c2) = sin(p) * (cos(t) * (b0 - c0) + sin(t) * (b1 - c1)).
        if cos_p.abs() > DEGENERATE_COEFFICIENT {
            let planar = cos_t * (target.x - c.x) + sin_t * (target.y - c.y);
            c.z = target.z - sin_p * planar / cos_p;
        } else {
            // Looking straight along z: only the x/y pivot matters.
            c.x = target.x;
            c.y = target.y;
        }
        self.center = c.clamp(DVec3::ZERO, DVec3::ONE);
        trace!(
            "recentered at theta={:.4} phi={:.4}: {:?} -> {:?}",
            self.theta, self.phi, previous, self.center
        );
    }
}

/// True when `(theta - π/4) mod π < π/2`, i.e. `|sin θ| >= |cos θ|`, where the
/// horizontal equation is best solved for the x component.
fn x_dominant(theta: f64) -> bool {
    (theta - FRAC_PI_4).rem_euclid(PI) < FRAC_PI_2
}

fn box_center() -> DVec3 {
    DVec3::splat(0.5)
}

/// The projection used by one view: flat 2D or rotating 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Flat(Projection2D),
    Axonometric(Projection3D),
}

impl Projection {
    pub fn flat() -> Self {
        Self::Flat(Projection2D::new())
    }

    pub fn axonometric(settings: ProjectionSettings) -> Self {
        Self::Axonometric(Projection3D::from_settings(settings))
    }

    /// Screen-ratio of `point`, or `None` if it cannot be placed.
    pub fn project_ratio(&self, base: &CoordinateBase, point: &[f64]) -> Option<[f64; 2]> {
        match self {
            Self::Flat(p) => p.project_ratio(base, point),
            Self::Axonometric(p) => p.project_ratio(base, point),
        }
    }

    /// Number of data axes this projection reads.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Flat(_) => 2,
            Self::Axonometric(_) => 3,
        }
    }

    pub fn as_3d_mut(&mut self) -> Option<&mut Projection3D> {
        match self {
            Self::Axonometric(p) => Some(p),
            Self::Flat(_) => None,
        }
    }

    pub fn as_3d(&self) -> Option<&Projection3D> {
        match self {
            Self::Axonometric(p) => Some(p),
            Self::Flat(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis_scale::AxisScale;

    const EPS: f64 = 1e-9;

    fn cube() -> CoordinateBase {
        CoordinateBase::new(&[0.0; 3], &[10.0; 3], &[AxisScale::Linear; 3]).unwrap()
    }

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < EPS && (a[1] - b[1]).abs() < EPS
    }

    #[test]
    fn flat_maps_bounds_to_unit_square() {
        let base = CoordinateBase::new(&[0.0, 0.0], &[10.0, 10.0], &[AxisScale::Linear; 2]).unwrap();
        let p = Projection2D::new();
        assert_eq!(p.project_ratio(&base, &[5.0, 5.0]), Some([0.5, 0.5]));
        assert_eq!(p.project_ratio(&base, &[0.0, 10.0]), Some([0.0, 1.0]));
        assert_eq!(p.project_ratio(&base, &[1.0]), None);
        assert_eq!(p.unproject_ratio(&base, [0.25, 0.75]), Some([2.5, 7.5]));
    }

    #[test]
    fn flat_log_axis_maps_geometric_midpoint_to_half() {
        let base =
            CoordinateBase::new(&[0.0, 1.0], &[1.0, 100.0], &[AxisScale::Linear, AxisScale::Log])
                .unwrap();
        let r = Projection2D::new().project_ratio(&base, &[0.0, 10.0]).unwrap();
        assert!((r[1] - 0.5).abs() < EPS);
        assert_eq!(Projection2D::new().project_ratio(&base, &[0.0, -3.0]), None);
    }

    #[test]
    fn box_center_projects_to_midpoint() {
        let base = cube();
        let mut p = Projection3D::new();
        for (theta, phi) in [(0.3, 0.2), (1.0, -0.7), (2.5, 1.2), (-4.0, 3.0)] {
            p.rotate(theta, phi);
            let r = p.project_ratio(&base, &[5.0, 5.0, 5.0]).unwrap();
            assert!(close(r, [0.5, 0.5]), "{theta} {phi}: {r:?}");
        }
    }

    #[test]
    fn axonometric_formula() {
        let base = cube();
        let mut p = Projection3D::new();
        p.rotate(0.0, 0.0);
        // theta = phi = 0: screen x follows axis 1, screen y follows axis 2.
        let r = p.project_ratio(&base, &[5.0, 10.0, 5.0]).unwrap();
        assert!(close(r, [0.5 + 0.5 / DEFAULT_ZOOM_FACTOR, 0.5]));
        let r = p.project_ratio(&base, &[9.0, 5.0, 0.0]).unwrap();
        assert!(close(r, [0.5, 0.5 - 0.5 / DEFAULT_ZOOM_FACTOR]));
    }

    #[test]
    fn drag_rotation_updates_angles() {
        let mut p = Projection3D::new();
        p.rotate(0.0, 0.0);
        p.rotate_by_drag(100.0, 0.0);
        assert!((p.theta() - -1.0).abs() < EPS);
        assert_eq!(p.phi(), 0.0);
        assert_eq!(p.zoom_factor(), DEFAULT_ZOOM_FACTOR);
    }

    #[test]
    fn repeated_rotate_is_idempotent() {
        let base = cube();
        let mut p = Projection3D::new();
        p.rotate(0.9, 0.4);
        let first = p.project_ratio(&base, &[1.0, 8.0, 3.0]).unwrap();
        p.rotate(0.9, 0.4);
        assert_eq!(p.project_ratio(&base, &[1.0, 8.0, 3.0]).unwrap(), first);
    }

    #[test]
    fn translate_moves_image() {
        let base = cube();
        let mut p = Projection3D::new();
        p.translate(0.1, -0.05);
        let r = p.project_ratio(&base, &[5.0, 5.0, 5.0]).unwrap();
        assert!(close(r, [0.6, 0.45]), "{r:?}");
    }

    #[test]
    fn pivot_stays_in_box_and_is_continuous_across_branch() {
        let mut p = Projection3D::new();
        p.rotate(0.1, 0.3);
        p.translate(0.05, 0.02);
        p.rotate_by_drag(-1.0, 0.0);
        let mut previous = DVec3::from_array(p.center_fraction());
        // Sweep theta through pi/4 + k*pi/2 boundaries in small drag steps.
        for _ in 0..800 {
            p.rotate_by_drag(-1.0, 0.05);
            let c = DVec3::from_array(p.center_fraction());
            assert!(c.cmpge(DVec3::ZERO).all() && c.cmple(DVec3::ONE).all());
            assert!((c - previous).length() < 0.1, "jump {previous:?} -> {c:?}");
            previous = c;
        }
    }

    #[test]
    fn drag_keeps_box_center_on_midpoint() {
        let base = cube();
        let mut p = Projection3D::new();
        for _ in 0..50 {
            p.rotate_by_drag(7.0, -3.0);
            let r = p.project_ratio(&base, &[5.0, 5.0, 5.0]).unwrap();
            assert!(close(r, [0.5, 0.5]), "{r:?}");
        }
    }

    #[test]
    fn zoom_rejects_non_positive() {
        let mut p = Projection3D::new();
        assert!(p.set_zoom_factor(0.0).is_err());
        p.zoom(2.0).unwrap();
        assert!((p.zoom_factor() - DEFAULT_ZOOM_FACTOR / 2.0).abs() < EPS);
        p.reset();
        assert_eq!(p.zoom_factor(), DEFAULT_ZOOM_FACTOR);
        assert_eq!(p.theta(), DEFAULT_ANGLE);
    }

    #[test]
    fn center_in_data_space() {
        let base = cube();
        let p = Projection3D::new();
        let c = p.center(&base).unwrap();
        assert!(c.iter().all(|v| (v - 5.0).abs() < EPS));
    }

    #[test]
    fn enum_dispatch() {
        let base = cube();
        let flat = Projection::flat();
        assert_eq!(flat.dimension(), 2);
        assert_eq!(flat.project_ratio(&base, &[5.0, 5.0, 0.0]), Some([0.5, 0.5]));
        let mut spatial = Projection::axonometric(ProjectionSettings::default());
        assert!(spatial.as_3d_mut().is_some());
        assert!(flat.as_3d().is_none());
    }
}
