use glam::DVec2;
use iced_core::{Padding, Rectangle, mouse};
use indexmap::IndexMap;
use log::debug;

use crate::{
    axis_scale::AxisScale,
    controls::{PlotControls, RotationDrag},
    coordinates::CoordinateBase,
    error::{PlotError, Result},
    matrix::Matrix,
    plot::{Plot, PlotItem, ShapeId},
    projection::{Projection, ProjectionSettings},
    screen::{ScreenMapper, ScreenVertex},
    ticks::Tick,
};

/// Axes of a view unless configured otherwise; enough for either mode.
pub const DEFAULT_VIEW_DIMENSION: usize = 3;

/// How a view projects its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Axes 0 and 1 onto the canvas.
    #[default]
    Flat,
    /// Rotating axonometric view of axes 0, 1 and 2.
    Axonometric,
}

/// Identifies a point, bin or cell within a plot of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointId {
    pub plot_id: ShapeId,
    pub point_index: usize,
}

/// What changed in response to a mouse event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    /// The 3D view was rotated; every plot needs re-projecting.
    Rotated,
    /// The 3D view was zoomed.
    Zoomed,
    /// The hovered point changed.
    Hovered(Option<PointId>),
}

/// An interactive plot view.
///
/// Owns the coordinate base, the projection and the plots drawn with them.
/// All bound and scale changes go through the view so the plots can be
/// checked against them first; a rejected change leaves the view untouched.
#[derive(Debug, Clone)]
pub struct PlotView {
    base: CoordinateBase,
    projection: Projection,
    settings: ProjectionSettings,
    mode: ViewMode,
    plots: IndexMap<ShapeId, Plot>,
    mapper: ScreenMapper,
    controls: PlotControls,
    drag: RotationDrag,
    autoscale_on_updates: bool,
    hovered: Option<PointId>,
}

impl Default for PlotView {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotView {
    /// Create a flat view with default settings.
    pub fn new() -> Self {
        Self::from_base(
            CoordinateBase::unit(DEFAULT_VIEW_DIMENSION),
            ProjectionSettings::default(),
        )
    }

    pub(crate) fn from_base(base: CoordinateBase, settings: ProjectionSettings) -> Self {
        Self {
            base,
            projection: Projection::flat(),
            settings,
            mode: ViewMode::Flat,
            plots: IndexMap::new(),
            mapper: ScreenMapper::default(),
            controls: PlotControls::default(),
            drag: RotationDrag::new(),
            autoscale_on_updates: true,
            hovered: None,
        }
    }

    // ---- plots ----

    /// Add a plot. A plot with the same id is replaced.
    ///
    /// Fails if the plot's data cannot be shown on the current axis scales.
    pub fn add_plot(&mut self, plot: Plot) -> Result<ShapeId> {
        let id = plot.id;
        let others = self.plots.values().filter(|p| p.id != id);
        let base = fit_plots(self.base.clone(), others.chain([&plot]))?;
        if self.autoscale_on_updates {
            self.base = base;
        }
        debug!("adding {id} with {} rows", plot.len());
        self.plots.insert(id, plot);
        Ok(id)
    }

    /// Remove a plot by its id.
    pub fn remove_plot(&mut self, id: &ShapeId) -> Result<Plot> {
        if !self.plots.contains_key(id) {
            return Err(PlotError::NotFound(*id));
        }
        if self.autoscale_on_updates {
            self.base = fit_plots(self.base.clone(), self.plots.values().filter(|p| p.id != *id))?;
        }
        if self.hovered.is_some_and(|h| h.plot_id == *id) {
            self.hovered = None;
        }
        debug!("removing {id}");
        self.plots
            .shift_remove(id)
            .ok_or(PlotError::NotFound(*id))
    }

    /// Update a plot by its id. Changes are discarded if `f` fails or the
    /// result no longer fits the axes.
    pub fn update_plot<F>(&mut self, id: &ShapeId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Plot) -> Result<()>,
    {
        let mut next = self.plots.get(id).ok_or(PlotError::NotFound(*id))?.clone();
        f(&mut next)?;
        let others = self.plots.values().filter(|p| p.id != *id);
        let base = fit_plots(self.base.clone(), others.chain([&next]))?;
        if self.autoscale_on_updates {
            self.base = base;
        }
        self.plots.insert(*id, next);
        Ok(())
    }

    /// Replace the data of a plot.
    pub fn set_plot_data(&mut self, id: &ShapeId, data: Matrix) -> Result<()> {
        self.update_plot(id, |plot| plot.set_data(data))
    }

    pub fn plot(&self, id: &ShapeId) -> Option<&Plot> {
        self.plots.get(id)
    }

    /// Ids of all plots, in drawing order.
    pub fn plot_ids(&self) -> Vec<ShapeId> {
        self.plots.keys().copied().collect()
    }

    /// Recompute the non-fixed axis bounds from the data of every plot.
    pub fn autoscale(&mut self) -> Result<()> {
        self.base = fit_plots(self.base.clone(), self.plots.values())?;
        Ok(())
    }

    /// Enable or disable autoscaling when plots are added, updated or removed.
    pub fn autoscale_on_updates(&mut self, enabled: bool) {
        self.autoscale_on_updates = enabled;
    }

    // ---- coordinates ----

    pub fn coordinates(&self) -> &CoordinateBase {
        &self.base
    }

    pub fn bounds(&self, d: usize) -> Result<(f64, f64)> {
        self.base.bounds(d)
    }

    pub fn scale(&self, d: usize) -> Result<AxisScale> {
        self.base.scale(d)
    }

    pub fn ticks(&self, d: usize) -> Result<Vec<Tick>> {
        self.base.ticks(d)
    }

    /// Pin the bounds of axis `d`.
    pub fn set_fixed_bounds(&mut self, d: usize, min: f64, max: f64) -> Result<()> {
        let mut next = self.base.clone();
        next.set_fixed_bounds(d, min, max)?;
        self.commit(next)
    }

    /// Release axis `d` to automatic bounds and autoscale.
    pub fn set_auto_bounds(&mut self, d: usize) -> Result<()> {
        let mut next = self.base.clone();
        next.set_auto_bounds(d)?;
        self.commit(next)
    }

    /// Change the scale of axis `d`; every plot must be representable under it.
    pub fn set_axis_scale(&mut self, d: usize, scale: AxisScale) -> Result<()> {
        let mut next = self.base.clone();
        next.set_axis_scale(d, scale)?;
        self.commit(next)
    }

    /// Register category labels on categorical axis `d` and return their ordinals
    /// in the given order.
    pub fn register_categories<S: AsRef<str>>(&mut self, d: usize, labels: &[S]) -> Result<Vec<f64>> {
        let mut next = self.base.clone();
        next.register_categories(d, labels)?;
        self.commit(next)?;
        Ok(labels
            .iter()
            .filter_map(|l| self.base.ordinal(d, l.as_ref()))
            .collect())
    }

    fn commit(&mut self, next: CoordinateBase) -> Result<()> {
        self.base = fit_plots(next, self.plots.values())?;
        Ok(())
    }

    // ---- projection ----

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Switch between flat and 3D projection. The projection is recreated from
    /// the view's settings, so rotation and zoom start over.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<()> {
        let projection = match mode {
            ViewMode::Flat => Projection::flat(),
            ViewMode::Axonometric => {
                if self.base.dimension() < 3 {
                    return Err(PlotError::dimension(format!(
                        "a 3D view needs three axes, this one has {}",
                        self.base.dimension()
                    )));
                }
                Projection::axonometric(self.settings)
            }
        };
        debug!("view mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        self.projection = projection;
        self.drag.release();
        Ok(())
    }

    /// Set absolute 3D angles. Returns false in flat mode.
    pub fn rotate(&mut self, theta: f64, phi: f64) -> bool {
        let Some(p) = self.projection.as_3d_mut() else {
            return false;
        };
        p.rotate(theta, phi);
        true
    }

    /// Rotate the 3D view by a drag of `(dx, dy)` pixels. Returns false in flat mode.
    pub fn rotate_by_drag(&mut self, dx: f64, dy: f64) -> bool {
        let Some(p) = self.projection.as_3d_mut() else {
            return false;
        };
        p.rotate_by_drag(dx, dy);
        true
    }

    /// Zoom the 3D view. Returns false in flat mode.
    pub fn zoom(&mut self, factor: f64) -> Result<bool> {
        match self.projection.as_3d_mut() {
            Some(p) => p.zoom(factor).map(|()| true),
            None => Ok(false),
        }
    }

    /// Back to the configured angles and zoom.
    pub fn reset_view(&mut self) {
        if self.mode == ViewMode::Axonometric {
            self.projection = Projection::axonometric(self.settings);
        }
    }

    // ---- screen ----

    pub fn mapper(&self) -> &ScreenMapper {
        &self.mapper
    }

    /// Canvas rectangle reported by the surrounding layer.
    pub fn set_screen_bounds(&mut self, bounds: Rectangle) {
        self.mapper.set_bounds(bounds);
    }

    pub fn set_margins(&mut self, margins: Padding) {
        self.mapper.margins = margins;
    }

    pub fn controls(&self) -> &PlotControls {
        &self.controls
    }

    pub fn set_controls(&mut self, controls: PlotControls) {
        self.controls = controls;
        if !controls.highlight_on_hover {
            self.hovered = None;
        }
    }

    /// Pixel vertices of one plot under the current bounds and projection.
    pub fn project_plot(&self, id: &ShapeId) -> Result<Vec<ScreenVertex>> {
        self.plots
            .get(id)
            .ok_or(PlotError::NotFound(*id))?
            .project(&self.base, &self.projection, &self.mapper)
    }

    /// Topmost point within the hover radius of `cursor`.
    pub fn hit_test(&self, cursor: DVec2) -> Option<PointId> {
        self.plots.values().rev().find_map(|plot| {
            plot.hit_test(
                &self.base,
                &self.projection,
                &self.mapper,
                cursor,
                self.controls.hover_radius_px,
            )
            .map(|point_index| PointId {
                plot_id: plot.id,
                point_index,
            })
        })
    }

    pub fn hovered(&self) -> Option<PointId> {
        self.hovered
    }

    /// Data-space `(x, y)` under a pixel position; flat mode only.
    pub fn data_at(&self, position: DVec2) -> Option<[f64; 2]> {
        let Projection::Flat(flat) = &self.projection else {
            return None;
        };
        flat.unproject_ratio(&self.base, self.mapper.screen_to_ratio(position)?)
    }

    /// Drive rotation, zoom and hover from a mouse event.
    pub fn handle_mouse_event(&mut self, event: &mouse::Event) -> Option<ViewEvent> {
        if let mouse::Event::WheelScrolled { delta } = event {
            return self.handle_scroll(delta);
        }

        if let Some(delta) = self.drag.handle_event(event, &self.mapper)
            && self.controls.drag_to_rotate
            && self.rotate_by_drag(delta.x, delta.y)
        {
            return Some(ViewEvent::Rotated);
        }

        // Hover picking (only when not dragging)
        if self.drag.is_dragging() || !self.controls.highlight_on_hover {
            return None;
        }
        let hovered = match event {
            mouse::Event::CursorMoved { .. } => self.drag.cursor().and_then(|c| self.hit_test(c)),
            mouse::Event::CursorLeft => None,
            _ => return None,
        };
        if hovered == self.hovered {
            return None;
        }
        self.hovered = hovered;
        Some(ViewEvent::Hovered(hovered))
    }

    fn handle_scroll(&mut self, delta: &mouse::ScrollDelta) -> Option<ViewEvent> {
        let inside = self.drag.cursor().is_some_and(|c| self.mapper.contains(c));
        if !inside || !self.controls.scroll_to_zoom {
            return None;
        }
        let y = match *delta {
            mouse::ScrollDelta::Lines { y, .. } | mouse::ScrollDelta::Pixels { y, .. } => y,
        };
        let factor = if y > 0.0 {
            self.controls.zoom_step
        } else if y < 0.0 {
            1.0 / self.controls.zoom_step
        } else {
            return None;
        };
        match self.zoom(factor) {
            Ok(true) => Some(ViewEvent::Zoomed),
            _ => None,
        }
    }
}

/// `base` with raw extents rebuilt from `plots` and bounds re-rounded.
fn fit_plots<'a>(
    mut base: CoordinateBase,
    plots: impl IntoIterator<Item = &'a Plot>,
) -> Result<CoordinateBase> {
    base.reset_raw_bounds();
    let dim = base.dimension();
    for plot in plots {
        let rows: Matrix = plot
            .footprint(&base)?
            .into_iter()
            .map(|row| fit_row(row, dim))
            .collect();
        base.include_all(&rows)?;
    }
    base.round_bounds()?;
    Ok(base)
}

/// Truncate or pad a row to `dim` coordinates; padding is ignored by the bounds.
fn fit_row(mut row: Vec<f64>, dim: usize) -> Vec<f64> {
    row.resize(dim, f64::NAN);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::BinSpec;
    use iced_core::Point;

    fn moved(x: f32, y: f32) -> mouse::Event {
        mouse::Event::CursorMoved {
            position: Point::new(x, y),
        }
    }

    #[test]
    fn adding_plots_autoscales() {
        let mut view = PlotView::new();
        let id = view
            .add_plot(Plot::scatter(vec![vec![0.13, -2.0], vec![0.97, 41.0]]).unwrap())
            .unwrap();
        let (x0, x1) = view.bounds(0).unwrap();
        assert!(x0 <= 0.13 && x1 >= 0.97);
        let (y0, y1) = view.bounds(1).unwrap();
        assert!(y0 <= -2.0 && y1 >= 41.0);
        // Unused axis keeps its bounds.
        assert_eq!(view.bounds(2).unwrap(), (0.0, 1.0));

        view.remove_plot(&id).unwrap();
        assert!(matches!(view.remove_plot(&id), Err(PlotError::NotFound(_))));
        assert!(view.plot_ids().is_empty());
    }

    #[test]
    fn log_scale_rejected_for_non_positive_data() {
        let mut view = PlotView::new();
        view.add_plot(Plot::scatter(vec![vec![1.0, 0.0], vec![2.0, 5.0]]).unwrap())
            .unwrap();
        let before = view.coordinates().clone();
        assert!(matches!(
            view.set_axis_scale(1, AxisScale::Log),
            Err(PlotError::InvalidScale { axis: 1, .. })
        ));
        assert_eq!(view.coordinates(), &before);

        view.set_axis_scale(0, AxisScale::Log).unwrap();
        let bad = Plot::scatter(vec![vec![-1.0, 1.0]]).unwrap();
        assert!(view.add_plot(bad).is_err());
        assert_eq!(view.plot_ids().len(), 1);
    }

    #[test]
    fn failed_update_keeps_old_plot() {
        let mut view = PlotView::new();
        let id = view
            .add_plot(Plot::grid(vec![vec![0.0, 0.0, 1.0]]).unwrap())
            .unwrap();
        assert!(view.set_plot_data(&id, vec![vec![1.0, 2.0]]).is_err());
        assert_eq!(view.plot(&id).unwrap().data(), &[vec![0.0, 0.0, 1.0]]);
        view.set_plot_data(&id, vec![vec![0.0, 0.0, 1.0], vec![4.0, 4.0, 2.0]])
            .unwrap();
        assert!(view.bounds(0).unwrap().1 >= 4.0);
    }

    #[test]
    fn fixed_bounds_survive_autoscale() {
        let mut view = PlotView::new();
        view.set_fixed_bounds(0, -1.0, 1.0).unwrap();
        view.add_plot(Plot::scatter(vec![vec![0.0, 0.0], vec![50.0, 7.0]]).unwrap())
            .unwrap();
        assert_eq!(view.bounds(0).unwrap(), (-1.0, 1.0));
        view.set_auto_bounds(0).unwrap();
        assert!(view.bounds(0).unwrap().1 >= 50.0);
        assert!(view.set_fixed_bounds(0, 2.0, 2.0).is_err());
    }

    #[test]
    fn categories_map_to_ordinals() {
        let mut view = PlotView::new();
        view.set_axis_scale(0, AxisScale::Categorical).unwrap();
        let ordinals = view.register_categories(0, &["b", "a", "c"]).unwrap();
        assert_eq!(ordinals, vec![1.0, 0.0, 2.0]);
        assert_eq!(view.bounds(0).unwrap(), (0.0, 2.0));
        let labels: Vec<String> = view.ticks(0).unwrap().iter().map(Tick::text).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert!(view.register_categories(1, &["x"]).is_err());
    }

    #[test]
    fn hover_follows_cursor() {
        let mut view = PlotView::new();
        let id = view
            .add_plot(Plot::scatter(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap())
            .unwrap();
        // Default canvas: plot area from (40, 40) to (600, 440).
        assert_eq!(
            view.handle_mouse_event(&moved(601.0, 41.0)),
            Some(ViewEvent::Hovered(Some(PointId {
                plot_id: id,
                point_index: 1
            })))
        );
        assert_eq!(view.handle_mouse_event(&moved(602.0, 41.0)), None);
        assert_eq!(
            view.handle_mouse_event(&moved(300.0, 300.0)),
            Some(ViewEvent::Hovered(None))
        );
        let at = view.data_at(DVec2::new(320.0, 240.0)).unwrap();
        assert!((at[0] - 5.0).abs() < 1e-9 && (at[1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn drag_rotates_in_3d_only() {
        let mut view = PlotView::new();
        view.handle_mouse_event(&moved(300.0, 200.0));
        view.handle_mouse_event(&mouse::Event::ButtonPressed(mouse::Button::Left));
        assert_eq!(view.handle_mouse_event(&moved(310.0, 200.0)), None);
        view.handle_mouse_event(&mouse::Event::ButtonReleased(mouse::Button::Left));

        view.set_view_mode(ViewMode::Axonometric).unwrap();
        view.handle_mouse_event(&mouse::Event::ButtonPressed(mouse::Button::Left));
        assert_eq!(
            view.handle_mouse_event(&moved(320.0, 200.0)),
            Some(ViewEvent::Rotated)
        );
        let p = view.projection().as_3d().unwrap();
        assert!((p.theta() - (std::f64::consts::FRAC_PI_4 - 0.1)).abs() < 1e-12);

        let zoom = p.zoom_factor();
        assert_eq!(
            view.handle_mouse_event(&mouse::Event::WheelScrolled {
                delta: mouse::ScrollDelta::Lines { x: 0.0, y: 1.0 }
            }),
            Some(ViewEvent::Zoomed)
        );
        assert!(view.projection().as_3d().unwrap().zoom_factor() < zoom);

        view.reset_view();
        assert_eq!(
            view.projection().as_3d().unwrap().theta(),
            std::f64::consts::FRAC_PI_4
        );
        view.set_view_mode(ViewMode::Flat).unwrap();
        assert!(!view.rotate(0.0, 0.0));
    }

    #[test]
    fn single_valued_data_can_be_binned() {
        let mut view = PlotView::new();
        let hist = view
            .add_plot(Plot::histogram(&[5.0, 5.0, 5.0], BinSpec::Count(4)).unwrap())
            .unwrap();
        let (x0, x1) = view.bounds(0).unwrap();
        assert!(x0 <= 4.0 && x1 >= 6.0);
        assert_eq!(view.project_plot(&hist).unwrap().len(), 16);

        let cloud = view
            .add_plot(Plot::cloud(vec![vec![1.0, 2.0, 3.0], vec![4.0, 2.0, 6.0]], vec![2, 2, 2]).unwrap())
            .unwrap();
        let vertices = view.project_plot(&cloud).unwrap();
        let weight: f32 = vertices.iter().map(|v| v.value).sum();
        assert!((weight - 1.0).abs() < 1e-6);
        view.set_view_mode(ViewMode::Axonometric).unwrap();
        assert!(!view.project_plot(&cloud).unwrap().is_empty());
    }

    #[test]
    fn empty_grid_projects_nothing() {
        let mut view = PlotView::new();
        let id = view.add_plot(Plot::grid(Matrix::new()).unwrap()).unwrap();
        assert!(view.project_plot(&id).unwrap().is_empty());
        view.set_view_mode(ViewMode::Axonometric).unwrap();
        assert!(view.project_plot(&id).unwrap().is_empty());
    }

    #[test]
    fn projecting_unknown_plot_fails() {
        let view = PlotView::new();
        let other = Plot::scatter(vec![vec![0.0, 0.0]]).unwrap();
        assert!(matches!(
            view.project_plot(&other.id),
            Err(PlotError::NotFound(_))
        ));
    }
}
