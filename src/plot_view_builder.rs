use iced_core::{Padding, Rectangle};

use crate::{
    axis_scale::AxisScale,
    controls::PlotControls,
    coordinates::CoordinateBase,
    error::{PlotError, Result},
    plot::Plot,
    plot_view::{DEFAULT_VIEW_DIMENSION, PlotView, ViewMode},
    projection::ProjectionSettings,
};

/// Builder for configuring and constructing a [`PlotView`].
///
/// Provides a fluent API for setting up a view with all its configuration
/// options before creating it. All settings have sensible defaults.
///
/// # Example
///
/// ```rust
/// use axoplot::{AxisScale, Plot, PlotViewBuilder, ViewMode};
///
/// let view = PlotViewBuilder::new()
///     .with_view_mode(ViewMode::Axonometric)
///     .with_axis_scale(2, AxisScale::Log)
///     .with_axis_lim(0, -1.0, 1.0)
///     .add_plot(Plot::scatter(vec![vec![0.0, 0.5, 10.0], vec![0.5, 1.0, 100.0]])?)
///     .build()?;
/// assert_eq!(view.bounds(0)?, (-1.0, 1.0));
/// # Ok::<(), axoplot::PlotError>(())
/// ```
#[derive(Default)]
pub struct PlotViewBuilder {
    dimension: Option<usize>,
    view_mode: Option<ViewMode>,
    projection: Option<ProjectionSettings>,
    controls: Option<PlotControls>,
    autoscale_on_updates: Option<bool>,
    screen_bounds: Option<Rectangle>,
    margins: Option<Padding>,
    scales: Vec<(usize, AxisScale)>,
    limits: Vec<(usize, f64, f64)>,
    categories: Vec<(usize, Vec<String>)>,
    plots: Vec<Plot>,
}

impl PlotViewBuilder {
    /// Create a new PlotViewBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of axes. Defaults to three, which allows both view modes.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.view_mode = Some(mode);
        self
    }

    /// Initial angles, zoom and drag sensitivity of the 3D view.
    pub fn with_projection_settings(mut self, settings: ProjectionSettings) -> Self {
        self.projection = Some(settings);
        self
    }

    pub fn with_controls(mut self, controls: PlotControls) -> Self {
        self.controls = Some(controls);
        self
    }

    /// Enable or disable autoscaling of the view when plots change.
    pub fn with_autoscale_on_updates(mut self, enabled: bool) -> Self {
        self.autoscale_on_updates = Some(enabled);
        self
    }

    /// Canvas rectangle in pixels.
    pub fn with_screen_bounds(mut self, bounds: Rectangle) -> Self {
        self.screen_bounds = Some(bounds);
        self
    }

    /// Space kept free around the plot area, in pixels.
    pub fn with_margins(mut self, margins: impl Into<Padding>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    pub fn with_axis_scale(mut self, axis: usize, scale: AxisScale) -> Self {
        self.scales.push((axis, scale));
        self
    }

    /// Set the limits (min, max) of an axis.
    /// If set, these will override autoscaling for that axis.
    pub fn with_axis_lim(mut self, axis: usize, min: f64, max: f64) -> Self {
        self.limits.push((axis, min, max));
        self
    }

    /// Register category labels on an axis; the axis is made categorical.
    pub fn with_categories<S: AsRef<str>>(mut self, axis: usize, labels: &[S]) -> Self {
        self.categories
            .push((axis, labels.iter().map(|l| l.as_ref().to_owned()).collect()));
        self.scales.push((axis, AxisScale::Categorical));
        self
    }

    pub fn add_plot(mut self, plot: Plot) -> Self {
        self.plots.push(plot);
        self
    }

    /// Build the view. Scales are applied before limits, limits before
    /// categories, and plots last, so every plot is checked against the
    /// final axis configuration.
    pub fn build(self) -> Result<PlotView> {
        let dimension = self.dimension.unwrap_or(DEFAULT_VIEW_DIMENSION);
        let mode = self.view_mode.unwrap_or_default();
        if mode == ViewMode::Axonometric && dimension < 3 {
            return Err(PlotError::dimension(format!(
                "a 3D view needs three axes, {dimension} requested"
            )));
        }

        let mut base = CoordinateBase::with_dimension(dimension)?;
        for (axis, scale) in self.scales {
            base.set_axis_scale(axis, scale)?;
        }
        for (axis, min, max) in self.limits {
            base.set_fixed_bounds(axis, min, max)?;
        }
        for (axis, labels) in &self.categories {
            base.register_categories(*axis, labels)?;
        }

        let mut view = PlotView::from_base(base, self.projection.unwrap_or_default());
        view.set_view_mode(mode)?;
        if let Some(controls) = self.controls {
            view.set_controls(controls);
        }
        if let Some(bounds) = self.screen_bounds {
            view.set_screen_bounds(bounds);
        }
        if let Some(margins) = self.margins {
            view.set_margins(margins);
        }

        for plot in self.plots {
            view.add_plot(plot)?;
        }
        view.autoscale()?;
        if let Some(enabled) = self.autoscale_on_updates {
            view.autoscale_on_updates(enabled);
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_a_flat_3_axis_view() {
        let view = PlotViewBuilder::new().build().unwrap();
        assert_eq!(view.view_mode(), ViewMode::Flat);
        assert_eq!(view.coordinates().dimension(), 3);
    }

    #[test]
    fn flat_only_views_reject_3d() {
        let err = PlotViewBuilder::new()
            .with_dimension(2)
            .with_view_mode(ViewMode::Axonometric)
            .build();
        assert!(matches!(err, Err(PlotError::Dimension(_))));

        let mut view = PlotViewBuilder::new().with_dimension(2).build().unwrap();
        assert!(view.set_view_mode(ViewMode::Axonometric).is_err());
        assert_eq!(view.view_mode(), ViewMode::Flat);
    }

    #[test]
    fn invalid_limits_fail() {
        let err = PlotViewBuilder::new().with_axis_lim(1, 3.0, 1.0).build();
        assert!(matches!(err, Err(PlotError::InvalidBounds { axis: 1, .. })));
    }

    #[test]
    fn categories_and_plots() {
        let view = PlotViewBuilder::new()
            .with_categories(0, &["mon", "tue", "wed"])
            .add_plot(Plot::bar(vec![vec![0.0, 3.0], vec![2.0, 9.0]]).unwrap())
            .build()
            .unwrap();
        assert_eq!(view.scale(0).unwrap(), AxisScale::Categorical);
        assert_eq!(view.coordinates().ordinal(0, "tue"), Some(1.0));
        assert_eq!(view.bounds(0).unwrap(), (0.0, 2.0));
        let (y0, y1) = view.bounds(1).unwrap();
        assert!(y0 <= 0.0 && y1 >= 9.0);
    }

    #[test]
    fn log_axis_rejects_plots_at_build() {
        let err = PlotViewBuilder::new()
            .with_axis_scale(1, AxisScale::Log)
            .add_plot(Plot::scatter(vec![vec![1.0, -1.0]]).unwrap())
            .build();
        assert!(matches!(err, Err(PlotError::InvalidScale { axis: 1, .. })));
    }
}
