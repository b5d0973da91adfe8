//! Per-axis bounds, scales and "nice" rounding.
//!
//! [`CoordinateBase`] is the single source of truth for axis ranges. It tracks
//! two extents per axis: the raw extent of every point included so far, and the
//! rounded display bounds that projections normalise against. Renderers call
//! [`CoordinateBase::round_bounds`] before each redraw to bring the display
//! bounds up to date with the raw data.
use log::{debug, warn};

use crate::{
    axis_scale::AxisScale,
    categories::CategoryMap,
    error::{PlotError, Result},
    ticks::{self, Tick, TickWeight},
};

/// Relative half-width used to widen a single-valued axis before rounding.
pub const DEGENERATE_RELATIVE_HALF_SPAN: f64 = 0.1;
/// Smallest half-width used to widen a single-valued axis before rounding.
pub const DEGENERATE_MIN_HALF_SPAN: f64 = 1.0;

// Display bounds given to an empty axis switched to a log scale.
const DEFAULT_LOG_BOUNDS: (f64, f64) = (1.0, 10.0);

#[derive(Debug, Clone, PartialEq)]
struct Axis {
    raw_min: f64,
    raw_max: f64,
    round_min: f64,
    round_max: f64,
    step: f64,
    scale: AxisScale,
    fixed: bool,
    categories: CategoryMap,
}

impl Axis {
    fn has_data(&self) -> bool {
        self.raw_min <= self.raw_max
    }

    fn plot_bounds(&self) -> Option<(f64, f64)> {
        Some((
            self.scale.data_to_plot(self.round_min)?,
            self.scale.data_to_plot(self.round_max)?,
        ))
    }

    /// Rounded `(min, max, step)` from the raw extent, or `None` to keep the
    /// current bounds.
    fn rounded(&self, d: usize) -> Result<Option<(f64, f64, f64)>> {
        if self.scale == AxisScale::Categorical
            && let Some((first, last)) = self.categories.extent()
        {
            let step = self.categories.step().abs();
            return Ok(Some(if first == last {
                (first - step / 2.0, last + step / 2.0, step)
            } else {
                (first, last, step)
            }));
        }
        if !self.has_data() {
            return Ok(None);
        }
        let (Some(lo), Some(hi)) = (
            self.scale.data_to_plot(self.raw_min),
            self.scale.data_to_plot(self.raw_max),
        ) else {
            return Err(PlotError::InvalidScale {
                axis: d,
                reason: format!("raw extent [{}, {}] is not positive", self.raw_min, self.raw_max),
            });
        };
        let (lo, hi) = widen_degenerate(lo, hi);
        let Some(range) = ticks::round_range(lo, hi) else {
            return Ok(None);
        };
        match (
            self.scale.plot_to_data(range.min),
            self.scale.plot_to_data(range.max),
        ) {
            (Some(min), Some(max)) if min < max => Ok(Some((min, max, range.step))),
            _ => Ok(None),
        }
    }
}

/// Extent of the `values` that `scale` can show, widened the way a
/// single-valued axis is. `None` if no value is representable.
pub fn widened_extent(scale: AxisScale, values: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .filter_map(|&v| scale.data_to_plot(v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return None;
    }
    let (lo, hi) = widen_degenerate(lo, hi);
    Some((scale.plot_to_data(lo)?, scale.plot_to_data(hi)?))
}

fn widen_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        return (lo, hi);
    }
    let half = (lo.abs() * DEGENERATE_RELATIVE_HALF_SPAN).max(DEGENERATE_MIN_HALF_SPAN);
    (lo - half, hi + half)
}

/// Bounds, scale and category state for every axis of one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateBase {
    axes: Vec<Axis>,
}

impl CoordinateBase {
    /// Create a base with explicit initial bounds and scales, one entry per axis.
    ///
    /// The initial bounds become both the raw extent and the display bounds.
    pub fn new(min: &[f64], max: &[f64], scales: &[AxisScale]) -> Result<Self> {
        let dim = scales.len();
        if dim == 0 || min.len() != dim || max.len() != dim {
            return Err(PlotError::dimension(format!(
                "need one min, max and scale per axis, got {} / {} / {}",
                min.len(),
                max.len(),
                dim
            )));
        }
        let axes = (0..dim)
            .map(|d| {
                let (lo, hi, scale) = (min[d], max[d], scales[d]);
                if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                    return Err(PlotError::InvalidBounds {
                        axis: d,
                        min: lo,
                        max: hi,
                    });
                }
                if !scale.accepts(lo) {
                    return Err(PlotError::InvalidScale {
                        axis: d,
                        reason: format!("initial minimum {lo} is not positive"),
                    });
                }
                Ok(Axis {
                    raw_min: lo,
                    raw_max: hi,
                    round_min: lo,
                    round_max: hi,
                    step: step_in_plot_space(scale, lo, hi),
                    scale,
                    fixed: false,
                    categories: CategoryMap::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { axes })
    }

    /// A linear base over `[0, 1]` on every axis, holding no data yet.
    pub fn with_dimension(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(PlotError::dimension("a coordinate base needs at least one axis"));
        }
        Ok(Self::unit(dim))
    }

    pub(crate) fn unit(dim: usize) -> Self {
        let axis = Axis {
            raw_min: f64::INFINITY,
            raw_max: f64::NEG_INFINITY,
            round_min: 0.0,
            round_max: 1.0,
            step: step_in_plot_space(AxisScale::Linear, 0.0, 1.0),
            scale: AxisScale::Linear,
            fixed: false,
            categories: CategoryMap::new(),
        };
        Self {
            axes: vec![axis; dim],
        }
    }

    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    fn axis(&self, d: usize) -> Result<&Axis> {
        self.axes.get(d).ok_or_else(|| {
            PlotError::dimension(format!("axis {d} out of range 0..{}", self.axes.len()))
        })
    }

    fn axis_mut(&mut self, d: usize) -> Result<&mut Axis> {
        let dim = self.axes.len();
        self.axes
            .get_mut(d)
            .ok_or_else(|| PlotError::dimension(format!("axis {d} out of range 0..{dim}")))
    }

    // ---- raw extents ----

    /// Grow the raw extents to contain `point`.
    ///
    /// Non-finite components are ignored. On a log axis a component `<= 0` is
    /// rejected and nothing is updated.
    pub fn include_in_bounds(&mut self, point: &[f64]) -> Result<()> {
        self.check_point(point)?;
        self.extend_raw(point);
        Ok(())
    }

    /// Include every row of `points`. Either all rows are included or none.
    pub fn include_all(&mut self, points: &[Vec<f64>]) -> Result<()> {
        for point in points {
            self.check_point(point)?;
        }
        for point in points {
            self.extend_raw(point);
        }
        Ok(())
    }

    fn check_point(&self, point: &[f64]) -> Result<()> {
        if point.len() != self.axes.len() {
            return Err(PlotError::dimension(format!(
                "point has {} coordinates, base has {} axes",
                point.len(),
                self.axes.len()
            )));
        }
        for (d, (axis, &v)) in self.axes.iter().zip(point).enumerate() {
            if axis.scale == AxisScale::Log && v.is_finite() && v <= 0.0 {
                warn!("rejecting value {v} on logarithmic axis {d}");
                return Err(PlotError::InvalidScale {
                    axis: d,
                    reason: format!("value {v} is not positive"),
                });
            }
        }
        Ok(())
    }

    fn extend_raw(&mut self, point: &[f64]) {
        for (axis, &v) in self.axes.iter_mut().zip(point) {
            if v.is_finite() {
                axis.raw_min = axis.raw_min.min(v);
                axis.raw_max = axis.raw_max.max(v);
            }
        }
    }

    /// Forget all raw extents. Axes without new data keep their display bounds
    /// on the next [`round_bounds`](Self::round_bounds).
    pub fn reset_raw_bounds(&mut self) {
        for axis in &mut self.axes {
            axis.raw_min = f64::INFINITY;
            axis.raw_max = f64::NEG_INFINITY;
        }
    }

    /// Raw `(min, max)` of the included data, if any.
    pub fn raw_bounds(&self, d: usize) -> Result<Option<(f64, f64)>> {
        let axis = self.axis(d)?;
        Ok(axis.has_data().then_some((axis.raw_min, axis.raw_max)))
    }

    // ---- display bounds ----

    /// Recompute the display bounds of every non-fixed axis from the raw extents.
    ///
    /// Idempotent for unchanged raw data.
    pub fn round_bounds(&mut self) -> Result<()> {
        let mut updates = Vec::with_capacity(self.axes.len());
        for (d, axis) in self.axes.iter().enumerate() {
            if axis.fixed {
                continue;
            }
            if let Some(rounded) = axis.rounded(d)? {
                updates.push((d, rounded));
            }
        }
        for (d, (min, max, step)) in updates {
            let axis = &mut self.axes[d];
            if (axis.round_min, axis.round_max) != (min, max) {
                debug!("axis {d} bounds [{}, {}] -> [{min}, {max}]", axis.round_min, axis.round_max);
            }
            axis.round_min = min;
            axis.round_max = max;
            axis.step = step;
        }
        Ok(())
    }

    /// Pin the display bounds of axis `d`; [`round_bounds`](Self::round_bounds)
    /// leaves it alone until [`set_auto_bounds`](Self::set_auto_bounds).
    pub fn set_fixed_bounds(&mut self, d: usize, min: f64, max: f64) -> Result<()> {
        let axis = self.axis(d)?;
        if !min.is_finite() || !max.is_finite() || min >= max {
            warn!("rejecting fixed bounds [{min}, {max}] on axis {d}");
            return Err(PlotError::InvalidBounds { axis: d, min, max });
        }
        if !axis.scale.accepts(min) {
            warn!("rejecting fixed bounds [{min}, {max}] on logarithmic axis {d}");
            return Err(PlotError::InvalidScale {
                axis: d,
                reason: format!("fixed minimum {min} is not positive"),
            });
        }
        let step = step_in_plot_space(axis.scale, min, max);
        let axis = self.axis_mut(d)?;
        axis.round_min = min;
        axis.round_max = max;
        axis.step = step;
        axis.fixed = true;
        Ok(())
    }

    /// Release axis `d` back to automatic bounds.
    pub fn set_auto_bounds(&mut self, d: usize) -> Result<()> {
        self.axis_mut(d)?.fixed = false;
        Ok(())
    }

    /// Change the scale of axis `d`.
    ///
    /// Switching to [`AxisScale::Log`] fails if the axis holds any value `<= 0`.
    /// A non-fixed axis has its display bounds recomputed under the new scale.
    pub fn set_axis_scale(&mut self, d: usize, scale: AxisScale) -> Result<()> {
        let axis = self.axis(d)?;
        if scale == AxisScale::Log {
            if axis.has_data() && axis.raw_min <= 0.0 {
                warn!("axis {d} holds {} and cannot become logarithmic", axis.raw_min);
                return Err(PlotError::InvalidScale {
                    axis: d,
                    reason: format!("data minimum {} is not positive", axis.raw_min),
                });
            }
            if axis.fixed && axis.round_min <= 0.0 {
                return Err(PlotError::InvalidScale {
                    axis: d,
                    reason: format!("fixed minimum {} is not positive", axis.round_min),
                });
            }
        }

        let mut next = axis.clone();
        next.scale = scale;
        if !next.fixed {
            if !scale.accepts(next.round_min) {
                (next.round_min, next.round_max) = DEFAULT_LOG_BOUNDS;
            }
            if let Some((min, max, step)) = next.rounded(d)? {
                (next.round_min, next.round_max, next.step) = (min, max, step);
            } else {
                next.step = step_in_plot_space(scale, next.round_min, next.round_max);
            }
        } else {
            next.step = step_in_plot_space(scale, next.round_min, next.round_max);
        }
        debug!("axis {d} scale {:?} -> {scale:?}", axis.scale);
        self.axes[d] = next;
        Ok(())
    }

    pub fn scale(&self, d: usize) -> Result<AxisScale> {
        Ok(self.axis(d)?.scale)
    }

    pub fn is_fixed(&self, d: usize) -> Result<bool> {
        Ok(self.axis(d)?.fixed)
    }

    /// Display `(min, max)` of axis `d`; always `min < max`.
    pub fn bounds(&self, d: usize) -> Result<(f64, f64)> {
        let axis = self.axis(d)?;
        Ok((axis.round_min, axis.round_max))
    }

    pub fn round_min(&self, d: usize) -> Result<f64> {
        Ok(self.axis(d)?.round_min)
    }

    pub fn round_max(&self, d: usize) -> Result<f64> {
        Ok(self.axis(d)?.round_max)
    }

    /// Major tick step of axis `d`, in plot-space (decades on a log axis).
    pub fn tick_step(&self, d: usize) -> Result<f64> {
        Ok(self.axis(d)?.step)
    }

    /// Ticks for label rendering over the display bounds of axis `d`.
    pub fn ticks(&self, d: usize) -> Result<Vec<Tick>> {
        let axis = self.axis(d)?;
        if axis.scale == AxisScale::Categorical && !axis.categories.is_empty() {
            return Ok(axis
                .categories
                .iter()
                .map(|(label, ordinal)| {
                    Tick::new(ordinal, axis.categories.step(), TickWeight::Major).with_label(label)
                })
                .collect());
        }
        let Some((lo, hi)) = axis.plot_bounds() else {
            return Ok(Vec::new());
        };
        let scale = axis.scale;
        Ok(ticks::linear_ticks(lo, hi, axis.step)
            .into_iter()
            .filter_map(|mut tick| {
                tick.value = scale.plot_to_data(tick.value)?;
                Some(tick)
            })
            .collect())
    }

    // ---- normalisation ----

    /// Position of `value` as a fraction of the display range of axis `d`,
    /// measured in plot-space. `None` if the value is not representable.
    pub fn axis_fraction(&self, d: usize, value: f64) -> Option<f64> {
        let axis = self.axes.get(d)?;
        let (lo, hi) = axis.plot_bounds()?;
        let v = axis.scale.data_to_plot(value)?;
        Some((v - lo) / (hi - lo))
    }

    /// Data value at `fraction` of the display range of axis `d`.
    pub fn axis_value(&self, d: usize, fraction: f64) -> Option<f64> {
        let axis = self.axes.get(d)?;
        let (lo, hi) = axis.plot_bounds()?;
        axis.scale.plot_to_data(lo + fraction * (hi - lo))
    }

    // ---- categories ----

    /// Register labels on categorical axis `d`. Returns true if the ordinals changed.
    pub fn register_categories<S: AsRef<str>>(&mut self, d: usize, labels: &[S]) -> Result<bool> {
        let axis = self.axis_mut(d)?;
        if axis.scale != AxisScale::Categorical {
            return Err(PlotError::dimension(format!("axis {d} is not categorical")));
        }
        Ok(axis.categories.register(labels))
    }

    /// Change where the first category sits and how far apart categories are.
    pub fn set_category_layout(&mut self, d: usize, origin: f64, step: f64) -> Result<()> {
        self.axis_mut(d)?.categories.set_layout(origin, step)
    }

    pub fn categories(&self, d: usize) -> Result<&CategoryMap> {
        Ok(&self.axis(d)?.categories)
    }

    /// Ordinal of `label` on axis `d`.
    pub fn ordinal(&self, d: usize, label: &str) -> Option<f64> {
        self.axes.get(d)?.categories.ordinal(label)
    }

    /// Display label for a data-space value on categorical axis `d`.
    pub fn label_at(&self, d: usize, value: f64) -> Option<&str> {
        self.axes.get(d)?.categories.label_at(value)
    }

    /// Range to bin `values` over on axis `d`: the fixed bounds if the axis
    /// is pinned, otherwise the widened extent of the values under the axis
    /// scale. Axes past the dimension are treated as linear.
    pub fn binning_range(&self, d: usize, values: &[f64]) -> Option<(f64, f64)> {
        match self.axes.get(d) {
            Some(axis) if axis.fixed => Some((axis.round_min, axis.round_max)),
            Some(axis) => widened_extent(axis.scale, values),
            None => widened_extent(AxisScale::Linear, values),
        }
    }
}

fn step_in_plot_space(scale: AxisScale, min: f64, max: f64) -> f64 {
    match (scale.data_to_plot(min), scale.data_to_plot(max)) {
        (Some(lo), Some(hi)) => ticks::step_for(lo, hi).unwrap_or(1.0),
        _ => 1.0,
    }
}
