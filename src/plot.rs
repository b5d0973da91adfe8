//! Plot kinds and the layered overlays computed on top of them.
use core::fmt;

use glam::DVec2;
use indexmap::IndexMap;

use crate::{
    axis_scale::AxisScale,
    coordinates::{self, CoordinateBase},
    error::{PlotError, Result},
    histogram::{BinSpec, EMPTY_SAMPLE_BOUNDS, Histogram1D, HistogramTable},
    matrix::{self, Matrix},
    projection::Projection,
    screen::{ScreenMapper, ScreenVertex},
};

/// Quantiles drawn by a box plot: minimum, quartiles and maximum.
pub const BOX_QUANTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Unique identifier for a plot in a view.
///
/// ```rust
/// use axoplot::Plot;
/// let a = Plot::scatter(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
/// let b = Plot::line(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
/// assert_ne!(a.id, b.id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub(crate) u64);
impl ShapeId {
    /// Create a new unique shape ID (0, 1, 2, ...).
    pub(crate) fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}
impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plot({})", self.0)
    }
}

/// The closed set of plot kinds.
///
/// Row layouts of the data matrix:
/// - `Scatter`, `Line`: one point per row.
/// - `Bar`: position in all but the last column, bar height in the last.
/// - `Box`: group position in all but the last column, one sample value in the last.
/// - `Histogram`: samples in the first column; heights are bin counts on axis 1.
/// - `Cloud`: one sample per row, binned on every column.
/// - `Grid`: `[x, y, value]` rows; `value` is the height in 3D and the weight in 2D.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotKind {
    Scatter,
    Line,
    Bar,
    Box,
    Histogram { bins: BinSpec },
    Cloud { bins: Vec<usize> },
    Grid,
}

impl PlotKind {
    fn check_columns(&self, cols: usize) -> Result<()> {
        let ok = match self {
            Self::Scatter | Self::Line | Self::Bar | Self::Box => cols >= 2,
            Self::Histogram { .. } => cols >= 1,
            Self::Cloud { bins } => cols == bins.len() && cols > 0,
            Self::Grid => cols == 3,
        };
        if ok {
            Ok(())
        } else {
            Err(PlotError::dimension(format!(
                "{self:?} plot cannot use {cols}-column data"
            )))
        }
    }
}

/// A statistic layered over the base data of a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// Probability density of column `axis`, as `[center, density]` rows.
    Density { axis: usize, bins: usize },
    /// The `q`-quantile of column `axis`, as a single `[q, value]` row.
    Quantile { axis: usize, q: f64 },
}

impl Overlay {
    pub fn compute(&self, data: &[Vec<f64>]) -> Result<Matrix> {
        match *self {
            Self::Density { axis, bins } => {
                let column = matrix::column(data, axis)?;
                let bounds = coordinates::widened_extent(AxisScale::Linear, &column);
                let h = Histogram1D::new(&column, bounds, &BinSpec::Count(bins))?;
                Ok(h
                    .bins
                    .iter()
                    .zip(h.density())
                    .map(|(bin, density)| vec![bin.center(), density])
                    .collect())
            }
            Self::Quantile { axis, q } => {
                if !(0.0..=1.0).contains(&q) {
                    return Err(PlotError::index(format!("quantile {q} outside [0, 1]")));
                }
                let column = matrix::column(data, axis)?;
                Ok(quantile(&column, q)
                    .map(|value| vec![vec![q, value]])
                    .unwrap_or_default())
            }
        }
    }
}

/// Linearly interpolated `q`-quantile of the finite values; `None` if there are none.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let h = q * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Capabilities shared by every plot kind.
pub trait PlotItem {
    /// The raw data matrix.
    fn data(&self) -> &[Vec<f64>];

    /// Replace the data, keeping the old one if the new matrix does not fit the kind.
    fn set_data(&mut self, data: Matrix) -> Result<()>;

    /// Data-space points the axes must contain for the plot to be fully visible.
    fn footprint(&self, base: &CoordinateBase) -> Result<Matrix>;

    /// Pixel vertices of the plot. Points that cannot be placed are skipped.
    fn project(
        &self,
        base: &CoordinateBase,
        projection: &Projection,
        mapper: &ScreenMapper,
    ) -> Result<Vec<ScreenVertex>>;

    /// Source index of the vertex nearest `cursor`, within `radius_px`.
    fn hit_test(
        &self,
        base: &CoordinateBase,
        projection: &Projection,
        mapper: &ScreenMapper,
        cursor: DVec2,
        radius_px: f64,
    ) -> Option<usize> {
        let vertices = self.project(base, projection, mapper).ok()?;
        let mut best: Option<(usize, f64)> = None;
        for v in &vertices {
            let d2 = v.position().distance_squared(cursor);
            if d2 <= radius_px * radius_px && best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((v.index as usize, d2));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// A plot: a base kind over a data matrix, plus ordered overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    /// Unique identifier for the plot.
    pub id: ShapeId,

    /// Optional label for legends and tooltips.
    pub label: Option<String>,

    kind: PlotKind,
    data: Matrix,
    overlays: Vec<Overlay>,
}

impl Plot {
    pub fn new(kind: PlotKind, data: Matrix) -> Result<Self> {
        let (rows, cols) = matrix::shape(&data)?;
        if rows > 0 {
            kind.check_columns(cols)?;
        }
        Ok(Self {
            id: ShapeId::new(),
            label: None,
            kind,
            data,
            overlays: Vec::new(),
        })
    }

    pub fn scatter(data: Matrix) -> Result<Self> {
        Self::new(PlotKind::Scatter, data)
    }

    pub fn line(data: Matrix) -> Result<Self> {
        Self::new(PlotKind::Line, data)
    }

    pub fn bar(data: Matrix) -> Result<Self> {
        Self::new(PlotKind::Bar, data)
    }

    pub fn boxplot(data: Matrix) -> Result<Self> {
        Self::new(PlotKind::Box, data)
    }

    /// Histogram of a sample vector.
    pub fn histogram(samples: &[f64], bins: BinSpec) -> Result<Self> {
        let data = samples.iter().map(|&v| vec![v]).collect();
        Self::new(PlotKind::Histogram { bins }, data)
    }

    /// Binned point cloud with `bins[d]` cells along column `d`.
    pub fn cloud(data: Matrix, bins: Vec<usize>) -> Result<Self> {
        Self::new(PlotKind::Cloud { bins }, data)
    }

    pub fn grid(data: Matrix) -> Result<Self> {
        Self::new(PlotKind::Grid, data)
    }

    /// Set a label for the plot.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let l = label.into();
        if !l.is_empty() {
            self.label = Some(l);
        }
        self
    }

    /// Layer an overlay on top of the previous ones.
    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn kind(&self) -> &PlotKind {
        &self.kind
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Every overlay evaluated on the current data, in layer order.
    pub fn overlay_data(&self) -> Result<Vec<Matrix>> {
        self.overlays.iter().map(|o| o.compute(&self.data)).collect()
    }

    /// Bins over the widened sample range, or the fixed bounds of a pinned
    /// axis. Footprint and projection share it.
    fn histogram_1d(&self, base: &CoordinateBase, bins: &BinSpec) -> Result<Histogram1D> {
        let samples: Vec<f64> = self.data.iter().map(|row| row[0]).collect();
        Histogram1D::new(&samples, base.binning_range(0, &samples), bins)
    }

    /// Cells span the display bounds of each axis.
    fn cloud_table(&self, base: &CoordinateBase, bins: &[usize]) -> Result<HistogramTable> {
        let bounds = (0..bins.len())
            .map(|d| -> Result<(f64, f64)> {
                if let Ok(b) = base.bounds(d) {
                    return Ok(b);
                }
                let column = matrix::column(&self.data, d)?;
                Ok(base.binning_range(d, &column).unwrap_or(EMPTY_SAMPLE_BOUNDS))
            })
            .collect::<Result<Vec<_>>>()?;
        let specs: Vec<BinSpec> = bins.iter().map(|&n| BinSpec::Count(n)).collect();
        HistogramTable::new(&self.data, Some(&bounds), &specs)
    }

    /// Rows grouped by their position prefix, in first-seen order.
    fn box_groups(&self) -> IndexMap<Vec<u64>, (Vec<f64>, Vec<f64>, usize)> {
        let mut groups: IndexMap<Vec<u64>, (Vec<f64>, Vec<f64>, usize)> = IndexMap::new();
        for (i, row) in self.data.iter().enumerate() {
            let (position, value) = row.split_at(row.len() - 1);
            let key = position.iter().map(|v| v.to_bits()).collect();
            groups
                .entry(key)
                .or_insert_with(|| (position.to_vec(), Vec::new(), i))
                .1
                .push(value[0]);
        }
        groups
    }
}

/// Value bars and histograms grow from on axis `d`: zero when the axis can
/// show it, clamped into the display bounds; the lower bound otherwise.
fn baseline(base: &CoordinateBase, d: usize) -> Option<f64> {
    let (lo, hi) = base.bounds(d).ok()?;
    let scale = base.scale(d).ok()?;
    Some(if scale.accepts(0.0) {
        0.0_f64.clamp(lo, hi)
    } else {
        lo
    })
}

fn accepts_zero(base: &CoordinateBase, d: usize) -> bool {
    base.scale(d).is_ok_and(|s| s.accepts(0.0))
}

fn place(
    base: &CoordinateBase,
    projection: &Projection,
    mapper: &ScreenMapper,
    point: &[f64],
) -> Option<DVec2> {
    projection
        .project_ratio(base, point)
        .map(|ratio| mapper.ratio_to_screen(ratio))
}

impl PlotItem for Plot {
    fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    fn set_data(&mut self, data: Matrix) -> Result<()> {
        let (rows, cols) = matrix::shape(&data)?;
        if rows > 0 {
            self.kind.check_columns(cols)?;
        }
        self.data = data;
        Ok(())
    }

    fn footprint(&self, base: &CoordinateBase) -> Result<Matrix> {
        if self.data.is_empty() {
            return Ok(Matrix::new());
        }
        match &self.kind {
            PlotKind::Scatter
            | PlotKind::Line
            | PlotKind::Box
            | PlotKind::Grid
            | PlotKind::Cloud { .. } => matrix::copy(&self.data),
            PlotKind::Bar => {
                let value_axis = self.data[0].len() - 1;
                let mut rows = matrix::copy(&self.data)?;
                if accepts_zero(base, value_axis) {
                    let zero = vec![0.0; self.data.len()];
                    let mut foot = matrix::delete_column(&self.data, value_axis)?;
                    foot = matrix::insert_column(&foot, value_axis, &zero)?;
                    rows.extend(foot);
                }
                Ok(rows)
            }
            PlotKind::Histogram { bins } => {
                let h = self.histogram_1d(base, bins)?;
                let mut rows = Vec::with_capacity(2 * h.bins.len());
                for bin in &h.bins {
                    rows.push(vec![bin.lower, bin.count as f64]);
                    rows.push(vec![bin.upper(), bin.count as f64]);
                }
                if accepts_zero(base, 1) {
                    rows.push(vec![h.bins[0].lower, 0.0]);
                }
                Ok(rows)
            }
        }
    }

    fn project(
        &self,
        base: &CoordinateBase,
        projection: &Projection,
        mapper: &ScreenMapper,
    ) -> Result<Vec<ScreenVertex>> {
        let to_screen = |point: &[f64]| place(base, projection, mapper, point);
        let mut out = Vec::new();
        if self.data.is_empty() {
            return Ok(out);
        }
        match &self.kind {
            PlotKind::Scatter | PlotKind::Line => {
                for (i, row) in self.data.iter().enumerate() {
                    if let Some(p) = to_screen(row) {
                        out.push(ScreenVertex::new(p, 0.0, i));
                    }
                }
            }
            PlotKind::Bar => {
                for (i, row) in self.data.iter().enumerate() {
                    let value_axis = row.len() - 1;
                    let Some(zero) = baseline(base, value_axis) else {
                        continue;
                    };
                    let mut foot = row.clone();
                    foot[value_axis] = zero;
                    if let (Some(a), Some(b)) = (to_screen(&foot), to_screen(row)) {
                        out.push(ScreenVertex::new(a, 0.0, i));
                        out.push(ScreenVertex::new(b, 0.0, i));
                    }
                }
            }
            PlotKind::Box => {
                for (position, values, first_row) in self.box_groups().into_values() {
                    let corners: Option<Vec<DVec2>> = BOX_QUANTILES
                        .iter()
                        .map(|&q| {
                            let mut point = position.clone();
                            point.push(quantile(&values, q)?);
                            to_screen(&point)
                        })
                        .collect();
                    if let Some(corners) = corners {
                        out.extend(
                            corners
                                .into_iter()
                                .zip(BOX_QUANTILES)
                                .map(|(p, q)| ScreenVertex::new(p, q, first_row)),
                        );
                    }
                }
            }
            PlotKind::Histogram { bins } => {
                let h = self.histogram_1d(base, bins)?;
                let total = h.total().max(1) as f64;
                let Some(zero) = baseline(base, 1) else {
                    return Ok(out);
                };
                for (k, bin) in h.bins.iter().enumerate() {
                    let height = bin.count as f64;
                    let quad = [
                        [bin.lower, zero],
                        [bin.lower, height],
                        [bin.upper(), height],
                        [bin.upper(), zero],
                    ];
                    let corners: Option<Vec<DVec2>> =
                        quad.iter().map(|p| to_screen(&pad(base, projection, p))).collect();
                    if let Some(corners) = corners {
                        let weight = height / total;
                        out.extend(corners.into_iter().map(|p| ScreenVertex::new(p, weight, k)));
                    }
                }
            }
            PlotKind::Cloud { bins } => {
                let table = self.cloud_table(base, bins)?;
                let centers = table.center_matrix()?;
                for (k, (cell, row)) in table.cells.iter().zip(&centers).enumerate() {
                    if cell.count == 0 {
                        continue;
                    }
                    let (center, weight) = row.split_at(row.len() - 1);
                    if let Some(p) = to_screen(center) {
                        out.push(ScreenVertex::new(p, weight[0], k));
                    }
                }
            }
            PlotKind::Grid => {
                let values = matrix::column(&self.data, 2)?;
                let range = matrix::vector_argmin(&values)
                    .zip(matrix::vector_argmax(&values))
                    .map(|((_, lo), (_, hi))| (lo, hi));
                for (i, row) in self.data.iter().enumerate() {
                    let weight = match range {
                        Some((lo, hi)) if hi > lo => (row[2] - lo) / (hi - lo),
                        _ => 0.0,
                    };
                    if let Some(p) = to_screen(row) {
                        out.push(ScreenVertex::new(p, weight, i));
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Extend a 2D point to the projection's dimension, resting extra axes on
/// their lower display bound.
fn pad(base: &CoordinateBase, projection: &Projection, point: &[f64; 2]) -> Vec<f64> {
    let mut out = point.to_vec();
    for d in 2..projection.dimension() {
        out.push(base.round_min(d).unwrap_or(f64::NAN));
    }
    out
}
