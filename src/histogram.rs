//! Histogram binning for density, cloud and histogram plots.
//!
//! Bins are half-open `[lower, lower + width)` except the last bin on each axis,
//! which also contains its upper edge, so the cells partition the closed bounds.
//! Samples outside the bounds (or non-finite) are tallied in `out_of_range`.
use log::debug;

use crate::{
    error::{PlotError, Result},
    matrix::{self, Matrix},
};

// Bounds used when neither samples nor explicit bounds define a range.
pub(crate) const EMPTY_SAMPLE_BOUNDS: (f64, f64) = (0.0, 1.0);

/// How to split an axis into bins.
#[derive(Debug, Clone, PartialEq)]
pub enum BinSpec {
    /// `n` equal-width bins over the bounds.
    Count(usize),
    /// Explicit, strictly ascending edges; `edges.len() - 1` bins.
    Edges(Vec<f64>),
}

/// Validated bin edges along one axis.
#[derive(Debug, Clone, PartialEq)]
struct AxisBins {
    edges: Vec<f64>,
}

impl AxisBins {
    fn equal_width(min: f64, max: f64, n: usize) -> Result<Self> {
        check_bounds(min, max)?;
        if n == 0 {
            return Err(PlotError::dimension("need at least one bin"));
        }
        let width = (max - min) / n as f64;
        let mut edges: Vec<f64> = (0..n).map(|k| min + k as f64 * width).collect();
        edges.push(max);
        Ok(Self { edges })
    }

    fn explicit(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(PlotError::dimension(format!(
                "need at least two bin edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PlotError::index(format!(
                "bin edges must be finite and strictly ascending: {edges:?}"
            )));
        }
        Ok(Self { edges })
    }

    fn from_spec(spec: &BinSpec, min: f64, max: f64) -> Result<Self> {
        match spec {
            BinSpec::Count(n) => Self::equal_width(min, max, *n),
            BinSpec::Edges(edges) => Self::explicit(edges.clone()),
        }
    }

    fn len(&self) -> usize {
        self.edges.len() - 1
    }

    fn lower(&self, k: usize) -> f64 {
        self.edges[k]
    }

    fn width(&self, k: usize) -> f64 {
        self.edges[k + 1] - self.edges[k]
    }

    /// Bin containing `v`, honouring the half-open/closed-last edge policy.
    fn index_of(&self, v: f64) -> Option<usize> {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if !v.is_finite() || v < first || v > last {
            return None;
        }
        if v == last {
            return Some(self.len() - 1);
        }
        // Number of edges <= v, minus one.
        Some(self.edges.partition_point(|&e| e <= v) - 1)
    }
}

fn check_bounds(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(PlotError::dimension(format!(
            "binning needs a non-degenerate range, got [{min}, {max}]"
        )));
    }
    Ok(())
}

/// One bin of a 1D histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub width: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        self.lower + self.width / 2.0
    }

    pub fn upper(&self) -> f64 {
        self.lower + self.width
    }
}

/// Ordered bins of a 1D histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub bins: Vec<Bin>,
    /// Samples that fell outside every bin, or were not finite.
    pub out_of_range: usize,
}

impl Histogram1D {
    /// Bin `samples` over `bounds` (default: the sample extent).
    ///
    /// Empty samples without bounds are binned over `[0, 1]`. A degenerate
    /// range is rejected; callers with a single distinct value must supply
    /// bounds.
    pub fn new(samples: &[f64], bounds: Option<(f64, f64)>, spec: &BinSpec) -> Result<Self> {
        let (min, max) = match (bounds, spec) {
            (Some(b), _) => b,
            (None, BinSpec::Edges(edges)) if edges.len() >= 2 => (edges[0], edges[edges.len() - 1]),
            (None, _) => sample_extent(samples).unwrap_or(EMPTY_SAMPLE_BOUNDS),
        };
        let axis = AxisBins::from_spec(spec, min, max)?;
        let mut counts = vec![0usize; axis.len()];
        let mut out_of_range = 0;
        for &v in samples {
            match axis.index_of(v) {
                Some(k) => counts[k] += 1,
                None => out_of_range += 1,
            }
        }
        if out_of_range > 0 {
            debug!("{out_of_range} of {} samples outside [{min}, {max}]", samples.len());
        }
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(k, count)| Bin {
                lower: axis.lower(k),
                width: axis.width(k),
                count,
            })
            .collect();
        Ok(Self { bins, out_of_range })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// `(center, count)` per bin.
    pub fn centers(&self) -> Vec<(f64, usize)> {
        self.bins.iter().map(|b| (b.center(), b.count)).collect()
    }

    /// Probability density per bin: `count / (total * width)`.
    pub fn density(&self) -> Vec<f64> {
        let total = self.total() as f64;
        self.bins
            .iter()
            .map(|b| if total > 0.0 { b.count as f64 / (total * b.width) } else { 0.0 })
            .collect()
    }

    /// The same bins as an N-dimensional table with one axis.
    pub fn to_table(&self) -> HistogramTable {
        HistogramTable {
            dimension: 1,
            shape: vec![self.bins.len()],
            cells: self
                .bins
                .iter()
                .map(|b| HistogramCell {
                    lower: vec![b.lower],
                    width: vec![b.width],
                    count: b.count,
                })
                .collect(),
            out_of_range: self.out_of_range,
        }
    }
}

/// `(min, max)` of the finite samples.
fn sample_extent(samples: &[f64]) -> Option<(f64, f64)> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    let (_, min) = matrix::vector_argmin(&finite)?;
    let (_, max) = matrix::vector_argmax(&finite)?;
    Some((min, max))
}

/// One cell of an N-dimensional histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramCell {
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
    pub count: usize,
}

impl HistogramCell {
    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.width)
            .map(|(l, w)| l + w / 2.0)
            .collect()
    }
}

/// Flattened grid of histogram cells; axis 0 varies slowest.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramTable {
    pub dimension: usize,
    /// Bins per axis.
    pub shape: Vec<usize>,
    pub cells: Vec<HistogramCell>,
    pub out_of_range: usize,
}

impl HistogramTable {
    /// Bin the rows of `samples` (one column per axis) into a grid.
    ///
    /// `bounds` defaults per axis to the sample extent; `specs` gives one
    /// binning per axis.
    pub fn new(
        samples: &[Vec<f64>],
        bounds: Option<&[(f64, f64)]>,
        specs: &[BinSpec],
    ) -> Result<Self> {
        let dimension = specs.len();
        if dimension == 0 {
            return Err(PlotError::dimension("need a bin spec for at least one axis"));
        }
        let (rows, cols) = matrix::shape(samples)?;
        if rows > 0 && cols != dimension {
            return Err(PlotError::dimension(format!(
                "samples have {cols} columns, {dimension} bin specs given"
            )));
        }
        if let Some(b) = bounds
            && b.len() != dimension
        {
            return Err(PlotError::dimension(format!(
                "{} bounds given for {dimension} axes",
                b.len()
            )));
        }

        let axes = specs
            .iter()
            .enumerate()
            .map(|(d, spec)| {
                let (min, max) = match (bounds, spec) {
                    (Some(b), _) => b[d],
                    (None, BinSpec::Edges(edges)) if edges.len() >= 2 => {
                        (edges[0], edges[edges.len() - 1])
                    }
                    (None, _) => {
                        let column: Vec<f64> = samples.iter().map(|row| row[d]).collect();
                        sample_extent(&column).unwrap_or(EMPTY_SAMPLE_BOUNDS)
                    }
                };
                AxisBins::from_spec(spec, min, max)
            })
            .collect::<Result<Vec<_>>>()?;

        let shape: Vec<usize> = axes.iter().map(AxisBins::len).collect();
        let mut counts = vec![0usize; shape.iter().product()];
        let mut out_of_range = 0;
        'samples: for row in samples {
            let mut flat = 0;
            for (axis, &v) in axes.iter().zip(row) {
                let Some(k) = axis.index_of(v) else {
                    out_of_range += 1;
                    continue 'samples;
                };
                flat = flat * axis.len() + k;
            }
            counts[flat] += 1;
        }

        let cells = counts
            .into_iter()
            .enumerate()
            .map(|(flat, count)| {
                let index = unflatten(flat, &shape);
                HistogramCell {
                    lower: axes.iter().zip(&index).map(|(a, &k)| a.lower(k)).collect(),
                    width: axes.iter().zip(&index).map(|(a, &k)| a.width(k)).collect(),
                    count,
                }
            })
            .collect();

        Ok(Self {
            dimension,
            shape,
            cells,
            out_of_range,
        })
    }

    /// Equal-width grid with `n[d]` bins per axis over explicit bounds.
    pub fn equal_width(samples: &[Vec<f64>], bounds: &[(f64, f64)], n: &[usize]) -> Result<Self> {
        let specs: Vec<BinSpec> = n.iter().map(|&k| BinSpec::Count(k)).collect();
        Self::new(samples, Some(bounds), &specs)
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }

    /// Cell at a per-axis bin index.
    pub fn cell(&self, index: &[usize]) -> Option<&HistogramCell> {
        if index.len() != self.dimension || index.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return None;
        }
        let flat = index
            .iter()
            .zip(&self.shape)
            .fold(0, |acc, (&i, &n)| acc * n + i);
        self.cells.get(flat)
    }

    /// Rows of `[lower.., width.., count]`.
    pub fn to_matrix(&self) -> Matrix {
        self.cells
            .iter()
            .map(|c| {
                let mut row = Vec::with_capacity(2 * self.dimension + 1);
                row.extend_from_slice(&c.lower);
                row.extend_from_slice(&c.width);
                row.push(c.count as f64);
                row
            })
            .collect()
    }

    /// Rows of `[center.., count / total]`, ready to be projected.
    pub fn center_matrix(&self) -> Result<Matrix> {
        let centers: Matrix = self.cells.iter().map(HistogramCell::center).collect();
        let counts: Vec<f64> = self.cells.iter().map(|c| c.count as f64).collect();
        let total = self.total().max(1) as f64;
        matrix::append_normalized(&centers, &counts, total)
    }
}

fn unflatten(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &n) in index.iter_mut().zip(shape).rev() {
        *slot = flat % n;
        flat /= n;
    }
    index
}
