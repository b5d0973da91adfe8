use crate::plot::ShapeId;

/// Errors surfaced by the coordinate, projection and binning operations.
///
/// Every operation that can fail leaves the state it was called on untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlotError {
    /// Jagged or mismatched shapes, or a degenerate explicit range.
    #[error("dimension error: {0}")]
    Dimension(String),
    /// Index out of range, or an index set that is not strictly ascending.
    #[error("index error: {0}")]
    Index(String),
    /// A logarithmic scale was requested for data that is not strictly positive.
    #[error("axis {axis} cannot use a logarithmic scale: {reason}")]
    InvalidScale { axis: usize, reason: String },
    /// Fixed bounds with `min >= max` (or non-finite limits).
    #[error("invalid bounds on axis {axis}: min {min} must be below max {max}")]
    InvalidBounds { axis: usize, min: f64, max: f64 },
    /// A view has no plot with the given id.
    #[error("{0} not found")]
    NotFound(ShapeId),
}

pub type Result<T> = std::result::Result<T, PlotError>;

impl PlotError {
    pub(crate) fn dimension(msg: impl Into<String>) -> Self {
        Self::Dimension(msg.into())
    }

    pub(crate) fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }
}
