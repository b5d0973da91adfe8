//! Coordinate, projection and binning engine for interactive plots.
//!
//! - Per-axis bounds with "nice" rounding under linear, log and categorical scales
//! - Flat 2D and rotating axonometric 3D projections onto the canvas
//! - 1D/2D/3D histogram binning for histogram, density and cloud plots
//! - Mouse-driven rotation, zoom and hover picking
//!
//! Quick start:
//!
//! ```
//! use axoplot::{Plot, PlotItem, PlotViewBuilder};
//!
//! let points = (0..100).map(|i| vec![i as f64, (i * i) as f64]).collect();
//! let view = PlotViewBuilder::new()
//!     .add_plot(Plot::scatter(points)?.with_label("squares"))
//!     .build()?;
//!
//! let id = view.plot_ids()[0];
//! let vertices = view.project_plot(&id)?;
//! assert_eq!(vertices.len(), 100);
//! # Ok::<(), axoplot::PlotError>(())
//! ```
pub mod axis_scale;
pub mod categories;
pub mod controls;
pub mod coordinates;
pub mod error;
pub mod histogram;
pub mod matrix;
pub mod plot;
pub mod plot_view;
pub mod plot_view_builder;
pub mod projection;
pub mod screen;
pub mod ticks;

// Re-exports of public types.
pub use axis_scale::AxisScale;
pub use categories::CategoryMap;
pub use controls::{DragPhase, PlotControls, RotationDrag};
pub use coordinates::CoordinateBase;
pub use error::{PlotError, Result};
pub use histogram::{Bin, BinSpec, Histogram1D, HistogramCell, HistogramTable};
pub use matrix::Matrix;
pub use plot::{Overlay, Plot, PlotItem, PlotKind, ShapeId};
pub use plot_view::{PlotView, PointId, ViewEvent, ViewMode};
pub use plot_view_builder::PlotViewBuilder;
pub use projection::{Projection, Projection2D, Projection3D, ProjectionSettings};
pub use screen::{ScreenMapper, ScreenVertex};
pub use ticks::{Tick, TickWeight};
