//! Horizon profile model, reference overlays and text export.
//!
//! A [`HorizonPath`] records points in click order and only accepts points
//! that continue the trace in its [`TraceDirection`] (strictly decreasing
//! azimuth by default). [`export_horizon`] turns it into the
//! `<azimuth> <elevation>` integer format; [`ReferenceOverlay`] reads the same
//! format (with arbitrary floats) back for comparison.

mod export;
mod path;
mod reference;

pub use export::{
    export_horizon, format_point, write_horizon, ExportError, ExportOutcome, DEFAULT_EXPORT_FILE,
};
pub use path::{AppendError, HorizonPath, TraceDirection};
pub use reference::{ReferenceError, ReferenceOverlay};

pub use polar_horizon_core::HorizonPoint;
