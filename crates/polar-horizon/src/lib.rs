//! Trace the horizon of a full 360° panorama into an azimuth/elevation table.
//!
//! This crate ties the workspace together:
//! - re-exports of the geometry core ([`core`]) and the path model ([`path`]),
//! - [`AppState`], the explicit session controller: load a panorama, click,
//!   zoom, undo, export,
//! - [`render`], overlay draw commands plus a small rasterizer for previews,
//! - [`io`], panorama decode/encode through the `image` crate,
//! - [`script`], replay of plain-text session scripts (used by the CLI).
//!
//! ## Quickstart
//!
//! ```no_run
//! use polar_horizon::{AppState, ClickOutcome, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut state = AppState::new(SessionConfig::default());
//! state.load_panorama_file("pano.jpg")?;
//!
//! // Start on the north line below the zenith, then move to lower bearings.
//! for (x, y) in [(400.0, 520.0), (520.0, 400.0)] {
//!     if let ClickOutcome::Rejected(err) = state.click(x, y) {
//!         eprintln!("{err}");
//!     }
//! }
//! state.export_to("horizon.txt")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Conventions
//!
//! Azimuth is a compass bearing measured as `atan2(dx, dy)` from the canvas
//! centre: 0° straight down (north line), 90° right, 180° up, 270° left.
//! Clicks within 0.5° of the seam record as 359°. The trace must run through
//! strictly decreasing azimuths.

pub use polar_horizon_core as core;
pub use polar_horizon_path as path;

pub mod config;
pub mod io;
pub mod render;
pub mod script;
mod session;

pub use config::{ConfigError, SessionConfig};
pub use io::ImageLoadError;
pub use polar_horizon_core::{CoordinateMapper, HorizonPoint, ProjectionParams, RgbImage};
pub use polar_horizon_path::{
    AppendError, ExportError, ExportOutcome, HorizonPath, ReferenceError, ReferenceOverlay,
    TraceDirection,
};
pub use script::{EventOutcome, ScriptError, SessionEvent};
pub use session::{AppState, ClickOutcome};
