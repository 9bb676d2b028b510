//! # Planar Slicer
//!
//! Converts a triangulated surface mesh into layer-by-layer toolpaths for
//! additive manufacturing.
//!
//! The pipeline is:
//! - Mesh loading (indexed vertices + faces) and centering on the build plate
//! - Horizontal-plane slicing into per-face contour chords
//! - Stitching chords into closed, ordered contour loops
//! - Solid and cross-hatch infill clipped to the loop crossings
//! - Extrusion bookkeeping for every move, folded across layers in order
//!
//! ## Example
//!
//! ```rust,ignore
//! use planar_slicer::{mesh::load_obj, PrintConfig, PrintPipeline};
//!
//! let mesh = load_obj("model.obj")?;
//! let pipeline = PrintPipeline::new(PrintConfig::default());
//! let print = pipeline.process(mesh)?;
//! println!("filament used: {:.2} mm", print.ledger.filament_used);
//! ```

pub mod clipper;
pub mod config;
pub mod gcode;
pub mod geometry;
pub mod infill;
pub mod mesh;
pub mod pipeline;
pub mod slice;

pub use config::{Material, PrintConfig, Temperature, Units};
pub use gcode::{ExtrusionRole, GCodeWriter, LayerPaths, PathMove};
pub use geometry::{distance, intersect, Axis, BoundingBox3, Point3};
pub use infill::{
    fill_across, gap_fill, CrossHatchFill, FillLine, FillSpacing, FillStrategy, InfillGenerator,
    InfillPattern, NoFill, SolidFill,
};
pub use mesh::{load_obj, parse_obj, Face, Mesh};
pub use pipeline::{ExtrusionLedger, PrintPipeline, ProcessedPrint};
pub use slice::{
    slice_layer, stitch_layer, Chord, ContourLoop, ContourPoint, EdgeKey, IntersectedFace, Layer,
    SlicingParams,
};

/// Floating-point coordinate type used throughout the slicer (output units).
pub type CoordF = f64;

/// Tolerance used when comparing coordinates that come out of interpolation.
pub const EPSILON: CoordF = 1e-9;

/// Result type used throughout the slicer.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for slicer operations.
///
/// Every variant is fatal: all failures are deterministic functions of the
/// input geometry and configuration, so nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed mesh input: {0}")]
    MalformedMeshInput(String),

    #[error("Degenerate segment: endpoints coincide along {axis} (requested {axis} = {value})")]
    DegenerateSegment { axis: Axis, value: CoordF },

    #[error("Contour integrity error on layer {layer}: {message}")]
    ContourIntegrity { layer: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn integrity(layer: usize, message: impl Into<String>) -> Self {
        Error::ContourIntegrity {
            layer,
            message: message.into(),
        }
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::integrity(7, "odd number of crossings");
        assert_eq!(
            err.to_string(),
            "Contour integrity error on layer 7: odd number of crossings"
        );

        let err = Error::DegenerateSegment {
            axis: Axis::Z,
            value: 0.5,
        };
        assert!(err.to_string().contains("z = 0.5"));
    }
}
