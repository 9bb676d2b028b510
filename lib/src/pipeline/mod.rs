//! Pipeline module - orchestrates the complete slicing process.
//!
//! mesh → layers → infill → moves → ledger
//!
//! # Stages
//!
//! 1. Prepare the mesh: triangulate, move onto the build plate, centre on
//!    X/Y, apply the scale factor
//! 2. Slice and stitch every layer (in parallel)
//! 3. Generate infill for every layer (in parallel); the overhang test
//!    reads the next layer up, which is already sliced
//! 4. Turn every layer into moves (in parallel), with extrusion counted
//!    from the start of the layer
//! 5. Merge the layers in ascending z: shift each layer's extrusion by the
//!    filament used so far and fold its totals into the [`ExtrusionLedger`]
//!
//! Only step 5 is sequential, so the result doesn't depend on the thread
//! count. Per-layer results are collected in layer order before errors are
//! checked, so a failing print always reports its lowest failing layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use planar_slicer::{Mesh, PrintConfig, PrintPipeline};
//!
//! let pipeline = PrintPipeline::new(PrintConfig::default().layer_height(0.5));
//! let print = pipeline.process(Mesh::cube(20.0))?;
//! println!("{} layers, {:.1} mm filament", print.layer_count(), print.ledger.filament_used);
//! ```

use crate::config::PrintConfig;
use crate::gcode::{ExtrusionRole, LayerPaths, PathGenerator};
use crate::geometry::{BoundingBox3, Point3};
use crate::infill::{InfillGenerator, InfillResult};
use crate::mesh::Mesh;
use crate::slice::{slice_and_stitch, Layer};
use crate::{CoordF, Error, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Running totals of nozzle motion and filament over a whole print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionLedger {
    /// Length of all printing moves.
    pub nozzle_distance: CoordF,

    /// Length of all travel moves, including moves between layers.
    pub travel_distance: CoordF,

    /// Filament consumed.
    pub filament_used: CoordF,

    /// Where the nozzle was left by the last recorded layer.
    pub position: Option<Point3>,
}

impl ExtrusionLedger {
    /// Totals after printing `paths` on top of everything recorded so far.
    pub fn record(self, paths: &LayerPaths) -> Self {
        let entry_travel = match (self.position, paths.first_point()) {
            (Some(from), Some(to)) => from.distance_to(&to),
            _ => 0.0,
        };
        Self {
            nozzle_distance: self.nozzle_distance + paths.nozzle_distance,
            travel_distance: self.travel_distance + entry_travel + paths.travel_distance,
            filament_used: self.filament_used + paths.filament_used,
            position: paths.last_point().or(self.position),
        }
    }
}

/// Result of processing a mesh.
#[derive(Debug, Clone)]
pub struct ProcessedPrint {
    /// Layers with their loops and infill, ascending by z.
    pub layers: Vec<Layer>,

    /// Moves per layer, with extrusion cumulative over the whole print.
    pub layer_paths: Vec<LayerPaths>,

    /// Final totals.
    pub ledger: ExtrusionLedger,

    /// Bounding box of the prepared mesh.
    pub bounds: BoundingBox3,

    /// Configuration used.
    pub config: PrintConfig,
}

impl ProcessedPrint {
    /// Get the number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Estimated print time (seconds) from the ledger distances and feedrates.
    pub fn estimated_time(&self) -> CoordF {
        let travel = self.ledger.travel_distance / self.config.feedrate;
        let printing = self.ledger.nozzle_distance / self.config.writing_feedrate();
        (travel + printing) * 60.0
    }
}

/// The main pipeline that turns a mesh into per-layer moves.
#[derive(Debug, Clone, Default)]
pub struct PrintPipeline {
    config: PrintConfig,
}

impl PrintPipeline {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: PrintConfig) -> Self {
        Self { config }
    }

    /// Create a pipeline with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PrintConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// Process a mesh through the complete pipeline.
    pub fn process(&self, mesh: Mesh) -> Result<ProcessedPrint> {
        self.process_with_callback(mesh, |_, _| {})
    }

    /// Process a mesh with a progress callback.
    ///
    /// The callback receives (stage_name, progress_0_to_1).
    pub fn process_with_callback<F>(&self, mut mesh: Mesh, mut callback: F) -> Result<ProcessedPrint>
    where
        F: FnMut(&str, f64),
    {
        self.config.validate()?;
        if mesh.face_count() == 0 {
            return Err(Error::MalformedMeshInput("mesh has no faces".to_string()));
        }

        callback("preparing", 0.0);
        let split = mesh.triangulate();
        if split > 0 {
            debug!("Triangulated {} polygon face(s)", split);
        }
        let z_max = mesh.center();
        let params = self.config.slicing_params();
        mesh.scale(params.scale);
        let heights = params.layer_heights(z_max)?;
        let bounds = mesh
            .bounding_box()
            .ok_or_else(|| Error::MalformedMeshInput("mesh has no vertices".to_string()))?;
        let size = bounds.max - bounds.min;
        if !(size.x.is_finite() && size.y.is_finite() && size.z.is_finite()) {
            return Err(Error::Config(format!(
                "scale {} takes the mesh out of range",
                params.scale
            )));
        }
        info!(
            "Prepared mesh: {} vertices, {} faces, {} layers",
            mesh.vertex_count(),
            mesh.face_count(),
            heights.len()
        );
        callback("preparing", 1.0);

        callback("slicing", 0.0);
        let mut layers = heights
            .par_iter()
            .enumerate()
            .map(|(index, &z)| slice_and_stitch(&mesh, index, z))
            .collect::<Vec<Result<Layer>>>()
            .into_iter()
            .collect::<Result<Vec<Layer>>>()?;
        callback("slicing", 1.0);

        callback("infill", 0.0);
        let generator = InfillGenerator::new(self.config.infill_config());
        let layer_count = layers.len();
        let infills = layers
            .par_iter()
            .enumerate()
            .map(|(i, layer)| generator.generate(layer, layers.get(i + 1), layer_count, &bounds))
            .collect::<Vec<Result<InfillResult>>>()
            .into_iter()
            .collect::<Result<Vec<InfillResult>>>()?;

        let fill_roles: Vec<ExtrusionRole> = layers
            .iter_mut()
            .zip(infills)
            .map(|(layer, infill)| {
                layer.infill = infill.lines;
                if infill.solid {
                    ExtrusionRole::SolidInfill
                } else {
                    ExtrusionRole::SparseInfill
                }
            })
            .collect();
        callback("infill", 1.0);

        callback("paths", 0.0);
        let path_generator = PathGenerator::new(self.config.path_config());
        let mut layer_paths: Vec<LayerPaths> = layers
            .par_iter()
            .zip(fill_roles.par_iter())
            .map(|(layer, &role)| path_generator.generate(layer, role))
            .collect();

        let mut ledger = ExtrusionLedger::default();
        for (i, paths) in layer_paths.iter_mut().enumerate() {
            paths.shift_extrusion(ledger.filament_used);
            ledger = ledger.record(paths);
            callback("paths", (i + 1) as f64 / layer_count as f64);
        }
        callback("paths", 1.0);

        info!(
            "Nozzle distance: {:.3}, travel: {:.3}, filament used: {:.3}",
            ledger.nozzle_distance, ledger.travel_distance, ledger.filament_used
        );

        Ok(ProcessedPrint {
            layers,
            layer_paths,
            ledger,
            bounds,
            config: self.config.clone(),
        })
    }
}
