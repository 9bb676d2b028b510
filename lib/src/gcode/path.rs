//! Path generation module.
//!
//! Converts one layer's contour loops and fill lines into an ordered list of
//! nozzle moves ready for G-code emission.
//!
//! # Order
//!
//! For every loop: travel to its first outline corner, extrude along the
//! outline and back to the first corner. Then, for every fill line: travel
//! to its start and extrude to its end.
//!
//! Extrusion values are cumulative from the start of the layer. The
//! pipeline shifts them by the filament already used in earlier layers when
//! it merges layers in order.

use crate::geometry::Point3;
use crate::infill::FillLine;
use crate::slice::Layer;
use crate::CoordF;
use log::warn;
use serde::{Deserialize, Serialize};

/// What a move does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrusionRole {
    /// Contour loop.
    Perimeter,
    /// Dense fill of shell and overhang layers.
    SolidInfill,
    /// Cross-hatch fill.
    SparseInfill,
    /// Rapid move without extrusion.
    Travel,
}

/// A single nozzle move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathMove {
    /// Where the move ends.
    pub target: Point3,

    /// What the move does.
    pub role: ExtrusionRole,

    /// Cumulative filament length at the end of the move; `None` for travel.
    pub extrusion: Option<CoordF>,

    /// Feedrate (mm/min).
    pub feedrate: CoordF,
}

impl PathMove {
    /// Check if this is a rapid travel move.
    #[inline]
    pub fn is_travel(&self) -> bool {
        self.extrusion.is_none()
    }
}

/// Parameters for turning geometry into moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathConfig {
    /// Filament length per mm of printed path.
    pub extrusion_rate: CoordF,

    /// Travel feedrate (mm/min).
    pub feedrate: CoordF,

    /// Printing feedrate (mm/min).
    pub feedrate_writing: CoordF,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            extrusion_rate: 0.033,
            feedrate: 3600.0,
            feedrate_writing: 1800.0,
        }
    }
}

/// Moves of one layer, in print order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPaths {
    /// Layer index.
    pub layer_index: usize,

    /// Layer Z height (mm).
    pub z_height: CoordF,

    /// All moves of this layer, in print order.
    pub moves: Vec<PathMove>,

    /// Length of printing moves (mm).
    pub nozzle_distance: CoordF,

    /// Length of travel moves inside the layer (mm).
    pub travel_distance: CoordF,

    /// Filament used by this layer (mm).
    pub filament_used: CoordF,
}

impl LayerPaths {
    /// Create an empty layer paths container.
    pub fn new(layer_index: usize, z_height: CoordF) -> Self {
        Self {
            layer_index,
            z_height,
            ..Default::default()
        }
    }

    /// Check if this layer has any moves.
    pub fn has_moves(&self) -> bool {
        !self.moves.is_empty()
    }

    /// First point the nozzle goes to.
    pub fn first_point(&self) -> Option<Point3> {
        self.moves.first().map(|m| m.target)
    }

    /// Point the nozzle ends at.
    pub fn last_point(&self) -> Option<Point3> {
        self.moves.last().map(|m| m.target)
    }

    /// Printing moves only.
    pub fn extrusion_moves(&self) -> impl Iterator<Item = &PathMove> {
        self.moves.iter().filter(|m| !m.is_travel())
    }

    /// Travel moves only.
    pub fn travel_moves(&self) -> impl Iterator<Item = &PathMove> {
        self.moves.iter().filter(|m| m.is_travel())
    }

    /// Add `offset` to every cumulative extrusion value.
    pub fn shift_extrusion(&mut self, offset: CoordF) {
        for m in &mut self.moves {
            if let Some(e) = m.extrusion.as_mut() {
                *e += offset;
            }
        }
    }
}

/// Builds the moves of one layer.
#[derive(Debug, Clone, Default)]
pub struct PathGenerator {
    config: PathConfig,
}

impl PathGenerator {
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Generate moves for `layer`: its loops, then its fill lines.
    ///
    /// Loops whose outline has fewer than two corners are skipped.
    pub fn generate(&self, layer: &Layer, fill_role: ExtrusionRole) -> LayerPaths {
        let mut builder = LayerBuilder::new(&self.config, LayerPaths::new(layer.index, layer.z));

        for (i, contour) in layer.loops.iter().enumerate() {
            let outline = contour.outline();
            if outline.len() < 2 {
                warn!(
                    "Layer {}: skipping degenerate loop {} ({} corner(s))",
                    layer.index,
                    i,
                    outline.len()
                );
                continue;
            }

            builder.travel_to(outline[0]);
            for p in &outline[1..] {
                builder.extrude_to(*p, ExtrusionRole::Perimeter);
            }
            builder.extrude_to(outline[0], ExtrusionRole::Perimeter);
        }

        for line in &layer.infill {
            builder.fill_line(line, fill_role);
        }

        builder.finish()
    }
}

/// Running position and filament count while a layer is built.
struct LayerBuilder<'a> {
    config: &'a PathConfig,
    paths: LayerPaths,
    position: Option<Point3>,
    extrusion: CoordF,
}

impl<'a> LayerBuilder<'a> {
    fn new(config: &'a PathConfig, paths: LayerPaths) -> Self {
        Self {
            config,
            paths,
            position: None,
            extrusion: 0.0,
        }
    }

    fn travel_to(&mut self, target: Point3) {
        if let Some(from) = self.position {
            self.paths.travel_distance += from.distance_to(&target);
        }
        self.paths.moves.push(PathMove {
            target,
            role: ExtrusionRole::Travel,
            extrusion: None,
            feedrate: self.config.feedrate,
        });
        self.position = Some(target);
    }

    fn extrude_to(&mut self, target: Point3, role: ExtrusionRole) {
        let length = self
            .position
            .map_or(0.0, |from| from.distance_to(&target));
        self.paths.nozzle_distance += length;
        self.extrusion += length * self.config.extrusion_rate;
        self.paths.moves.push(PathMove {
            target,
            role,
            extrusion: Some(self.extrusion),
            feedrate: self.config.feedrate_writing,
        });
        self.position = Some(target);
    }

    fn fill_line(&mut self, line: &FillLine, role: ExtrusionRole) {
        self.travel_to(line.start);
        self.extrude_to(line.end, role);
    }

    fn finish(mut self) -> LayerPaths {
        self.paths.filament_used = self.extrusion;
        self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::{Chord, ContourLoop, EdgeKey};

    fn square_layer(side: CoordF, z: CoordF) -> Layer {
        let corners = [
            Point3::new(0.0, 0.0, z),
            Point3::new(side, 0.0, z),
            Point3::new(side, side, z),
            Point3::new(0.0, side, z),
        ];
        let chords = (0..4)
            .map(|i| Chord {
                face_index: i,
                start: corners[i],
                end: corners[(i + 1) % 4],
                entry: EdgeKey::new(i, 4),
                exit: EdgeKey::new((i + 1) % 4, 4),
            })
            .collect();
        Layer::new(2, z, vec![ContourLoop::from_chords(chords)])
    }

    fn config() -> PathConfig {
        PathConfig {
            extrusion_rate: 0.5,
            feedrate: 3000.0,
            feedrate_writing: 1200.0,
        }
    }

    #[test]
    fn test_loop_moves() {
        let layer = square_layer(10.0, 0.2);
        let paths = PathGenerator::new(config()).generate(&layer, ExtrusionRole::SparseInfill);

        // Travel to the first corner, three corners, then back to the start.
        assert_eq!(paths.moves.len(), 5);
        assert!(paths.moves[0].is_travel());
        assert_eq!(paths.moves[0].feedrate, 3000.0);
        assert_eq!(paths.moves[4].target, paths.moves[0].target);
        assert!(paths
            .extrusion_moves()
            .all(|m| m.role == ExtrusionRole::Perimeter && m.feedrate == 1200.0));

        assert_eq!(paths.layer_index, 2);
        assert!((paths.nozzle_distance - 40.0).abs() < 1e-12);
        assert!((paths.filament_used - 20.0).abs() < 1e-12);
        assert_eq!(paths.travel_distance, 0.0);
    }

    #[test]
    fn test_extrusion_is_cumulative() {
        let layer = square_layer(10.0, 0.0);
        let paths = PathGenerator::new(config()).generate(&layer, ExtrusionRole::SparseInfill);

        let values: Vec<CoordF> = paths.extrusion_moves().filter_map(|m| m.extrusion).collect();
        let expected = [5.0, 10.0, 15.0, 20.0];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fill_lines_after_loops() {
        let mut layer = square_layer(10.0, 0.0);
        layer.infill = vec![
            FillLine::new(Point3::new(5.0, 0.0, 0.0), Point3::new(5.0, 10.0, 0.0)),
            FillLine::new(Point3::new(0.0, 5.0, 0.0), Point3::new(10.0, 5.0, 0.0)),
        ];
        let paths = PathGenerator::new(config()).generate(&layer, ExtrusionRole::SolidInfill);

        assert_eq!(paths.moves.len(), 9);
        assert_eq!(paths.travel_moves().count(), 3);
        assert_eq!(
            paths
                .extrusion_moves()
                .filter(|m| m.role == ExtrusionRole::SolidInfill)
                .count(),
            2
        );
        // Loop ends at the origin: travel 5 to the first line, then from
        // (5, 10) to (0, 5).
        let expected_travel = 5.0 + (50.0_f64).sqrt();
        assert!((paths.travel_distance - expected_travel).abs() < 1e-12);
        assert!((paths.nozzle_distance - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_loop_is_skipped() {
        let p = Point3::new(1.0, 1.0, 0.0);
        let contour = ContourLoop::from_chords(vec![Chord {
            face_index: 0,
            start: p,
            end: p,
            entry: EdgeKey::new(0, 1),
            exit: EdgeKey::new(0, 2),
        }]);
        let layer = Layer::new(0, 0.0, vec![contour]);
        let paths = PathGenerator::default().generate(&layer, ExtrusionRole::SparseInfill);
        assert!(!paths.has_moves());
    }

    #[test]
    fn test_shift_extrusion() {
        let layer = square_layer(10.0, 0.0);
        let mut paths = PathGenerator::new(config()).generate(&layer, ExtrusionRole::SparseInfill);
        paths.shift_extrusion(100.0);

        assert_eq!(paths.moves[0].extrusion, None);
        assert!((paths.moves[1].extrusion.unwrap() - 105.0).abs() < 1e-12);
        assert!((paths.filament_used - 20.0).abs() < 1e-12);
    }
}
