//! Layer footprint boolean operations.
//!
//! This module turns a layer's contour loops into `geo` polygons and runs
//! boolean operations on them through the geo-clipper library. It backs the
//! overhang test of the infill policy: a layer must be filled solid when the
//! layer above covers area this layer does not.
//!
//! Loop orientation from stitching is arbitrary, so loops are combined with
//! the even-odd rule (successive XOR): a loop inside another one is a hole.

use crate::slice::ContourLoop;
use crate::CoordF;
use geo::{Area, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::Clipper;

/// Factor geo-clipper uses to convert coordinates to integers.
/// 1e6 keeps nanometer resolution for millimeter input.
pub const CLIPPER_FACTOR: CoordF = 1_000_000.0;

/// Convert a contour loop to a `geo` polygon over its simplified outline.
///
/// Returns `None` for loops that enclose no area (fewer than three corners).
pub fn loop_to_geo(contour: &ContourLoop) -> Option<GeoPolygon<CoordF>> {
    let outline = contour.outline();
    if outline.len() < 3 {
        return None;
    }
    let ring: Vec<geo::Coord<CoordF>> = outline.iter().map(|p| p.to_geo_xy()).collect();
    Some(GeoPolygon::new(LineString::from(ring), vec![]))
}

/// Region enclosed by the loops, combined with the even-odd rule.
pub fn footprint(loops: &[ContourLoop]) -> MultiPolygon<CoordF> {
    loops
        .iter()
        .filter_map(loop_to_geo)
        .fold(MultiPolygon::new(Vec::new()), |acc, poly| {
            acc.xor(&poly, CLIPPER_FACTOR)
        })
}

/// Area enclosed by the loops.
pub fn footprint_area(loops: &[ContourLoop]) -> CoordF {
    footprint(loops).unsigned_area()
}

/// Area covered by `upper` but not by `lower`.
pub fn uncovered_area(upper: &[ContourLoop], lower: &[ContourLoop]) -> CoordF {
    let upper = footprint(upper);
    if upper.0.is_empty() {
        return 0.0;
    }
    let lower = footprint(lower);
    upper.difference(&lower, CLIPPER_FACTOR).unsigned_area()
}
