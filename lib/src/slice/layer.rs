//! Layer and contour loop types.

use crate::clipper;
use crate::geometry::simplify::{loop_tolerance, simplify_loop};
use crate::geometry::{BoundingBox3, Point3};
use crate::infill::FillLine;
use crate::slice::EdgeKey;
use crate::{CoordF, EPSILON};
use serde::{Deserialize, Serialize};

/// One face's crossing of the slicing plane, oriented along its loop.
///
/// `start` lies on `entry`, `end` lies on `exit`, and the next chord of the
/// loop starts on this chord's `exit` edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub face_index: usize,
    pub start: Point3,
    pub end: Point3,
    pub entry: EdgeKey,
    pub exit: EdgeKey,
}

impl Chord {
    /// Length of the chord.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.start.distance_to(&self.end)
    }
}

/// An ordered loop of chords at one layer height.
///
/// Consecutive chords share a point: `chords[i].end == chords[i + 1].start`,
/// and for a closed loop the last chord ends where the first starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourLoop {
    chords: Vec<Chord>,
}

impl ContourLoop {
    /// Build a loop from already ordered chords.
    pub fn from_chords(chords: Vec<Chord>) -> Self {
        Self { chords }
    }

    /// The ordered chords.
    #[inline]
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// Number of chords (= number of faces crossing the plane in this loop).
    #[inline]
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Both endpoints of every chord in walk order (two points per face).
    pub fn chord_points(&self) -> Vec<Point3> {
        self.chords.iter().flat_map(|c| [c.start, c.end]).collect()
    }

    /// One point per chord: the start of each chord in walk order.
    pub fn points(&self) -> Vec<Point3> {
        self.chords.iter().map(|c| c.start).collect()
    }

    /// Corner points of the loop, with duplicate and collinear points removed.
    ///
    /// The loop is implicitly closed; the first point is not repeated.
    pub fn outline(&self) -> Vec<Point3> {
        let points = self.points();
        simplify_loop(&points, loop_tolerance(&points))
    }

    /// Check that the last chord ends where the first one starts.
    pub fn is_closed(&self) -> bool {
        match (self.chords.first(), self.chords.last()) {
            (Some(first), Some(last)) => last.end.approx_eq(&first.start, EPSILON),
            _ => false,
        }
    }

    /// Total length of the loop.
    pub fn perimeter(&self) -> CoordF {
        self.chords.iter().map(Chord::length).sum()
    }

    /// Bounding box of the loop.
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(&self.points())
    }
}

/// One z-height's contour loops plus the infill generated for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer index, ascending with z.
    pub index: usize,

    /// Height of the slicing plane.
    pub z: CoordF,

    /// Closed contour loops of the cross-section.
    pub loops: Vec<ContourLoop>,

    /// Fill lines, in print order. Empty until infill runs.
    pub infill: Vec<FillLine>,
}

impl Layer {
    /// Create a layer with no infill yet.
    pub fn new(index: usize, z: CoordF, loops: Vec<ContourLoop>) -> Self {
        Self {
            index,
            z,
            loops,
            infill: Vec::new(),
        }
    }

    /// Check if the plane missed the mesh entirely.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Iterate over every chord of every loop.
    pub fn chords(&self) -> impl Iterator<Item = &Chord> {
        self.loops.iter().flat_map(|l| l.chords().iter())
    }

    /// Bounding box of all loops.
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(
            self.chords()
                .flat_map(|c| [&c.start, &c.end])
                .collect::<Vec<_>>(),
        )
    }

    /// Area enclosed by the loops (holes subtracted).
    pub fn footprint_area(&self) -> CoordF {
        clipper::footprint_area(&self.loops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_loop(side: CoordF, z: CoordF) -> ContourLoop {
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
                entry: EdgeKey::new(i, 10 + i),
                exit: EdgeKey::new((i + 1) % 4, 10 + (i + 1) % 4),
            })
            .collect();
        ContourLoop::from_chords(chords)
    }

    #[test]
    fn test_loop_properties() {
        let l = square_loop(2.0, 0.4);
        assert_eq!(l.len(), 4);
        assert!(l.is_closed());
        assert!((l.perimeter() - 8.0).abs() < 1e-12);
        assert_eq!(l.chord_points().len(), 8);
        assert_eq!(l.outline().len(), 4);
    }

    #[test]
    fn test_open_loop_is_not_closed() {
        let mut chords = square_loop(1.0, 0.0).chords().to_vec();
        chords.pop();
        assert!(!ContourLoop::from_chords(chords).is_closed());
        assert!(!ContourLoop::default().is_closed());
    }

    #[test]
    fn test_layer_bounds() {
        let layer = Layer::new(0, 0.0, vec![square_loop(3.0, 0.0)]);
        assert_eq!(layer.chords().count(), 4);
        let bb = layer.bounding_box().unwrap();
        assert_eq!(bb.max, Point3::new(3.0, 3.0, 0.0));
        assert!((layer.footprint_area() - 9.0).abs() < 1e-6);
    }
}
