//! Geometry primitives for the slicer.
//!
//! This module provides the geometry kernel the slicing pipeline is built on:
//! - [`Point3`] - 3-D point with floating-point coordinates
//! - [`BoundingBox3`] - Axis-aligned bounding box
//! - [`Axis`] - Coordinate axis selector
//! - [`intersect`] - Point on a segment where one coordinate takes a given value
//! - [`distance`] - Euclidean distance
//! - [`simplify`] - Duplicate/collinear point removal for contour outlines
//!
//! ## Coordinate System
//!
//! All coordinates are unscaled floats in output units (mm or inches, per
//! configuration). Z is the build direction; slicing planes are `z = const`.

mod bounding_box;
mod point;
pub mod simplify;

pub use bounding_box::BoundingBox3;
pub use point::Point3;
pub use simplify::{remove_collinear_points, remove_duplicate_points, simplify_loop};

use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Index of the axis in an `[x, y, z]` triple.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The in-plane axis used to order fill crossings taken along `self`.
    ///
    /// Scanning at fixed X orders crossings by Y and vice versa.
    #[inline]
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y | Axis::Z => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Point on the line through `p1` and `p2` where the `axis` coordinate equals `value`.
///
/// The other two coordinates are linearly interpolated; the chosen coordinate
/// is set to `value` exactly. Values outside the segment extrapolate along the
/// line.
///
/// # Errors
///
/// [`Error::DegenerateSegment`] when `p1` and `p2` share the same `axis`
/// coordinate, since the line never reaches (or always lies on) `value`.
pub fn intersect(p1: &Point3, p2: &Point3, axis: Axis, value: CoordF) -> Result<Point3> {
    let span = p2.coord(axis) - p1.coord(axis);
    if span == 0.0 {
        return Err(Error::DegenerateSegment { axis, value });
    }

    let t = (value - p1.coord(axis)) / span;
    let point = *p1 + (*p2 - *p1) * t;
    Ok(point.with_coord(axis, value))
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(p1: &Point3, p2: &Point3) -> CoordF {
    p1.distance_to(p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_each_axis() {
        let c1 = Point3::new(1.0, 1.0, 1.0);

        let p = intersect(&c1, &Point3::new(3.0, 1.0, 1.0), Axis::X, 2.0).unwrap();
        assert_eq!(p, Point3::new(2.0, 1.0, 1.0));

        let p = intersect(&c1, &Point3::new(1.0, 3.0, 1.0), Axis::Y, 2.0).unwrap();
        assert_eq!(p, Point3::new(1.0, 2.0, 1.0));

        let p = intersect(&c1, &Point3::new(1.0, 1.0, 3.0), Axis::Z, 2.0).unwrap();
        assert_eq!(p, Point3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_intersect_lies_on_segment() {
        let a = Point3::new(-2.0, 5.0, 0.3);
        let b = Point3::new(4.0, -1.0, 2.7);

        for &z in &[0.3, 0.5, 1.0, 1.9, 2.7] {
            let p = intersect(&a, &b, Axis::Z, z).unwrap();
            assert!((p.z - z).abs() < 1e-12);
            // On the segment: |ap| + |pb| == |ab|
            let along = distance(&a, &p) + distance(&p, &b);
            assert!((along - distance(&a, &b)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_intersect_is_symmetric_in_endpoints() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, 4.0, 2.0);
        let p = intersect(&a, &b, Axis::X, 2.5).unwrap();
        let q = intersect(&b, &a, Axis::X, 2.5).unwrap();
        assert!(p.approx_eq(&q, 1e-12));
        assert!((p.y - 1.0).abs() < 1e-12);
        assert!((p.z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_intersect_degenerate() {
        let a = Point3::new(0.0, 0.0, 1.0);
        let b = Point3::new(5.0, 5.0, 1.0);
        match intersect(&a, &b, Axis::Z, 1.0) {
            Err(Error::DegenerateSegment { axis, value }) => {
                assert_eq!(axis, Axis::Z);
                assert_eq!(value, 1.0);
            }
            other => panic!("expected DegenerateSegment, got {:?}", other),
        }
    }

    #[test]
    fn test_distance() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-12);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(distance(&a, &a), 0.0);
    }

    #[test]
    fn test_axis_perpendicular() {
        assert_eq!(Axis::X.perpendicular(), Axis::Y);
        assert_eq!(Axis::Y.perpendicular(), Axis::X);
        assert_eq!(Axis::Z.index(), 2);
        assert_eq!(Axis::Y.to_string(), "y");
    }
}
