//! Path simplification for contour outlines.
//!
//! Stitched contour loops carry one point per mesh-edge crossing. Many of
//! those points are redundant for motion:
//!
//! - Faces touching the slicing plane at a vertex yield zero-length chords,
//!   which show up as consecutive duplicate points.
//! - Coplanar triangles of a flat side wall all cross the plane on the same
//!   straight line, which shows up as collinear runs.
//!
//! Removing both leaves the corner points of the cross-section.

use super::{BoundingBox3, Point3};
use crate::CoordF;

/// Largest tolerance for duplicate and collinear point removal (1 micron in mm).
pub const COLLINEARITY_THRESHOLD: CoordF = 0.001;

/// Tolerance relative to the loop's largest extent.
pub const RELATIVE_TOLERANCE: CoordF = 1e-6;

/// Simplification tolerance for a loop: [`RELATIVE_TOLERANCE`] of its largest
/// extent, capped at [`COLLINEARITY_THRESHOLD`].
///
/// Keeps corners of small loops (inch units, small scale factors) that a fixed
/// 0.001 would merge.
pub fn loop_tolerance(points: &[Point3]) -> CoordF {
    let Some(bb) = BoundingBox3::from_points(points) else {
        return 0.0;
    };
    let size = bb.max - bb.min;
    let extent = size.x.max(size.y).max(size.z);
    (extent * RELATIVE_TOLERANCE).min(COLLINEARITY_THRESHOLD)
}

/// Remove consecutive points closer than `tolerance` to the previously kept point.
pub fn remove_duplicate_points(points: &[Point3], tolerance: CoordF) -> Vec<Point3> {
    let mut result: Vec<Point3> = Vec::with_capacity(points.len());

    for point in points {
        match result.last() {
            Some(last) if last.distance_to(point) <= tolerance => {}
            _ => result.push(*point),
        }
    }

    result
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn distance_to_line(p: &Point3, a: &Point3, b: &Point3) -> CoordF {
    let ab = *b - *a;
    let ap = *p - *a;
    let len = (ab.x * ab.x + ab.y * ab.y + ab.z * ab.z).sqrt();
    if len <= CoordF::EPSILON {
        return a.distance_to(p);
    }
    let cx = ap.y * ab.z - ap.z * ab.y;
    let cy = ap.z * ab.x - ap.x * ab.z;
    let cz = ap.x * ab.y - ap.y * ab.x;
    (cx * cx + cy * cy + cz * cz).sqrt() / len
}

/// Remove collinear points from an open path.
///
/// Points are removed if they lie within `tolerance` of the line connecting
/// their neighbors. The first and last points are always kept.
pub fn remove_collinear_points(points: &[Point3], tolerance: CoordF) -> Vec<Point3> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut result: Vec<Point3> = Vec::with_capacity(points.len());
    for point in points {
        while result.len() >= 2 {
            let n = result.len();
            if distance_to_line(&result[n - 1], &result[n - 2], point) <= tolerance {
                result.pop();
            } else {
                break;
            }
        }
        result.push(*point);
    }

    result
}

/// Simplify a closed loop: duplicates and collinear points are removed,
/// including across the seam between the last and the first point.
///
/// The returned loop does not repeat its first point at the end.
pub fn simplify_loop(points: &[Point3], tolerance: CoordF) -> Vec<Point3> {
    let mut pts = remove_duplicate_points(points, tolerance);
    while pts.len() > 1 && pts[0].distance_to(&pts[pts.len() - 1]) <= tolerance {
        pts.pop();
    }

    let mut pts = remove_collinear_points(&pts, tolerance);

    // Seam: the open-path pass never tests the last and first points.
    loop {
        let n = pts.len();
        if n < 3 {
            break;
        }
        if distance_to_line(&pts[n - 1], &pts[n - 2], &pts[0]) <= tolerance {
            pts.pop();
        } else if distance_to_line(&pts[0], &pts[n - 1], &pts[1]) <= tolerance {
            pts.remove(0);
        } else {
            break;
        }
    }

    pts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: CoordF, y: CoordF) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn test_remove_duplicates() {
        let pts = vec![p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1e-6), p(2.0, 0.0)];
        let out = remove_duplicate_points(&pts, COLLINEARITY_THRESHOLD);
        assert_eq!(out, vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);
    }

    #[test]
    fn test_remove_collinear_open() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(2.0, 1.0)];
        let out = remove_collinear_points(&pts, COLLINEARITY_THRESHOLD);
        assert_eq!(out, vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 1.0)]);
    }

    #[test]
    fn test_simplify_square_with_midpoints() {
        // Square with a midpoint on every side and the start on a side.
        let pts = vec![
            p(0.5, 0.0),
            p(1.0, 0.0),
            p(1.0, 0.5),
            p(1.0, 1.0),
            p(0.5, 1.0),
            p(0.0, 1.0),
            p(0.0, 0.5),
            p(0.0, 0.0),
        ];
        let out = simplify_loop(&pts, COLLINEARITY_THRESHOLD);
        assert_eq!(out.len(), 4);
        for corner in [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)] {
            assert!(out.iter().any(|q| q.approx_eq(&corner, 1e-12)));
        }
    }

    #[test]
    fn test_simplify_loop_drops_closing_duplicate() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)];
        let out = simplify_loop(&pts, COLLINEARITY_THRESHOLD);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_simplify_single_point() {
        let pts = vec![p(1.0, 1.0); 5];
        let out = simplify_loop(&pts, COLLINEARITY_THRESHOLD);
        assert_eq!(out, vec![p(1.0, 1.0)]);
    }

    #[test]
    fn test_small_loop_keeps_corners() {
        let side = 0.0005;
        let pts = vec![
            p(0.0, 0.0),
            p(side / 2.0, 0.0),
            p(side, 0.0),
            p(side, side),
            p(0.0, side),
        ];
        assert_eq!(simplify_loop(&pts, COLLINEARITY_THRESHOLD).len(), 1);

        let tolerance = loop_tolerance(&pts);
        assert!((tolerance - side * RELATIVE_TOLERANCE).abs() < 1e-18);
        assert_eq!(simplify_loop(&pts, tolerance).len(), 4);
    }

    #[test]
    fn test_loop_tolerance_is_capped() {
        let pts = vec![p(0.0, 0.0), p(1e4, 0.0), p(1e4, 1e4)];
        assert_eq!(loop_tolerance(&pts), COLLINEARITY_THRESHOLD);
        assert_eq!(loop_tolerance(&[]), 0.0);
    }
}
