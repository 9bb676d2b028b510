//! Axis-aligned bounding box.

use super::{Axis, Point3};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Axis-aligned 3-D bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    /// Create a bounding box from its corners.
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bb = Self::new(first, first);
        for p in iter {
            bb.include(p);
        }
        Some(bb)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Lower bound along `axis`.
    #[inline]
    pub fn min_along(&self, axis: Axis) -> CoordF {
        self.min.coord(axis)
    }

    /// Upper bound along `axis`.
    #[inline]
    pub fn max_along(&self, axis: Axis) -> CoordF {
        self.max.coord(axis)
    }

    /// Extent along `axis`.
    #[inline]
    pub fn size_along(&self, axis: Axis) -> CoordF {
        self.max_along(axis) - self.min_along(axis)
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// Check if the XY projection of `p` lies inside the box (inclusive).
    pub fn contains_xy(&self, p: &Point3, epsilon: CoordF) -> bool {
        p.x >= self.min.x - epsilon
            && p.x <= self.max.x + epsilon
            && p.y >= self.min.y - epsilon
            && p.y <= self.max.y + epsilon
    }
}
