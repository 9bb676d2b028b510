//! Mesh model - indexed vertex array plus face index array.
//!
//! Faces own no geometry; they index into the shared vertex array. The
//! bounding box is derived on demand and never stored, so it can't go stale
//! after [`Mesh::center`] or [`Mesh::scale`] move the vertices.

mod obj;

pub use obj::{load_obj, parse_obj};

use crate::geometry::{BoundingBox3, Point3};
use crate::{CoordF, Error, Result, EPSILON};
use log::warn;
use serde::{Deserialize, Serialize};

/// A mesh face: an ordered tuple of three or more vertex indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    /// Create a face from vertex indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Create a triangle.
    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Number of vertices on this face.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if the face has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Check if this face is a triangle.
    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.indices.len() == 3
    }
}

/// Indexed surface mesh.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<Point3>,
    faces: Vec<Face>,
}

impl Mesh {
    /// Store the vertex and face arrays as given.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedMeshInput`] if a vertex has a non-finite coordinate,
    /// or a face has fewer than three indices or references a vertex that
    /// doesn't exist.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Face>) -> Result<Self> {
        if let Some(index) = vertices
            .iter()
            .position(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(Error::MalformedMeshInput(format!(
                "vertex {} has a non-finite coordinate",
                index
            )));
        }
        for (face_index, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(Error::MalformedMeshInput(format!(
                    "face {} has {} vertices, need at least 3",
                    face_index,
                    face.len()
                )));
            }
            if let Some(&bad) = face.indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(Error::MalformedMeshInput(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    face_index,
                    bad,
                    vertices.len()
                )));
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Axis-aligned cube `[0, size]³` made of 12 outward-facing triangles.
    pub fn cube(size: CoordF) -> Self {
        let s = size;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(0.0, s, 0.0),
            Point3::new(0.0, 0.0, s),
            Point3::new(s, 0.0, s),
            Point3::new(s, s, s),
            Point3::new(0.0, s, s),
        ];
        let faces = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ]
        .iter()
        .map(|f| Face::triangle(f[0], f[1], f[2]))
        .collect();
        Self { vertices, faces }
    }

    /// Square pyramid: base `[0, base]²` at `z = 0`, apex above the base centre.
    pub fn pyramid(base: CoordF, height: CoordF) -> Self {
        let h = base / 2.0;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(base, 0.0, 0.0),
            Point3::new(base, base, 0.0),
            Point3::new(0.0, base, 0.0),
            Point3::new(h, h, height),
        ];
        let faces = vec![
            Face::triangle(0, 2, 1),
            Face::triangle(0, 3, 2),
            Face::triangle(0, 1, 4),
            Face::triangle(1, 2, 4),
            Face::triangle(2, 3, 4),
            Face::triangle(3, 0, 4),
        ];
        Self { vertices, faces }
    }

    /// Square frame: the `[0, outer]²` block of height `height` with a
    /// centred square hole of side `inner` running through it.
    ///
    /// Walls and caps are quads, so call [`Mesh::triangulate`] before slicing.
    pub fn square_frame(outer: CoordF, inner: CoordF, height: CoordF) -> Self {
        let lo = (outer - inner) / 2.0;
        let hi = lo + inner;
        let ring = |a: CoordF, b: CoordF, z: CoordF| {
            [
                Point3::new(a, a, z),
                Point3::new(b, a, z),
                Point3::new(b, b, z),
                Point3::new(a, b, z),
            ]
        };
        // Outer bottom 0..4, outer top 4..8, inner bottom 8..12, inner top 12..16.
        let vertices: Vec<Point3> = ring(0.0, outer, 0.0)
            .into_iter()
            .chain(ring(0.0, outer, height))
            .chain(ring(lo, hi, 0.0))
            .chain(ring(lo, hi, height))
            .collect();

        let mut faces = Vec::with_capacity(16);
        for i in 0..4 {
            let j = (i + 1) % 4;
            faces.push(Face::new(vec![i, j, 4 + j, 4 + i]));
            faces.push(Face::new(vec![8 + j, 8 + i, 12 + i, 12 + j]));
            faces.push(Face::new(vec![j, i, 8 + i, 8 + j]));
            faces.push(Face::new(vec![4 + i, 4 + j, 12 + j, 12 + i]));
        }
        Self { vertices, faces }
    }

    /// The vertex array.
    #[inline]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// The face array.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Vertex positions of a face, in face order.
    pub fn face_points<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = Point3> + 'a {
        face.indices.iter().map(move |&i| self.vertices[i])
    }

    /// Bounding box of all vertices, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(&self.vertices)
    }

    /// Multiply every coordinate by `factor`.
    pub fn scale(&mut self, factor: CoordF) {
        for v in &mut self.vertices {
            *v = *v * factor;
        }
    }

    /// Split every face with more than three vertices into a triangle fan.
    ///
    /// Returns the number of faces that were split.
    pub fn triangulate(&mut self) -> usize {
        if self.faces.iter().all(Face::is_triangle) {
            return 0;
        }

        let mut split = 0;
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in self.faces.drain(..) {
            if face.is_triangle() {
                faces.push(face);
                continue;
            }
            split += 1;
            let v0 = face.indices[0];
            for pair in face.indices[1..].windows(2) {
                faces.push(Face::triangle(v0, pair[0], pair[1]));
            }
        }
        self.faces = faces;
        split
    }

    /// Move the mesh onto the build plate and centre it on X and Y.
    ///
    /// After centering `z_min == 0` and the midpoints of the X and Y ranges
    /// are at the origin. Returns the resulting `z_max`, which determines the
    /// number of layers. Offsets smaller than [`EPSILON`] are left alone, so
    /// centering an already-centered mesh doesn't move it.
    pub fn center(&mut self) -> CoordF {
        let Some(bb) = self.bounding_box() else {
            return 0.0;
        };

        let mid = bb.center();
        let mut offset = Point3::default();
        if bb.min.z.abs() > EPSILON {
            warn!("Base height is {} instead of zero, compensating", bb.min.z);
            offset.z = bb.min.z;
        }

        if mid.x.abs() > EPSILON {
            warn!("X axis is off centre by {}, centering", mid.x);
            offset.x = mid.x;
        }

        if mid.y.abs() > EPSILON {
            warn!("Y axis is off centre by {}, centering", mid.y);
            offset.y = mid.y;
        }

        if offset != Point3::default() {
            for v in &mut self.vertices {
                *v = *v - offset;
            }
        }

        bb.max.z - offset.z
    }
}
