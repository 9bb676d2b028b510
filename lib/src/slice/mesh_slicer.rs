//! Mesh slicer - face-plane intersection.
//!
//! For a plane `z = h`, every face is split into the vertices on or below the
//! plane (`z <= h`) and the vertices above it (`z > h`). A face crosses the
//! plane iff both sets are non-empty, and each (below, above) pair is one of
//! its edges crossing the plane. The crossing point of every such edge is
//! recorded against the face, tagged with the edge it came from so that the
//! stitcher can link faces sharing that edge.
//!
//! A vertex lying exactly on the plane counts as "below". A face touching the
//! plane at that vertex, with its other vertices above, therefore crosses the
//! plane and yields a zero-length chord at the vertex. Those chords are kept:
//! they keep the loop walk connected, and [`ContourLoop::outline`] drops the
//! duplicate points they produce.
//!
//! [`ContourLoop::outline`]: super::ContourLoop::outline

use crate::geometry::{intersect, Axis, Point3};
use crate::mesh::Mesh;
use crate::{CoordF, Result};
use serde::{Deserialize, Serialize};

/// An undirected mesh edge, stored as `(min, max)` vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    /// Create the key for the edge between vertices `a` and `b`.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// A point where a mesh edge crosses the slicing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    /// Position on the plane.
    pub position: Point3,
    /// The mesh edge this point lies on.
    pub edge: EdgeKey,
}

/// A face crossing the current slicing plane, with its crossing points.
///
/// Lives for one slicing pass at one layer height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectedFace {
    /// Index of the face in the mesh.
    pub face_index: usize,
    /// The face's vertex indices.
    pub vertices: Vec<usize>,
    /// Crossing points, one per (below, above) vertex pair.
    pub points: Vec<ContourPoint>,
}

/// Compute every face crossing the plane `z`, in mesh face order.
pub fn slice_layer(mesh: &Mesh, z: CoordF) -> Result<Vec<IntersectedFace>> {
    let vertices = mesh.vertices();
    let mut crossed = Vec::new();

    for (face_index, face) in mesh.faces().iter().enumerate() {
        let (below, above): (Vec<usize>, Vec<usize>) =
            face.indices.iter().partition(|&&i| vertices[i].z <= z);

        if below.is_empty() || above.is_empty() {
            continue;
        }

        let mut points = Vec::with_capacity(below.len() * above.len());
        for &low in &below {
            for &up in &above {
                let position = intersect(&vertices[low], &vertices[up], Axis::Z, z)?;
                points.push(ContourPoint {
                    position,
                    edge: EdgeKey::new(low, up),
                });
            }
        }

        crossed.push(IntersectedFace {
            face_index,
            vertices: face.indices.clone(),
            points,
        });
    }

    Ok(crossed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;

    #[test]
    fn test_edge_key_is_unordered() {
        assert_eq!(EdgeKey::new(3, 1), EdgeKey::new(1, 3));
        assert_eq!(EdgeKey::new(3, 1), EdgeKey(1, 3));
    }

    #[test]
    fn test_slice_cube_middle() {
        let mesh = Mesh::cube(1.0);
        let faces = slice_layer(&mesh, 0.5).unwrap();

        // Top and bottom are skipped, all eight side triangles cross.
        assert_eq!(faces.len(), 8);
        for face in &faces {
            assert_eq!(face.points.len(), 2);
            for p in &face.points {
                assert!((p.position.z - 0.5).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_slice_above_and_below() {
        let mesh = Mesh::cube(1.0);
        assert!(slice_layer(&mesh, 1.0).unwrap().is_empty());
        assert!(slice_layer(&mesh, 2.0).unwrap().is_empty());
        assert!(slice_layer(&mesh, -0.5).unwrap().is_empty());
    }

    #[test]
    fn test_vertex_on_plane_counts_as_below() {
        // Triangle touching z = 0 at one vertex, other two above.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let mesh = Mesh::new(vertices, vec![Face::triangle(0, 1, 2)]).unwrap();
        let faces = slice_layer(&mesh, 0.0).unwrap();

        assert_eq!(faces.len(), 1);
        let pts = &faces[0].points;
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].position, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(pts[1].position, Point3::new(0.0, 0.0, 0.0));
        assert_ne!(pts[0].edge, pts[1].edge);
    }

    #[test]
    fn test_quad_face_records_every_pair() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::new(vertices, vec![Face::new(vec![0, 1, 2, 3])]).unwrap();
        let faces = slice_layer(&mesh, 0.5).unwrap();
        assert_eq!(faces[0].points.len(), 4);
    }
}
