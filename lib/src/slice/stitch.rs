//! Contour stitching - reorders a layer's unordered chords into closed loops.
//!
//! # Algorithm
//!
//! Each intersected face contributes one chord whose two endpoints lie on two
//! mesh edges crossing the plane. Two chords are adjacent iff they share such
//! an edge. On a manifold mesh every crossing edge borders exactly two
//! crossing faces, so the adjacency graph is a disjoint union of cycles, one
//! per contour loop.
//!
//! 1. Index chords by the crossing edges they touch
//! 2. Partition chords into connected components (breadth-first)
//! 3. Walk each component from its lowest-indexed chord, always leaving
//!    through the edge the current chord did not enter by, until the walk
//!    returns to the first chord
//!
//! The walk orients every chord so that it starts where the previous one
//! ended. Disjoint cross-sections (two bodies, a torus) come out as separate
//! loops instead of being interleaved.
//!
//! Input order only decides which loop comes first and where each loop
//! starts, so the output is deterministic for a given mesh.

use super::{Chord, ContourLoop, EdgeKey, IntersectedFace};
use crate::{Error, Result, EPSILON};
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Stitch one layer's intersected faces into closed contour loops.
///
/// # Errors
///
/// [`Error::ContourIntegrity`] carrying `layer_index` if a face doesn't cross
/// the plane at exactly two points, a crossing edge is shared by more than two
/// faces, or a loop can't be closed.
pub fn stitch_layer(layer_index: usize, faces: &[IntersectedFace]) -> Result<Vec<ContourLoop>> {
    if faces.is_empty() {
        return Ok(Vec::new());
    }

    let by_edge = index_edges(layer_index, faces)?;
    let components = connected_components(faces, &by_edge);

    let loops = components
        .iter()
        .map(|component| walk_component(layer_index, faces, &by_edge, component))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Layer {}: stitched {} faces into {} loop(s)",
        layer_index,
        faces.len(),
        loops.len()
    );

    Ok(loops)
}

/// Map each crossing edge to the faces (by position in `faces`) touching it.
fn index_edges(
    layer_index: usize,
    faces: &[IntersectedFace],
) -> Result<HashMap<EdgeKey, Vec<usize>>> {
    let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::with_capacity(faces.len());

    for (i, face) in faces.iter().enumerate() {
        if face.points.len() != 2 {
            return Err(Error::integrity(
                layer_index,
                format!(
                    "face {} crosses the plane at {} points, expected 2",
                    face.face_index,
                    face.points.len()
                ),
            ));
        }
        for p in &face.points {
            let users = by_edge.entry(p.edge).or_default();
            users.push(i);
            if users.len() > 2 {
                return Err(Error::integrity(
                    layer_index,
                    format!(
                        "edge ({}, {}) is shared by more than two crossing faces",
                        p.edge.0, p.edge.1
                    ),
                ));
            }
        }
    }

    Ok(by_edge)
}

/// Group faces into connected components, each sorted by face position.
///
/// Components are ordered by their lowest face position.
fn connected_components(
    faces: &[IntersectedFace],
    by_edge: &HashMap<EdgeKey, Vec<usize>>,
) -> Vec<Vec<usize>> {
    let mut component_of: Vec<Option<usize>> = vec![None; faces.len()];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for seed in 0..faces.len() {
        if component_of[seed].is_some() {
            continue;
        }

        let id = components.len();
        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);
        component_of[seed] = Some(id);

        while let Some(i) = queue.pop_front() {
            members.push(i);
            for p in &faces[i].points {
                for &j in &by_edge[&p.edge] {
                    if component_of[j].is_none() {
                        component_of[j] = Some(id);
                        queue.push_back(j);
                    }
                }
            }
        }

        members.sort_unstable();
        components.push(members);
    }

    components
}

/// Walk one component into an ordered, closed loop.
fn walk_component(
    layer_index: usize,
    faces: &[IntersectedFace],
    by_edge: &HashMap<EdgeKey, Vec<usize>>,
    component: &[usize],
) -> Result<ContourLoop> {
    let first = component[0];
    let mut chords = Vec::with_capacity(component.len());

    let start_face = &faces[first];
    let mut current = first;
    let mut entry = start_face.points[0];
    let mut exit = start_face.points[1];

    loop {
        chords.push(Chord {
            face_index: faces[current].face_index,
            start: entry.position,
            end: exit.position,
            entry: entry.edge,
            exit: exit.edge,
        });

        let next = by_edge[&exit.edge]
            .iter()
            .copied()
            .find(|&j| j != current);

        let Some(next) = next else {
            return Err(Error::integrity(
                layer_index,
                format!(
                    "loop starting at face {} is open at edge ({}, {})",
                    start_face.face_index, exit.edge.0, exit.edge.1
                ),
            ));
        };

        if next == first {
            break;
        }
        if chords.len() >= component.len() {
            return Err(Error::integrity(
                layer_index,
                format!(
                    "loop starting at face {} does not return to its start",
                    start_face.face_index
                ),
            ));
        }

        let pts = &faces[next].points;
        let (next_entry, next_exit) = if pts[0].edge == exit.edge {
            (pts[0], pts[1])
        } else {
            (pts[1], pts[0])
        };

        current = next;
        entry = next_entry;
        exit = next_exit;
    }

    if chords.len() != component.len() {
        return Err(Error::integrity(
            layer_index,
            format!(
                "loop starting at face {} closed after {} of {} faces",
                start_face.face_index,
                chords.len(),
                component.len()
            ),
        ));
    }

    let contour = ContourLoop::from_chords(chords);
    if !contour.is_closed() {
        return Err(Error::integrity(
            layer_index,
            format!(
                "loop starting at face {} ends {} away from its start (tolerance {})",
                start_face.face_index,
                contour.chords()[contour.len() - 1]
                    .end
                    .distance_to(&contour.chords()[0].start),
                EPSILON
            ),
        ));
    }

    Ok(contour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use crate::mesh::{Face, Mesh};
    use crate::slice::slice_layer;
    use crate::CoordF;

    fn assert_walk_is_continuous(contour: &ContourLoop) {
        let pts = contour.chord_points();
        assert_eq!(pts.len(), contour.len() * 2);
        // Consecutive chords share a point, and the loop closes.
        for i in 0..contour.len() {
            let end = pts[2 * i + 1];
            let next_start = pts[(2 * i + 2) % pts.len()];
            assert!(end.approx_eq(&next_start, 1e-12));
        }
    }

    #[test]
    fn test_stitch_cube_middle() {
        let mesh = Mesh::cube(1.0);
        let faces = slice_layer(&mesh, 0.5).unwrap();
        let loops = stitch_layer(3, &faces).unwrap();

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), faces.len());
        assert_walk_is_continuous(&loops[0]);
        assert!((loops[0].perimeter() - 4.0).abs() < 1e-9);
        assert_eq!(loops[0].outline().len(), 4);
    }

    #[test]
    fn test_stitch_is_independent_of_input_order() {
        let mesh = Mesh::cube(1.0);
        let mut faces = slice_layer(&mesh, 0.25).unwrap();
        faces.reverse();
        faces.swap(1, 5);

        let loops = stitch_layer(0, &faces).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 8);
        assert_walk_is_continuous(&loops[0]);
    }

    #[test]
    fn test_stitch_separates_disjoint_bodies() {
        // Two unit cubes side by side with a gap: one layer, two loops.
        let a = Mesh::cube(1.0);
        let mut vertices = a.vertices().to_vec();
        let mut faces = a.faces().to_vec();
        let offset = vertices.len();
        vertices.extend(
            a.vertices()
                .iter()
                .map(|v| *v + Point3::new(3.0, 0.0, 0.0)),
        );
        faces.extend(
            a.faces()
                .iter()
                .map(|f| Face::new(f.indices.iter().map(|i| i + offset).collect())),
        );
        let mesh = Mesh::new(vertices, faces).unwrap();

        let crossed = slice_layer(&mesh, 0.5).unwrap();
        let loops = stitch_layer(0, &crossed).unwrap();

        assert_eq!(loops.len(), 2);
        for l in &loops {
            assert_eq!(l.len(), 8);
            assert!(l.is_closed());
            assert_walk_is_continuous(l);
        }
        let bb0 = loops[0].bounding_box().unwrap();
        let bb1 = loops[1].bounding_box().unwrap();
        assert!(bb0.max.x <= 1.0 + 1e-12);
        assert!(bb1.min.x >= 3.0 - 1e-12);
    }

    #[test]
    fn test_stitch_frame_gives_nested_loops() {
        let mut mesh = Mesh::square_frame(10.0, 4.0, 2.0);
        assert_eq!(mesh.triangulate(), 16);

        let crossed = slice_layer(&mesh, 1.0).unwrap();
        assert_eq!(crossed.len(), 16);
        let loops = stitch_layer(0, &crossed).unwrap();

        assert_eq!(loops.len(), 2);
        let mut sizes: Vec<CoordF> = loops
            .iter()
            .map(|l| {
                assert!(l.is_closed());
                assert_walk_is_continuous(l);
                assert_eq!(l.outline().len(), 4);
                l.bounding_box().unwrap().size_along(crate::geometry::Axis::X)
            })
            .collect();
        sizes.sort_by(|a, b| a.total_cmp(b));
        assert!((sizes[0] - 4.0).abs() < 1e-12);
        assert!((sizes[1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_stitch_bottom_plane_with_vertex_touching_faces() {
        let mesh = Mesh::cube(1.0);
        let faces = slice_layer(&mesh, 0.0).unwrap();
        let loops = stitch_layer(0, &faces).unwrap();

        assert_eq!(loops.len(), 1);
        assert_walk_is_continuous(&loops[0]);
        let outline = loops[0].outline();
        assert_eq!(outline.len(), 4);
        for corner in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ] {
            assert!(outline.iter().any(|p| p.approx_eq(&corner, 1e-12)));
        }
    }

    #[test]
    fn test_stitch_open_surface_is_error() {
        // A single side wall is not closed: the loop can't return to its start.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::new(
            vertices,
            vec![Face::triangle(0, 1, 2), Face::triangle(0, 2, 3)],
        )
        .unwrap();
        let faces = slice_layer(&mesh, 0.5).unwrap();

        match stitch_layer(9, &faces) {
            Err(Error::ContourIntegrity { layer, .. }) => assert_eq!(layer, 9),
            other => panic!("expected ContourIntegrity, got {:?}", other),
        }
    }

    #[test]
    fn test_stitch_rejects_non_triangular_crossing() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::new(vertices, vec![Face::new(vec![0, 1, 2, 3])]).unwrap();
        let faces = slice_layer(&mesh, 0.5).unwrap();
        assert!(matches!(
            stitch_layer(0, &faces),
            Err(Error::ContourIntegrity { .. })
        ));
    }

    #[test]
    fn test_stitch_empty_layer() {
        assert!(stitch_layer(0, &[]).unwrap().is_empty());
    }
}
