//! Slicing module - converts meshes into layers of closed contour loops.
//!
//! This module contains the core slicing functionality:
//! - [`SlicingParams`] - Layer height and scale, and the plane heights they imply
//! - [`slice_layer`] - Faces crossing one plane, with their crossing points
//! - [`stitch_layer`] - Reorders those crossings into closed [`ContourLoop`]s
//! - [`Layer`] - One plane's loops plus its infill

mod layer;
mod mesh_slicer;
mod slicing_params;
mod stitch;

pub use layer::{Chord, ContourLoop, Layer};
pub use mesh_slicer::{slice_layer, ContourPoint, EdgeKey, IntersectedFace};
pub use slicing_params::SlicingParams;
pub use stitch::stitch_layer;

use crate::mesh::Mesh;
use crate::{CoordF, Result};

/// Slice and stitch a single plane into a [`Layer`].
pub fn slice_and_stitch(mesh: &Mesh, index: usize, z: CoordF) -> Result<Layer> {
    let faces = slice_layer(mesh, z)?;
    let loops = stitch_layer(index, &faces)?;
    Ok(Layer::new(index, z, loops))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyramid_loops_shrink_towards_apex() {
        let mesh = Mesh::pyramid(4.0, 4.0);
        let params = SlicingParams::new(0.5, 1.0);

        let perimeters: Vec<CoordF> = params
            .layer_heights(4.0)
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, &z)| {
                let layer = slice_and_stitch(&mesh, i, z).unwrap();
                assert_eq!(layer.loops.len(), 1);
                assert_eq!(layer.loops[0].outline().len(), 4);
                layer.loops[0].perimeter()
            })
            .collect();

        assert_eq!(perimeters.len(), 8);
        assert!((perimeters[0] - 16.0).abs() < 1e-9);
        for pair in perimeters.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        // Side shrinks by 0.5 per 0.5 of height: last layer at z = 3.5.
        assert!((perimeters[7] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_convex_mesh_even_crossings() {
        // Any scan line through a convex cross-section crosses it an even
        // number of times.
        let mesh = Mesh::pyramid(4.0, 3.0);
        for &z in &[0.3, 1.1, 2.9] {
            let layer = slice_and_stitch(&mesh, 0, z).unwrap();
            for &x in &[0.5, 1.7, 2.0, 3.3] {
                let crossings = layer
                    .chords()
                    .filter(|c| (c.start.x > x) != (c.end.x > x))
                    .count();
                assert_eq!(crossings % 2, 0);
            }
        }
    }
}
