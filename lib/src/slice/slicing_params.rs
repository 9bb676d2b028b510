//! Slicing parameters.

use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of slicing planes for one print.
pub const MAX_LAYERS: usize = 1_000_000;

/// Parameters controlling where slicing planes are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlicingParams {
    /// Distance between consecutive slicing planes (output units).
    pub layer_height: CoordF,

    /// Factor applied to the mesh before slicing.
    pub scale: CoordF,
}

impl Default for SlicingParams {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            scale: 1.0,
        }
    }
}

impl SlicingParams {
    /// Create slicing parameters.
    pub fn new(layer_height: CoordF, scale: CoordF) -> Self {
        Self {
            layer_height,
            scale,
        }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.layer_height.is_finite() || self.layer_height <= 0.0 {
            return Err(Error::Config(format!(
                "layer height must be positive, got {}",
                self.layer_height
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::Config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// Number of layers for a centered, unscaled mesh of height `z_max`:
    /// `ceil(z_max * scale / layer_height)`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the count is not finite or exceeds [`MAX_LAYERS`].
    pub fn layer_count(&self, z_max: CoordF) -> Result<usize> {
        let layers = (z_max * self.scale / self.layer_height).ceil();
        if !layers.is_finite() || layers > MAX_LAYERS as CoordF {
            return Err(Error::Config(format!(
                "mesh height {} at scale {} and layer height {} gives {} layers (limit {})",
                z_max, self.scale, self.layer_height, layers, MAX_LAYERS
            )));
        }
        Ok(if layers > 0.0 { layers as usize } else { 0 })
    }

    /// Plane heights `i * layer_height` for `i` in `[0, layer_count)`, ascending.
    pub fn layer_heights(&self, z_max: CoordF) -> Result<Vec<CoordF>> {
        Ok((0..self.layer_count(z_max)?)
            .map(|i| i as CoordF * self.layer_height)
            .collect())
    }
}
