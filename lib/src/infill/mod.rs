//! Infill pattern generation module.
//!
//! Every pattern is built from one primitive, [`fill_across`]: intersect a
//! layer's chords with the scan line `axis = value`, sort the crossings along
//! the perpendicular axis and pair them up (0↔1, 2↔3, ...). Each pair is one
//! fill line: a rapid travel to its start followed by a filled move to its
//! end.
//!
//! # Patterns
//!
//! - **Solid** - scan lines a small fixed gap apart along one axis,
//!   alternating between X (even layers) and Y (odd layers)
//! - **Cross hatch** - scan lines along X over the mesh-wide X range, then
//!   along Y over the mesh-wide Y range, so lines line up between layers
//! - **None** - no fill
//!
//! # Layer policy
//!
//! [`InfillGenerator`] picks the strategy per layer: the bottom and top
//! `solid_layers` layers are shells and always filled solid, as is a layer
//! that the layer above overhangs. Every other layer uses the configured
//! pattern.

use crate::clipper::uncovered_area;
use crate::geometry::{intersect, Axis, BoundingBox3, Point3};
use crate::slice::{Chord, Layer};
use crate::{CoordF, Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Scan-line gap used for solid layers (mm).
pub const DEFAULT_SOLID_GAP: CoordF = 1.0;

/// Scan-line gap used for cross-hatch infill (mm).
pub const DEFAULT_CROSS_GAP: CoordF = 5.0;

/// Uncovered area (mm²) above which the layer above counts as an overhang.
pub const OVERHANG_AREA_TOLERANCE: CoordF = 1e-6;

/// A straight fill segment: travel to `start`, extrude to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillLine {
    pub start: Point3,
    pub end: Point3,
}

impl FillLine {
    #[inline]
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Length of the filled move.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.start.distance_to(&self.end)
    }
}

/// Distance between scan lines, either given directly or as a line count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillSpacing {
    /// Fixed gap between scan lines (mm).
    Gap(CoordF),
    /// Number of equal intervals the range is split into.
    Lines(usize),
}

impl Default for FillSpacing {
    fn default() -> Self {
        FillSpacing::Gap(DEFAULT_CROSS_GAP)
    }
}

impl FillSpacing {
    /// Gap between scan lines over the range `start..end`.
    pub fn gap(&self, start: CoordF, end: CoordF) -> CoordF {
        match *self {
            FillSpacing::Gap(gap) => gap,
            FillSpacing::Lines(n) => (end - start) / n.max(1) as CoordF,
        }
    }

    /// Check that the spacing yields a positive gap.
    pub fn validate(&self) -> Result<()> {
        match *self {
            FillSpacing::Gap(gap) if !gap.is_finite() || gap <= 0.0 => Err(Error::Config(
                format!("infill gap must be positive, got {}", gap),
            )),
            FillSpacing::Lines(0) => Err(Error::Config(
                "infill line count must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Infill kind used for layers that are neither shells nor overhangs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InfillPattern {
    /// Cross-hatch over the mesh-wide bounding box.
    Cross {
        #[serde(default)]
        spacing: FillSpacing,
    },
    /// Solid fill on every layer.
    Solid,
    /// Contours only.
    None,
}

impl Default for InfillPattern {
    fn default() -> Self {
        InfillPattern::Cross {
            spacing: FillSpacing::default(),
        }
    }
}

impl std::fmt::Display for InfillPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfillPattern::Cross { .. } => write!(f, "cross"),
            InfillPattern::Solid => write!(f, "solid"),
            InfillPattern::None => write!(f, "none"),
        }
    }
}

/// Check whether a chord crosses the scan line `axis = value`.
///
/// One endpoint must lie strictly above `value` and the other at or below
/// it, so a loop vertex lying exactly on the scan line is counted once.
#[inline]
fn crosses(chord: &Chord, axis: Axis, value: CoordF) -> bool {
    let a = chord.start.coord(axis);
    let b = chord.end.coord(axis);
    (a > value && b <= value) || (b > value && a <= value)
}

/// Fill lines where the scan line `axis = value` is inside the layer.
///
/// # Errors
///
/// [`Error::ContourIntegrity`] if the scan line crosses the loops an odd
/// number of times.
pub fn fill_across(layer: &Layer, axis: Axis, value: CoordF) -> Result<Vec<FillLine>> {
    let order = axis.perpendicular();

    let mut hits = layer
        .chords()
        .filter(|c| crosses(c, axis, value))
        .map(|c| intersect(&c.start, &c.end, axis, value))
        .collect::<Result<Vec<Point3>>>()?;

    if hits.len() % 2 != 0 {
        return Err(Error::integrity(
            layer.index,
            format!(
                "scan line {} = {} crosses the contours {} times",
                axis,
                value,
                hits.len()
            ),
        ));
    }

    hits.sort_by(|a, b| a.coord(order).total_cmp(&b.coord(order)));

    Ok(hits
        .chunks_exact(2)
        .map(|pair| FillLine::new(pair[0], pair[1]))
        .collect())
}

/// Scan lines along `axis` at `start + gap`, `start + 2 * gap`, ... below `end`.
///
/// # Errors
///
/// [`Error::Config`] for a non-positive gap, or any error from [`fill_across`].
pub fn gap_fill(
    layer: &Layer,
    axis: Axis,
    start: CoordF,
    end: CoordF,
    gap: CoordF,
) -> Result<Vec<FillLine>> {
    if !gap.is_finite() || gap <= 0.0 {
        return Err(Error::Config(format!(
            "fill gap must be positive, got {}",
            gap
        )));
    }

    let steps = ((end - start) / gap).ceil();
    if steps <= 1.0 {
        return Ok(Vec::new());
    }

    let mut lines = Vec::new();
    for k in 1..steps as usize {
        let value = start + k as CoordF * gap;
        if value >= end {
            break;
        }
        lines.extend(fill_across(layer, axis, value)?);
    }
    Ok(lines)
}

/// A way of filling the inside of a layer's contours.
pub trait FillStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Whether this strategy gives dense (solid) coverage.
    fn is_solid(&self) -> bool;

    /// Generate fill lines for `layer`. `bounds` is the mesh-wide bounding box.
    fn generate(&self, layer: &Layer, bounds: &BoundingBox3) -> Result<Vec<FillLine>>;
}

/// Dense scan lines along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidFill {
    pub axis: Axis,
    pub gap: CoordF,
}

impl SolidFill {
    pub fn new(axis: Axis, gap: CoordF) -> Self {
        Self { axis, gap }
    }

    /// Solid fill for a layer: X on even layers, Y on odd layers.
    pub fn for_layer(layer_index: usize, gap: CoordF) -> Self {
        let axis = if layer_index % 2 == 0 { Axis::X } else { Axis::Y };
        Self::new(axis, gap)
    }
}

impl FillStrategy for SolidFill {
    fn name(&self) -> &'static str {
        "solid"
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn generate(&self, layer: &Layer, bounds: &BoundingBox3) -> Result<Vec<FillLine>> {
        gap_fill(
            layer,
            self.axis,
            bounds.min_along(self.axis),
            bounds.max_along(self.axis),
            self.gap,
        )
    }
}

/// Scan lines along X, then along Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrossHatchFill {
    pub spacing: FillSpacing,
}

impl CrossHatchFill {
    pub fn new(spacing: FillSpacing) -> Self {
        Self { spacing }
    }
}

impl FillStrategy for CrossHatchFill {
    fn name(&self) -> &'static str {
        "cross"
    }

    fn is_solid(&self) -> bool {
        false
    }

    fn generate(&self, layer: &Layer, bounds: &BoundingBox3) -> Result<Vec<FillLine>> {
        let mut lines = Vec::new();
        for axis in [Axis::X, Axis::Y] {
            let start = bounds.min_along(axis);
            let end = bounds.max_along(axis);
            lines.extend(gap_fill(
                layer,
                axis,
                start,
                end,
                self.spacing.gap(start, end),
            )?);
        }
        Ok(lines)
    }
}

/// No infill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoFill;

impl FillStrategy for NoFill {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_solid(&self) -> bool {
        false
    }

    fn generate(&self, _layer: &Layer, _bounds: &BoundingBox3) -> Result<Vec<FillLine>> {
        Ok(Vec::new())
    }
}

/// Configuration for infill generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfillConfig {
    /// Pattern for layers that are neither shells nor overhangs.
    pub pattern: InfillPattern,

    /// Number of solid shell layers at the bottom and at the top.
    pub solid_layers: usize,

    /// Scan-line gap for solid layers (mm).
    pub solid_gap: CoordF,
}

impl Default for InfillConfig {
    fn default() -> Self {
        Self {
            pattern: InfillPattern::default(),
            solid_layers: 3,
            solid_gap: DEFAULT_SOLID_GAP,
        }
    }
}

/// Result of infill generation for one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfillResult {
    /// Fill lines in print order.
    pub lines: Vec<FillLine>,

    /// Whether the layer was filled solid.
    pub solid: bool,
}

impl InfillResult {
    /// Total length of the filled moves.
    pub fn total_length(&self) -> CoordF {
        self.lines.iter().map(FillLine::length).sum()
    }
}

/// Per-layer infill generator.
#[derive(Debug, Clone, Default)]
pub struct InfillGenerator {
    config: InfillConfig,
}

impl InfillGenerator {
    pub fn new(config: InfillConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InfillConfig {
        &self.config
    }

    /// Check if `layer_index` is one of the bottom or top shell layers.
    pub fn is_shell_layer(&self, layer_index: usize, layer_count: usize) -> bool {
        let n = self.config.solid_layers;
        layer_index < n || layer_index + n >= layer_count
    }

    /// Check if `above` covers area that `layer` does not.
    pub fn is_overhang(layer: &Layer, above: Option<&Layer>) -> bool {
        above.is_some_and(|above| {
            uncovered_area(&above.loops, &layer.loops) > OVERHANG_AREA_TOLERANCE
        })
    }

    /// Choose the fill strategy for a layer.
    pub fn strategy_for(
        &self,
        layer_index: usize,
        layer_count: usize,
        overhang: bool,
    ) -> Box<dyn FillStrategy> {
        let solid = SolidFill::for_layer(layer_index, self.config.solid_gap);
        if overhang || self.is_shell_layer(layer_index, layer_count) {
            return Box::new(solid);
        }
        match self.config.pattern {
            InfillPattern::Cross { spacing } => Box::new(CrossHatchFill::new(spacing)),
            InfillPattern::Solid => Box::new(solid),
            InfillPattern::None => Box::new(NoFill),
        }
    }

    /// Generate infill for `layer`.
    ///
    /// `above` is the next layer up (for the overhang test), `layer_count` the
    /// total number of layers and `bounds` the mesh-wide bounding box.
    pub fn generate(
        &self,
        layer: &Layer,
        above: Option<&Layer>,
        layer_count: usize,
        bounds: &BoundingBox3,
    ) -> Result<InfillResult> {
        if layer.is_empty() {
            return Ok(InfillResult::default());
        }

        let overhang = Self::is_overhang(layer, above);
        let strategy = self.strategy_for(layer.index, layer_count, overhang);
        let lines = strategy.generate(layer, bounds)?;

        debug!(
            "Layer {}: {} infill, {} lines{}",
            layer.index,
            strategy.name(),
            lines.len(),
            if overhang { " (overhang)" } else { "" }
        );

        Ok(InfillResult {
            lines,
            solid: strategy.is_solid(),
        })
    }
}
