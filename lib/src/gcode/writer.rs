//! G-code text writer.
//!
//! Renders per-layer moves as G-code: a header that sets units,
//! temperatures and absolute positioning, one block per layer, and a footer
//! that switches the heaters off.

use super::{GCodeCommand, LayerPaths};
use crate::config::{PrintConfig, Units};
use crate::{CoordF, Result};
use std::io::Write;

/// Height the nozzle is lifted by after the last layer.
const FINAL_LIFT: CoordF = 10.0;

/// G-code writer.
#[derive(Debug, Clone, PartialEq)]
pub struct GCodeWriter {
    units: Units,
    nozzle_temperature: u32,
    bed_temperature: u32,
}

impl Default for GCodeWriter {
    fn default() -> Self {
        Self::from_config(&PrintConfig::default())
    }
}

impl GCodeWriter {
    /// Create a writer with the given units and temperatures (°C).
    pub fn new(units: Units, nozzle_temperature: u32, bed_temperature: u32) -> Self {
        Self {
            units,
            nozzle_temperature,
            bed_temperature,
        }
    }

    /// Create a writer from a print configuration.
    pub fn from_config(config: &PrintConfig) -> Self {
        Self::new(
            config.units,
            config.nozzle_temperature.nozzle_celsius().round().max(0.0) as u32,
            config.bed_temperature.bed_celsius().round().max(0.0) as u32,
        )
    }

    /// Commands before the first layer.
    pub fn header(&self) -> Vec<GCodeCommand> {
        vec![
            GCodeCommand::Comment(format!("generated by planar-slicer {}", crate::VERSION)),
            match self.units {
                Units::Mm => GCodeCommand::UnitsMillimeters,
                Units::In => GCodeCommand::UnitsInches,
            },
            GCodeCommand::SetBedTemp {
                s: self.bed_temperature,
            },
            GCodeCommand::SetExtruderTemp {
                s: self.nozzle_temperature,
            },
            GCodeCommand::SetBedTempWait {
                s: self.bed_temperature,
            },
            GCodeCommand::SetExtruderTempWait {
                s: self.nozzle_temperature,
            },
            GCodeCommand::Home {
                x: true,
                y: true,
                z: true,
            },
            GCodeCommand::AbsolutePositioning,
            GCodeCommand::AbsoluteExtrusion,
            GCodeCommand::SetPosition {
                x: None,
                y: None,
                z: None,
                e: Some(0.0),
            },
        ]
    }

    /// Commands for one layer.
    pub fn layer(&self, paths: &LayerPaths) -> Vec<GCodeCommand> {
        let mut commands = Vec::with_capacity(paths.moves.len() + 2);
        commands.push(GCodeCommand::Comment(format!(
            "LAYER:{} Z:{:.3}",
            paths.layer_index, paths.z_height
        )));
        commands.push(GCodeCommand::RapidMove {
            x: None,
            y: None,
            z: Some(paths.z_height),
            f: None,
        });

        let mut feedrate: Option<CoordF> = None;
        for m in &paths.moves {
            let f = if feedrate == Some(m.feedrate) {
                None
            } else {
                feedrate = Some(m.feedrate);
                Some(m.feedrate)
            };
            commands.push(match m.extrusion {
                None => GCodeCommand::RapidMove {
                    x: Some(m.target.x),
                    y: Some(m.target.y),
                    z: None,
                    f,
                },
                Some(e) => GCodeCommand::LinearMove {
                    x: Some(m.target.x),
                    y: Some(m.target.y),
                    z: None,
                    e: Some(e),
                    f,
                },
            });
        }
        commands
    }

    /// Commands after the last layer.
    pub fn footer(&self, last_z: CoordF) -> Vec<GCodeCommand> {
        vec![
            GCodeCommand::Comment("end".to_string()),
            GCodeCommand::RapidMove {
                x: None,
                y: None,
                z: Some(last_z + FINAL_LIFT),
                f: None,
            },
            GCodeCommand::SetExtruderTemp { s: 0 },
            GCodeCommand::SetBedTemp { s: 0 },
            GCodeCommand::MotorsOff,
        ]
    }

    /// Write the whole program to `out`.
    pub fn write<W: Write>(&self, out: &mut W, layers: &[LayerPaths]) -> Result<()> {
        let last_z = layers.last().map_or(0.0, |l| l.z_height);
        let blocks = std::iter::once(self.header())
            .chain(layers.iter().map(|l| self.layer(l)))
            .chain(std::iter::once(self.footer(last_z)));

        for block in blocks {
            for command in block {
                writeln!(out, "{}", command.to_gcode())?;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Render the whole program as a string.
    pub fn render(&self, layers: &[LayerPaths]) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf, layers)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
