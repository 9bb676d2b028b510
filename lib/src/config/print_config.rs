//! Print configuration types.
//!
//! [`PrintConfig`] holds every setting the pipeline reads. It deserializes
//! from JSON with `#[serde(default)]`, so a file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!     "layer_height": 0.3,
//!     "infill": { "kind": "cross", "spacing": { "gap": 4.0 } },
//!     "nozzle_temperature": "ABS",
//!     "bed_temperature": 90
//! }
//! ```

use crate::gcode::PathConfig;
use crate::infill::{FillSpacing, InfillConfig, InfillPattern, DEFAULT_SOLID_GAP};
use crate::slice::SlicingParams;
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::path::Path;

/// Length unit of the mesh and of the emitted G-code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimeters (G21).
    #[default]
    Mm,
    /// Inches (G20).
    In,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Mm => write!(f, "mm"),
            Units::In => write!(f, "in"),
        }
    }
}

/// Filament material presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Material {
    #[default]
    Pla,
    Abs,
}

impl Material {
    /// Nozzle temperature (°C).
    pub fn nozzle_celsius(&self) -> CoordF {
        match self {
            Material::Pla => 215.0,
            Material::Abs => 235.0,
        }
    }

    /// Bed temperature (°C).
    pub fn bed_celsius(&self) -> CoordF {
        match self {
            Material::Pla => 60.0,
            Material::Abs => 100.0,
        }
    }
}

/// A temperature given in °C or as a material preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Celsius(CoordF),
    Preset(Material),
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature::Preset(Material::default())
    }
}

impl Temperature {
    /// Resolve as a nozzle temperature.
    pub fn nozzle_celsius(&self) -> CoordF {
        match self {
            Temperature::Celsius(t) => *t,
            Temperature::Preset(m) => m.nozzle_celsius(),
        }
    }

    /// Resolve as a bed temperature.
    pub fn bed_celsius(&self) -> CoordF {
        match self {
            Temperature::Celsius(t) => *t,
            Temperature::Preset(m) => m.bed_celsius(),
        }
    }
}

/// Main print configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    // === Slicing ===
    /// Distance between slicing planes (output units).
    pub layer_height: CoordF,
    /// Factor applied to the mesh before slicing.
    pub scale: CoordF,
    /// Length unit of the mesh and the G-code.
    pub units: Units,

    // === Extrusion ===
    /// Filament diameter (mm).
    pub filament_diameter: CoordF,
    /// Width of an extruded line (mm).
    pub extrusion_width: CoordF,
    /// Extrusion multiplier (flow rate adjustment).
    pub extrusion_multiplier: CoordF,

    // === Speeds (mm/min) ===
    /// Travel feedrate.
    pub feedrate: CoordF,
    /// Printing feedrate; half of `feedrate` when unset.
    pub feedrate_writing: Option<CoordF>,

    // === Infill ===
    /// Pattern for layers that are neither shells nor overhangs.
    pub infill: InfillPattern,
    /// Number of solid layers at the bottom and at the top.
    pub solid_layers: usize,
    /// Scan-line gap of solid layers (mm).
    pub solid_infill_gap: CoordF,

    // === Temperatures ===
    /// Nozzle temperature.
    pub nozzle_temperature: Temperature,
    /// Bed temperature.
    pub bed_temperature: Temperature,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            scale: 1.0,
            units: Units::Mm,
            filament_diameter: 1.75,
            extrusion_width: 0.4,
            extrusion_multiplier: 1.0,
            feedrate: 3600.0,
            feedrate_writing: None,
            infill: InfillPattern::default(),
            solid_layers: 3,
            solid_infill_gap: DEFAULT_SOLID_GAP,
            nozzle_temperature: Temperature::default(),
            bed_temperature: Temperature::default(),
        }
    }
}

impl PrintConfig {
    /// Create a new print configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set layer height.
    pub fn layer_height(mut self, height: CoordF) -> Self {
        self.layer_height = height;
        self
    }

    /// Set scale factor.
    pub fn scale(mut self, scale: CoordF) -> Self {
        self.scale = scale;
        self
    }

    /// Set units.
    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Set filament diameter.
    pub fn filament_diameter(mut self, diameter: CoordF) -> Self {
        self.filament_diameter = diameter;
        self
    }

    /// Set extrusion width.
    pub fn extrusion_width(mut self, width: CoordF) -> Self {
        self.extrusion_width = width;
        self
    }

    /// Set extrusion multiplier.
    pub fn extrusion_multiplier(mut self, multiplier: CoordF) -> Self {
        self.extrusion_multiplier = multiplier;
        self
    }

    /// Set travel feedrate.
    pub fn feedrate(mut self, feedrate: CoordF) -> Self {
        self.feedrate = feedrate;
        self
    }

    /// Set printing feedrate.
    pub fn feedrate_writing(mut self, feedrate: CoordF) -> Self {
        self.feedrate_writing = Some(feedrate);
        self
    }

    /// Set infill pattern.
    pub fn infill(mut self, pattern: InfillPattern) -> Self {
        self.infill = pattern;
        self
    }

    /// Set number of solid shell layers.
    pub fn solid_layers(mut self, count: usize) -> Self {
        self.solid_layers = count;
        self
    }

    /// Set nozzle temperature.
    pub fn nozzle_temperature(mut self, temperature: Temperature) -> Self {
        self.nozzle_temperature = temperature;
        self
    }

    /// Set bed temperature.
    pub fn bed_temperature(mut self, temperature: Temperature) -> Self {
        self.bed_temperature = temperature;
        self
    }

    /// Printing feedrate, falling back to half the travel feedrate.
    pub fn writing_feedrate(&self) -> CoordF {
        self.feedrate_writing.unwrap_or(self.feedrate / 2.0)
    }

    /// Filament length consumed per unit of nozzle path.
    pub fn extrusion_rate(&self) -> CoordF {
        let filament_area = PI * self.filament_diameter * self.filament_diameter / 4.0;
        self.extrusion_multiplier * self.extrusion_width * self.layer_height / filament_area
    }

    /// Slicing parameters.
    pub fn slicing_params(&self) -> SlicingParams {
        SlicingParams::new(self.layer_height, self.scale)
    }

    /// Infill generator settings.
    pub fn infill_config(&self) -> InfillConfig {
        InfillConfig {
            pattern: self.infill,
            solid_layers: self.solid_layers,
            solid_gap: self.solid_infill_gap,
        }
    }

    /// Move generation settings.
    pub fn path_config(&self) -> PathConfig {
        PathConfig {
            extrusion_rate: self.extrusion_rate(),
            feedrate: self.feedrate,
            feedrate_writing: self.writing_feedrate(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.slicing_params().validate()?;

        let positive = [
            ("Filament diameter", self.filament_diameter),
            ("Extrusion width", self.extrusion_width),
            ("Extrusion multiplier", self.extrusion_multiplier),
            ("Feedrate", self.feedrate),
            ("Writing feedrate", self.writing_feedrate()),
            ("Solid infill gap", self.solid_infill_gap),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if let InfillPattern::Cross { spacing } = self.infill {
            spacing.validate()?;
        }
        Ok(())
    }
}

impl fmt::Display for PrintConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrintConfig(layer={:.2}{}, infill={}, feed={:.0}/{:.0})",
            self.layer_height,
            self.units,
            self.infill,
            self.feedrate,
            self.writing_feedrate()
        )
    }
}

/// Cross-hatch pattern with a fixed gap.
pub fn cross_with_gap(gap: CoordF) -> InfillPattern {
    InfillPattern::Cross {
        spacing: FillSpacing::Gap(gap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_config_default() {
        let config = PrintConfig::default();
        assert!((config.layer_height - 0.2).abs() < 1e-12);
        assert!((config.writing_feedrate() - 1800.0).abs() < 1e-12);
        assert_eq!(config.infill, cross_with_gap(5.0));
        assert_eq!(config.solid_layers, 3);
        assert_eq!(config.units, Units::Mm);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_print_config_builder() {
        let config = PrintConfig::new()
            .layer_height(0.3)
            .feedrate(6000.0)
            .feedrate_writing(2000.0)
            .infill(InfillPattern::None)
            .units(Units::In);

        assert!((config.layer_height - 0.3).abs() < 1e-12);
        assert!((config.writing_feedrate() - 2000.0).abs() < 1e-12);
        assert_eq!(config.infill, InfillPattern::None);
        assert_eq!(config.units, Units::In);
    }

    #[test]
    fn test_print_config_validation() {
        let mut config = PrintConfig::default();
        config.layer_height = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = PrintConfig::default().filament_diameter(-1.0);
        assert!(config.validate().is_err());

        let config = PrintConfig::default().infill(cross_with_gap(0.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extrusion_rate() {
        let config = PrintConfig::default();
        let area = PI * 1.75 * 1.75 / 4.0;
        assert!((config.extrusion_rate() - 0.4 * 0.2 / area).abs() < 1e-12);

        let doubled = config.extrusion_multiplier(2.0);
        assert!((doubled.extrusion_rate() - 2.0 * 0.4 * 0.2 / area).abs() < 1e-12);
    }

    #[test]
    fn test_temperatures() {
        assert_eq!(Temperature::default().nozzle_celsius(), 215.0);
        assert_eq!(Temperature::default().bed_celsius(), 60.0);
        assert_eq!(Temperature::Preset(Material::Abs).nozzle_celsius(), 235.0);
        assert_eq!(Temperature::Preset(Material::Abs).bed_celsius(), 100.0);
        assert_eq!(Temperature::Celsius(200.0).nozzle_celsius(), 200.0);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "layer_height": 0.5,
            "units": "in",
            "infill": { "kind": "solid" },
            "nozzle_temperature": "ABS",
            "bed_temperature": 90
        }"#;
        let config = PrintConfig::from_json_str(json).unwrap();

        assert!((config.layer_height - 0.5).abs() < 1e-12);
        assert_eq!(config.units, Units::In);
        assert_eq!(config.infill, InfillPattern::Solid);
        assert_eq!(config.nozzle_temperature, Temperature::Preset(Material::Abs));
        assert_eq!(config.bed_temperature, Temperature::Celsius(90.0));
        // Untouched keys keep their defaults.
        assert!((config.feedrate - 3600.0).abs() < 1e-12);
        assert_eq!(config.solid_layers, 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PrintConfig::default().nozzle_temperature(Temperature::Celsius(210.0));
        let text = config.to_json_string().unwrap();
        assert_eq!(PrintConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            PrintConfig::from_json_str("{ layer_height: }"),
            Err(Error::Json(_))
        ));
    }
}
