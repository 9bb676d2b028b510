//! G-code generation module.
//!
//! This module turns sliced layers into nozzle moves ([`path`]) and renders
//! those moves as G-code text ([`writer`]).

mod path;
mod writer;

pub use path::{ExtrusionRole, LayerPaths, PathConfig, PathGenerator, PathMove};
pub use writer::GCodeWriter;

/// G-code command types.
#[derive(Clone, Debug, PartialEq)]
pub enum GCodeCommand {
    /// G0 - Rapid move (travel)
    RapidMove {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        f: Option<f64>,
    },
    /// G1 - Linear move (extrusion)
    LinearMove {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        e: Option<f64>,
        f: Option<f64>,
    },
    /// G20 - Coordinates in inches
    UnitsInches,
    /// G21 - Coordinates in millimeters
    UnitsMillimeters,
    /// G28 - Home
    Home { x: bool, y: bool, z: bool },
    /// G90 - Absolute positioning
    AbsolutePositioning,
    /// G92 - Set position
    SetPosition {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        e: Option<f64>,
    },
    /// M82 - Absolute extrusion
    AbsoluteExtrusion,
    /// M84 - Disable motors
    MotorsOff,
    /// M104 - Set extruder temperature (no wait)
    SetExtruderTemp { s: u32 },
    /// M109 - Set extruder temperature and wait
    SetExtruderTempWait { s: u32 },
    /// M140 - Set bed temperature (no wait)
    SetBedTemp { s: u32 },
    /// M190 - Set bed temperature and wait
    SetBedTempWait { s: u32 },
    /// Comment
    Comment(String),
}

fn push_word(cmd: &mut String, letter: char, value: Option<f64>, precision: usize) {
    if let Some(v) = value {
        cmd.push_str(&format!(" {}{:.*}", letter, precision, v));
    }
}

impl GCodeCommand {
    /// Convert the command to a G-code string.
    pub fn to_gcode(&self) -> String {
        match self {
            GCodeCommand::RapidMove { x, y, z, f } => {
                let mut cmd = String::from("G0");
                push_word(&mut cmd, 'X', *x, 3);
                push_word(&mut cmd, 'Y', *y, 3);
                push_word(&mut cmd, 'Z', *z, 3);
                push_word(&mut cmd, 'F', *f, 0);
                cmd
            }
            GCodeCommand::LinearMove { x, y, z, e, f } => {
                let mut cmd = String::from("G1");
                push_word(&mut cmd, 'X', *x, 3);
                push_word(&mut cmd, 'Y', *y, 3);
                push_word(&mut cmd, 'Z', *z, 3);
                push_word(&mut cmd, 'E', *e, 5);
                push_word(&mut cmd, 'F', *f, 0);
                cmd
            }
            GCodeCommand::UnitsInches => "G20".to_string(),
            GCodeCommand::UnitsMillimeters => "G21".to_string(),
            GCodeCommand::Home { x, y, z } => {
                let mut cmd = String::from("G28");
                if *x {
                    cmd.push_str(" X");
                }
                if *y {
                    cmd.push_str(" Y");
                }
                if *z {
                    cmd.push_str(" Z");
                }
                cmd
            }
            GCodeCommand::AbsolutePositioning => "G90".to_string(),
            GCodeCommand::SetPosition { x, y, z, e } => {
                let mut cmd = String::from("G92");
                push_word(&mut cmd, 'X', *x, 3);
                push_word(&mut cmd, 'Y', *y, 3);
                push_word(&mut cmd, 'Z', *z, 3);
                push_word(&mut cmd, 'E', *e, 5);
                cmd
            }
            GCodeCommand::AbsoluteExtrusion => "M82".to_string(),
            GCodeCommand::MotorsOff => "M84".to_string(),
            GCodeCommand::SetExtruderTemp { s } => format!("M104 S{}", s),
            GCodeCommand::SetExtruderTempWait { s } => format!("M109 S{}", s),
            GCodeCommand::SetBedTemp { s } => format!("M140 S{}", s),
            GCodeCommand::SetBedTempWait { s } => format!("M190 S{}", s),
            GCodeCommand::Comment(text) => format!("; {}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_move() {
        let cmd = GCodeCommand::RapidMove {
            x: Some(10.0),
            y: Some(20.0),
            z: None,
            f: Some(3000.0),
        };
        assert_eq!(cmd.to_gcode(), "G0 X10.000 Y20.000 F3000");
    }

    #[test]
    fn test_linear_move() {
        let cmd = GCodeCommand::LinearMove {
            x: Some(10.0),
            y: Some(20.0),
            z: None,
            e: Some(1.5),
            f: Some(1200.0),
        };
        assert_eq!(cmd.to_gcode(), "G1 X10.000 Y20.000 E1.50000 F1200");
    }

    #[test]
    fn test_units_and_reset() {
        assert_eq!(GCodeCommand::UnitsInches.to_gcode(), "G20");
        assert_eq!(GCodeCommand::UnitsMillimeters.to_gcode(), "G21");
        let reset = GCodeCommand::SetPosition {
            x: None,
            y: None,
            z: None,
            e: Some(0.0),
        };
        assert_eq!(reset.to_gcode(), "G92 E0.00000");
    }

    #[test]
    fn test_temperature_commands() {
        assert_eq!(
            GCodeCommand::SetExtruderTemp { s: 215 }.to_gcode(),
            "M104 S215"
        );
        assert_eq!(
            GCodeCommand::SetExtruderTempWait { s: 235 }.to_gcode(),
            "M109 S235"
        );
        assert_eq!(GCodeCommand::SetBedTemp { s: 60 }.to_gcode(), "M140 S60");
        assert_eq!(
            GCodeCommand::SetBedTempWait { s: 100 }.to_gcode(),
            "M190 S100"
        );
    }

    #[test]
    fn test_comment() {
        let cmd = GCodeCommand::Comment("LAYER:1".to_string());
        assert_eq!(cmd.to_gcode(), "; LAYER:1");
    }
}
