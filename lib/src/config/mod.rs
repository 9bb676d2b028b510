//! Configuration module.

mod print_config;

pub use print_config::{cross_with_gap, Material, PrintConfig, Temperature, Units};
