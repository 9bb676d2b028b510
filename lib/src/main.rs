//! Planar slicer CLI - Command-line interface for the slicer library
//!
//! Usage:
//!   planar-slicer slice <input.obj> -o <output.gcode> [options]
//!   planar-slicer slice <input.obj> --config my_config.json
//!   planar-slicer info <input.obj>

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use planar_slicer::{
    load_obj, FillSpacing, GCodeWriter, InfillPattern, PrintConfig, PrintPipeline, SlicingParams,
    Units,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Slice a triangle mesh into planar layers and emit G-code
#[derive(Parser, Debug)]
#[command(name = "planar-slicer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Slice an OBJ file and generate G-code
    Slice(SliceArgs),

    /// Show mesh information
    Info {
        /// Input OBJ file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InfillKind {
    Cross,
    Solid,
    None,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum UnitsArg {
    Mm,
    In,
}

impl From<UnitsArg> for Units {
    fn from(units: UnitsArg) -> Self {
        match units {
            UnitsArg::Mm => Units::Mm,
            UnitsArg::In => Units::In,
        }
    }
}

#[derive(Args, Debug)]
struct SliceArgs {
    /// Input OBJ file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output G-code file (defaults to the input with a .gcode extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Print configuration file (JSON); command-line options override it
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Layer height
    #[arg(long)]
    layer_height: Option<f64>,

    /// Scale factor applied to the mesh
    #[arg(long)]
    scale: Option<f64>,

    /// Travel feedrate (mm/min)
    #[arg(long)]
    feedrate: Option<f64>,

    /// Printing feedrate (mm/min), half the travel feedrate by default
    #[arg(long)]
    feedrate_writing: Option<f64>,

    /// Filament diameter in mm
    #[arg(long)]
    filament_diameter: Option<f64>,

    /// Extrusion width in mm
    #[arg(long)]
    extrusion_width: Option<f64>,

    /// Extrusion multiplier
    #[arg(long)]
    extrusion_multiplier: Option<f64>,

    /// Infill pattern for non-shell layers
    #[arg(long, value_enum)]
    infill: Option<InfillKind>,

    /// Gap between cross-hatch lines
    #[arg(long, conflicts_with = "infill_lines")]
    infill_gap: Option<f64>,

    /// Number of cross-hatch lines across the mesh
    #[arg(long)]
    infill_lines: Option<usize>,

    /// Number of solid layers at the bottom and top
    #[arg(long)]
    solid_layers: Option<usize>,

    /// Units of the mesh and the G-code
    #[arg(long, value_enum)]
    units: Option<UnitsArg>,

    /// Number of threads to use (0 = auto)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,
}

impl SliceArgs {
    /// Build the print configuration: file (or defaults), then overrides.
    fn print_config(&self) -> Result<PrintConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading print config from: {}", path.display());
                PrintConfig::from_file(path)
                    .with_context(|| format!("Failed to load config file {}", path.display()))?
            }
            None => PrintConfig::default(),
        };

        if let Some(v) = self.layer_height {
            config.layer_height = v;
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if let Some(v) = self.feedrate {
            config.feedrate = v;
        }
        if let Some(v) = self.feedrate_writing {
            config.feedrate_writing = Some(v);
        }
        if let Some(v) = self.filament_diameter {
            config.filament_diameter = v;
        }
        if let Some(v) = self.extrusion_width {
            config.extrusion_width = v;
        }
        if let Some(v) = self.extrusion_multiplier {
            config.extrusion_multiplier = v;
        }
        if let Some(v) = self.solid_layers {
            config.solid_layers = v;
        }
        if let Some(v) = self.units {
            config.units = v.into();
        }

        let spacing = match (self.infill_gap, self.infill_lines) {
            (Some(gap), _) => Some(FillSpacing::Gap(gap)),
            (None, Some(lines)) => Some(FillSpacing::Lines(lines)),
            (None, None) => None,
        };
        match (self.infill, spacing) {
            (Some(InfillKind::Solid), _) => config.infill = InfillPattern::Solid,
            (Some(InfillKind::None), _) => config.infill = InfillPattern::None,
            (Some(InfillKind::Cross), spacing) => {
                config.infill = InfillPattern::Cross {
                    spacing: spacing.unwrap_or_default(),
                }
            }
            (None, Some(spacing)) => config.infill = InfillPattern::Cross { spacing },
            (None, None) => {}
        }

        config.validate().context("Invalid print configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Slice(args) => cmd_slice(args),
        Commands::Info { input } => cmd_info(input),
    }
}

fn cmd_slice(args: SliceArgs) -> Result<()> {
    info!("Loading OBJ file: {}", args.input.display());

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("gcode"));

    // Set thread count if specified
    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to initialize thread pool")?;
    }

    let config = args.print_config()?;

    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    progress.set_message("Loading mesh...");
    progress.set_position(5);

    let mesh = load_obj(&args.input)
        .with_context(|| format!("Failed to load OBJ file {}", args.input.display()))?;

    info!("Mesh loaded:");
    info!("  Vertices: {}", mesh.vertex_count());
    info!("  Faces: {}", mesh.face_count());
    info!("Configuration: {}", config);

    let writer = GCodeWriter::from_config(&config);
    let pipeline = PrintPipeline::new(config);

    let progress_clone = progress.clone();
    let print = pipeline
        .process_with_callback(mesh, |stage, stage_progress| {
            let (base, range, message) = match stage {
                "preparing" => (5, 5, "Preparing mesh..."),
                "slicing" => (10, 30, "Slicing layers..."),
                "infill" => (40, 30, "Generating infill..."),
                "paths" => (70, 20, "Generating toolpaths..."),
                _ => (5, 0, "Processing..."),
            };
            progress_clone.set_position(base + (stage_progress * range as f64) as u64);
            progress_clone.set_message(message);
        })
        .context("Slicing failed")?;

    progress.set_message("Writing output...");
    progress.set_position(95);

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    writer
        .write(&mut BufWriter::new(file), &print.layer_paths)
        .context("Failed to write G-code file")?;

    progress.set_position(100);
    progress.finish_with_message("Done!");

    println!();
    println!("Slicing complete!");
    println!("  Output: {}", output_path.display());
    println!("  Layers: {}", print.layer_count());
    println!("  Nozzle distance: {:.2}", print.ledger.nozzle_distance);
    println!("  Travel distance: {:.2}", print.ledger.travel_distance);
    println!("  Filament used: {:.2}", print.ledger.filament_used);
    println!(
        "  Estimated time: {:.1} min",
        print.estimated_time() / 60.0
    );

    Ok(())
}

fn cmd_info(input: PathBuf) -> Result<()> {
    info!("Loading OBJ file: {}", input.display());

    let mesh = load_obj(&input)
        .with_context(|| format!("Failed to load OBJ file {}", input.display()))?;

    println!("Mesh Information:");
    println!("  File: {}", input.display());
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Faces: {}", mesh.face_count());

    let Some(bb) = mesh.bounding_box() else {
        println!("  (empty mesh)");
        return Ok(());
    };
    let size = bb.max - bb.min;

    println!("  Bounding box:");
    println!("    Min: ({:.3}, {:.3}, {:.3})", bb.min.x, bb.min.y, bb.min.z);
    println!("    Max: ({:.3}, {:.3}, {:.3})", bb.max.x, bb.max.y, bb.max.z);
    println!("    Size: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);

    println!("  Estimated layers:");
    for lh in [0.1, 0.2, 0.3] {
        let layers = SlicingParams::new(lh, 1.0)
            .layer_count(size.z)
            .context("Mesh height is out of range")?;
        println!("    At {:.1} layer height: {} layers", lh, layers);
    }

    Ok(())
}
