//! Voxelize one frame dump.
//!
//! Loads a dump directory (`disparity.bin`, `confidence.bin`, `lut_meta.bin`,
//! `params.bin`), runs one invocation and writes the voxel points file.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin drishti-voxelize -- --input dump/ --model conical --output points.txt
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use drishti::core::TrigMode;
use drishti::projection::CameraModel;
use drishti::{DrishtiConfig, load_dump, save_points, voxelize};

#[derive(Parser)]
#[command(name = "drishti-voxelize")]
#[command(about = "Project a stereo disparity dump into a voxel buffer")]
struct Args {
    /// Dump directory
    #[arg(short, long)]
    input: PathBuf,

    /// Configuration file (defaults to configs/drishti.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera model override (cylindrical, conical)
    #[arg(short, long)]
    model: Option<CameraModel>,

    /// Trigonometry override (polynomial, exact)
    #[arg(long)]
    trig: Option<TrigMode>,

    /// Process cells on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Points output file (overrides output.points_path)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => DrishtiConfig::load(path)?,
        None => DrishtiConfig::load_default()?,
    };
    if let Some(model) = args.model {
        config.pipeline.camera_model = model;
    }
    if let Some(trig) = args.trig {
        config.pipeline.trig = trig;
    }
    if args.sequential {
        config.pipeline.parallel = false;
    }
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.points_path));

    log::info!("drishti-voxelize starting...");
    log::info!("  Input: {}", args.input.display());
    log::info!("  Camera model: {}", config.pipeline.camera_model);
    log::info!("  Trig: {}", config.pipeline.trig);
    log::info!("  Parallel: {}", config.pipeline.parallel);

    let dump = load_dump(&args.input)?;
    let p = &dump.params;
    log::info!(
        "  Frame: {}x{}, {} cells, envelope {}x{}x{} voxels of {} mm",
        p.image_width,
        p.image_height,
        p.grid.cell_count(),
        p.envelope.length_vx,
        p.envelope.width_vx,
        p.envelope.height_vx,
        p.envelope.mm_per_voxel
    );

    let options = config.to_voxelize_options();
    let result = voxelize(&dump.frame, &p.projection, &p.grid, &p.envelope, &options)?;
    let report = &result.report;

    log::info!(
        "Voxelized {} pixels: {} rejected, {} out of grid, {} collisions",
        report.pixels.pixels,
        report.pixels.rejected,
        report.pixels.out_of_grid,
        report.pixels.collisions
    );
    log::info!(
        "Buffer: {} / {} voxels, {} batches merged, {} dropped ({} voxels lost)",
        result.buffer.len(),
        result.buffer.capacity(),
        report.batches_merged,
        report.batches_dropped,
        report.voxels_dropped
    );

    write_output(&output, &result.buffer)?;
    log::info!("Wrote {}", output.display());
    Ok(())
}

fn write_output(path: &Path, buffer: &drishti::VoxelBuffer) -> Result<(), drishti::DumpError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    save_points(path, buffer)
}
