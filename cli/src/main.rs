use anyhow::{ensure, Result};
use clap::Parser;
use image::io::Reader;
use image::GenericImageView;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use superpixels::lloyd::{self, CellCollector, RelaxParams};
use superpixels::{boundary, svg};

#[derive(Parser)]
pub struct Options {
    /// Mask image, foreground is red channel above the threshold
    #[arg(long, short)]
    input: PathBuf,

    /// Output SVG
    #[arg(long, short)]
    output: PathBuf,

    #[arg(long, short, default_value_t = 50)]
    num_points: usize,

    /// Number of Lloyd iterations
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    #[arg(long, default_value_t = 50)]
    threshold: u8,

    /// Seed for reproducible sampling and jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Write one SVG per iteration into this directory
    #[arg(long)]
    frames: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let opt = Options::parse();
    let img = Reader::open(&opt.input)?.decode()?;
    let (width, height) = img.dimensions();

    info!("Trace mask boundary");
    let pixels = boundary::foreground_pixels(&img, opt.threshold);
    let outline = boundary::trace_boundary(&pixels);
    ensure!(outline.len() >= 3, "mask has no traceable foreground region");

    let mut rng = match opt.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!("Sample {} points", opt.num_points);
    let mut points = superpixels::sample_points(&outline, opt.num_points, &mut rng);

    if let Some(dir) = &opt.frames {
        fs::create_dir_all(dir)?;
    }

    info!("Relax points over {} iterations", opt.iterations);
    let params = RelaxParams::default();

    for iteration in 0..opt.iterations {
        let mut cells = CellCollector::default();
        let result = lloyd::relax_with(points, &outline, &params, &mut rng, |event| {
            cells.record(event)
        })?;

        if !result.collapsed.is_empty() {
            info!(
                "iteration {}: {} collapsed cells",
                iteration,
                result.collapsed.len()
            );
        }

        points = result.points;

        if let Some(dir) = &opt.frames {
            let frame = dir.join(format!("iteration-{:03}.svg", iteration));
            svg::write_iteration(&frame, &outline, &points, &cells, width, height)?;
        }
    }

    svg::write_points(&opt.output, &outline, &points, width, height)?;

    Ok(())
}
