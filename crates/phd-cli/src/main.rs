//! phd CLI - Pompeiu-Hausdorff distance bounds
//!
//! Bounds the one-sided distance from every point of mesh A to mesh B.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use phd_bounds::{compute_bounds, BoundSettings, BoundsReport, ConvergenceStatus};
use phd_io::load_obj;
use tracing::info;

#[derive(Parser)]
#[command(name = "phd")]
#[command(about = "Guaranteed bounds on the Hausdorff distance from mesh A to mesh B", long_about = None)]
struct Cli {
    /// Source mesh A (.obj)
    mesh_a: PathBuf,
    /// Target mesh B (.obj)
    mesh_b: PathBuf,
    /// Convergence tolerance on upper - lower
    tolerance: Option<f64>,
    /// Refined-mesh growth ceiling, as a multiple of A's size
    max_factor: Option<f64>,
    /// 1 to measure the tolerance against A's bounding-box diagonal, 0 for absolute
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    normalize: Option<u8>,
    /// Print the full report as JSON instead of the results block
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn settings(&self) -> BoundSettings {
        let defaults = BoundSettings::default();
        BoundSettings {
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            max_factor: self.max_factor.unwrap_or(defaults.max_factor),
            normalize: self.normalize.map_or(defaults.normalize, |n| n == 1),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.settings();

    let a = load_obj(&cli.mesh_a)
        .with_context(|| format!("Failed to load mesh A from {}", cli.mesh_a.display()))?;
    let b = load_obj(&cli.mesh_b)
        .with_context(|| format!("Failed to load mesh B from {}", cli.mesh_b.display()))?;
    info!(
        "A: {} vertices, {} faces; B: {} vertices, {} faces",
        a.num_vertices(),
        a.num_faces(),
        b.num_vertices(),
        b.num_faces()
    );

    let report = compute_bounds(&a, &b, &settings).context("Bound computation failed")?;

    if report.status == ConvergenceStatus::QueueExhausted {
        eprintln!(
            "warning: refinement stopped before reaching tolerance (gap {:e})",
            report.gap()
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_results(&report));
    }
    Ok(())
}

/// The plain-text results block.
fn render_results(report: &BoundsReport) -> String {
    let mut out = String::new();
    out.push_str("----- Results -----\n");
    out.push_str(&format!("dA = {:.12}\n", report.diagonal));
    out.push_str(&format!("lower={:.12}\n", report.lower));
    out.push_str(&format!("upper_max={:.12}\n", report.upper));
    out.push_str(&format!("lower/dA={:.12}\n", report.normalized_lower()));
    out.push_str(&format!("upper_max/dA={:.12}\n", report.normalized_upper()));
    out.push_str(&format!("bvh_time(ms)={:.12}\n", report.bvh_build_ms));
    out.push_str(&format!("bound_time(ms)={:.12}\n", report.bounds_ms));
    out.push_str(&"-".repeat(40));
    out.push('\n');
    out
}
