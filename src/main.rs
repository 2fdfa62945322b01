//! gerstner-cascades - Synthesize a cascaded Gerstner wave field from the command line
//!
//! Samples a spectrum, slices the components into cascades, applies any
//! requested origin shifts and prints the packed cascade table.

use std::convert::Infallible;
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;

use gerstner_cascades::cascade::{CascadeGrid, PackedWaves, SliceOutcome, CASCADE_COUNT};
use gerstner_cascades::cli::Args;
use gerstner_cascades::ocean::{DispatchParams, GerstnerSystem, WaveGenerator};

/// Stand-in for the GPU stage: reports what would be dispatched
struct DispatchLog;

impl WaveGenerator for DispatchLog {
    type Error = Infallible;

    fn generate(&mut self, waves: &PackedWaves, params: &DispatchParams) -> Result<(), Infallible> {
        println!(
            "Dispatch: {} groups, slices {}..{}, {}x{}x{} thread groups, t = {}s",
            waves.group_count(),
            params.first_cascade,
            params.first_cascade + params.thread_groups[2],
            params.thread_groups[0],
            params.thread_groups[1],
            params.thread_groups[2],
            params.time_s
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let params = args.build_params();
    let spectrum = args
        .load_spectrum(params.gravity)
        .context("Failed to load spectrum")?;
    let grid = CascadeGrid {
        resolution: params.resolution,
        min_texels_per_wave: params.min_texels_per_wave,
    };

    let mut ocean = GerstnerSystem::new(params, Some(spectrum));
    let mut report = ocean.synthesize()?;
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }

    if !args.shift.is_empty() {
        for offset in &args.shift {
            tracing::info!("Origin shift by ({}, {})", offset.x, offset.z);
            ocean.on_origin_shift(*offset);
        }
        report = ocean.synthesize()?;
    }

    let packed = ocean.packed();
    let (first, last) = packed.gpu_cascade_indices();
    println!(
        "{} components, {} groups, cascades {}..={}",
        ocean.snapshot().len(),
        packed.group_count(),
        first,
        last
    );
    println!("cascade  min_wl(m)  start  groups  cum_slope_var");
    for cascade in 0..CASCADE_COUNT {
        println!(
            "{:>7}  {:>9.4}  {:>5}  {:>6}  {:>13.6}",
            cascade,
            grid.min_wavelength(cascade),
            packed.cascades[cascade].start_group,
            packed.cascade_groups(cascade).len(),
            packed.cascades[cascade].cumulative_slope_variance
        );
    }

    let displacement = ocean.max_displacement();
    println!(
        "Max displacement: {:.3}m horizontal, {:.3}m vertical",
        displacement.horizontal_m, displacement.vertical_m
    );
    if let SliceOutcome::Truncated {
        beyond_last_cascade,
        over_capacity,
    } = report.outcome
    {
        println!(
            "Truncated: {} beyond last cascade, {} over capacity",
            beyond_last_cascade, over_capacity
        );
    }

    let dispatched = ocean.dispatch(&mut DispatchLog, args.time)?;
    if !dispatched {
        println!("No waves, dispatch skipped");
    }

    if let Some(dir) = &args.dump {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let waves_path = dir.join("waves.bin");
        fs::write(&waves_path, packed.wave_bytes())
            .with_context(|| format!("Failed to write {}", waves_path.display()))?;
        let cascades_path = dir.join("cascades.bin");
        fs::write(&cascades_path, packed.cascade_bytes())
            .with_context(|| format!("Failed to write {}", cascades_path.display()))?;
        println!("Wrote {} and {}", waves_path.display(), cascades_path.display());
    }

    Ok(())
}
