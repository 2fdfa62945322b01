//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use crate::error::SynthError;
use crate::params::{GerstnerParams, OceanWaveSpectrum, OverflowPolicy};
use crate::spectrum::SpectrumModel;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "gerstner-cascades")]
#[command(about = "Synthesize and pack cascaded Gerstner ocean waves", long_about = None)]
pub struct Args {
    /// Seed for wavelength, direction and phase sampling
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Wave components per octave
    #[arg(long, value_name = "COUNT", default_value = "8")]
    pub components_per_octave: usize,

    /// Wave buffer resolution (texels per side)
    #[arg(long, value_name = "TEXELS", default_value = "32")]
    pub resolution: u32,

    /// Wind direction (degrees from the x axis)
    #[arg(long, value_name = "DEGREES", default_value = "0", allow_hyphen_values = true)]
    pub wind: f32,

    /// Blend weight (0..1)
    #[arg(long, default_value = "1.0")]
    pub weight: f32,

    /// Shortest wave a cascade may hold (texels)
    #[arg(long, value_name = "TEXELS", default_value = "3.0")]
    pub min_texels_per_wave: f32,

    /// Spectrum asset (TOML); overrides --preset
    #[arg(long, value_name = "FILE")]
    pub spectrum: Option<PathBuf>,

    /// Spectrum preset: stock (default), phillips, pierson-moskowitz, jonswap
    #[arg(long, value_name = "PRESET", default_value = "stock")]
    pub preset: String,

    /// Wind speed for analytic presets (m/s)
    #[arg(long, value_name = "M/S", default_value = "10.0")]
    pub wind_speed: f32,

    /// Fetch for the jonswap preset (meters)
    #[arg(long, value_name = "METERS", default_value = "100000")]
    pub fetch: f32,

    /// Origin shift applied after the first pass, as X,Z meters (repeatable)
    #[arg(long, value_name = "X,Z", value_parser = parse_shift, allow_hyphen_values = true)]
    pub shift: Vec<Vec3>,

    /// Simulation time passed to the dispatch (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    pub time: f32,

    /// Fail instead of truncating when the wave buffer overflows
    #[arg(long)]
    pub reject_overflow: bool,

    /// Write waves.bin and cascades.bin into this directory
    #[arg(long, value_name = "DIR")]
    pub dump: Option<PathBuf>,
}

impl Args {
    /// Synthesis parameters from command-line arguments
    pub fn build_params(&self) -> GerstnerParams {
        GerstnerParams {
            wind_direction_deg: self.wind,
            components_per_octave: self.components_per_octave,
            weight: self.weight,
            random_seed: self.seed,
            resolution: self.resolution,
            min_texels_per_wave: self.min_texels_per_wave,
            overflow_policy: if self.reject_overflow {
                OverflowPolicy::Reject
            } else {
                OverflowPolicy::Truncate
            },
            ..Default::default()
        }
    }

    /// Load the spectrum file, or build the selected preset
    pub fn load_spectrum(&self, gravity: f32) -> Result<OceanWaveSpectrum, SynthError> {
        if let Some(path) = &self.spectrum {
            tracing::info!("Spectrum: {}", path.display());
            return OceanWaveSpectrum::load(path);
        }
        Ok(match self.parse_preset() {
            Some(model) => OceanWaveSpectrum::from_model(model, gravity),
            None => OceanWaveSpectrum::default(),
        })
    }

    /// Parse spectrum preset; `None` selects the stock spectrum
    pub fn parse_preset(&self) -> Option<SpectrumModel> {
        match self.preset.to_lowercase().as_str() {
            "stock" => {
                tracing::info!("Spectrum: stock");
                None
            }
            "phillips" => {
                tracing::info!("Spectrum: Phillips ({} m/s)", self.wind_speed);
                Some(SpectrumModel::Phillips {
                    wind_speed: self.wind_speed,
                })
            }
            "pierson-moskowitz" | "pm" => {
                tracing::info!("Spectrum: Pierson-Moskowitz ({} m/s)", self.wind_speed);
                Some(SpectrumModel::PiersonMoskowitz {
                    wind_speed: self.wind_speed,
                })
            }
            "jonswap" => {
                tracing::info!(
                    "Spectrum: JONSWAP ({} m/s, fetch {} m)",
                    self.wind_speed,
                    self.fetch
                );
                Some(SpectrumModel::Jonswap {
                    wind_speed: self.wind_speed,
                    fetch_m: self.fetch,
                })
            }
            other => {
                tracing::warn!("Unknown spectrum preset '{}', using stock", other);
                None
            }
        }
    }
}

/// Parse an `X,Z` origin offset
fn parse_shift(text: &str) -> Result<Vec3, String> {
    let (x, z) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z, got '{}'", text))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad X '{}': {}", x, e))?;
    let z: f32 = z.trim().parse().map_err(|e| format!("bad Z '{}': {}", z, e))?;
    Ok(Vec3::new(x, 0.0, z))
}
