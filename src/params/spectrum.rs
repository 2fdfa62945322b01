//! Ocean wave spectrum asset: per-octave power and shaping controls.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// Number of wavelength octaves covered by a spectrum
pub const NUM_OCTAVES: usize = 14;

/// log2 of the smallest wavelength (meters). Octave 0 covers [1/16 m, 1/8 m).
pub const SMALLEST_WL_POW_2: f32 = -4.0;

/// Lowest storable log10 power. Disabled octaves are treated as this value.
pub const MIN_POWER_LOG: f32 = -8.0;

/// Highest storable log10 power
pub const MAX_POWER_LOG: f32 = 5.0;

/// Spectrum definition consumed by the synthesizer
///
/// All per-octave tables must hold exactly [`NUM_OCTAVES`] entries; a spectrum
/// saved with a different octave count is reported as out of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanWaveSpectrum {
    /// Display name, used in diagnostics
    pub name: String,

    /// Energy density per octave (log10 of spectral power, m²·s)
    pub power_log: Vec<f32>,

    /// Octaves switched off entirely
    pub power_disabled: Vec<bool>,

    /// Per-octave horizontal displacement scale (dimensionless)
    pub chop_scales: Vec<f32>,

    /// Per-octave multiplier on gravity (changes wave speed only)
    pub gravity_scales: Vec<f32>,

    /// Global chop multiplier
    pub chop: f32,

    /// Global gravity multiplier
    pub gravity_scale: f32,

    /// Global amplitude multiplier
    pub multiplier: f32,

    /// Spread of wave directions around the wind axis (± degrees)
    pub wave_direction_variance_deg: f32,
}

impl Default for OceanWaveSpectrum {
    fn default() -> Self {
        Self {
            name: "Default Waves".to_string(),
            power_log: vec![
                -7.0, -6.2, -5.4, -4.6, -3.8, -3.0, -2.2, -1.4, -0.6, 0.2, 0.8, 1.2, 1.2, 1.0,
            ],
            power_disabled: vec![false; NUM_OCTAVES],
            chop_scales: vec![1.0; NUM_OCTAVES],
            gravity_scales: vec![1.0; NUM_OCTAVES],
            chop: 1.6,
            gravity_scale: 1.0,
            multiplier: 1.0,
            wave_direction_variance_deg: 90.0,
        }
    }
}

impl OceanWaveSpectrum {
    /// Parse a spectrum from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, SynthError> {
        toml::from_str(text).map_err(|source| SynthError::SpectrumParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a spectrum asset from a TOML file
    pub fn load(path: &Path) -> Result<Self, SynthError> {
        let text = std::fs::read_to_string(path).map_err(|source| SynthError::SpectrumIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// True when every per-octave table has [`NUM_OCTAVES`] entries
    pub fn is_current(&self) -> bool {
        self.power_log.len() == NUM_OCTAVES
            && self.power_disabled.len() == NUM_OCTAVES
            && self.chop_scales.len() == NUM_OCTAVES
            && self.gravity_scales.len() == NUM_OCTAVES
    }

    /// Shortest table length, for diagnostics
    pub fn octave_table_len(&self) -> usize {
        self.power_log
            .len()
            .min(self.power_disabled.len())
            .min(self.chop_scales.len())
            .min(self.gravity_scales.len())
    }

    /// Smallest wavelength of an octave (meters)
    pub fn small_wavelength(octave: usize) -> f32 {
        2f32.powf(SMALLEST_WL_POW_2 + octave as f32)
    }

    /// Octave containing a wavelength, clamped to the table
    pub fn octave_index(wavelength: f32) -> usize {
        debug_assert!(wavelength > 0.0, "wavelength must be > 0");
        let wl_pow2 = wavelength
            .log2()
            .clamp(SMALLEST_WL_POW_2, SMALLEST_WL_POW_2 + NUM_OCTAVES as f32 - 1.0);
        (wl_pow2 - SMALLEST_WL_POW_2) as usize
    }

    pub fn chop_scale(&self, octave: usize) -> f32 {
        self.chop_scales.get(octave).copied().unwrap_or(1.0)
    }

    pub fn octave_gravity_scale(&self, octave: usize) -> f32 {
        self.gravity_scales.get(octave).copied().unwrap_or(1.0)
    }

    /// log10 power of an octave, honoring the disabled flags
    pub(crate) fn octave_power_log(&self, octave: usize) -> f32 {
        match (self.power_log.get(octave), self.power_disabled.get(octave)) {
            (Some(&power), Some(false)) => power,
            _ => MIN_POWER_LOG,
        }
    }
}
