//! Analytic ocean spectra used to fill a spectrum's power table.
//!
//! Each model is evaluated at 1.5× the octave's smallest wavelength and stored
//! as log10 power, clamped to the storable range.

use std::f32::consts::TAU;

use crate::params::{OceanWaveSpectrum, MAX_POWER_LOG, MIN_POWER_LOG, NUM_OCTAVES};

/// Phillips spectrum constant
const PHILLIPS_A: f32 = 0.0081;

/// Pierson-Moskowitz constants
const PM_ALPHA: f32 = 0.0081;
const PM_BETA: f32 = 0.74;

/// JONSWAP peak enhancement factor
const JONSWAP_GAMMA: f32 = 3.3;

/// Named spectrum models
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpectrumModel {
    /// Phillips spectrum along the wind (wind speed in m/s)
    Phillips { wind_speed: f32 },

    /// Fully developed sea (wind speed at 19.5 m, m/s)
    PiersonMoskowitz { wind_speed: f32 },

    /// Fetch-limited sea (wind speed in m/s, fetch in meters)
    Jonswap { wind_speed: f32, fetch_m: f32 },
}

impl SpectrumModel {
    /// Spectral density S(ω) for a wavelength
    pub fn density(&self, wavelength: f32, gravity: f32) -> f32 {
        let k = TAU / wavelength;
        let omega = (gravity * k).sqrt();
        match *self {
            SpectrumModel::Phillips { wind_speed } => {
                let l = wind_speed * wind_speed / gravity;
                let p_k = PHILLIPS_A * (-1.0 / (k * l).powi(2)).exp() / k.powi(4);
                // Convert P(k) to a frequency density: S(ω) = P(k)·k·dk/dω
                p_k * k * (2.0 * omega / gravity)
            }
            SpectrumModel::PiersonMoskowitz { wind_speed } => {
                let omega_0 = gravity / wind_speed.max(f32::EPSILON);
                PM_ALPHA * gravity * gravity / omega.powi(5)
                    * (-PM_BETA * (omega_0 / omega).powi(4)).exp()
            }
            SpectrumModel::Jonswap {
                wind_speed,
                fetch_m,
            } => {
                let u = wind_speed.max(f32::EPSILON);
                let fetch = fetch_m.max(1.0);
                let alpha = 0.076 * (u * u / (fetch * gravity)).powf(0.22);
                let omega_p = 22.0 * (gravity * gravity / (u * fetch)).cbrt();
                let sigma = if omega <= omega_p { 0.07 } else { 0.09 };
                let spread = 2.0 * sigma * sigma * omega_p * omega_p;
                let r = (-(omega - omega_p).powi(2) / spread).exp();
                alpha * gravity * gravity / omega.powi(5)
                    * (-1.25 * (omega_p / omega).powi(4)).exp()
                    * JONSWAP_GAMMA.powf(r)
            }
        }
    }
}

impl OceanWaveSpectrum {
    /// Replace the power table with an analytic model, enabling every octave
    pub fn apply_model(&mut self, model: SpectrumModel, gravity: f32) {
        let floor = 10f32.powf(MIN_POWER_LOG);
        self.power_log = (0..NUM_OCTAVES)
            .map(|octave| {
                let wavelength = Self::small_wavelength(octave) * 1.5;
                let power = model.density(wavelength, gravity);
                let power = if power.is_finite() { power.max(floor) } else { floor };
                power.log10().clamp(MIN_POWER_LOG, MAX_POWER_LOG)
            })
            .collect();
        self.power_disabled = vec![false; NUM_OCTAVES];
        tracing::debug!("Applied {:?} to spectrum '{}'", model, self.name);
    }

    /// Stock spectrum with its power table replaced by `model`
    pub fn from_model(model: SpectrumModel, gravity: f32) -> Self {
        let mut spectrum = Self::default();
        spectrum.apply_model(model, gravity);
        spectrum
    }
}
