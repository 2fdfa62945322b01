//! Assignment of wave components to cascades.
//!
//! A single forward pass over components sorted by ascending wavelength. Each
//! surviving component is placed in the cascade whose band
//! `[min_wavelength(i), 2·min_wavelength(i))` contains it, with its wave
//! vector quantized so it tiles that cascade's domain. Slope variance of every
//! visited component accumulates into the cascade current at the time of the
//! visit, including components that are skipped.

use std::f32::consts::TAU;

use glam::Vec2;

use super::layout::{tile_diameter, CascadeGrid, WaveLane, CASCADE_COUNT, MIN_AMPLITUDE};
use crate::error::SynthError;
use crate::params::OceanWaveSpectrum;
use crate::phase::packed_phase;
use crate::spectrum::SpectrumSnapshot;

/// Inputs to a slicing pass besides the components themselves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSettings {
    pub grid: CascadeGrid,
    /// Gravitational acceleration (m/s²), before spectrum scaling
    pub gravity: f32,
}

/// A component placed in a cascade, with its packed values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedWave {
    /// Index into the snapshot
    pub component: usize,
    pub lane: WaveLane,
}

/// Component-to-cascade assignment produced by [`slice`]
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeMap {
    cascades: Vec<Vec<PlacedWave>>,
    cumulative_slope_variance: [f32; CASCADE_COUNT],
    beyond_last_cascade: usize,
}

impl CascadeMap {
    fn new() -> Self {
        Self {
            cascades: vec![Vec::new(); CASCADE_COUNT],
            cumulative_slope_variance: [0.0; CASCADE_COUNT],
            beyond_last_cascade: 0,
        }
    }

    /// Waves placed in a cascade, in ascending wavelength order
    ///
    /// # Panics
    /// * If `cascade >= CASCADE_COUNT`
    pub fn waves(&self, cascade: usize) -> &[PlacedWave] {
        &self.cascades[cascade]
    }

    /// Slope variance summed over cascades `0..=cascade`
    ///
    /// # Panics
    /// * If `cascade >= CASCADE_COUNT`
    pub fn cumulative_slope_variance(&self, cascade: usize) -> f32 {
        self.cumulative_slope_variance[cascade]
    }

    /// Components above the amplitude threshold that are too long for the
    /// coarsest cascade
    pub fn beyond_last_cascade(&self) -> usize {
        self.beyond_last_cascade
    }

    pub fn wave_count(&self) -> usize {
        self.cascades.iter().map(Vec::len).sum()
    }

    /// Lowest and highest cascade holding at least one wave
    pub fn range(&self) -> Option<CascadeRange> {
        let first = self.cascades.iter().position(|waves| !waves.is_empty())?;
        let last = self.cascades.iter().rposition(|waves| !waves.is_empty())?;
        Some(CascadeRange { first, last })
    }
}

/// Inclusive span of cascades that hold waves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeRange {
    pub first: usize,
    pub last: usize,
}

impl CascadeRange {
    /// Number of texture slices the range spans
    pub fn slice_count(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, cascade: usize) -> bool {
        (self.first..=self.last).contains(&cascade)
    }
}

/// Assign components to cascades
///
/// `phases` holds one phase per snapshot component (radians, any range).
pub fn slice(
    snapshot: &SpectrumSnapshot,
    phases: &[f32],
    spectrum: &OceanWaveSpectrum,
    settings: &SliceSettings,
) -> Result<CascadeMap, SynthError> {
    if phases.len() != snapshot.len() {
        return Err(SynthError::ArrayLengthMismatch {
            what: "phases",
            expected: snapshot.len(),
            found: phases.len(),
        });
    }

    let wavelengths = snapshot.wavelengths();
    let amplitudes = snapshot.amplitudes();
    let count = wavelengths.len();

    let mut map = CascadeMap::new();
    let mut cascade = 0;
    let mut min_wavelength = settings.grid.min_wavelength(0);
    let mut cumulative = 0.0f32;
    let mut index = 0;

    // Sub-texel waves fold their slope variance into the finest cascade
    while index < count && wavelengths[index] < min_wavelength {
        cumulative += slope_variance(snapshot, spectrum, index, TAU / wavelengths[index]);
        index += 1;
    }

    while index < count {
        let wavelength = wavelengths[index];

        if amplitudes[index] < MIN_AMPLITUDE {
            cumulative += slope_variance(snapshot, spectrum, index, TAU / wavelength);
            index += 1;
            continue;
        }

        while cascade < CASCADE_COUNT && wavelength >= 2.0 * min_wavelength {
            map.cumulative_slope_variance[cascade] = cumulative;
            cascade += 1;
            min_wavelength *= 2.0;
            tracing::trace!("cascade {} starts at component {}", cascade, index);
        }
        if cascade == CASCADE_COUNT {
            map.beyond_last_cascade = amplitudes[index..]
                .iter()
                .filter(|&&amplitude| amplitude >= MIN_AMPLITUDE)
                .count();
            break;
        }

        let octave = snapshot.octave_of(index);
        let chop_scale = spectrum.chop_scale(octave);
        let gravity =
            settings.gravity * spectrum.gravity_scale * spectrum.octave_gravity_scale(octave);
        let phase_speed = (wavelength * gravity / TAU).sqrt();

        let angle = snapshot.angles_deg()[index].to_radians();
        let (k, direction) =
            quantize_wave_vector(TAU / wavelength, Vec2::new(angle.cos(), angle.sin()), cascade);

        let amplitude = amplitudes[index];
        map.cascades[cascade].push(PlacedWave {
            component: index,
            lane: WaveLane {
                two_pi_over_wavelength: TAU / wavelength,
                amplitude,
                direction,
                omega: k * phase_speed,
                phase: packed_phase(phases[index] as f64),
                chop_amplitude: -chop_scale * spectrum.chop * amplitude,
            },
        });

        cumulative += slope_variance(snapshot, spectrum, index, k);
        index += 1;
    }

    // Cascades past the last one reached carry the total forward
    let closed = cascade.min(CASCADE_COUNT);
    for entry in &mut map.cumulative_slope_variance[closed..] {
        *entry = cumulative;
    }

    if map.beyond_last_cascade > 0 {
        tracing::warn!(
            "{} wave components are longer than the coarsest cascade and were dropped",
            map.beyond_last_cascade
        );
    }

    Ok(map)
}

/// Slope variance contribution of one component
///
/// `k` is the component's own wavenumber (quantized when it was packed); the
/// neighbor term always uses the next component's sampled wavelength, clamped
/// to the last component.
fn slope_variance(
    snapshot: &SpectrumSnapshot,
    spectrum: &OceanWaveSpectrum,
    index: usize,
    k: f32,
) -> f32 {
    let wavelengths = snapshot.wavelengths();
    let next = (index + 1).min(wavelengths.len() - 1);
    let k_next = TAU / wavelengths[next];
    let power = snapshot.powers()[index];
    let chop_scale = spectrum.chop_scale(snapshot.octave_of(index));
    chop_scale * k * k * power * power * (k_next - k).abs()
}

/// Snap a wave vector to the cascade's tiling lattice
///
/// Returns the quantized wavenumber and unit direction. Each component of the
/// quantized vector is an integer multiple of `2π / tile_diameter(cascade)`, so
/// the wave repeats exactly across the cascade's tile. A vector that would
/// round to zero is moved one lattice step along its dominant axis.
pub fn quantize_wave_vector(k: f32, direction: Vec2, cascade: usize) -> (f32, Vec2) {
    let step = TAU / tile_diameter(cascade);
    let mut n = (k * direction.x / step).round();
    let mut m = (k * direction.y / step).round();
    if n == 0.0 && m == 0.0 {
        if direction.x.abs() >= direction.y.abs() {
            n = direction.x.signum();
        } else {
            m = direction.y.signum();
        }
    }

    let quantized = Vec2::new(n * step, m * step);
    let k_quantized = quantized.length();
    (k_quantized, quantized / k_quantized)
}
