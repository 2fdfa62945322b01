//! Immutable set of wave components derived from one spectrum configuration.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::sampler::SpectrumSampler;
use crate::error::SynthError;
use crate::params::{GerstnerParams, OceanWaveSpectrum};

/// Stable identity of a component: its octave and slot within the octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    pub octave: u16,
    pub slot: u16,
}

/// Wave components sorted by ascending wavelength
///
/// Regenerated whenever the spectrum or sampling configuration changes; the
/// per-component phase lives separately in [`crate::phase::PhaseTable`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumSnapshot {
    components_per_octave: usize,
    wavelengths: Vec<f32>,
    angles_deg: Vec<f32>,
    amplitudes: Vec<f32>,
    powers: Vec<f32>,
}

impl SpectrumSnapshot {
    /// Snapshot with no components
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sample a spectrum with the seed and density from `params`
    pub fn build(spectrum: &OceanWaveSpectrum, params: &GerstnerParams) -> Self {
        let cpo = params.components_per_octave;
        let sampler = SpectrumSampler::new(spectrum, params.gravity);
        let mut rng = Pcg32::seed_from_u64(params.random_seed);
        let (wavelengths, angles_deg) = sampler.generate(cpo, &mut rng);

        let weight = params.clamped_weight();
        let (amplitudes, powers): (Vec<f32>, Vec<f32>) = wavelengths
            .iter()
            .map(|&wl| {
                let (amplitude, power) = sampler.amplitude(wl, cpo);
                (weight * amplitude, power)
            })
            .unzip();

        Self {
            components_per_octave: cpo,
            wavelengths,
            angles_deg,
            amplitudes,
            powers,
        }
    }

    /// Assemble a snapshot from explicit component arrays
    ///
    /// Rejects mismatched lengths, non-positive or non-finite wavelengths and
    /// wavelengths that are not sorted ascending.
    pub fn from_parts(
        components_per_octave: usize,
        wavelengths: Vec<f32>,
        angles_deg: Vec<f32>,
        amplitudes: Vec<f32>,
        powers: Vec<f32>,
    ) -> Result<Self, SynthError> {
        let expected = wavelengths.len();
        for (what, found) in [
            ("angles", angles_deg.len()),
            ("amplitudes", amplitudes.len()),
            ("powers", powers.len()),
        ] {
            if found != expected {
                return Err(SynthError::ArrayLengthMismatch {
                    what,
                    expected,
                    found,
                });
            }
        }
        if components_per_octave == 0 && expected > 0 {
            return Err(SynthError::ArrayLengthMismatch {
                what: "components per octave",
                expected,
                found: 0,
            });
        }

        for (index, &wavelength) in wavelengths.iter().enumerate() {
            if !(wavelength.is_finite() && wavelength > 0.0) {
                return Err(SynthError::InvalidWavelength { index, wavelength });
            }
            if index > 0 && wavelength < wavelengths[index - 1] {
                return Err(SynthError::UnsortedWavelengths { index });
            }
        }

        Ok(Self {
            components_per_octave,
            wavelengths,
            angles_deg,
            amplitudes,
            powers,
        })
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn components_per_octave(&self) -> usize {
        self.components_per_octave
    }

    pub fn wavelengths(&self) -> &[f32] {
        &self.wavelengths
    }

    pub fn angles_deg(&self) -> &[f32] {
        &self.angles_deg
    }

    pub fn amplitudes(&self) -> &[f32] {
        &self.amplitudes
    }

    pub fn powers(&self) -> &[f32] {
        &self.powers
    }

    /// Octave a component was sampled in
    pub fn octave_of(&self, index: usize) -> usize {
        index / self.components_per_octave.max(1)
    }

    pub fn id(&self, index: usize) -> ComponentId {
        let cpo = self.components_per_octave.max(1);
        ComponentId {
            octave: (index / cpo) as u16,
            slot: (index % cpo) as u16,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        (0..self.len()).map(|index| self.id(index))
    }

    /// Largest displacement the components can produce (meters)
    pub fn max_displacement(&self, spectrum: &OceanWaveSpectrum) -> MaxDisplacement {
        let sum: f32 = self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(index, &amplitude)| amplitude * spectrum.chop_scale(self.octave_of(index)))
            .sum();
        MaxDisplacement {
            horizontal_m: sum * spectrum.chop,
            vertical_m: sum,
        }
    }
}

/// Displacement bounds reported to the host for culling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxDisplacement {
    pub horizontal_m: f32,
    pub vertical_m: f32,
}
