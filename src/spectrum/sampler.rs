//! Spectral sampling: wavelengths, directions, amplitudes and phase seeds.

use std::f32::consts::TAU;

use rand::Rng;

use crate::params::{OceanWaveSpectrum, NUM_OCTAVES};

/// Samples wave components from a spectrum
///
/// Randomness comes from the generator passed in by the caller, so the same
/// seeded generator always reproduces the same components.
pub struct SpectrumSampler<'a> {
    spectrum: &'a OceanWaveSpectrum,
    gravity: f32,
}

impl<'a> SpectrumSampler<'a> {
    pub fn new(spectrum: &'a OceanWaveSpectrum, gravity: f32) -> Self {
        Self { spectrum, gravity }
    }

    /// Generate sorted wavelengths (meters) and direction angles (degrees)
    ///
    /// Each octave is split into `components_per_octave` equal wavelength slots
    /// and one wavelength is drawn per slot, so the output is ascending by
    /// construction. Angles are stratified the same way across
    /// ±`wave_direction_variance_deg`.
    pub fn generate<R: Rng>(
        &self,
        components_per_octave: usize,
        rng: &mut R,
    ) -> (Vec<f32>, Vec<f32>) {
        let total = components_per_octave * NUM_OCTAVES;
        let mut wavelengths = Vec::with_capacity(total);
        let mut angles_deg = Vec::with_capacity(total);
        if components_per_octave == 0 {
            return (wavelengths, angles_deg);
        }

        let inv_count = 1.0 / components_per_octave as f32;
        let variance = self.spectrum.wave_direction_variance_deg;

        for octave in 0..NUM_OCTAVES {
            let octave_min = OceanWaveSpectrum::small_wavelength(octave);
            for i in 0..components_per_octave {
                // Slot bounds use one formula so neighboring slots share edges exactly
                let lo = octave_min * (1.0 + i as f32 * inv_count);
                let hi = octave_min * (1.0 + (i + 1) as f32 * inv_count);
                let u: f32 = rng.random();
                wavelengths.push(lo + (hi - lo) * u);

                let stratified = (i as f32 + rng.random::<f32>()) * inv_count;
                angles_deg.push((2.0 * stratified - 1.0) * variance);
            }
        }

        (wavelengths, angles_deg)
    }

    /// Amplitude (meters) and spectral power sample for a wavelength
    ///
    /// Power is interpolated in log space between the wavelength's octave and
    /// the next one; the amplitude follows from `a² = 2·S(ω)·Δω` where `Δω` is
    /// the angular frequency span of one component. Returns zeros for an out
    /// of date spectrum.
    pub fn amplitude(&self, wavelength: f32, components_per_octave: usize) -> (f32, f32) {
        if !self.spectrum.is_current() || components_per_octave == 0 {
            return (0.0, 0.0);
        }
        debug_assert!(wavelength > 0.0, "wavelength must be > 0");

        let index = OceanWaveSpectrum::octave_index(wavelength);
        let this_power = self.spectrum.octave_power_log(index);
        let has_next = index + 1 < NUM_OCTAVES;
        let next_power = if has_next {
            self.spectrum.octave_power_log(index + 1)
        } else {
            this_power
        };

        let wl_lo = OceanWaveSpectrum::small_wavelength(index);
        let wl_hi = 2.0 * wl_lo;
        let domega = (self.angular_frequency(wl_lo) - self.angular_frequency(wl_hi))
            / components_per_octave as f32;

        let alpha = ((wavelength - wl_lo) / wl_lo).clamp(0.0, 1.0);
        let power_log = lerp(this_power, next_power, alpha);
        let amplitude = (2.0 * 10f32.powf(power_log) * domega).sqrt();

        let power = lerp(10f32.powf(this_power), 10f32.powf(next_power), alpha);

        (amplitude * self.spectrum.multiplier, power)
    }

    /// Deep water dispersion: ω = √(g·k)
    fn angular_frequency(&self, wavelength: f32) -> f32 {
        let k = TAU / wavelength;
        (self.gravity * self.spectrum.gravity_scale * k).sqrt()
    }
}

/// Initial phases (radians), stratified within each octave
///
/// Slot `i` of an octave draws from `[2π·i/n, 2π·(i+1)/n)` so phases of
/// neighboring components do not cluster.
pub fn seed_phases<R: Rng>(components_per_octave: usize, rng: &mut R) -> Vec<f64> {
    let total = components_per_octave * NUM_OCTAVES;
    let mut phases = Vec::with_capacity(total);
    for _octave in 0..NUM_OCTAVES {
        for i in 0..components_per_octave {
            let u: f64 = rng.random();
            phases.push(std::f64::consts::TAU * (i as f64 + u) / components_per_octave as f64);
        }
    }
    phases
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn sample(seed: u64, cpo: usize) -> (Vec<f32>, Vec<f32>) {
        let spectrum = OceanWaveSpectrum::default();
        let sampler = SpectrumSampler::new(&spectrum, 9.81);
        let mut rng = Pcg32::seed_from_u64(seed);
        sampler.generate(cpo, &mut rng)
    }

    fn bits(values: &[f32]) -> Vec<u32> {
        values.iter().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let (wl_a, ang_a) = sample(7, 8);
        let (wl_b, ang_b) = sample(7, 8);
        assert_eq!(bits(&wl_a), bits(&wl_b));
        assert_eq!(bits(&ang_a), bits(&ang_b));

        let (wl_c, _) = sample(8, 8);
        assert_ne!(bits(&wl_a), bits(&wl_c));
    }

    #[test]
    fn test_generate_sorted_and_within_octaves() {
        let cpo = 6;
        let (wavelengths, angles) = sample(3, cpo);
        assert_eq!(wavelengths.len(), cpo * NUM_OCTAVES);
        assert_eq!(angles.len(), cpo * NUM_OCTAVES);

        for pair in wavelengths.windows(2) {
            assert!(pair[0] <= pair[1], "{} > {}", pair[0], pair[1]);
        }
        for (index, &wl) in wavelengths.iter().enumerate() {
            let octave = index / cpo;
            let lo = OceanWaveSpectrum::small_wavelength(octave);
            assert!(wl >= lo && wl <= 2.0 * lo, "component {index}: {wl}");
        }
        for &angle in &angles {
            assert!(angle >= -90.0 && angle <= 90.0);
        }
    }

    #[test]
    fn test_generate_zero_components() {
        let (wavelengths, angles) = sample(1, 0);
        assert!(wavelengths.is_empty());
        assert!(angles.is_empty());
    }

    #[test]
    fn test_amplitude_power_at_octave_start() {
        let spectrum = OceanWaveSpectrum::default();
        let sampler = SpectrumSampler::new(&spectrum, 9.81);

        // At the start of an octave alpha is 0, so power is exactly the table value
        let (amplitude, power) = sampler.amplitude(1.0, 8);
        let expected = 10f32.powf(spectrum.power_log[4]);
        assert!((power - expected).abs() <= expected * 1e-5);
        assert!(amplitude > 0.0);
    }

    #[test]
    fn test_amplitude_grows_with_density() {
        let spectrum = OceanWaveSpectrum::default();
        let sampler = SpectrumSampler::new(&spectrum, 9.81);
        // Fewer components per octave means each carries more energy
        let (sparse, _) = sampler.amplitude(10.0, 4);
        let (dense, _) = sampler.amplitude(10.0, 16);
        assert!(sparse > dense);
        assert!(((sparse / dense) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_amplitude_multiplier_and_disabled() {
        let mut spectrum = OceanWaveSpectrum::default();
        let (base, _) = SpectrumSampler::new(&spectrum, 9.81).amplitude(3.0, 8);

        spectrum.multiplier = 0.5;
        let (halved, _) = SpectrumSampler::new(&spectrum, 9.81).amplitude(3.0, 8);
        assert!((halved - base * 0.5).abs() < 1e-6);

        spectrum.multiplier = 1.0;
        spectrum.power_disabled = vec![true; NUM_OCTAVES];
        let (amplitude, power) = SpectrumSampler::new(&spectrum, 9.81).amplitude(3.0, 8);
        let floor = 10f32.powf(crate::params::MIN_POWER_LOG);
        assert!(amplitude < 0.001);
        assert!((power - floor).abs() < 1e-12);
    }

    #[test]
    fn test_amplitude_outdated_spectrum() {
        let spectrum = OceanWaveSpectrum {
            power_log: vec![0.0; 3],
            ..Default::default()
        };
        let sampler = SpectrumSampler::new(&spectrum, 9.81);
        assert_eq!(sampler.amplitude(10.0, 8), (0.0, 0.0));
    }

    #[test]
    fn test_seed_phases_stratified() {
        let cpo = 5;
        let mut rng = Pcg32::seed_from_u64(11);
        let phases = seed_phases(cpo, &mut rng);
        assert_eq!(phases.len(), cpo * NUM_OCTAVES);

        let slot = std::f64::consts::TAU / cpo as f64;
        for (index, &phase) in phases.iter().enumerate() {
            let i = (index % cpo) as f64;
            assert!(phase >= slot * i && phase < slot * (i + 1.0) + 1e-12);
        }
    }
}
