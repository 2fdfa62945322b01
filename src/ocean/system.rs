//! Gerstner wave synthesis driven by the engine lifecycle.

use glam::Vec3;

use super::dispatch::{CascadeBatch, DispatchParams, WaveGenerator};
use crate::cascade::{
    pack, slice, CascadeGrid, CascadeRange, PackedWaves, SliceOutcome, SliceSettings,
    MAX_WAVE_COMPONENTS,
};
use crate::error::{SynthError, SynthWarning};
use crate::params::{GerstnerParams, OceanWaveSpectrum, OverflowPolicy, NUM_OCTAVES};
use crate::phase::PhaseTable;
use crate::spectrum::{MaxDisplacement, SpectrumSnapshot};

/// Result of one `synthesize()` call
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    /// Configuration problems; when non-empty no waves were generated
    pub warnings: Vec<SynthWarning>,
    pub outcome: SliceOutcome,
    /// Cascades holding waves after this pass
    pub range: Option<CascadeRange>,
    /// False when a static spectrum was reused without re-packing
    pub repacked: bool,
}

/// Gerstner wave synthesizer for one ocean instance
///
/// Owns the component snapshot, the persistent phases and the published
/// buffers. Passes compute into staging values and only replace the published
/// state once they succeed.
pub struct GerstnerSystem {
    params: GerstnerParams,
    spectrum: Option<OceanWaveSpectrum>,
    snapshot: SpectrumSnapshot,
    phases: PhaseTable,
    packed: PackedWaves,
    batches: Vec<CascadeBatch>,
    max_displacement: MaxDisplacement,
    needs_rebuild: bool,
    needs_repack: bool,
}

impl GerstnerSystem {
    /// Create a synthesizer; nothing is generated until the first `synthesize()`
    pub fn new(params: GerstnerParams, spectrum: Option<OceanWaveSpectrum>) -> Self {
        Self {
            params,
            spectrum,
            snapshot: SpectrumSnapshot::empty(),
            phases: PhaseTable::new(),
            packed: PackedWaves::empty(),
            batches: Vec::new(),
            max_displacement: MaxDisplacement::default(),
            needs_rebuild: true,
            needs_repack: false,
        }
    }

    pub fn params(&self) -> &GerstnerParams {
        &self.params
    }

    pub fn spectrum(&self) -> Option<&OceanWaveSpectrum> {
        self.spectrum.as_ref()
    }

    pub fn snapshot(&self) -> &SpectrumSnapshot {
        &self.snapshot
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.phases
    }

    /// Buffers published by the last successful pass
    pub fn packed(&self) -> &PackedWaves {
        &self.packed
    }

    /// One batch per cascade in the published range
    pub fn batches(&self) -> &[CascadeBatch] {
        &self.batches
    }

    pub fn max_displacement(&self) -> MaxDisplacement {
        self.max_displacement
    }

    /// Replace all parameters; components are re-derived on the next pass
    pub fn set_params(&mut self, params: GerstnerParams) {
        self.params = params;
        self.needs_rebuild = true;
    }

    /// Assign or clear the spectrum; components are re-derived on the next pass
    pub fn set_spectrum(&mut self, spectrum: Option<OceanWaveSpectrum>) {
        self.spectrum = spectrum;
        self.needs_rebuild = true;
    }

    /// Change the blend weight
    ///
    /// Batch weights follow on the next pass. Amplitudes of a static spectrum
    /// keep the weight they were derived with.
    pub fn set_weight(&mut self, weight: f32) {
        self.params.weight = weight;
    }

    /// Per-frame entry point
    ///
    /// Static spectra derive their components once and afterwards only
    /// re-pack when an origin shift changed the phases, so this may be called
    /// unconditionally every frame.
    ///
    /// # Returns
    /// * Report with warnings and the slicing outcome, or an error if the
    ///   configuration is invalid or overflow is rejected. On error the
    ///   previously published buffers stay in place.
    pub fn synthesize(&mut self) -> Result<SynthesisReport, SynthError> {
        let requested = self.params.components_per_octave * NUM_OCTAVES;
        if requested > MAX_WAVE_COMPONENTS {
            return Err(SynthError::TooManyComponents {
                requested,
                max: MAX_WAVE_COMPONENTS,
            });
        }

        let spectrum = match self.validate() {
            Ok(spectrum) => spectrum,
            Err(warnings) => return Ok(self.publish_empty(warnings)),
        };

        let rebuild = self.needs_rebuild || !self.params.spectrum_is_static;
        if !rebuild && !self.needs_repack {
            self.refresh_batch_weights();
            return Ok(SynthesisReport {
                warnings: Vec::new(),
                outcome: self.packed.outcome,
                range: self.packed.range,
                repacked: false,
            });
        }

        // Staging
        let mut phases = self.phases.clone();
        let snapshot = if rebuild {
            let snapshot = SpectrumSnapshot::build(spectrum, &self.params);
            let seeded = phases.sync(&snapshot, self.params.random_seed);
            tracing::debug!(
                "Derived {} wave components ({} new phases)",
                snapshot.len(),
                seeded
            );
            Some(snapshot)
        } else {
            None
        };
        let current = snapshot.as_ref().unwrap_or(&self.snapshot);

        let settings = SliceSettings {
            grid: self.grid(),
            gravity: self.params.gravity,
        };
        let map = slice(current, &phases.phases_for(current), spectrum, &settings)?;
        let packed = pack(&map);
        check_overflow(packed.outcome, self.params.overflow_policy)?;
        let max_displacement = current.max_displacement(spectrum);

        // Publish
        if let Some(snapshot) = snapshot {
            self.snapshot = snapshot;
        }
        self.phases = phases;
        self.max_displacement = max_displacement;
        self.packed = packed;
        self.needs_rebuild = false;
        self.needs_repack = false;
        self.rebuild_batches();

        tracing::debug!(
            "Synthesized {} groups, cascades {:?}",
            self.packed.group_count(),
            self.packed.range
        );

        Ok(SynthesisReport {
            warnings: Vec::new(),
            outcome: self.packed.outcome,
            range: self.packed.range,
            repacked: true,
        })
    }

    /// Engine entry point for a world recentering by `offset`
    ///
    /// Must be called once per shift, before the next `synthesize()`. Does
    /// nothing until phases exist.
    pub fn on_origin_shift(&mut self, offset: Vec3) {
        if self.phases.is_empty() {
            tracing::trace!("Origin shift before any synthesis, ignored");
            return;
        }
        self.phases
            .translate(&self.snapshot, self.params.wind_direction_deg, offset);
        self.needs_repack = true;
    }

    /// Hand the published buffers to the GPU stage
    ///
    /// # Returns
    /// * `Ok(false)` without calling the generator when no cascade holds waves
    pub fn dispatch<G: WaveGenerator>(
        &self,
        generator: &mut G,
        time_s: f32,
    ) -> Result<bool, G::Error> {
        let Some(range) = self.packed.range else {
            return Ok(false);
        };
        let params = DispatchParams::new(
            range,
            self.params.resolution,
            time_s,
            self.params.wind_axis(),
        );
        generator.generate(&self.packed, &params)?;
        Ok(true)
    }

    /// Spectrum to synthesize from, or the reasons there is none
    fn validate(&self) -> Result<&OceanWaveSpectrum, Vec<SynthWarning>> {
        let mut warnings = Vec::new();
        if let Some(spectrum) = &self.spectrum {
            if !spectrum.is_current() {
                warnings.push(SynthWarning::OutdatedSpectrum {
                    name: spectrum.name.clone(),
                    expected: NUM_OCTAVES,
                    found: spectrum.octave_table_len(),
                });
            }
        } else {
            warnings.push(SynthWarning::MissingSpectrum);
        }
        if self.params.components_per_octave == 0 {
            warnings.push(SynthWarning::ZeroComponentsPerOctave);
        }

        match &self.spectrum {
            Some(spectrum) if warnings.is_empty() => Ok(spectrum),
            _ => Err(warnings),
        }
    }

    /// Publish a pass with no waves
    fn publish_empty(&mut self, warnings: Vec<SynthWarning>) -> SynthesisReport {
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        self.packed = PackedWaves::empty();
        self.batches.clear();
        self.max_displacement = MaxDisplacement::default();
        self.needs_rebuild = true;
        SynthesisReport {
            warnings,
            outcome: SliceOutcome::Complete,
            range: None,
            repacked: true,
        }
    }

    fn grid(&self) -> CascadeGrid {
        CascadeGrid {
            resolution: self.params.resolution,
            min_texels_per_wave: self.params.min_texels_per_wave,
        }
    }

    fn rebuild_batches(&mut self) {
        let grid = self.grid();
        let weight = self.params.clamped_weight();
        self.batches = match self.packed.range {
            Some(range) => (range.first..=range.last)
                .map(|cascade| CascadeBatch::new(cascade, grid.min_wavelength(cascade), weight))
                .collect(),
            None => Vec::new(),
        };
    }

    fn refresh_batch_weights(&mut self) {
        let weight = self.params.clamped_weight();
        for batch in &mut self.batches {
            batch.weight = weight;
        }
    }
}

/// Apply the overflow policy to a packing outcome
fn check_overflow(outcome: SliceOutcome, policy: OverflowPolicy) -> Result<(), SynthError> {
    match (outcome, policy) {
        (SliceOutcome::Complete, _) => Ok(()),
        (SliceOutcome::Truncated { .. }, OverflowPolicy::Reject) => {
            Err(SynthError::CapacityExceeded {
                dropped: outcome.dropped(),
            })
        }
        (SliceOutcome::Truncated { over_capacity, .. }, OverflowPolicy::Truncate) => {
            if over_capacity > 0 {
                tracing::warn!(
                    "Packed wave buffer full, {} components dropped",
                    over_capacity
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingGenerator {
        calls: Vec<DispatchParams>,
    }

    impl WaveGenerator for RecordingGenerator {
        type Error = std::convert::Infallible;

        fn generate(
            &mut self,
            waves: &PackedWaves,
            params: &DispatchParams,
        ) -> Result<(), Self::Error> {
            assert!(waves.range.is_some());
            self.calls.push(*params);
            Ok(())
        }
    }

    fn system() -> GerstnerSystem {
        GerstnerSystem::new(
            GerstnerParams::default(),
            Some(OceanWaveSpectrum::default()),
        )
    }

    #[test]
    fn test_synthesize_default_spectrum() {
        let mut ocean = system();
        let report = ocean.synthesize().unwrap();
        assert!(report.warnings.is_empty());
        assert!(report.repacked);

        let range = report.range.unwrap();
        assert_eq!(ocean.batches().len(), range.slice_count());
        assert_eq!(ocean.batches()[0].slice_index, range.first);
        assert_eq!(ocean.snapshot().len(), 8 * NUM_OCTAVES);
        assert_eq!(ocean.phases().len(), ocean.snapshot().len());
        assert!(ocean.max_displacement().vertical_m > 0.0);
    }

    #[test]
    fn test_missing_spectrum_warns() {
        let mut ocean = GerstnerSystem::new(GerstnerParams::default(), None);
        let report = ocean.synthesize().unwrap();
        assert_eq!(report.warnings, vec![SynthWarning::MissingSpectrum]);
        assert_eq!(report.range, None);
        assert_eq!(ocean.packed().gpu_cascade_indices(), (-1, -1));

        let mut generator = RecordingGenerator::default();
        assert!(!ocean.dispatch(&mut generator, 0.0).unwrap());
        assert!(generator.calls.is_empty());
    }

    #[test]
    fn test_zero_components_warns() {
        let mut ocean = system();
        ocean.set_params(GerstnerParams {
            components_per_octave: 0,
            ..Default::default()
        });
        let report = ocean.synthesize().unwrap();
        assert_eq!(report.warnings, vec![SynthWarning::ZeroComponentsPerOctave]);
        assert_eq!(ocean.packed().group_count(), 0);
    }

    #[test]
    fn test_outdated_spectrum_warns() {
        let mut spectrum = OceanWaveSpectrum::default();
        spectrum.power_log.truncate(10);
        let mut ocean = GerstnerSystem::new(GerstnerParams::default(), Some(spectrum));
        let report = ocean.synthesize().unwrap();
        assert!(matches!(
            report.warnings.as_slice(),
            [SynthWarning::OutdatedSpectrum { found: 10, .. }]
        ));
        assert_eq!(report.range, None);
    }

    #[test]
    fn test_too_many_components() {
        let mut ocean = system();
        ocean.set_params(GerstnerParams {
            components_per_octave: 74,
            ..Default::default()
        });
        assert!(matches!(
            ocean.synthesize(),
            Err(SynthError::TooManyComponents {
                requested: 1036,
                max: 1024
            })
        ));
    }

    #[test]
    fn test_static_spectrum_is_cached() {
        let mut ocean = system();
        ocean.synthesize().unwrap();
        let first = ocean.packed().clone();

        let report = ocean.synthesize().unwrap();
        assert!(!report.repacked);
        assert_eq!(*ocean.packed(), first);

        ocean.on_origin_shift(Vec3::new(13.0, 0.0, -7.0));
        let report = ocean.synthesize().unwrap();
        assert!(report.repacked);
        assert_ne!(ocean.packed().groups, first.groups);
        // Shifts only move phases
        assert_eq!(ocean.packed().cascades, first.cascades);
    }

    #[test]
    fn test_dynamic_spectrum_repacks_every_pass() {
        let mut ocean = system();
        ocean.set_params(GerstnerParams {
            spectrum_is_static: false,
            ..Default::default()
        });
        assert!(ocean.synthesize().unwrap().repacked);
        assert!(ocean.synthesize().unwrap().repacked);
    }

    #[test]
    fn test_weight_refreshes_batches() {
        let mut ocean = system();
        ocean.synthesize().unwrap();
        ocean.set_weight(1.7);
        ocean.synthesize().unwrap();
        assert!(ocean.batches().iter().all(|batch| batch.weight == 1.0));

        ocean.set_weight(0.25);
        let report = ocean.synthesize().unwrap();
        assert!(!report.repacked);
        assert!(ocean.batches().iter().all(|batch| batch.weight == 0.25));
    }

    #[test]
    fn test_origin_shift_before_synthesis_is_ignored() {
        let mut ocean = system();
        ocean.on_origin_shift(Vec3::new(100.0, 0.0, 0.0));
        assert!(ocean.phases().is_empty());
        assert!(ocean.synthesize().unwrap().repacked);
    }

    #[test]
    fn test_dispatch_descriptor() {
        let mut ocean = system();
        ocean.synthesize().unwrap();
        let mut generator = RecordingGenerator::default();
        assert!(ocean.dispatch(&mut generator, 2.5).unwrap());

        let range = ocean.packed().range.unwrap();
        let params = generator.calls[0];
        assert_eq!(params.time_s, 2.5);
        assert_eq!(params.first_cascade as usize, range.first);
        assert_eq!(params.thread_groups, [4, 4, range.slice_count() as u32]);
    }

    #[test]
    fn test_reject_overflow_keeps_published_buffers() {
        // Dense, loud spectrum: every component survives, cascade padding overflows
        let spectrum = OceanWaveSpectrum {
            multiplier: 1000.0,
            ..Default::default()
        };
        let params = GerstnerParams {
            components_per_octave: 73,
            ..Default::default()
        };
        let mut ocean = GerstnerSystem::new(params.clone(), Some(spectrum));
        let report = ocean.synthesize().unwrap();
        assert!(!report.outcome.is_complete());
        let published = ocean.packed().clone();

        ocean.set_params(GerstnerParams {
            overflow_policy: OverflowPolicy::Reject,
            ..params
        });
        assert!(matches!(
            ocean.synthesize(),
            Err(SynthError::CapacityExceeded { .. })
        ));
        assert_eq!(*ocean.packed(), published);
    }
}
