//! Phase bookkeeping across origin shifts.
//!
//! When the world recenters by `offset`, a wave `sin(k·(d·x) + φ)` evaluated in
//! the new frame must keep its shape, so its phase advances by `k·(d·offset)`.
//! Phases are stored in f64 and wrapped to [0, 2π) after every update, which
//! keeps the bookkeeping exact enough that two successive shifts match one
//! combined shift.

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::spectrum::{seed_phases, ComponentId, SpectrumSnapshot};

/// Wrap a phase into [0, 2π)
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap a phase and narrow it to the f32 stored in the packed buffer
pub fn packed_phase(phase: f64) -> f32 {
    let narrowed = wrap_phase(phase) as f32;
    // Values just below 2π round up to it in f32
    if narrowed >= std::f32::consts::TAU {
        0.0
    } else {
        narrowed
    }
}

/// Phase change of one component for an origin offset
///
/// The component travels along `wind_angle_deg + angle_deg` in the XZ plane;
/// the y part of the offset is ignored.
pub fn phase_delta(wavelength: f32, angle_deg: f32, wind_angle_deg: f32, offset: Vec3) -> f64 {
    let heading = (wind_angle_deg as f64 + angle_deg as f64).to_radians();
    let distance_m = offset.x as f64 * heading.cos() + offset.z as f64 * heading.sin();
    let k = TAU / wavelength as f64;
    distance_m * k
}

/// Advance phases in place for an origin offset
///
/// All three slices hold one entry per component and must be equally long.
pub fn translate_phases(
    phases: &mut [f64],
    wavelengths: &[f32],
    angles_deg: &[f32],
    wind_angle_deg: f32,
    offset: Vec3,
) {
    debug_assert_eq!(phases.len(), wavelengths.len());
    debug_assert_eq!(phases.len(), angles_deg.len());
    for ((phase, &wavelength), &angle_deg) in phases.iter_mut().zip(wavelengths).zip(angles_deg) {
        *phase = wrap_phase(*phase + phase_delta(wavelength, angle_deg, wind_angle_deg, offset));
    }
}

/// Persistent phase per component identity
///
/// Survives snapshot regeneration as long as the component count is
/// unchanged. A different count moves every slot's wavelength band, so the
/// whole table is seeded again.
#[derive(Debug, Clone, Default)]
pub struct PhaseTable {
    phases: HashMap<ComponentId, f64>,
}

impl PhaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, id: ComponentId) -> Option<f64> {
        self.phases.get(&id).copied()
    }

    /// Match the table to a snapshot
    ///
    /// Keeps every phase when the table already holds one per component.
    /// Otherwise all phases are seeded from a generator initialized with
    /// `seed`, so the result only depends on the seed and the density.
    /// Returns how many phases were seeded.
    pub fn sync(&mut self, snapshot: &SpectrumSnapshot, seed: u64) -> usize {
        if self.phases.len() == snapshot.len() {
            return 0;
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let seeds = seed_phases(snapshot.components_per_octave(), &mut rng);
        self.phases = snapshot.ids().zip(seeds).collect();
        self.phases.len()
    }

    /// Phases in snapshot order as f32, wrapped. Unknown components get 0.
    pub fn phases_for(&self, snapshot: &SpectrumSnapshot) -> Vec<f32> {
        snapshot
            .ids()
            .map(|id| self.get(id).map_or(0.0, packed_phase))
            .collect()
    }

    /// Advance every known component's phase for an origin offset
    pub fn translate(&mut self, snapshot: &SpectrumSnapshot, wind_angle_deg: f32, offset: Vec3) {
        let wavelengths = snapshot.wavelengths();
        let angles_deg = snapshot.angles_deg();
        for (index, id) in snapshot.ids().enumerate() {
            if let Some(phase) = self.phases.get_mut(&id) {
                let delta =
                    phase_delta(wavelengths[index], angles_deg[index], wind_angle_deg, offset);
                *phase = wrap_phase(*phase + delta);
            }
        }
    }
}
