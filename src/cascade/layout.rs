//! Packed buffer layout handed to the GPU wave evaluation stage.
//!
//! Two structured buffers are produced per synthesis pass:
//!
//! * **Wave data**: `MAX_WAVE_GROUPS` entries of [`GerstnerWaveComponent4`],
//!   112 bytes each. Every entry holds four wave components lane-wise as seven
//!   `float4` fields in this order: `2π/λ`, amplitude, direction x, direction z,
//!   angular frequency ω, phase, chop amplitude. Directions are relative to the
//!   wind axis, unit length, and quantized so each wave tiles its cascade.
//!   Unused lanes hold `2π/λ = 1` and zero everywhere else.
//! * **Cascade table**: `CASCADE_COUNT + 1` entries of [`CascadeParams`],
//!   8 bytes each (`uint start_group, float cumulative_slope_variance`).
//!   Cascade `i` owns groups `table[i].start_group .. table[i + 1].start_group`;
//!   the last entry is a sentinel whose start marks the end of the data.
//!
//! All fields are little-endian 32-bit values with no padding.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Number of wavelength cascades (texture array slices)
pub const CASCADE_COUNT: usize = 16;

/// Hard limit on wave components, and the packed buffer's lane capacity
pub const MAX_WAVE_COMPONENTS: usize = 1024;

/// Components per packed group
pub const LANES: usize = 4;

/// Packed buffer length in groups
pub const MAX_WAVE_GROUPS: usize = MAX_WAVE_COMPONENTS / LANES;

/// Compute thread group edge used by the wave evaluation kernel
pub const THREAD_GROUP_SIZE: u32 = 8;

/// Amplitudes below this are skipped (meters)
pub const MIN_AMPLITUDE: f32 = 0.001;

/// Four wave components packed lane-wise
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GerstnerWaveComponent4 {
    pub two_pi_over_wavelength: [f32; 4],
    pub amplitude: [f32; 4],
    pub wave_dir_x: [f32; 4],
    pub wave_dir_z: [f32; 4],
    pub omega: [f32; 4],
    pub phase: [f32; 4],
    pub chop_amplitude: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<GerstnerWaveComponent4>() == 112);

impl GerstnerWaveComponent4 {
    /// Group with every lane unused
    pub const PADDING: Self = Self {
        two_pi_over_wavelength: [1.0; 4],
        amplitude: [0.0; 4],
        wave_dir_x: [0.0; 4],
        wave_dir_z: [0.0; 4],
        omega: [0.0; 4],
        phase: [0.0; 4],
        chop_amplitude: [0.0; 4],
    };

    pub fn set_lane(&mut self, lane: usize, wave: &WaveLane) {
        self.two_pi_over_wavelength[lane] = wave.two_pi_over_wavelength;
        self.amplitude[lane] = wave.amplitude;
        self.wave_dir_x[lane] = wave.direction.x;
        self.wave_dir_z[lane] = wave.direction.y;
        self.omega[lane] = wave.omega;
        self.phase[lane] = wave.phase;
        self.chop_amplitude[lane] = wave.chop_amplitude;
    }

    pub fn lane(&self, lane: usize) -> WaveLane {
        WaveLane {
            two_pi_over_wavelength: self.two_pi_over_wavelength[lane],
            amplitude: self.amplitude[lane],
            direction: Vec2::new(self.wave_dir_x[lane], self.wave_dir_z[lane]),
            omega: self.omega[lane],
            phase: self.phase[lane],
            chop_amplitude: self.chop_amplitude[lane],
        }
    }

    /// True if the lane holds the unused-lane pattern
    pub fn is_padding_lane(&self, lane: usize) -> bool {
        self.lane(lane) == Self::PADDING.lane(lane)
    }
}

/// One packed wave component
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WaveLane {
    /// 2π/λ from the sampled (unquantized) wavelength
    pub two_pi_over_wavelength: f32,
    pub amplitude: f32,
    /// Quantized propagation direction (x, z), relative to the wind axis
    pub direction: Vec2,
    /// Angular frequency (rad/s)
    pub omega: f32,
    /// Phase wrapped to [0, 2π)
    pub phase: f32,
    pub chop_amplitude: f32,
}

/// Cascade table entry
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CascadeParams {
    /// First group owned by the cascade
    pub start_group: u32,
    /// Slope variance summed over this and all finer cascades
    pub cumulative_slope_variance: f32,
}

const _: () = assert!(std::mem::size_of::<CascadeParams>() == 8);

/// Cascade table including the trailing sentinel entry
pub type CascadeTable = [CascadeParams; CASCADE_COUNT + 1];

/// Size of the cascade band grid in the wave buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeGrid {
    /// Texels per side of each cascade slice
    pub resolution: u32,
    /// Shortest wave a cascade may hold, in texels
    pub min_texels_per_wave: f32,
}

impl CascadeGrid {
    /// Minimum wavelength (meters) stored in a cascade. Does not depend on viewpoint.
    pub fn min_wavelength(&self, cascade: usize) -> f32 {
        let texel_size = tile_diameter(cascade) / self.resolution as f32;
        texel_size * self.min_texels_per_wave
    }

    /// Cascade a wavelength belongs to under the doubling rule, if any
    pub fn cascade_for(&self, wavelength: f32) -> Option<usize> {
        (0..CASCADE_COUNT).find(|&cascade| {
            let min = self.min_wavelength(cascade);
            wavelength >= min && wavelength < 2.0 * min
        })
    }
}

/// World-space tile size (meters) covered by a cascade
pub fn tile_diameter(cascade: usize) -> f32 {
    0.5 * (1u32 << cascade) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_wavelength_doubles() {
        let grid = CascadeGrid {
            resolution: 32,
            min_texels_per_wave: 3.0,
        };
        assert!((grid.min_wavelength(0) - 0.046875).abs() < 1e-9);
        for cascade in 1..CASCADE_COUNT {
            assert_eq!(grid.min_wavelength(cascade), 2.0 * grid.min_wavelength(cascade - 1));
        }
        assert_eq!(grid.cascade_for(10.0), Some(7));
        assert_eq!(grid.cascade_for(0.01), None);
    }

    #[test]
    fn test_lane_roundtrip() {
        let mut group = GerstnerWaveComponent4::PADDING;
        let wave = WaveLane {
            two_pi_over_wavelength: 0.5,
            amplitude: 1.25,
            direction: Vec2::new(0.6, 0.8),
            omega: 2.0,
            phase: 3.0,
            chop_amplitude: -2.0,
        };
        group.set_lane(2, &wave);
        assert_eq!(group.lane(2), wave);
        assert!(group.is_padding_lane(0));
        assert!(!group.is_padding_lane(2));
    }

    #[test]
    fn test_byte_layout() {
        let mut group = GerstnerWaveComponent4::PADDING;
        group.amplitude[1] = 7.0;
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&group));
        assert_eq!(floats.len(), 28);
        // Field-major: the amplitude float4 follows the 2π/λ float4
        assert_eq!(floats[0..4], [1.0; 4]);
        assert_eq!(floats[5], 7.0);

        let entry = CascadeParams {
            start_group: 3,
            cumulative_slope_variance: 0.5,
        };
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&entry));
        assert_eq!(words, &[3, 0.5f32.to_bits()]);
    }
}
