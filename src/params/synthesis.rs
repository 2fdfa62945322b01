//! Per-instance synthesis parameters.

use glam::Vec2;

/// What to do when surviving components do not fit the packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Keep what fits, report the dropped count
    #[default]
    Truncate,

    /// Fail the pass and keep the previously published buffers
    Reject,
}

/// Gerstner synthesis parameters
#[derive(Debug, Clone)]
pub struct GerstnerParams {
    /// Wind direction (angle from x axis, degrees, -180..180)
    pub wind_direction_deg: f32,

    /// Wave components generated in each octave
    pub components_per_octave: usize,

    /// Blend weight for crossfading spectra (0..1)
    pub weight: f32,

    /// Seed for wavelength, direction and phase sampling
    pub random_seed: u64,

    /// Wave buffer resolution (texels per side)
    pub resolution: u32,

    /// Shortest wave a cascade may hold, in texels
    pub min_texels_per_wave: f32,

    /// Gravitational acceleration (m/s²)
    pub gravity: f32,

    /// Derive components once instead of every pass
    pub spectrum_is_static: bool,

    pub overflow_policy: OverflowPolicy,
}

impl Default for GerstnerParams {
    fn default() -> Self {
        Self {
            wind_direction_deg: 0.0,
            components_per_octave: 8,
            weight: 1.0,
            random_seed: 0,
            resolution: 32,
            min_texels_per_wave: 3.0,
            gravity: 9.81,
            spectrum_is_static: true,
            overflow_policy: OverflowPolicy::Truncate,
        }
    }
}

impl GerstnerParams {
    /// Unit wind axis in the XZ plane
    pub fn wind_axis(&self) -> Vec2 {
        let angle = self.wind_direction_deg.to_radians();
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Weight clamped to [0, 1]
    pub fn clamped_weight(&self) -> f32 {
        self.weight.clamp(0.0, 1.0)
    }
}
