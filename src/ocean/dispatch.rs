//! Boundary towards the GPU stage that evaluates packed waves.

use glam::Vec2;

use crate::cascade::{CascadeRange, PackedWaves, THREAD_GROUP_SIZE};

/// Parameters for one wave generation dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchParams {
    /// Texels per side of each cascade slice
    pub texture_res: u32,
    /// Simulation time (seconds)
    pub time_s: f32,
    /// Texture slice of the first generated cascade
    pub first_cascade: u32,
    /// Thread groups in x, y and slices
    pub thread_groups: [u32; 3],
    /// Wind axis (cos, sin) used to rotate packed directions into world space
    pub wind_axis: Vec2,
}

impl DispatchParams {
    pub fn new(range: CascadeRange, texture_res: u32, time_s: f32, wind_axis: Vec2) -> Self {
        let groups = (texture_res / THREAD_GROUP_SIZE).max(1);
        Self {
            texture_res,
            time_s,
            first_cascade: range.first as u32,
            thread_groups: [groups, groups, range.slice_count() as u32],
            wind_axis,
        }
    }
}

/// GPU collaborator that turns packed waves into a displacement texture array
pub trait WaveGenerator {
    type Error;

    /// Evaluate `waves` into slices `first_cascade..first_cascade + thread_groups[2]`
    fn generate(&mut self, waves: &PackedWaves, params: &DispatchParams) -> Result<(), Self::Error>;
}

/// Rendering input for one cascade slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeBatch {
    /// Texture array slice holding this cascade
    pub slice_index: usize,
    /// Shortest wavelength in the cascade (meters)
    pub min_wavelength: f32,
    /// Representative wavelength used to pick a level of detail (meters)
    pub average_wavelength: f32,
    /// Blend weight applied when drawing
    pub weight: f32,
}

impl CascadeBatch {
    pub fn new(slice_index: usize, min_wavelength: f32, weight: f32) -> Self {
        Self {
            slice_index,
            min_wavelength,
            average_wavelength: min_wavelength * 1.5,
            weight,
        }
    }
}
