//! Cascade slicing and packing of wave components for the GPU.

mod layout;
mod pack;
mod slicer;

pub use layout::{
    tile_diameter, CascadeGrid, CascadeParams, CascadeTable, GerstnerWaveComponent4,
    WaveLane, CASCADE_COUNT, LANES, MAX_WAVE_COMPONENTS, MAX_WAVE_GROUPS, MIN_AMPLITUDE,
    THREAD_GROUP_SIZE,
};
pub use pack::{pack, PackedWaves, SliceOutcome};
pub use slicer::{quantize_wave_vector, slice, CascadeMap, CascadeRange, PlacedWave, SliceSettings};
