//! Parameter definitions with physical units and documented semantics.

mod spectrum;
mod synthesis;

// Re-export all types
pub use spectrum::{
    OceanWaveSpectrum, MAX_POWER_LOG, MIN_POWER_LOG, NUM_OCTAVES, SMALLEST_WL_POW_2,
};
pub use synthesis::{GerstnerParams, OverflowPolicy};
