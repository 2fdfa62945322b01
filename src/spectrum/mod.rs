//! Wave component generation from a spectrum.

mod presets;
mod sampler;
mod snapshot;

pub use presets::SpectrumModel;
pub use sampler::{seed_phases, SpectrumSampler};
pub use snapshot::{ComponentId, MaxDisplacement, SpectrumSnapshot};
