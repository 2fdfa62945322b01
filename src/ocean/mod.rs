//! Ocean wave synthesis system and its GPU dispatch boundary.

mod dispatch;
mod system;

pub use dispatch::{CascadeBatch, DispatchParams, WaveGenerator};
pub use system::{GerstnerSystem, SynthesisReport};
