//! Error and diagnostic types for wave synthesis.

use std::path::PathBuf;

/// Fatal synthesis errors (precondition violations and rejected overflow)
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("wavelength at component {index} must be finite and > 0, got {wavelength}")]
    InvalidWavelength { index: usize, wavelength: f32 },

    #[error("wavelengths must ascend, component {index} is shorter than its predecessor")]
    UnsortedWavelengths { index: usize },

    #[error("component arrays disagree in length: {what} has {found} entries, expected {expected}")]
    ArrayLengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{requested} wave components requested, at most {max} are supported")]
    TooManyComponents { requested: usize, max: usize },

    #[error("packed wave buffer overflowed, {dropped} components dropped")]
    CapacityExceeded { dropped: usize },

    #[error("failed to read spectrum {path:?}: {source}")]
    SpectrumIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse spectrum {path:?}: {source}")]
    SpectrumParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Non-fatal configuration diagnostics. Synthesis continues and produces no waves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthWarning {
    #[error("no spectrum assigned, no waves will be generated")]
    MissingSpectrum,

    #[error("components per octave is 0, no waves will be generated")]
    ZeroComponentsPerOctave,

    #[error("spectrum '{name}' is out of date: expected {expected} octaves, found {found}")]
    OutdatedSpectrum {
        name: String,
        expected: usize,
        found: usize,
    },
}
