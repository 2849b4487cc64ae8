//! Factory default values for measurement properties.

/// Sampling frequency in Hz
pub const SAMPLING_RATE: u32 = 44100;

/// Exponent of the FFT length (numSamples = 2^FFT_DEGREE)
pub const FFT_DEGREE: u32 = 18;

/// Signal duration in seconds
pub const TIME_LENGTH: f64 = 10.0;

/// Integration time in seconds (125 ms, "fast" weighting)
pub const INTEGRATION: f64 = 0.125;

/// Lower limit of the frequency band of interest in Hz
pub const MIN_FREQ: u32 = 20;

/// Upper limit of the frequency band of interest in Hz
pub const MAX_FREQ: u32 = 20000;

/// Input and output channels (1-based)
pub const IN_CHANNEL: [u32; 1] = [1];
pub const OUT_CHANNEL: [u32; 1] = [1];

/// Silence left at the beginning of a signal, in seconds
pub const START_MARGIN: f64 = 0.3;

/// Silence left at the end of a signal, in seconds
pub const STOP_MARGIN: f64 = 0.7;

pub const COMMENT: &str = "No comments.";
