//! Default values shared by the CLI flags and the pipeline configuration.

/// Default output path for the captured WAV file.
pub const DEFAULT_OUTPUT_PATH: &str = "beamscope.wav";

/// Default recording duration in seconds.
pub const DEFAULT_RECORD_SECONDS: u64 = 5;

/// Slots in the rolling energy history.
pub const DEFAULT_ENERGY_WIDTH: usize = 500;

/// PCM samples folded into one energy slot.
pub const DEFAULT_SAMPLES_PER_SLOT: u32 = 10;

/// Weight of the newest slot when blending against its left neighbor.
pub const DEFAULT_ENERGY_BLEND: f64 = 0.3;

/// Upper clamp for a single energy slot.
pub const DEFAULT_ENERGY_CLAMP_MAX: f64 = 10.0;

/// Base smoothing factor for beam angle updates.
pub const DEFAULT_ANGLE_SMOOTHING: f64 = 0.35;

/// Direction readings at or below this confidence are ignored.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Beam tracker tick interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Capacity of the bounded channels between pipeline threads.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
