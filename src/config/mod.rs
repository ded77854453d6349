//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_ANGLE_SMOOTHING, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_ENERGY_BLEND, DEFAULT_ENERGY_CLAMP_MAX, DEFAULT_ENERGY_WIDTH, DEFAULT_OUTPUT_PATH,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_RECORD_SECONDS, DEFAULT_SAMPLES_PER_SLOT,
};

/// CLI options for the beamscope capture tool.
#[derive(Debug, Parser, Clone)]
#[command(about = "Microphone capture with live energy and beam tracking", author, version)]
pub struct AppConfig {
    /// Output WAV file path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Recording duration in seconds
    #[arg(long, default_value_t = DEFAULT_RECORD_SECONDS)]
    pub seconds: u64,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Emit one JSON line per beam update instead of the live status line
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "BEAMSCOPE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "BEAMSCOPE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Slots in the rolling energy history
    #[arg(long = "energy-width", default_value_t = DEFAULT_ENERGY_WIDTH)]
    pub energy_width: usize,

    /// PCM samples folded into one energy slot
    #[arg(long = "samples-per-slot", default_value_t = DEFAULT_SAMPLES_PER_SLOT)]
    pub samples_per_slot: u32,

    /// Weight of the newest slot when blending against its left neighbor
    #[arg(long = "energy-blend", default_value_t = DEFAULT_ENERGY_BLEND)]
    pub energy_blend: f64,

    /// Upper clamp for a single energy slot
    #[arg(long = "energy-clamp", default_value_t = DEFAULT_ENERGY_CLAMP_MAX)]
    pub energy_clamp_max: f64,

    /// Base smoothing factor for beam angle updates
    #[arg(long = "angle-smoothing", default_value_t = DEFAULT_ANGLE_SMOOTHING)]
    pub angle_smoothing: f64,

    /// Ignore direction readings at or below this confidence
    #[arg(
        long = "confidence-threshold",
        default_value_t = DEFAULT_CONFIDENCE_THRESHOLD
    )]
    pub confidence_threshold: f64,

    /// Beam tracker tick interval (milliseconds)
    #[arg(long = "poll-interval-ms", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Capacity of the bounded channels between pipeline threads
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,
}

/// Tunable parameters for the energy ring and beam tracker.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub energy_width: usize,
    pub samples_per_slot: u32,
    pub energy_blend: f64,
    pub energy_clamp_max: f64,
    pub angle_smoothing: f64,
    pub confidence_threshold: f64,
    pub poll_interval_ms: u64,
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            energy_width: DEFAULT_ENERGY_WIDTH,
            samples_per_slot: DEFAULT_SAMPLES_PER_SLOT,
            energy_blend: DEFAULT_ENERGY_BLEND,
            energy_clamp_max: DEFAULT_ENERGY_CLAMP_MAX,
            angle_smoothing: DEFAULT_ANGLE_SMOOTHING,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
