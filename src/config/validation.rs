use super::{AppConfig, PipelineConfig};
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before any thread or device is touched.
    pub fn validate(&self) -> Result<()> {
        const MIN_RECORD_SECONDS: u64 = 1;
        const MAX_RECORD_SECONDS: u64 = 60;

        if !(MIN_RECORD_SECONDS..=MAX_RECORD_SECONDS).contains(&self.seconds) {
            bail!(
                "--seconds must be between {MIN_RECORD_SECONDS} and {MAX_RECORD_SECONDS}, got {}",
                self.seconds
            );
        }
        if !(1..=10_000).contains(&self.energy_width) {
            bail!(
                "--energy-width must be between 1 and 10000, got {}",
                self.energy_width
            );
        }
        if !(1..=1_000).contains(&self.samples_per_slot) {
            bail!(
                "--samples-per-slot must be between 1 and 1000, got {}",
                self.samples_per_slot
            );
        }
        if !(0.0..=1.0).contains(&self.energy_blend) {
            bail!(
                "--energy-blend must be between 0.0 and 1.0, got {}",
                self.energy_blend
            );
        }
        if !self.energy_clamp_max.is_finite() || self.energy_clamp_max <= 0.0 {
            bail!(
                "--energy-clamp must be a positive finite value, got {}",
                self.energy_clamp_max
            );
        }
        if !(0.0..=1.0).contains(&self.angle_smoothing) {
            bail!(
                "--angle-smoothing must be between 0.0 and 1.0, got {}",
                self.angle_smoothing
            );
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!(
                "--confidence-threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            );
        }
        if !(1..=1_000).contains(&self.poll_interval_ms) {
            bail!(
                "--poll-interval-ms must be between 1 and 1000, got {}",
                self.poll_interval_ms
            );
        }
        if !(8..=1024).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between 8 and 1024, got {}",
                self.channel_capacity
            );
        }

        Ok(())
    }

    /// Snapshot the CLI-controlled pipeline settings for downstream consumers.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            energy_width: self.energy_width,
            samples_per_slot: self.samples_per_slot,
            energy_blend: self.energy_blend,
            energy_clamp_max: self.energy_clamp_max,
            angle_smoothing: self.angle_smoothing,
            confidence_threshold: self.confidence_threshold,
            poll_interval_ms: self.poll_interval_ms,
            channel_capacity: self.channel_capacity,
        }
    }
}
