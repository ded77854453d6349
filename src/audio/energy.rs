//! Rolling signal-energy history for waveform-style displays.
//!
//! Incoming 16-bit PCM is reduced to one smoothed energy value per block of
//! samples. The values live in a fixed-width ring so a renderer can redraw
//! the recent history at any time without holding up the capture path.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::PipelineConfig;

/// Fixed-point scale the DSP energy path divides by: half of `i32::MAX`.
const ENERGY_SCALE: f64 = (i32::MAX / 2) as f64;
/// Baseline added to every slot so silence still renders a visible trace.
const ENERGY_FLOOR: f64 = 0.2;
/// Gain applied to the mean square before scaling.
const ENERGY_GAIN: f64 = 11.0;

/// Configuration for the energy ring.
#[derive(Debug, Clone)]
pub struct EnergyConfig {
    pub width: usize,
    pub samples_per_slot: u32,
    pub blend: f64,
    pub clamp_max: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            width: 500,
            samples_per_slot: 10,
            blend: 0.3,
            clamp_max: 10.0,
        }
    }
}

impl From<&PipelineConfig> for EnergyConfig {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            width: cfg.energy_width,
            samples_per_slot: cfg.samples_per_slot,
            blend: cfg.energy_blend,
            clamp_max: cfg.energy_clamp_max,
        }
    }
}

/// Fixed ring of smoothed energy slots plus the partial-block accumulator.
///
/// The cursor always points at the next slot to overwrite, which is also the
/// oldest value in the ring. Each finished slot is blended against its left
/// neighbor; the slot written at cursor zero is stored unblended, including
/// every time the cursor wraps.
#[derive(Debug)]
pub struct EnergyRing {
    slots: Vec<f64>,
    cursor: usize,
    square_sum: f64,
    sample_count: u32,
    samples_per_slot: u32,
    blend: f64,
    clamp_max: f64,
}

impl EnergyRing {
    pub fn new(config: &EnergyConfig) -> Self {
        Self {
            slots: vec![0.0; config.width.max(1)],
            cursor: 0,
            square_sum: 0.0,
            sample_count: 0,
            samples_per_slot: config.samples_per_slot.max(1),
            blend: config.blend,
            clamp_max: config.clamp_max,
        }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Accumulate one sample; completes a slot every `samples_per_slot` calls.
    pub fn push_sample(&mut self, sample: i16) {
        let value = f64::from(sample);
        self.square_sum += value * value;
        self.sample_count += 1;
        if self.sample_count < self.samples_per_slot {
            return;
        }

        let mean_square = self.square_sum / f64::from(self.samples_per_slot);
        let mut level = ENERGY_FLOOR + (mean_square * ENERGY_GAIN) / ENERGY_SCALE;
        if level > self.clamp_max {
            level = self.clamp_max;
        }
        if self.cursor > 0 {
            level = level * self.blend + (1.0 - self.blend) * self.slots[self.cursor - 1];
        }
        self.slots[self.cursor] = level;
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.square_sum = 0.0;
        self.sample_count = 0;
    }

    /// Copy the ring oldest-first into `out`, reusing its allocation.
    pub fn snapshot_into(&self, out: &mut Vec<f64>) {
        out.clear();
        out.extend_from_slice(&self.slots[self.cursor..]);
        out.extend_from_slice(&self.slots[..self.cursor]);
    }
}

/// Cloneable handle to a shared [`EnergyRing`].
///
/// The capture path feeds bytes in through [`EnergyLevels::ingest`]; any
/// number of renderer threads can snapshot concurrently.
#[derive(Clone, Debug)]
pub struct EnergyLevels {
    ring: Arc<Mutex<EnergyRing>>,
    width: usize,
}

impl EnergyLevels {
    pub fn new(config: &EnergyConfig) -> Self {
        let ring = EnergyRing::new(config);
        let width = ring.width();
        Self {
            ring: Arc::new(Mutex::new(ring)),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Fold captured PCM bytes into the ring.
    ///
    /// Bytes are consumed as little-endian i16 pairs. A trailing odd byte
    /// carries no complete sample and is skipped; the partial-block
    /// accumulator still carries across calls, so short reads lose nothing
    /// beyond that byte.
    pub(crate) fn ingest(&self, bytes: &[u8]) {
        if bytes.len() < 2 {
            return;
        }
        let mut ring = self.lock_ring();
        for pair in bytes.chunks_exact(2) {
            ring.push_sample(i16::from_le_bytes([pair[0], pair[1]]));
        }
    }

    pub fn snapshot_into(&self, out: &mut Vec<f64>) {
        self.lock_ring().snapshot_into(out);
    }

    fn lock_ring(&self) -> MutexGuard<'_, EnergyRing> {
        self.ring
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_starts_silent() {
        let ring = EnergyRing::new(&EnergyConfig::default());
        let mut out = Vec::new();
        ring.snapshot_into(&mut out);
        assert_eq!(out.len(), 500);
        assert!(out.iter().all(|&slot| slot == 0.0));
    }

    #[test]
    fn zero_width_is_bumped_to_one() {
        let config = EnergyConfig {
            width: 0,
            ..EnergyConfig::default()
        };
        assert_eq!(EnergyRing::new(&config).width(), 1);
    }

    #[test]
    fn config_maps_from_pipeline() {
        let pipeline = PipelineConfig {
            energy_width: 32,
            samples_per_slot: 4,
            energy_blend: 0.5,
            energy_clamp_max: 8.0,
            ..PipelineConfig::default()
        };
        let config = EnergyConfig::from(&pipeline);
        assert_eq!(config.width, 32);
        assert_eq!(config.samples_per_slot, 4);
        assert_eq!(config.blend, 0.5);
        assert_eq!(config.clamp_max, 8.0);
    }
}
