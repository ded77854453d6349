//! Beam direction tracking with confidence-gated angle smoothing.
//!
//! A dedicated thread polls a [`DirectionSource`] on a fixed cadence, folds
//! each reading into an exponential smoother, and publishes the smoothed
//! angle together with an energy snapshot over a bounded channel.

use crossbeam_channel::{bounded, Receiver, TrySendError};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

use crate::audio::EnergyLevels;
use crate::config::PipelineConfig;

/// One observation from a direction estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionReading {
    /// Estimated arrival angle in degrees.
    pub angle_deg: f64,
    /// Estimator confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Source of direction estimates, polled from the tracker thread.
///
/// `sample` should return quickly; the tracker calls it once per tick and
/// sleeps in between. Implementations backed by fallible hardware should
/// absorb failures and report zero confidence instead of blocking or
/// panicking.
pub trait DirectionSource: Send {
    fn sample(&mut self) -> DirectionReading;
}

/// Trivial source that reports the same reading forever.
pub struct FixedDirection {
    reading: DirectionReading,
}

impl FixedDirection {
    pub fn new(angle_deg: f64, confidence: f64) -> Self {
        Self {
            reading: DirectionReading {
                angle_deg,
                confidence,
            },
        }
    }
}

impl DirectionSource for FixedDirection {
    fn sample(&mut self) -> DirectionReading {
        self.reading
    }
}

/// Exponential smoother for the beam angle.
///
/// Readings at or below the confidence gate leave the angle untouched. Above
/// the gate the step size scales with confidence, so strong estimates pull
/// the angle harder than marginal ones.
#[derive(Debug, Clone)]
pub struct BeamSmoother {
    angle_deg: f64,
    smoothing: f64,
    confidence_gate: f64,
}

impl BeamSmoother {
    pub fn new(smoothing: f64, confidence_gate: f64) -> Self {
        Self {
            angle_deg: 0.0,
            smoothing,
            confidence_gate,
        }
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Fold one reading in. Returns true when the angle moved.
    pub fn observe(&mut self, reading: DirectionReading) -> bool {
        if reading.confidence <= self.confidence_gate {
            return false;
        }
        let step = self.smoothing * reading.confidence;
        self.angle_deg = (1.0 - step) * self.angle_deg + step * reading.angle_deg;
        true
    }
}

/// Snapshot published on every tracker tick.
#[derive(Debug, Clone, Serialize)]
pub struct BeamUpdate {
    /// Tick counter, strictly increasing from zero.
    pub seq: u64,
    /// Smoothed beam angle in degrees.
    pub angle_deg: f64,
    /// Confidence of the reading taken this tick.
    pub confidence: f64,
    /// Oldest-first copy of the energy ring.
    pub energy: Vec<f64>,
}

/// Handle to the tracker thread.
///
/// `receiver` yields one [`BeamUpdate`] per tick. Dropping the handle
/// signals the thread and joins it.
pub struct BeamTracker {
    pub receiver: Receiver<BeamUpdate>,
    handle: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
}

impl BeamTracker {
    /// Ask the tracker thread to exit after its current tick.
    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stop the thread and wait for it to finish.
    pub fn join(mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BeamTracker {
    fn drop(&mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the polling thread that drives smoothing and publishes updates.
///
/// A full channel drops the update rather than disturbing the tick cadence;
/// a disconnected receiver is treated the same way so the thread keeps
/// smoothing until it is told to stop.
pub fn start_beam_tracker<S>(
    mut source: S,
    levels: EnergyLevels,
    config: &PipelineConfig,
) -> BeamTracker
where
    S: DirectionSource + 'static,
{
    let (sender, receiver) = bounded(config.channel_capacity.max(1));
    let stop_flag = Arc::new(AtomicBool::new(false));
    let thread_flag = stop_flag.clone();
    let smoothing = config.angle_smoothing;
    let confidence_gate = config.confidence_threshold;
    let interval = Duration::from_millis(config.poll_interval_ms.max(1));

    let handle = thread::spawn(move || {
        let mut smoother = BeamSmoother::new(smoothing, confidence_gate);
        let mut energy = Vec::with_capacity(levels.width());
        let mut seq = 0u64;
        let mut published = 0u64;
        let mut dropped = 0u64;
        let mut angle_updates = 0u64;

        while !thread_flag.load(Ordering::Relaxed) {
            let reading = source.sample();
            if smoother.observe(reading) {
                angle_updates += 1;
            }
            levels.snapshot_into(&mut energy);
            let update = BeamUpdate {
                seq,
                angle_deg: smoother.angle_deg(),
                confidence: reading.confidence,
                energy: energy.clone(),
            };
            seq += 1;
            match sender.try_send(update) {
                Ok(()) => published += 1,
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => dropped += 1,
            }
            thread::sleep(interval);
        }

        debug!(
            ticks = seq,
            published, dropped, angle_updates, "beam tracker stopped"
        );
    });

    BeamTracker {
        receiver,
        handle: Some(handle),
        stop_flag,
    }
}
