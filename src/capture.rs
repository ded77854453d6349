//! Capture session: pump PCM from a source through the energy tap into a
//! WAV container, with stop-flag and duration-limit control.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{Read, Seek, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::audio::{EnergyConfig, EnergyLevels, EnergyTap, WavWriter};
use crate::config::PipelineConfig;

const READ_CHUNK: usize = 4096;

/// Why a capture run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCause {
    /// The source reported end of stream.
    SourceEof,
    /// The stop flag was raised.
    ManualStop,
    /// The duration limit elapsed.
    MaxDuration,
}

impl StopCause {
    pub fn label(&self) -> &'static str {
        match self {
            StopCause::SourceEof => "source_eof",
            StopCause::ManualStop => "manual_stop",
            StopCause::MaxDuration => "max_duration",
        }
    }
}

/// Counters describing one finished capture run.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureStats {
    pub bytes_captured: u64,
    pub reads: u64,
    pub stop_cause: StopCause,
}

/// Pulls PCM from a source, feeds the energy ring as a side effect of every
/// read, and streams the bytes into a WAV container on the sink.
pub struct CaptureSession<R, W: Write + Seek> {
    tap: EnergyTap<R>,
    wav: WavWriter<W>,
    stop_flag: Arc<AtomicBool>,
}

impl<R: Read, W: Write + Seek> CaptureSession<R, W> {
    /// Writes the placeholder WAV header to the sink immediately.
    pub fn new(source: R, sink: W, config: &PipelineConfig) -> Result<Self> {
        let wav = WavWriter::new(sink).context("failed to write wav header")?;
        Ok(Self {
            tap: EnergyTap::new(source, &EnergyConfig::from(config)),
            wav,
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared handle to the live energy ring.
    pub fn levels(&self) -> EnergyLevels {
        self.tap.levels()
    }

    /// Flag that makes `run` stop before its next read.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Copy audio until EOF, the stop flag, or the optional duration limit.
    ///
    /// On success the sink comes back holding a complete WAV container with
    /// patched size fields. On error the sink is abandoned mid-container,
    /// still carrying the placeholder sizes.
    pub fn run(mut self, limit: Option<Duration>) -> Result<(CaptureStats, W)> {
        let started = Instant::now();
        let mut buf = [0u8; READ_CHUNK];
        let mut bytes_captured = 0u64;
        let mut reads = 0u64;

        let stop_cause = loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                break StopCause::ManualStop;
            }
            if let Some(limit) = limit {
                if started.elapsed() >= limit {
                    break StopCause::MaxDuration;
                }
            }
            let n = self
                .tap
                .read(&mut buf)
                .context("audio source read failed")?;
            if n == 0 {
                break StopCause::SourceEof;
            }
            reads += 1;
            self.wav.append(&buf[..n]).context("wav append failed")?;
            bytes_captured += n as u64;
        };

        let sink = self.wav.finalize().context("wav finalize failed")?;
        let stats = CaptureStats {
            bytes_captured,
            reads,
            stop_cause,
        };
        debug!(
            bytes = stats.bytes_captured,
            reads = stats.reads,
            stop_cause = stats.stop_cause.label(),
            "capture finished"
        );
        Ok((stats, sink))
    }
}
