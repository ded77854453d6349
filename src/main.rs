//! Beamscope entrypoint: microphone capture with a live energy strip and a
//! smoothed beam angle readout.
//!
//! Three threads cooperate. The cpal callback feeds PCM chunks to the
//! capture thread, which copies them into the WAV container while metering
//! energy as a side effect of every read. The beam tracker polls a direction
//! source and publishes updates on its own cadence. The main thread renders
//! those updates until capture ends.

use anyhow::{bail, Context, Result};
use beamscope::audio::{EnergyLevels, MicSource};
use beamscope::beam::{start_beam_tracker, BeamUpdate, FixedDirection};
use beamscope::capture::{CaptureSession, CaptureStats};
use beamscope::config::AppConfig;
use beamscope::telemetry;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cells in the rendered energy strip.
const STATUS_BAR_WIDTH: usize = 60;

/// How long the render loop waits for an update before re-checking capture.
const RENDER_WAIT_MS: u64 = 200;

const WAVEFORM_CHARS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    telemetry::init_tracing(&config);

    if config.list_input_devices {
        return list_input_devices();
    }

    run_capture(config)
}

fn list_input_devices() -> Result<()> {
    // Support BEAMSCOPE_TEST_DEVICES for testing
    let devices = if let Ok(raw) = std::env::var("BEAMSCOPE_TEST_DEVICES") {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        }
    } else {
        MicSource::list_devices().unwrap_or_else(|err| {
            eprintln!("Failed to list audio input devices: {err}");
            Vec::new()
        })
    };

    if devices.is_empty() {
        println!("No audio input devices detected.");
    } else {
        println!("Available audio input devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}

fn run_capture(config: AppConfig) -> Result<()> {
    let pipeline = config.pipeline_config();
    let limit = Duration::from_secs(config.seconds);
    let mic = MicSource::new(config.input_device.as_deref())?;
    let device_name = mic.device_name();
    let sink = File::create(&config.output)
        .with_context(|| format!("failed to create '{}'", config.output.display()))?;

    if !config.json {
        println!(
            "Recording {}s from '{}' to {}",
            config.seconds,
            device_name,
            config.output.display()
        );
    }

    // cpal streams are not Send, so the stream and the session both live on
    // the capture thread; only the energy handle crosses back over a channel.
    let (ready_tx, ready_rx) = bounded::<EnergyLevels>(1);
    let channel_capacity = pipeline.channel_capacity;
    let session_pipeline = pipeline.clone();
    let capture = thread::spawn(move || -> Result<(CaptureStats, File)> {
        let stream = mic.start(channel_capacity)?;
        let session = CaptureSession::new(stream, sink, &session_pipeline)?;
        let _ = ready_tx.send(session.levels());
        session.run(Some(limit))
    });

    let levels = match ready_rx.recv() {
        Ok(levels) => levels,
        // The capture thread failed before publishing; surface its error.
        Err(_) => return finish_capture(capture).map(|_| ()),
    };

    let tracker = start_beam_tracker(FixedDirection::new(0.0, 0.0), levels, &pipeline);
    render_loop(
        &capture,
        &tracker.receiver,
        config.json,
        pipeline.energy_clamp_max,
    );
    tracker.join();

    let (stats, _sink) = finish_capture(capture)?;
    if config.json {
        if let Ok(line) = serde_json::to_string(&stats) {
            println!("{line}");
        }
    } else {
        println!();
        println!("{}", format_summary(&stats, &config.output));
    }
    Ok(())
}

fn finish_capture(
    handle: JoinHandle<Result<(CaptureStats, File)>>,
) -> Result<(CaptureStats, File)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => bail!("capture thread panicked"),
    }
}

/// Drain tracker updates until the capture thread finishes.
fn render_loop(
    capture: &JoinHandle<Result<(CaptureStats, File)>>,
    updates: &Receiver<BeamUpdate>,
    json: bool,
    clamp_max: f64,
) {
    while !capture.is_finished() {
        match updates.recv_timeout(Duration::from_millis(RENDER_WAIT_MS)) {
            Ok(update) => {
                if json {
                    if let Ok(line) = serde_json::to_string(&update) {
                        println!("{line}");
                    }
                } else {
                    print!("\r{}", format_status(&update, STATUS_BAR_WIDTH, clamp_max));
                    let _ = io::stdout().flush();
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Render the energy ring as a fixed-width waveform strip.
///
/// The ring is wider than the terminal, so slots are bucketed and each cell
/// shows its bucket's peak.
fn format_energy_bar(energy: &[f64], width: usize, clamp_max: f64) -> String {
    if energy.is_empty() {
        return " ".repeat(width);
    }
    let mut bar = String::with_capacity(width * 3);
    for cell in 0..width {
        let start = cell * energy.len() / width;
        let end = ((cell + 1) * energy.len() / width)
            .max(start + 1)
            .min(energy.len());
        let peak = energy[start..end].iter().copied().fold(0.0, f64::max);
        let normalized = (peak / clamp_max).clamp(0.0, 1.0);
        let idx = (normalized * (WAVEFORM_CHARS.len() - 1) as f64) as usize;
        bar.push(WAVEFORM_CHARS[idx]);
    }
    bar
}

fn format_status(update: &BeamUpdate, bar_width: usize, clamp_max: f64) -> String {
    format!(
        "angle {:>8.3}°  conf {:.3}  {}",
        update.angle_deg,
        update.confidence,
        format_energy_bar(&update.energy, bar_width, clamp_max)
    )
}

fn format_summary(stats: &CaptureStats, output: &Path) -> String {
    format!(
        "Wrote {} ({} bytes in {} reads, stopped: {})",
        output.display(),
        stats.bytes_captured,
        stats.reads,
        stats.stop_cause.label()
    )
}
