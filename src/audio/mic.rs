//! System microphone capture via CPAL.
//!
//! Handles device enumeration and format conversion. Whatever the hardware
//! delivers is converted to the pipeline contract of 16 kHz mono 16-bit
//! little-endian PCM and exposed as a blocking byte reader.

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::{CHANNELS, SAMPLE_RATE};

/// Audio input device wrapper.
pub struct MicSource {
    device: cpal::Device,
}

impl MicSource {
    /// List microphone names so the CLI can expose a selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Pick a specific device by name, or fall back to the system default.
    pub fn new(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host
                .default_input_device()
                .context("no default input device available")?,
        };
        Ok(Self { device })
    }

    /// Get the name of the active capture device.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Open the capture stream and hand back a blocking byte reader.
    ///
    /// The cpal callback converts each buffer to little-endian i16 bytes and
    /// offers it on a bounded channel. When the reader falls behind, whole
    /// chunks are dropped rather than stalling the audio thread; the drop
    /// count is visible through [`MicStream::dropped_chunks`].
    pub fn start(&self, channel_capacity: usize) -> Result<MicStream> {
        let format = self.contract_sample_format()?;
        let stream_config = StreamConfig {
            channels: CHANNELS,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: BufferSize::Default,
        };
        let (sender, receiver) = bounded::<Vec<u8>>(channel_capacity.max(1));
        let dropped = Arc::new(AtomicUsize::new(0));
        let err_fn = |err| warn!(%err, "audio stream error");

        let stream = match format {
            SampleFormat::I16 => {
                let pump = ChunkPump::new(sender, dropped.clone());
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _| pump.push(data, |sample| sample),
                    err_fn,
                    None,
                )?
            }
            SampleFormat::F32 => {
                let pump = ChunkPump::new(sender, dropped.clone());
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _| {
                        pump.push(data, |sample| {
                            (sample * 32_768.0).clamp(-32_768.0, 32_767.0) as i16
                        })
                    },
                    err_fn,
                    None,
                )?
            }
            SampleFormat::U16 => {
                let pump = ChunkPump::new(sender, dropped.clone());
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _| {
                        pump.push(data, |sample| (i32::from(sample) - 32_768) as i16)
                    },
                    err_fn,
                    None,
                )?
            }
            other => bail!("unsupported sample format: {other:?}"),
        };

        stream.play().context("failed to start audio stream")?;

        Ok(MicStream {
            _stream: stream,
            receiver,
            pending: Vec::new(),
            pos: 0,
            dropped,
        })
    }

    /// Find a sample format the device supports at the contract rate and
    /// channel count. Native i16 wins so no conversion is needed.
    fn contract_sample_format(&self) -> Result<SampleFormat> {
        let supported = self
            .device
            .supported_input_configs()
            .context("failed to query supported input formats")?;
        let mut formats = Vec::new();
        for range in supported {
            if range.channels() != CHANNELS {
                continue;
            }
            if range.min_sample_rate().0 > SAMPLE_RATE || range.max_sample_rate().0 < SAMPLE_RATE {
                continue;
            }
            formats.push(range.sample_format());
        }
        for preferred in [SampleFormat::I16, SampleFormat::F32, SampleFormat::U16] {
            if formats.contains(&preferred) {
                return Ok(preferred);
            }
        }
        bail!(
            "input device '{}' cannot capture 16 kHz mono PCM",
            self.device_name()
        )
    }
}

/// Converts cpal callback buffers to contract bytes and queues them.
struct ChunkPump {
    sender: Sender<Vec<u8>>,
    dropped: Arc<AtomicUsize>,
}

impl ChunkPump {
    fn new(sender: Sender<Vec<u8>>, dropped: Arc<AtomicUsize>) -> Self {
        Self { sender, dropped }
    }

    fn push<T: Copy>(&self, data: &[T], convert: impl Fn(T) -> i16) {
        if data.is_empty() {
            return;
        }
        let mut chunk = Vec::with_capacity(data.len() * 2);
        for &sample in data {
            chunk.extend_from_slice(&convert(sample).to_le_bytes());
        }
        match self.sender.try_send(chunk) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // Reader went away; the stream is about to be dropped too.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Blocking reader over a live microphone stream.
///
/// Owns the cpal stream, so capture stops when the value is dropped. `read`
/// blocks until the next chunk arrives and reports EOF once the stream side
/// has disconnected.
pub struct MicStream {
    _stream: cpal::Stream,
    receiver: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    pos: usize,
    dropped: Arc<AtomicUsize>,
}

impl MicStream {
    /// Number of callback chunks discarded because the reader fell behind.
    pub fn dropped_chunks(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for MicStream {
    fn drop(&mut self) {
        let dropped = self.dropped_chunks();
        if dropped > 0 {
            warn!(chunks = dropped, "capture reader fell behind; chunks dropped");
        }
    }
}

impl Read for MicStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.pending.len() {
            match self.receiver.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
        let n = (self.pending.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
