//! Audio capture, energy metering, and WAV output.
//!
//! The pipeline contract everywhere in this module is 16 kHz mono 16-bit
//! little-endian PCM. The microphone layer converts whatever the hardware
//! delivers into that shape; everything downstream assumes it.

/// Contract sample rate.
pub const SAMPLE_RATE: u32 = 16_000;

/// Contract channel count.
pub const CHANNELS: u16 = 1;

/// Contract bit depth.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Bytes per sample frame (mono 16-bit).
pub const BLOCK_ALIGN: u16 = 2;

/// Contract byte rate.
pub const BYTES_PER_SECOND: u32 = 32_000;

mod energy;
mod mic;
mod tap;
mod wav;

pub use energy::{EnergyConfig, EnergyLevels, EnergyRing};
pub use mic::{MicSource, MicStream};
pub use tap::EnergyTap;
pub use wav::{WavWriter, HEADER_LEN};
