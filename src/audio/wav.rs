//! Streaming WAV container writer for the capture pipeline's PCM contract.
//!
//! The header goes out immediately with placeholder size fields so the sink
//! only ever sees sequential writes while audio is flowing; `finalize` seeks
//! back and patches the RIFF and data sizes once the payload length is known.

use std::io::{self, Seek, SeekFrom, Write};

use super::{BITS_PER_SAMPLE, BLOCK_ALIGN, BYTES_PER_SECOND, CHANNELS, SAMPLE_RATE};

/// Total container preamble: 20-byte RIFF region, 18-byte WAVEFORMATEX
/// block, 8-byte data chunk header.
pub const HEADER_LEN: u32 = 46;

const FMT_CHUNK_LEN: u32 = 18;
const FORMAT_TAG_PCM: u16 = 1;
const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 42;
/// Largest payload the 32-bit RIFF size field can still describe once the
/// header overhead is added in.
const MAX_DATA_LEN: u32 = u32::MAX - (HEADER_LEN - 8);

/// WAV writer for 16 kHz mono 16-bit PCM.
///
/// Works against any seekable sink and tolerates starting at a non-zero
/// position; all patch offsets are relative to where the header was written.
pub struct WavWriter<W: Write + Seek> {
    sink: W,
    base: u64,
    data_len: u32,
}

impl<W: Write + Seek> WavWriter<W> {
    /// Write the placeholder header and leave the sink positioned for payload.
    pub fn new(mut sink: W) -> io::Result<Self> {
        let base = sink.stream_position()?;
        sink.write_all(&placeholder_header())?;
        Ok(Self {
            sink,
            base,
            data_len: 0,
        })
    }

    /// Payload bytes appended so far.
    pub fn data_len(&self) -> u32 {
        self.data_len
    }

    /// Append raw PCM payload bytes.
    ///
    /// Fails with `InvalidInput`, without touching the sink, if the payload
    /// would overflow the 32-bit RIFF size field.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        let next = u32::try_from(bytes.len())
            .ok()
            .and_then(|len| self.data_len.checked_add(len))
            .filter(|&len| len <= MAX_DATA_LEN)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "wav payload exceeds the 32-bit riff size field",
                )
            })?;
        self.sink.write_all(bytes)?;
        self.data_len = next;
        Ok(())
    }

    /// Patch the size fields, flush, and hand the sink back.
    ///
    /// The sink is left positioned at the end of the container.
    pub fn finalize(mut self) -> io::Result<W> {
        self.sink
            .seek(SeekFrom::Start(self.base + RIFF_SIZE_OFFSET))?;
        self.sink
            .write_all(&(self.data_len + (HEADER_LEN - 8)).to_le_bytes())?;
        self.sink
            .seek(SeekFrom::Start(self.base + DATA_SIZE_OFFSET))?;
        self.sink.write_all(&self.data_len.to_le_bytes())?;
        self.sink.seek(SeekFrom::Start(
            self.base + u64::from(HEADER_LEN) + u64::from(self.data_len),
        ))?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    #[cfg(test)]
    pub(super) fn set_data_len_for_tests(&mut self, len: u32) {
        self.data_len = len;
    }
}

/// The 46-byte header with both size fields still at their placeholder
/// values: 38 for the RIFF size (header overhead only), 0 for the data size.
fn placeholder_header() -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&(HEADER_LEN - 8).to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    header.extend_from_slice(&FORMAT_TAG_PCM.to_le_bytes());
    header.extend_from_slice(&CHANNELS.to_le_bytes());
    header.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    header.extend_from_slice(&BYTES_PER_SECOND.to_le_bytes());
    header.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    header.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header.extend_from_slice(&0u16.to_le_bytes()); // cbSize, no format extension
    header.extend_from_slice(b"data");
    header.extend_from_slice(&0u32.to_le_bytes());
    header
}
