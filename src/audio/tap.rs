use std::io::{self, Read};

use super::energy::{EnergyConfig, EnergyLevels};

/// `Read` adapter that measures signal energy as PCM bytes stream through.
///
/// Wraps any source of 16-bit little-endian mono PCM. Every read goes to the
/// inner source first; whatever arrived is folded into the shared
/// [`EnergyLevels`] ring before the call returns, so the byte stream the
/// caller sees is untouched. Errors and EOF pass straight through.
pub struct EnergyTap<R> {
    inner: R,
    levels: EnergyLevels,
}

impl<R> EnergyTap<R> {
    pub fn new(inner: R, config: &EnergyConfig) -> Self {
        Self {
            inner,
            levels: EnergyLevels::new(config),
        }
    }

    /// Shared handle for threads that want to render the energy history.
    pub fn levels(&self) -> EnergyLevels {
        self.levels.clone()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for EnergyTap<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.levels.ingest(&buf[..n]);
        Ok(n)
    }
}
