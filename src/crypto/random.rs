//! Cryptographically secure random bytes.
//!
//! `RandomSource` wraps a ChaCha-based `StdRng` behind its own mutex.  The
//! generator is seeded from the OS entropy source and reseeded after
//! `RESEED_INTERVAL` bytes.  If the OS source ever fails the error is
//! surfaced as `Fatal`; there is no fallback generator.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, error};

use crate::errors::{Result, VaultError};

/// Bytes produced before an OS-seeded generator is reseeded (1 MiB).
const RESEED_INTERVAL: u64 = 1 << 20;

/// Produces a freshly seeded generator.
type Reseed = fn() -> Result<StdRng>;

struct RngState {
    rng: StdRng,
    /// Bytes produced since the last (re)seed.
    produced: u64,
    /// `None` for fixed-seed sources, which never reseed.
    reseed: Option<Reseed>,
}

/// Shared CSPRNG.  Safe to use from many threads at once.
pub struct RandomSource {
    state: Mutex<RngState>,
}

impl RandomSource {
    /// Seed a new source from the operating system.
    pub fn from_os() -> Result<Self> {
        let rng = seed_from_os()?;
        debug!("random source seeded from OS entropy");
        Ok(Self {
            state: Mutex::new(RngState {
                rng,
                produced: 0,
                reseed: Some(seed_from_os),
            }),
        })
    }

    /// Deterministic source from a fixed 32-byte seed.
    ///
    /// Only for tests and reproducible tooling: two sources with the same
    /// seed produce the same stream.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            state: Mutex::new(RngState {
                rng: StdRng::from_seed(seed),
                produced: 0,
                reseed: None,
            }),
        }
    }

    /// Fill `buffer` with random bytes.
    pub fn fill(&self, buffer: &mut [u8]) -> Result<()> {
        let mut state = self.state.lock();

        if let Some(reseed) = state.reseed {
            if state.produced >= RESEED_INTERVAL {
                state.rng = reseed()?;
                state.produced = 0;
                debug!("random source reseeded");
            }
        }

        state.rng.fill_bytes(buffer);
        state.produced = state.produced.saturating_add(buffer.len() as u64);
        Ok(())
    }
}

fn seed_from_os() -> Result<StdRng> {
    StdRng::try_from_os_rng().map_err(entropy_unavailable)
}

fn entropy_unavailable(e: impl std::fmt::Display) -> VaultError {
    error!(error = %e, "OS entropy source unavailable");
    VaultError::Fatal(format!("OS entropy source failed: {e}"))
}
