//! Cryptographically secure randomness with unbiased integer sampling.
//!
//! Game outcomes move real money, so production draws come from the
//! operating system CSPRNG. The byte source is a trait so the settlement
//! engine can be driven by a deterministic stream in tests and replays.

use crate::errors::RngError;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

/// Source of random bytes.
///
/// Implementations must be safe to call from concurrent tasks; each call is
/// independent and carries no game state.
pub trait ByteSource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RngError>;
}

/// Operating-system CSPRNG. The only source suitable for real play.
pub struct OsByteSource;

impl ByteSource for OsByteSource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RngError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| RngError::SourceFailure(e.to_string()))
    }
}

/// Replays a fixed byte stream, then fails.
///
/// Used to force specific outcomes in tests and to prove that settlement is
/// a pure function of the byte stream and the request.
pub struct ScriptedByteSource {
    stream: Vec<u8>,
    cursor: Mutex<usize>,
}

impl ScriptedByteSource {
    pub fn new(stream: Vec<u8>) -> Self {
        Self {
            stream,
            cursor: Mutex::new(0),
        }
    }
}

impl ByteSource for ScriptedByteSource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RngError> {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        let end = *cursor + dest.len();
        if end > self.stream.len() {
            return Err(RngError::StreamExhausted { consumed: *cursor });
        }
        dest.copy_from_slice(&self.stream[*cursor..end]);
        *cursor = end;
        Ok(())
    }
}

/// Deterministic SHA-256 counter stream over a secret seed.
///
/// Unlimited output for statistical tests, with a publishable commitment
/// (hash of the seed) so a recorded round can later be audited against the
/// seed that produced it.
pub struct SeededByteSource {
    seed: [u8; 32],
    state: Mutex<SeededState>,
}

struct SeededState {
    counter: u64,
    buffer: Vec<u8>,
}

impl SeededByteSource {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            state: Mutex::new(SeededState {
                counter: 0,
                buffer: Vec::new(),
            }),
        }
    }

    /// Hex-encoded SHA-256 of the seed. Publish this before play; reveal the
    /// seed afterwards to let anyone verify the draws.
    pub fn commitment(&self) -> String {
        hex::encode(Sha256::digest(self.seed))
    }
}

impl ByteSource for SeededByteSource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RngError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        while state.buffer.len() < dest.len() {
            let mut hasher = Sha256::new();
            hasher.update(self.seed);
            hasher.update(state.counter.to_le_bytes());
            state.counter += 1;
            let block = hasher.finalize();
            state.buffer.extend_from_slice(&block);
        }
        let rest = state.buffer.split_off(dest.len());
        dest.copy_from_slice(&state.buffer);
        state.buffer = rest;
        Ok(())
    }
}

/// Unbiased integer and float sampling over a [`ByteSource`].
#[derive(Clone)]
pub struct SecureRng {
    source: Arc<dyn ByteSource>,
}

impl SecureRng {
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self { source }
    }

    /// RNG backed by the operating-system CSPRNG.
    pub fn from_os() -> Self {
        Self::new(Arc::new(OsByteSource))
    }

    /// Uniform integer in `[min, max]` inclusive.
    ///
    /// Draws the minimal number of bytes `k` with `256^k >= range` and
    /// rejection-samples: values at or above `floor(256^k / range) * range`
    /// are discarded and redrawn, which removes the modulo bias a bare
    /// `v % range` would introduce. The expected number of redraws is below
    /// one for every range.
    pub fn random_int(&self, min: u64, max: u64) -> Result<u64, RngError> {
        assert!(min <= max, "random_int called with min > max");
        let range = (max - min) as u128 + 1;
        if range == 1 {
            return Ok(min);
        }

        let bits = 128 - (range - 1).leading_zeros();
        let k = ((bits + 7) / 8) as usize;
        let span = 1u128 << (8 * k);
        let threshold = (span / range) * range;

        loop {
            let mut bytes = [0u8; 8];
            self.source.fill_bytes(&mut bytes[..k])?;
            let mut value = 0u128;
            for byte in &bytes[..k] {
                value = (value << 8) | *byte as u128;
            }
            if value < threshold {
                return Ok(min + (value % range) as u64);
            }
        }
    }

    /// Uniform float in `[0, 1)` with full 53-bit precision.
    pub fn random_float(&self) -> Result<f64, RngError> {
        let mut bytes = [0u8; 8];
        self.source.fill_bytes(&mut bytes)?;
        let value = u64::from_be_bytes(bytes) >> 11;
        Ok(value as f64 / (1u64 << 53) as f64)
    }
}
