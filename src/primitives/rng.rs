//! Cryptographically secure randomness and uniform big-integer sampling.

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::{CryptoRng, CryptoRngCore, OsRng, RngCore};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Upper bound on rejection-sampling rounds before the source is considered broken.
///
/// Each round succeeds with probability at least 1/2, so a healthy source never
/// gets close.
const MAX_REJECTION_ROUNDS: usize = 256;

/// Cryptographically secure random number generator.
///
/// This is a thin wrapper around `OsRng` that provides a consistent interface
/// for cryptographic randomness throughout the library.
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Creates a new cryptographically secure random number generator.
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

/// Samples a uniform integer in `[0, 2^bits)`.
///
/// Uses the fallible `try_fill_bytes` so an unavailable entropy source surfaces as
/// [`Error::Randomness`] instead of a panic.
pub fn random_bits<R: CryptoRngCore + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if bits == 0 {
        return Ok(BigUint::zero());
    }

    let byte_len = usize::try_from(bits.div_ceil(8))
        .map_err(|_| Error::InvalidParams(format!("Bit length {bits} is too large")))?;
    let mut buf = Zeroizing::new(vec![0u8; byte_len]);
    rng.try_fill_bytes(&mut buf)
        .map_err(|e| Error::Randomness(e.to_string()))?;

    let excess = (byte_len as u64) * 8 - bits;
    buf[0] &= 0xFF >> excess;

    Ok(BigUint::from_bytes_be(&buf))
}

/// Samples a uniform integer in `[0, bound)` by rejection sampling.
pub fn random_below<R: CryptoRngCore + ?Sized>(rng: &mut R, bound: &BigUint) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(Error::InvalidParams(
            "Sampling bound must be non-zero".to_string(),
        ));
    }

    let bits = bound.bits();
    for _ in 0..MAX_REJECTION_ROUNDS {
        let candidate = random_bits(rng, bits)?;
        if &candidate < bound {
            return Ok(candidate);
        }
    }

    Err(Error::Randomness(
        "Rejection sampling did not converge".to_string(),
    ))
}

/// Samples a uniform integer in `[low, high)`.
pub fn random_range<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint> {
    if low >= high {
        return Err(Error::InvalidParams(format!(
            "Empty sampling range [{low}, {high})"
        )));
    }

    Ok(low + random_below(rng, &(high - low))?)
}
