//! Bounded, cancellable prime search. Primality tests come from `num-prime`.

use num_bigint::BigUint;
use num_prime::nt_funcs::{is_prime, is_safe_prime};
use num_prime::PrimalityTestConfig;
use num_traits::One;
use rand_core::CryptoRngCore;

use super::cancel::Cancellation;
use super::rng::random_bits;
use crate::{Error, Result};

/// Random-base Miller-Rabin rounds used for validation: false-positive probability <= 2^-40.
pub const VALIDATION_ROUNDS: u32 = 20;

/// Candidates sampled per bit of the target length before a search gives up.
///
/// The expected number of odd candidates is about `0.35 * bits`.
const CANDIDATES_PER_BIT: u64 = 64;

/// Baillie-PSW plus at least [`VALIDATION_ROUNDS`] random-base Miller-Rabin rounds.
///
/// Values below 2^64 are decided deterministically by `num-prime`.
fn test_config(rounds: u32) -> PrimalityTestConfig {
    let mut config = PrimalityTestConfig::bpsw();
    config.sprp_random_trials = rounds.max(VALIDATION_ROUNDS) as usize;
    config
}

/// Returns `true` if `n` passes Baillie-PSW and `rounds` random-base Miller-Rabin
/// rounds. Fewer than [`VALIDATION_ROUNDS`] rounds are never used.
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    is_prime(n, Some(test_config(rounds))).probably()
}

/// Returns `true` if `p` and `(p - 1) / 2` are both prime.
///
/// Cheaper than two [`is_probable_prime`] calls; used to discard safe-prime
/// candidates before the full test.
pub fn is_probable_safe_prime(p: &BigUint) -> bool {
    is_safe_prime(p).probably()
}

/// Upper bound on candidates for a search over `bits`-bit numbers.
pub(crate) fn candidate_budget(bits: u64) -> u64 {
    bits.saturating_mul(CANDIDATES_PER_BIT)
}

/// Samples a random odd `bits`-bit integer with the top bit set.
pub(crate) fn random_odd_with_top_bit<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bits: u64,
) -> Result<BigUint> {
    let mut candidate = random_bits(rng, bits)?;
    candidate |= BigUint::one() << (bits - 1);
    candidate |= BigUint::one();
    Ok(candidate)
}

/// Searches for a random prime with exactly `bits` bits.
///
/// Candidates come from `rng`, so a seeded generator reproduces the result. Checks
/// `cancel` before every candidate and fails with [`Error::Generation`] once the
/// candidate budget is spent.
pub fn random_prime<R: CryptoRngCore + ?Sized>(
    bits: u64,
    rounds: u32,
    rng: &mut R,
    cancel: &Cancellation,
) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::InvalidParams(format!(
            "Cannot search for a {bits}-bit prime"
        )));
    }

    for _ in 0..candidate_budget(bits) {
        cancel.check()?;

        let candidate = random_odd_with_top_bit(rng, bits)?;
        if is_probable_prime(&candidate, rounds) {
            return Ok(candidate);
        }
    }

    Err(Error::Generation(format!(
        "No {bits}-bit prime found within the candidate budget"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::rng::tests::FailingRng;
    use crate::SecureRng;

    fn prime(n: u64) -> bool {
        is_probable_prime(&BigUint::from(n), VALIDATION_ROUNDS)
    }

    #[test]
    fn small_values() {
        assert!(!prime(0));
        assert!(!prime(1));
        assert!(prime(2));
        assert!(prime(3));
        assert!(!prime(4));
        assert!(prime(251));
        assert!(prime(257));
        assert!(!prime(259));
    }

    #[test]
    fn known_primes_and_composites() {
        assert!(prime(2741));
        assert!(prime(1_000_000_007));
        assert!(prime(18_446_744_073_709_551_557));
        assert!(!prime(1_000_000_007 * 3));
        assert!(!prime(65_537 * 65_539));
    }

    #[test]
    fn carmichael_numbers_are_rejected() {
        for n in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 41_041, 825_265] {
            assert!(!prime(n), "{n} is a Carmichael number");
        }
    }

    #[test]
    fn large_values_use_the_probabilistic_path() {
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&m127, VALIDATION_ROUNDS));

        let m128 = (BigUint::one() << 128u32) - 1u32;
        assert!(!is_probable_prime(&m128, VALIDATION_ROUNDS));

        // Product of two 64-bit primes
        let semiprime = BigUint::from(18_446_744_073_709_551_557u64)
            * BigUint::from(18_446_744_073_709_551_533u64);
        assert!(!is_probable_prime(&semiprime, VALIDATION_ROUNDS));
    }

    #[test]
    fn safe_prime_check() {
        // 23 = 2 * 11 + 1, 2^127 - 1 has composite (p - 1) / 2
        assert!(is_probable_safe_prime(&BigUint::from(23u32)));
        assert!(!is_probable_safe_prime(&BigUint::from(29u32)));
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(!is_probable_safe_prime(&m127));
    }

    #[test]
    fn random_prime_has_requested_length() {
        let mut rng = SecureRng::new();
        let cancel = Cancellation::new();
        for bits in [16u64, 64, 128] {
            let p = random_prime(bits, VALIDATION_ROUNDS, &mut rng, &cancel).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&p, VALIDATION_ROUNDS));
        }
    }

    #[test]
    fn random_prime_honours_cancellation() {
        let mut rng = SecureRng::new();
        let cancel = Cancellation::new();
        cancel.cancel();
        assert!(matches!(
            random_prime(256, VALIDATION_ROUNDS, &mut rng, &cancel),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn random_prime_surfaces_rng_failure() {
        let cancel = Cancellation::new();
        assert!(matches!(
            random_prime(64, VALIDATION_ROUNDS, &mut FailingRng, &cancel),
            Err(Error::Randomness(_))
        ));
    }
}
