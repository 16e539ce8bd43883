use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::DomainParameters;
use crate::config::ProtocolConfig;
use crate::primitives::primality::{
    candidate_budget, is_probable_prime, is_probable_safe_prime, random_odd_with_top_bit,
    random_prime, VALIDATION_ROUNDS,
};
use crate::primitives::rng::random_range;
use crate::primitives::Cancellation;
use crate::{Error, Result};

/// Smallest modulus the generator accepts.
pub const MIN_BITS: u64 = 64;

/// Smallest modulus considered secure.
pub const SECURE_BITS: u64 = 2048;

/// Default cap on regeneration after a validation failure.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Draws of `h` before generator construction gives up.
const MAX_GENERATOR_DRAWS: usize = 256;

/// How `q` is derived together with `p`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Safe prime `p = 2q + 1`. Slow for large moduli.
    SafePrime,
    /// Schnorr group `p = m * q + 1` with a smaller prime `q`.
    #[default]
    Schnorr,
}

/// Subgroup size used for Schnorr groups when none is configured.
pub fn default_subgroup_bits(bits: u64) -> u64 {
    match bits {
        b if b >= 2048 => 256,
        b if b >= 1024 => 160,
        b => (b / 4).max(32),
    }
}

/// Generator of validated [`DomainParameters`].
///
/// # Examples
///
/// ```rust
/// use zk13::{GroupKind, ParameterGenerator, SecureRng};
///
/// let mut rng = SecureRng::new();
/// let params = ParameterGenerator::new(128)
///     .with_kind(GroupKind::Schnorr)
///     .generate(&mut rng)
///     .unwrap();
/// assert_eq!(params.bits(), 128);
/// ```
#[derive(Clone, Debug)]
pub struct ParameterGenerator {
    bits: u64,
    kind: GroupKind,
    subgroup_bits: Option<u64>,
    max_attempts: u32,
    rounds: u32,
    cancel: Cancellation,
}

impl ParameterGenerator {
    /// Creates a generator for a `bits`-bit modulus with default settings.
    pub fn new(bits: u64) -> Self {
        Self {
            bits,
            kind: GroupKind::default(),
            subgroup_bits: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rounds: VALIDATION_ROUNDS,
            cancel: Cancellation::new(),
        }
    }

    /// Creates a generator from protocol configuration.
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            bits: config.bits,
            kind: config.group,
            subgroup_bits: config.subgroup_bits,
            max_attempts: config.max_generation_attempts,
            rounds: config.primality_rounds,
            cancel: Cancellation::new(),
        }
    }

    /// Selects the group construction.
    pub fn with_kind(mut self, kind: GroupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the bit length of `q` for Schnorr groups.
    pub fn with_subgroup_bits(mut self, subgroup_bits: u64) -> Self {
        self.subgroup_bits = Some(subgroup_bits);
        self
    }

    /// Sets the maximum number of generation attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the random-base Miller-Rabin rounds run on top of Baillie-PSW.
    /// Values below 20 are raised to 20.
    pub fn with_primality_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds.max(VALIDATION_ROUNDS);
        self
    }

    /// Attaches a cancellation flag polled once per sampled candidate.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Generates and validates domain parameters.
    ///
    /// Parameters that fail validation are discarded and regenerated, up to the
    /// configured number of attempts.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParams`] for unusable settings
    /// - [`Error::Generation`] if randomness fails, a prime search exhausts its
    ///   budget, or every attempt fails validation
    /// - [`Error::Cancelled`] if the cancellation flag is raised
    pub fn generate<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<DomainParameters> {
        let subgroup_bits = self.check_settings()?;

        info!(
            bits = self.bits,
            kind = ?self.kind,
            "Generating domain parameters"
        );
        if self.bits < SECURE_BITS {
            warn!(
                bits = self.bits,
                "Modulus below {} bits is insecure and only suitable for tests",
                SECURE_BITS
            );
        }

        for attempt in 1..=self.max_attempts {
            let params = self
                .generate_once(subgroup_bits, rng)
                .map_err(into_generation_error)?;

            match params.validate_with_rounds(self.rounds) {
                Ok(()) => {
                    info!(bits = self.bits, attempt, "Domain parameters generated");
                    return Ok(params);
                }
                Err(Error::InvalidParams(reason)) => {
                    warn!(attempt, %reason, "Generated parameters failed validation, regenerating");
                }
                Err(e) => return Err(into_generation_error(e)),
            }
        }

        Err(Error::Generation(format!(
            "Parameters failed validation after {} attempts",
            self.max_attempts
        )))
    }

    /// Returns the subgroup bit length to use, or an error for unusable settings.
    fn check_settings(&self) -> Result<u64> {
        if self.bits < MIN_BITS {
            return Err(Error::InvalidParams(format!(
                "Modulus must have at least {MIN_BITS} bits, got {}",
                self.bits
            )));
        }

        if self.max_attempts == 0 {
            return Err(Error::InvalidParams(
                "At least one generation attempt is required".to_string(),
            ));
        }

        let subgroup_bits = match self.kind {
            GroupKind::SafePrime => self.bits - 1,
            GroupKind::Schnorr => self
                .subgroup_bits
                .unwrap_or_else(|| default_subgroup_bits(self.bits)),
        };

        if subgroup_bits < 2 || subgroup_bits >= self.bits {
            return Err(Error::InvalidParams(format!(
                "Subgroup order of {subgroup_bits} bits does not fit a {}-bit modulus",
                self.bits
            )));
        }

        Ok(subgroup_bits)
    }

    fn generate_once<R: CryptoRngCore + ?Sized>(
        &self,
        subgroup_bits: u64,
        rng: &mut R,
    ) -> Result<DomainParameters> {
        let (p, q) = match self.kind {
            GroupKind::SafePrime => self.safe_prime_group(rng)?,
            GroupKind::Schnorr => self.schnorr_group(subgroup_bits, rng)?,
        };
        let g = find_generator(&p, &q, rng)?;

        Ok(DomainParameters::new(p, q, g))
    }

    /// Searches for a safe prime `p = 2q + 1` with `q` prime.
    fn safe_prime_group<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint)> {
        let budget = candidate_budget(self.bits).saturating_mul(self.bits);

        for candidates in 1..=budget {
            self.cancel.check()?;

            let q = random_odd_with_top_bit(rng, self.bits - 1)?;
            let p = (&q << 1u32) + 1u32;

            if !is_probable_safe_prime(&p) {
                continue;
            }
            if is_probable_prime(&q, self.rounds) && is_probable_prime(&p, self.rounds) {
                debug!(candidates, "Safe prime found");
                return Ok((p, q));
            }
        }

        Err(Error::Generation(format!(
            "No {}-bit safe prime found within the candidate budget",
            self.bits
        )))
    }

    /// Picks a prime `q`, then searches for a prime `p = m * 2q + 1` of full length.
    fn schnorr_group<R: CryptoRngCore + ?Sized>(
        &self,
        subgroup_bits: u64,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint)> {
        let q = random_prime(subgroup_bits, self.rounds, rng, &self.cancel)?;
        let two_q = &q << 1u32;

        for candidates in 1..=candidate_budget(self.bits) {
            self.cancel.check()?;

            let x = random_odd_with_top_bit(rng, self.bits)?;
            let p = &x - (&x % &two_q) + 1u32;
            if p.bits() != self.bits {
                continue;
            }

            if is_probable_prime(&p, self.rounds) {
                debug!(candidates, subgroup_bits, "Schnorr group modulus found");
                return Ok((p, q));
            }
        }

        Err(Error::Generation(format!(
            "No {}-bit modulus found for a {subgroup_bits}-bit subgroup within the candidate budget",
            self.bits
        )))
    }
}

/// Constructs `g = h^((p-1)/q) mod p` for random `h`, rejecting trivial results.
fn find_generator<R: CryptoRngCore + ?Sized>(
    p: &BigUint,
    q: &BigUint,
    rng: &mut R,
) -> Result<BigUint> {
    let p_minus_one = p - 1u32;
    let cofactor = &p_minus_one / q;
    let two = BigUint::from(2u32);

    for _ in 0..MAX_GENERATOR_DRAWS {
        let h = random_range(rng, &two, &p_minus_one)?;
        if (&h % q).is_zero() {
            continue;
        }

        let g = h.modpow(&cofactor, p);
        if !g.is_one() {
            return Ok(g);
        }
    }

    Err(Error::Generation(
        "No generator found for the subgroup".to_string(),
    ))
}

fn into_generation_error(error: Error) -> Error {
    match error {
        Error::Randomness(reason) => {
            Error::Generation(format!("Secure randomness unavailable: {reason}"))
        }
        other => other,
    }
}

/// Generates validated domain parameters for a `bits`-bit modulus.
///
/// Uses a Schnorr group with the default subgroup size and [`SecureRng`](crate::SecureRng).
pub fn generate_parameters(bits: u64) -> Result<DomainParameters> {
    let mut rng = crate::SecureRng::new();
    ParameterGenerator::new(bits).generate(&mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::rng::tests::FailingRng;
    use crate::SecureRng;

    fn assert_invariants(params: &DomainParameters) {
        let p = params.modulus();
        let q = params.order();
        let g = params.generator();

        assert!(!g.is_one());
        assert!(g < p);
        assert!(g.modpow(q, p).is_one());
        assert!(((p - 1u32) % q).is_zero());
    }

    #[test]
    fn schnorr_group_generation() {
        let mut rng = SecureRng::new();
        for bits in [64u64, 128, 256] {
            let params = ParameterGenerator::new(bits).generate(&mut rng).unwrap();
            assert_eq!(params.bits(), bits);
            assert_eq!(params.order().bits(), default_subgroup_bits(bits));
            assert_invariants(&params);
        }
    }

    #[test]
    fn schnorr_group_with_custom_subgroup() {
        let mut rng = SecureRng::new();
        let params = ParameterGenerator::new(192)
            .with_subgroup_bits(80)
            .generate(&mut rng)
            .unwrap();
        assert_eq!(params.order().bits(), 80);
        assert_invariants(&params);
    }

    #[test]
    fn safe_prime_generation() {
        let mut rng = SecureRng::new();
        let params = ParameterGenerator::new(96)
            .with_kind(GroupKind::SafePrime)
            .generate(&mut rng)
            .unwrap();

        assert_eq!(params.bits(), 96);
        assert_eq!(params.modulus(), &((params.order() << 1u32) + 1u32));
        assert!(is_probable_safe_prime(params.modulus()));
        assert_invariants(&params);
    }

    #[test]
    fn rejects_tiny_modulus() {
        let mut rng = SecureRng::new();
        assert!(matches!(
            ParameterGenerator::new(32).generate(&mut rng),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_oversized_subgroup() {
        let mut rng = SecureRng::new();
        assert!(matches!(
            ParameterGenerator::new(128)
                .with_subgroup_bits(128)
                .generate(&mut rng),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut rng = SecureRng::new();
        assert!(matches!(
            ParameterGenerator::new(128)
                .with_max_attempts(0)
                .generate(&mut rng),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn failing_rng_is_a_generation_error() {
        assert!(matches!(
            ParameterGenerator::new(128).generate(&mut FailingRng),
            Err(Error::Generation(_))
        ));
    }

    #[test]
    fn cancelled_generation_stops() {
        let mut rng = SecureRng::new();
        let cancel = Cancellation::new();
        cancel.cancel();

        let result = ParameterGenerator::new(512)
            .with_cancellation(cancel)
            .generate(&mut rng);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn primality_rounds_never_drop_below_validation_level() {
        let generator = ParameterGenerator::new(128).with_primality_rounds(1);
        assert_eq!(generator.rounds, VALIDATION_ROUNDS);
    }

    #[test]
    fn default_subgroup_sizes() {
        assert_eq!(default_subgroup_bits(4096), 256);
        assert_eq!(default_subgroup_bits(2048), 256);
        assert_eq!(default_subgroup_bits(1024), 160);
        assert_eq!(default_subgroup_bits(512), 128);
        assert_eq!(default_subgroup_bits(64), 32);
    }

    #[test]
    fn seeded_rng_reproduces_parameters() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let generator = ParameterGenerator::new(128);
        let first = generator.generate(&mut StdRng::seed_from_u64(13)).unwrap();
        let second = generator.generate(&mut StdRng::seed_from_u64(13)).unwrap();
        assert_eq!(first, second);
        assert_invariants(&first);
    }
}
