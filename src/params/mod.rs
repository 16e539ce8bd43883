//! Domain parameters `(p, q, g)` and their generation.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::primitives::groups::rfc5114;
use crate::primitives::primality::{is_probable_prime, VALIDATION_ROUNDS};
use crate::{Error, Result};

/// Parameter generation.
pub mod generator;

pub use generator::{GroupKind, ParameterGenerator};

/// Public domain parameters of a discrete-logarithm group.
///
/// `p` is a prime modulus, `q` a prime dividing `p - 1`, and `g` an element of order
/// `q` in the multiplicative group mod `p`.
///
/// # Security
///
/// A value built with [`DomainParameters::new`] is unchecked. [`Context`](crate::Context)
/// runs [`DomainParameters::validate`] before use, and parameters that fail it must
/// be regenerated. Moduli below 2048 bits are only suitable for tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainParameters {
    modulus: BigUint,
    order: BigUint,
    generator: BigUint,
}

impl DomainParameters {
    /// Creates parameters from raw values without validating them.
    pub fn new(modulus: BigUint, order: BigUint, generator: BigUint) -> Self {
        Self {
            modulus,
            order,
            generator,
        }
    }

    /// The 2048-bit group with 256-bit subgroup from RFC 5114 section 2.3.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zk13::DomainParameters;
    ///
    /// let params = DomainParameters::rfc5114_2048_256();
    /// assert_eq!(params.bits(), 2048);
    /// ```
    pub fn rfc5114_2048_256() -> Self {
        debug!(group = rfc5114::NAME, "Using well-known domain parameters");
        Self::new(
            rfc5114::rfc5114_p(),
            rfc5114::rfc5114_q(),
            rfc5114::rfc5114_g(),
        )
    }

    /// Returns the prime modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns the subgroup order `q`.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Returns the generator `g`.
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Byte length of a canonical group element encoding.
    pub fn element_len(&self) -> usize {
        self.bits().div_ceil(8) as usize
    }

    /// Encodes a value as big-endian bytes left-padded to [`Self::element_len`].
    ///
    /// Values wider than the modulus are returned unpadded.
    pub fn encode_element(&self, value: &BigUint) -> Vec<u8> {
        let bytes = value.to_bytes_be();
        let len = self.element_len();
        if bytes.len() >= len {
            return bytes;
        }

        let mut padded = vec![0u8; len - bytes.len()];
        padded.extend_from_slice(&bytes);
        padded
    }

    /// Returns `true` if `value` is a non-identity element of the order-`q` subgroup.
    pub fn is_subgroup_element(&self, value: &BigUint) -> bool {
        if value.is_zero() || value.is_one() || value >= &self.modulus {
            return false;
        }
        value.modpow(&self.order, &self.modulus).is_one()
    }

    /// Validates the parameters; primality is checked with Baillie-PSW and 20
    /// random-base Miller-Rabin rounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] naming the first failed check.
    pub fn validate(&self) -> Result<()> {
        self.validate_with_rounds(VALIDATION_ROUNDS)
    }

    /// Validates the parameters with at least `rounds` Miller-Rabin rounds.
    ///
    /// Fewer than 20 rounds are never used.
    pub fn validate_with_rounds(&self, rounds: u32) -> Result<()> {
        let p = &self.modulus;
        let q = &self.order;
        let g = &self.generator;

        if g.is_zero() || g.is_one() {
            return Err(Error::InvalidParams(
                "Generator g must be greater than 1".to_string(),
            ));
        }

        if g >= p {
            return Err(Error::InvalidParams(
                "Generator g must be less than p".to_string(),
            ));
        }

        if q.is_zero() || !((p - 1u32) % q).is_zero() {
            return Err(Error::InvalidParams(
                "Subgroup order q must divide p - 1".to_string(),
            ));
        }

        if !is_probable_prime(p, rounds) {
            return Err(Error::InvalidParams("Modulus p is not prime".to_string()));
        }

        if !is_probable_prime(q, rounds) {
            return Err(Error::InvalidParams(
                "Subgroup order q is not prime".to_string(),
            ));
        }

        if !g.modpow(q, p).is_one() {
            return Err(Error::InvalidParams(
                "Generator g does not have order q".to_string(),
            ));
        }

        Ok(())
    }
}
