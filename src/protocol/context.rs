use core::fmt;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::params::DomainParameters;
use crate::primitives::rng::random_range;
use crate::primitives::{SecretExponent, Transcript};
use crate::Result;

/// Protocol context: validated domain parameters plus the shared secret exponent.
///
/// Read-only after construction and safe to share across threads (wrap it in an
/// `Arc`). Prover and verifier must build numerically identical contexts.
pub struct Context {
    params: DomainParameters,
    secret: SecretExponent,
    public_value: BigUint,
}

impl Context {
    /// Creates a context, validating the domain parameters first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`](crate::Error::InvalidParams) if the
    /// parameters fail validation. Such parameters must be regenerated.
    pub fn new(params: DomainParameters, secret: SecretExponent) -> Result<Self> {
        params.validate()?;

        let public_value = params
            .generator()
            .modpow(&secret.reduce(params.order()), params.modulus());

        Ok(Self {
            params,
            secret,
            public_value,
        })
    }

    /// Creates a context by deriving the exponent from shared secret bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zk13::{Context, DomainParameters, SecureRng};
    ///
    /// let mut rng = SecureRng::new();
    /// let params = DomainParameters::rfc5114_2048_256();
    /// let context = Context::from_shared_secret(params, b"shared secret").unwrap();
    /// ```
    pub fn from_shared_secret(params: DomainParameters, shared_secret: &[u8]) -> Result<Self> {
        Self::new(params, SecretExponent::derive(shared_secret))
    }

    /// Returns the domain parameters.
    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    /// Returns the public value `Y = g^Hs mod p`.
    pub fn public_value(&self) -> &BigUint {
        &self.public_value
    }

    pub(crate) fn secret(&self) -> &SecretExponent {
        &self.secret
    }

    /// Samples a nonce uniformly from `[1, p)`.
    pub fn generate_nonce<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<BigUint> {
        random_range(rng, &BigUint::from(1u32), self.params.modulus())
    }

    /// Binds the public inputs of one proof into `transcript` and derives the
    /// challenge in `[0, q)`.
    pub(crate) fn challenge(
        &self,
        transcript: &mut Transcript,
        commitment: &BigUint,
        nonce: &BigUint,
    ) -> BigUint {
        let params = &self.params;
        transcript.append_parameters(
            &params.encode_element(params.modulus()),
            &params.order().to_bytes_be(),
            &params.encode_element(params.generator()),
        );
        transcript.append_public_value(&params.encode_element(&self.public_value));
        transcript.append_commitment(&params.encode_element(commitment));
        transcript.append_nonce(&nonce.to_bytes_be());

        transcript.challenge_below(params.order())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("bits", &self.params.bits())
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}
