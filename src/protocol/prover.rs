use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use super::{Context, Proof};
use crate::primitives::rng::random_range;
use crate::primitives::Transcript;
use crate::{Error, Result};

/// Prover for the ZK13 protocol.
///
/// Proves knowledge of the secret exponent `Hs` behind the public value
/// `Y = g^Hs` without revealing it, as a Schnorr proof made non-interactive with
/// Fiat-Shamir. The nonce is part of the challenge, so a proof is bound to the
/// nonce it was made for.
///
/// # Security
///
/// - Always use [`SecureRng`](crate::SecureRng) for randomness generation
/// - Use a fresh nonce per authentication attempt
/// - The randomizer `k` exists only for the duration of one `prove` call
pub struct Prover {
    context: Arc<Context>,
}

impl Prover {
    /// Creates a prover over a shared context.
    pub fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    /// Returns the context the prover works in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Generates a non-interactive proof for `nonce`.
    ///
    /// This is the recommended method for most use cases.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParams`] if the nonce is zero or not below `p`
    /// - [`Error::Randomness`] if the randomizer cannot be sampled
    pub fn prove<R: CryptoRngCore + ?Sized>(&self, nonce: &BigUint, rng: &mut R) -> Result<Proof> {
        let mut transcript = Transcript::new();
        self.prove_with_transcript(nonce, rng, &mut transcript)
    }

    /// Generates a proof using a custom transcript.
    ///
    /// Allows the caller to add additional context to the transcript. The verifier
    /// must replay the same additions.
    pub fn prove_with_transcript<R: CryptoRngCore + ?Sized>(
        &self,
        nonce: &BigUint,
        rng: &mut R,
        transcript: &mut Transcript,
    ) -> Result<Proof> {
        let params = self.context.params();

        if nonce.is_zero() {
            return Err(Error::InvalidParams("Nonce must be positive".to_string()));
        }
        if nonce >= params.modulus() {
            return Err(Error::InvalidParams(
                "Nonce must be less than p".to_string(),
            ));
        }

        let k = random_range(rng, &BigUint::one(), params.order())?;
        let commitment = params.generator().modpow(&k, params.modulus());

        let challenge = self.context.challenge(transcript, &commitment, nonce);
        let exponent = self.context.secret().reduce(params.order());
        let response = (k + challenge * exponent) % params.order();

        Ok(Proof::new(commitment, response, nonce.clone()))
    }
}
