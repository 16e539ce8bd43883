//! Stateful verifier with replay protection.
//!
//! [`Verifier`] combines the algebraic check from [`check_proof`] with a
//! [`NonceGuard`], so each nonce authenticates at most once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ReplaySettings;
use crate::protocol::check_proof_with_transcript;
use crate::{Context, Proof, Transcript};

/// Consumed-nonce tracking.
pub mod replay;

pub use replay::NonceGuard;

/// Verifier for the ZK13 protocol.
///
/// Accepts a proof only if it is algebraically valid and its nonce has not been
/// accepted before. Verifiers built with [`Verifier::with_guard`] over clones of
/// one [`NonceGuard`] share replay state.
///
/// # Security
///
/// - The nonce is consumed only after the proof checks out, so a forged proof
///   cannot burn a legitimate nonce
/// - When the guard is full, every new proof is rejected
#[derive(Clone, Debug)]
pub struct Verifier {
    context: Arc<Context>,
    guard: NonceGuard,
}

impl Verifier {
    /// Creates a verifier with its own default guard.
    ///
    /// # Security
    ///
    /// - The guard belongs to this verifier and its clones only. Another verifier
    ///   built with `new`, even over the same [`Context`], accepts the same proof
    ///   once more. Share one [`NonceGuard`] through [`Verifier::with_guard`] when
    ///   several verifiers serve the same clients.
    /// - The default guard keeps nonces forever and holds at most 100 000 of them.
    ///   Once full it fails closed and rejects every new proof until
    ///   [`NonceGuard::clear`] is called. Use [`Verifier::from_config`] with a
    ///   `ttl_secs` for long-running verifiers.
    pub fn new(context: Arc<Context>) -> Self {
        Self::with_guard(context, NonceGuard::default())
    }

    /// Creates a verifier over an existing guard.
    pub fn with_guard(context: Arc<Context>, guard: NonceGuard) -> Self {
        Self { context, guard }
    }

    /// Creates a verifier whose guard follows `settings`.
    pub fn from_config(context: Arc<Context>, settings: &ReplaySettings) -> Self {
        Self::with_guard(context, settings.build_guard())
    }

    /// Returns the context the verifier works in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the replay guard.
    pub fn guard(&self) -> &NonceGuard {
        &self.guard
    }

    /// Returns `true` if `nonce` has not been accepted yet.
    pub fn is_fresh_nonce(&self, nonce: &num_bigint::BigUint) -> bool {
        self.guard.is_fresh(nonce)
    }

    /// Verifies a proof and consumes its nonce on success.
    ///
    /// Returns `false` for replays, malformed proofs, failed checks and a full
    /// replay guard. Never panics on adversarial input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use zk13::{Context, DomainParameters, Prover, SecureRng, Verifier};
    ///
    /// let mut rng = SecureRng::new();
    /// let params = DomainParameters::rfc5114_2048_256();
    /// let context = Arc::new(Context::from_shared_secret(params, b"shared secret").unwrap());
    ///
    /// let nonce = context.generate_nonce(&mut rng).unwrap();
    /// let proof = Prover::new(context.clone()).prove(&nonce, &mut rng).unwrap();
    ///
    /// let verifier = Verifier::new(context);
    /// assert!(verifier.verify(&proof));
    /// assert!(!verifier.verify(&proof));
    /// ```
    pub fn verify(&self, proof: &Proof) -> bool {
        let mut transcript = Transcript::new();
        self.verify_with_transcript(proof, &mut transcript)
    }

    /// Verifies a proof using a custom transcript.
    ///
    /// The transcript must match the one used during proof generation.
    pub fn verify_with_transcript(&self, proof: &Proof, transcript: &mut Transcript) -> bool {
        if !self.guard.is_fresh(proof.nonce()) {
            debug!("Proof rejected: nonce already used");
            return false;
        }

        if let Err(e) = check_proof_with_transcript(&self.context, proof, transcript) {
            debug!(reason = %e, "Proof rejected");
            return false;
        }

        match self.guard.consume_if_fresh(proof.nonce()) {
            Ok(true) => true,
            Ok(false) => {
                debug!("Proof rejected: nonce consumed concurrently");
                false
            }
            Err(e) => {
                warn!(error = %e, "Proof rejected: replay guard refused nonce");
                false
            }
        }
    }
}
