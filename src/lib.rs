//! # ZK13
//!
//! Zero-knowledge authentication over a prime-order subgroup of `Z_p^*`.
//!
//! A prover and a verifier share a secret. Both derive the exponent `Hs`, the
//! 512-bit BLAKE3 output of the secret, and the public value `Y = g^Hs mod p`. The
//! verifier issues a fresh nonce; the prover answers with a non-interactive Schnorr proof
//! of knowledge of `Hs` bound to that nonce; the verifier checks the proof and
//! accepts each nonce at most once.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use zk13::{Context, DomainParameters, Prover, SecureRng, Verifier};
//!
//! let mut rng = SecureRng::new();
//! let params = DomainParameters::rfc5114_2048_256();
//! let context = Arc::new(Context::from_shared_secret(params, b"shared secret").unwrap());
//!
//! let verifier = Verifier::new(context.clone());
//! let nonce = context.generate_nonce(&mut rng).unwrap();
//!
//! let proof = Prover::new(context).prove(&nonce, &mut rng).unwrap();
//! assert!(verifier.verify(&proof));
//! ```
//!
//! ## Modules
//!
//! - [`params`]: domain parameters, their validation and generation
//! - [`primitives`]: randomness, primality, secret derivation, transcripts
//! - [`protocol`]: proving and stateless proof checks
//! - [`verifier`]: stateful verification with replay protection
//! - [`config`]: layered configuration

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod params;
pub mod primitives;
pub mod protocol;
pub mod verifier;

use num_bigint::BigUint;

pub use config::{ProtocolConfig, ReplaySettings};
pub use error::{Error, Result};
pub use params::{generator::generate_parameters, DomainParameters, GroupKind, ParameterGenerator};
pub use primitives::{derive_secret, Cancellation, SecretExponent, SecureRng, Transcript};
pub use protocol::{check_proof, verify_proof, Context, Proof, Prover};
pub use verifier::{NonceGuard, Verifier};

/// Samples a fresh nonce in `[1, p)` using the operating system RNG.
pub fn generate_nonce(context: &Context) -> Result<BigUint> {
    context.generate_nonce(&mut SecureRng::new())
}

/// Proves knowledge of the context's secret exponent for `nonce`.
pub fn prove(context: &std::sync::Arc<Context>, nonce: &BigUint) -> Result<Proof> {
    Prover::new(context.clone()).prove(nonce, &mut SecureRng::new())
}

/// Verifies `proof` and consumes its nonce on success.
pub fn verify(verifier: &Verifier, proof: &Proof) -> bool {
    verifier.verify(proof)
}
