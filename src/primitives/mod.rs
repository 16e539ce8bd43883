//! Core cryptographic primitives for the ZK13 protocol.
//!
//! This module contains the building blocks the protocol is assembled from:
//! - **rng**: secure randomness and uniform big-integer sampling
//! - **primality**: bounded prime search over `num-prime` primality tests
//! - **cancel**: cooperative cancellation of prime searches
//! - **groups**: well-known group constants
//! - **secret**: derivation of the secret exponent
//! - **transcript**: Fiat-Shamir transform for non-interactive proofs

/// Cooperative cancellation.
pub mod cancel;
/// Well-known group constants.
pub mod groups;
/// Primality testing and prime search.
pub mod primality;
/// Cryptographically secure random number generation.
pub mod rng;
/// Secret exponent derivation.
pub mod secret;
/// Transcript for Fiat-Shamir transform.
pub mod transcript;

pub use cancel::Cancellation;
pub use rng::SecureRng;
pub use secret::{derive_secret, SecretExponent};
pub use transcript::Transcript;
