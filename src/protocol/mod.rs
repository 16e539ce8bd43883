//! ZK13 proof generation and algebraic verification.

mod context;
mod proof;
mod prover;
mod verifier;

pub use context::Context;
pub use proof::Proof;
pub use prover::Prover;
pub use verifier::{check_proof, check_proof_with_transcript, verify_proof};
