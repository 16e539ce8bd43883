//! Fiat-Shamir transcript for non-interactive proofs.
//!
//! Provides domain-separated, transcript-based challenge generation using Merlin.

use merlin::Transcript as MerlinTranscript;
use num_bigint::BigUint;
use zeroize::Zeroizing;

/// Protocol label for transcript initialization.
const PROTOCOL_LABEL: &[u8] = b"ZK13 v1.0.0";

/// Domain separation tag for protocol name.
const PROTOCOL_DST: &[u8] = b"zk13-schnorr-modp";

/// Domain separation tag for challenge generation.
const CHALLENGE_DST: &[u8] = b"challenge";

/// Number of extra bits for statistical security in challenge reduction (128 bits).
const EXTRA_SECURITY_BITS: u64 = 128;

/// Transcript wrapper for Fiat-Shamir transformation.
///
/// Prover and verifier must append the same messages in the same order to derive
/// the same challenge.
pub struct Transcript(MerlinTranscript);

impl Transcript {
    /// Creates a new transcript for the ZK13 protocol.
    pub fn new() -> Self {
        let mut transcript = MerlinTranscript::new(PROTOCOL_LABEL);
        transcript.append_message(b"protocol", PROTOCOL_DST);
        Self(transcript)
    }

    /// Appends application-specific context to prevent cross-protocol attacks.
    ///
    /// # Security
    ///
    /// Proofs produced under one context do not verify under another.
    /// Examples: session ID, domain separator, purpose string.
    pub fn append_context(&mut self, context: &[u8]) {
        self.0.append_message(b"context", context);
    }

    /// Appends the domain parameters `(p, q, g)` to the transcript.
    pub fn append_parameters(&mut self, modulus: &[u8], order: &[u8], generator: &[u8]) {
        self.0.append_message(b"modulus-p", modulus);
        self.0.append_message(b"order-q", order);
        self.0.append_message(b"generator-g", generator);
    }

    /// Appends the public value `Y = g^Hs` to the transcript.
    pub fn append_public_value(&mut self, public: &[u8]) {
        self.0.append_message(b"public-y", public);
    }

    /// Appends the commitment `R` to the transcript.
    pub fn append_commitment(&mut self, commitment: &[u8]) {
        self.0.append_message(b"commitment-r", commitment);
    }

    /// Appends the proof nonce to the transcript.
    pub fn append_nonce(&mut self, nonce: &[u8]) {
        self.0.append_message(b"nonce", nonce);
    }

    /// Generates a challenge uniformly distributed in `[0, order)` up to a
    /// statistical distance of `2^-128`.
    pub fn challenge_below(&mut self, order: &BigUint) -> BigUint {
        let byte_len = (order.bits() + EXTRA_SECURITY_BITS).div_ceil(8) as usize;
        let mut buf = Zeroizing::new(vec![0u8; byte_len]);
        self.0.challenge_bytes(CHALLENGE_DST, &mut buf);

        BigUint::from_bytes_be(&buf) % order
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
