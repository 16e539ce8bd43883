use num_traits::Zero;
use subtle::ConstantTimeEq;
use tracing::debug;

use super::{Context, Proof};
use crate::primitives::Transcript;
use crate::{Error, Result};

/// Checks the algebra of a proof and reports why it was rejected.
///
/// Does not consult a replay guard; see [`Verifier`](crate::Verifier) for that.
pub fn check_proof(context: &Context, proof: &Proof) -> Result<()> {
    let mut transcript = Transcript::new();
    check_proof_with_transcript(context, proof, &mut transcript)
}

/// Checks a proof using a custom transcript.
///
/// The transcript must match the one used during proof generation.
///
/// Verifies `g^s == R * Y^c (mod p)`, comparing both sides in constant time
/// over their fixed-width encodings.
pub fn check_proof_with_transcript(
    context: &Context,
    proof: &Proof,
    transcript: &mut Transcript,
) -> Result<()> {
    let params = context.params();
    let p = params.modulus();

    if proof.nonce().is_zero() {
        return Err(Error::InvalidProof("Nonce must be positive".to_string()));
    }
    if proof.nonce() >= p {
        return Err(Error::InvalidProof("Nonce must be less than p".to_string()));
    }
    if proof.response() >= params.order() {
        return Err(Error::InvalidProof(
            "Response must be less than q".to_string(),
        ));
    }
    if !params.is_subgroup_element(proof.commitment()) {
        return Err(Error::InvalidProof(
            "Commitment is not in the subgroup".to_string(),
        ));
    }

    let challenge = context.challenge(transcript, proof.commitment(), proof.nonce());

    let lhs = params.generator().modpow(proof.response(), p);
    let rhs = proof.commitment() * context.public_value().modpow(&challenge, p) % p;

    let lhs_bytes = params.encode_element(&lhs);
    let rhs_bytes = params.encode_element(&rhs);
    if !bool::from(lhs_bytes[..].ct_eq(&rhs_bytes[..])) {
        return Err(Error::InvalidProof(
            "Proof verification failed".to_string(),
        ));
    }

    Ok(())
}

/// Returns `true` if the proof is algebraically valid for `context`.
///
/// Never panics or errors on malformed input; every rejection is `false`.
///
/// # Security
///
/// Keeps no state and does not reject replays: the same proof verifies every
/// time it is presented. Use [`Verifier`](crate::Verifier) to accept each nonce
/// at most once.
pub fn verify_proof(context: &Context, proof: &Proof) -> bool {
    match check_proof(context, proof) {
        Ok(()) => true,
        Err(e) => {
            debug!(reason = %e, "Proof rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use num_bigint::BigUint;

    use super::*;
    use crate::protocol::test_support::{context_for, shared_context};
    use crate::{Prover, SecureRng};

    fn setup(secret: &[u8]) -> Arc<Context> {
        if secret == b"shared secret" {
            return shared_context();
        }
        context_for(secret)
    }

    #[test]
    fn accepts_valid_proof() {
        let mut rng = SecureRng::new();
        let context = setup(b"shared secret");
        let nonce = context.generate_nonce(&mut rng).unwrap();
        let proof = Prover::new(context.clone()).prove(&nonce, &mut rng).unwrap();

        assert!(check_proof(&context, &proof).is_ok());
        assert!(verify_proof(&context, &proof));
    }

    #[test]
    fn rejects_proof_for_other_secret() {
        let mut rng = SecureRng::new();
        let prover_context = setup(b"shared secret");
        let verifier_context = setup(b"another secret");
        let proof = Prover::new(prover_context)
            .prove(&BigUint::from(99u32), &mut rng)
            .unwrap();

        assert!(!verify_proof(&verifier_context, &proof));
    }

    #[test]
    fn rejection_reasons() {
        let mut rng = SecureRng::new();
        let context = setup(b"shared secret");
        let proof = Prover::new(context.clone())
            .prove(&BigUint::from(99u32), &mut rng)
            .unwrap();
        let (r, s, nonce) = proof.into_parts();
        let q = context.params().order().clone();

        let zero_nonce = Proof::new(r.clone(), s.clone(), BigUint::zero());
        let big_response = Proof::new(r.clone(), &s + &q, nonce.clone());
        let outside = Proof::new(BigUint::from(1u32), s.clone(), nonce.clone());

        for (proof, reason) in [
            (zero_nonce, "positive"),
            (big_response, "less than q"),
            (outside, "subgroup"),
        ] {
            match check_proof(&context, &proof) {
                Err(Error::InvalidProof(msg)) => assert!(msg.contains(reason), "{msg}"),
                other => panic!("expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn stateless_check_accepts_repeated_proof() {
        let mut rng = SecureRng::new();
        let context = setup(b"shared secret");
        let nonce = context.generate_nonce(&mut rng).unwrap();
        let proof = Prover::new(context.clone()).prove(&nonce, &mut rng).unwrap();

        assert!(verify_proof(&context, &proof));
        assert!(verify_proof(&context, &proof));
    }

    #[test]
    fn transcript_context_must_match() {
        let mut rng = SecureRng::new();
        let context = setup(b"shared secret");

        let mut transcript = Transcript::new();
        transcript.append_context(b"session-1");
        let proof = Prover::new(context.clone())
            .prove_with_transcript(&BigUint::from(5u32), &mut rng, &mut transcript)
            .unwrap();

        let mut same = Transcript::new();
        same.append_context(b"session-1");
        assert!(check_proof_with_transcript(&context, &proof, &mut same).is_ok());

        let mut other = Transcript::new();
        other.append_context(b"session-2");
        assert!(check_proof_with_transcript(&context, &proof, &mut other).is_err());
    }
}
