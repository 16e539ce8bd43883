//! Basic usage example of the ZK13 protocol.
//!
//! This example demonstrates:
//! - Generating domain parameters
//! - Deriving the secret exponent on both sides
//! - Issuing a nonce and proving knowledge of the secret
//! - Verifying the proof and rejecting its replay

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use zk13::{Context, ParameterGenerator, Proof, ProtocolConfig, Prover, SecureRng, Verifier};

const EXAMPLE_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/zk13.example.toml");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zk13=info")),
        )
        .init();

    println!("ZK13 Zero-Knowledge Protocol: Basic Example\n");

    println!("Step 1: Load configuration and generate parameters");
    // The sample file keeps the demo fast; `ProtocolConfig::from_env` defaults to 2048 bits
    let config = ProtocolConfig::load(EXAMPLE_CONFIG).expect("Configuration should load");
    let mut rng = SecureRng::new();
    let params = ParameterGenerator::from_config(&config)
        .generate(&mut rng)
        .expect("Parameter generation should succeed");
    println!("  {}-bit modulus, {}-bit subgroup\n", params.bits(), params.order().bits());

    println!("Step 2: Both parties derive Hs = BLAKE3-512(secret)");
    let prover_context = Arc::new(
        Context::from_shared_secret(params.clone(), b"shared secret")
            .expect("Context creation should succeed"),
    );
    let verifier_context = Arc::new(
        Context::from_shared_secret(params, b"shared secret")
            .expect("Context creation should succeed"),
    );
    println!("  Public value Y = g^Hs computed (Hs stays private)\n");

    println!("Step 3: Verifier issues a nonce");
    let verifier = Verifier::from_config(verifier_context.clone(), &config.replay);
    let nonce = verifier_context
        .generate_nonce(&mut rng)
        .expect("Nonce generation should succeed");
    println!("  Nonce: {} bits\n", nonce.bits());

    println!("Step 4: Prover answers with a proof");
    let proof = Prover::new(prover_context)
        .prove(&nonce, &mut rng)
        .expect("Proof generation should succeed");
    let encoded = proof.to_hex().expect("Proof fields fit the wire format");
    println!("  Proof size: {} bytes\n", encoded.len() / 2);

    println!("Step 5: Verifier checks the proof");
    let received = Proof::from_hex(&encoded).expect("Decoding should succeed");
    if verifier.verify(&received) {
        println!("  Proof is VALID");
    } else {
        println!("  Proof is INVALID");
    }

    println!("\nStep 6: Replaying the same proof");
    if verifier.verify(&received) {
        println!("  Replay ACCEPTED (unexpected)");
    } else {
        println!("  Replay REJECTED");
    }
}
