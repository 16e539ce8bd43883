use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use zk13::{verify_proof, Context, DomainParameters, NonceGuard, Proof, Prover, SecureRng, Verifier};

fn setup() -> (Arc<Context>, Proof) {
    let mut rng = SecureRng::new();
    let params = DomainParameters::rfc5114_2048_256();
    let context = Arc::new(Context::from_shared_secret(params, b"shared secret").unwrap());
    let nonce = context.generate_nonce(&mut rng).unwrap();
    let proof = Prover::new(context.clone()).prove(&nonce, &mut rng).unwrap();
    (context, proof)
}

fn bench_rfc5114_proof_check(c: &mut Criterion) {
    let (context, proof) = setup();

    c.bench_function("rfc5114_proof_check", |b| {
        b.iter(|| assert!(verify_proof(&context, black_box(&proof))))
    });
}

fn bench_rfc5114_stateful_verification(c: &mut Criterion) {
    let (context, proof) = setup();

    c.bench_function("rfc5114_stateful_verification", |b| {
        b.iter(|| {
            let verifier = Verifier::with_guard(context.clone(), NonceGuard::new(1, None));
            assert!(verifier.verify(black_box(&proof)))
        })
    });
}

fn bench_proof_decoding(c: &mut Criterion) {
    let (_, proof) = setup();
    let bytes = proof.to_bytes().unwrap();

    c.bench_function("proof_decoding", |b| {
        b.iter(|| Proof::from_bytes(black_box(&bytes)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_rfc5114_proof_check,
    bench_rfc5114_stateful_verification,
    bench_proof_decoding
);
criterion_main!(benches);
