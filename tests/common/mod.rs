//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use zk13::{Context, DomainParameters, ParameterGenerator, SecureRng};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from the library are shown. Subsequent calls are safe and will be
/// ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("zk13=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// 512-bit Schnorr group, generated once per test binary.
pub fn params_512() -> DomainParameters {
    static PARAMS: OnceLock<DomainParameters> = OnceLock::new();
    PARAMS
        .get_or_init(|| {
            ParameterGenerator::new(512)
                .generate(&mut SecureRng::new())
                .expect("512-bit parameter generation should succeed")
        })
        .clone()
}

/// RFC 5114 context for `secret`.
pub fn rfc5114_context(secret: &[u8]) -> Arc<Context> {
    let params = DomainParameters::rfc5114_2048_256();
    Arc::new(
        Context::from_shared_secret(params, secret)
            .expect("RFC 5114 parameters should validate"),
    )
}

/// Context over the generated 512-bit group for `secret`.
pub fn context_512(secret: &[u8]) -> Arc<Context> {
    Arc::new(
        Context::from_shared_secret(params_512(), secret)
            .expect("Generated parameters should validate"),
    )
}
