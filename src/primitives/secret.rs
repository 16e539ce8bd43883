//! Derivation of the secret exponent from a shared secret.

use core::fmt;

use num_bigint::BigUint;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Byte length of the digest the exponent is read from (512 bits).
pub const SECRET_DIGEST_LEN: usize = 64;

/// Secret exponent `Hs` shared by prover and verifier.
///
/// The 512-bit BLAKE3 output (extendable-output mode) of the shared secret, read as
/// a big-endian unsigned integer.
/// The digest bytes are zeroized on drop and the `Debug` output is redacted. The
/// type has no serialization.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretExponent {
    digest: [u8; SECRET_DIGEST_LEN],
}

impl SecretExponent {
    /// Derives the exponent from arbitrary-length secret bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zk13::SecretExponent;
    ///
    /// let a = SecretExponent::derive(b"shared secret");
    /// let b = SecretExponent::derive(b"shared secret");
    /// assert_eq!(a, b);
    /// ```
    pub fn derive(secret: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(secret);

        let mut reader = hasher.finalize_xof();
        let mut digest = [0u8; SECRET_DIGEST_LEN];
        reader.fill(&mut digest);

        hasher.zeroize();
        reader.zeroize();
        Self { digest }
    }

    /// Returns the exponent as an integer.
    ///
    /// The returned value is not zeroized; keep its lifetime short.
    pub(crate) fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.digest)
    }

    /// Returns the exponent reduced modulo `order`.
    pub(crate) fn reduce(&self, order: &BigUint) -> BigUint {
        self.to_biguint() % order
    }
}

impl ConstantTimeEq for SecretExponent {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.digest[..].ct_eq(&other.digest[..])
    }
}

impl PartialEq for SecretExponent {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SecretExponent {}

impl fmt::Debug for SecretExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretExponent(<redacted>)")
    }
}

/// Maps a shared secret of any length to its [`SecretExponent`].
pub fn derive_secret(secret: &[u8]) -> SecretExponent {
    SecretExponent::derive(secret)
}
