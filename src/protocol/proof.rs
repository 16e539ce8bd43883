//! Proof values and their wire encoding.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Protocol version for serialization compatibility.
const PROTOCOL_VERSION: u8 = 1;

/// Largest accepted encoded integer (a 32768-bit value).
const MAX_FIELD_SIZE: usize = 4096;

/// Non-interactive ZK13 proof.
///
/// - `commitment`: `R = g^k mod p` for a fresh secret randomizer `k`
/// - `response`: `s = k + c * Hs mod q`, where the challenge `c` is derived from
///   the parameters, the public value, `R` and the nonce
/// - `nonce`: single-use value bound into the challenge
///
/// # Security
///
/// - Proofs are single-use: a verifier with a replay guard accepts a nonce once
/// - Proofs carry no secret material and can be transmitted freely
///
/// # Serialization
///
/// [`Proof::to_bytes`] / [`Proof::from_bytes`] use a versioned, length-prefixed
/// encoding of the three integers. The type also implements serde; deserialization
/// applies the same version and size checks as [`Proof::from_bytes`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PackedProof")]
pub struct Proof {
    version: u8,
    commitment: BigUint,
    response: BigUint,
    nonce: BigUint,
}

impl Proof {
    /// Creates a proof from its three components.
    ///
    /// This is typically called by [`Prover`](crate::Prover) and not directly by users.
    pub fn new(commitment: BigUint, response: BigUint, nonce: BigUint) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            commitment,
            response,
            nonce,
        }
    }

    /// Returns the protocol version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the commitment `R`.
    pub fn commitment(&self) -> &BigUint {
        &self.commitment
    }

    /// Returns the response `s`.
    pub fn response(&self) -> &BigUint {
        &self.response
    }

    /// Returns the nonce.
    pub fn nonce(&self) -> &BigUint {
        &self.nonce
    }

    /// Splits the proof into `(commitment, response, nonce)`.
    pub fn into_parts(self) -> (BigUint, BigUint, BigUint) {
        (self.commitment, self.response, self.nonce)
    }

    /// Serializes the proof to bytes.
    ///
    /// Format: `[version (1 byte)][R_len (4 bytes)][R][s_len (4 bytes)][s][nonce_len (4 bytes)][nonce]`
    /// with every integer big-endian.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProof`] if a field is larger than
    /// [`Proof::from_bytes`] accepts, so every encoding produced here decodes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut result = vec![self.version];
        for (name, field) in self.fields() {
            let bytes = field.to_bytes_be();
            let len = u32::try_from(check_field_len(name, bytes.len())?)
                .map_err(|_| Error::InvalidProof(format!("Invalid {name} length")))?;
            result.extend_from_slice(&len.to_be_bytes());
            result.extend_from_slice(&bytes);
        }
        Ok(result)
    }

    /// Deserializes a proof from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProof`] for unknown versions, truncated input,
    /// oversized fields or trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&version, mut rest) = bytes
            .split_first()
            .ok_or_else(|| Error::InvalidProof("Empty proof".to_string()))?;

        check_version(version)?;

        let commitment = read_field(&mut rest, "commitment")?;
        let response = read_field(&mut rest, "response")?;
        let nonce = read_field(&mut rest, "nonce")?;

        if !rest.is_empty() {
            return Err(Error::InvalidProof(format!(
                "{} trailing bytes after proof",
                rest.len()
            )));
        }

        Ok(Self {
            version,
            commitment,
            response,
            nonce,
        })
    }

    /// Hex-encodes [`Proof::to_bytes`] for text transports.
    ///
    /// # Errors
    ///
    /// Fails like [`Proof::to_bytes`].
    pub fn to_hex(&self) -> Result<String> {
        self.to_bytes().map(hex::encode)
    }

    /// Decodes a proof produced by [`Proof::to_hex`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProof`] for malformed hex or a malformed encoding.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| Error::InvalidProof(format!("Invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    fn fields(&self) -> [(&'static str, &BigUint); 3] {
        [
            ("commitment", &self.commitment),
            ("response", &self.response),
            ("nonce", &self.nonce),
        ]
    }
}

/// Serde form of [`Proof`], checked on the way in.
#[derive(Deserialize)]
struct PackedProof {
    version: u8,
    commitment: BigUint,
    response: BigUint,
    nonce: BigUint,
}

impl TryFrom<PackedProof> for Proof {
    type Error = Error;

    fn try_from(packed: PackedProof) -> Result<Self> {
        check_version(packed.version)?;

        let proof = Self {
            version: packed.version,
            commitment: packed.commitment,
            response: packed.response,
            nonce: packed.nonce,
        };
        for (name, field) in proof.fields() {
            check_field_len(name, encoded_len(field))?;
        }
        Ok(proof)
    }
}

fn check_version(version: u8) -> Result<()> {
    if version != PROTOCOL_VERSION {
        return Err(Error::InvalidProof(format!(
            "Unsupported proof version: {version}"
        )));
    }
    Ok(())
}

fn check_field_len(name: &str, len: usize) -> Result<usize> {
    if len == 0 || len > MAX_FIELD_SIZE {
        return Err(Error::InvalidProof(format!("Invalid {name} length: {len}")));
    }
    Ok(len)
}

/// Length of `value.to_bytes_be()` without allocating it.
fn encoded_len(value: &BigUint) -> usize {
    usize::try_from(value.bits().div_ceil(8).max(1)).unwrap_or(usize::MAX)
}

fn read_field(input: &mut &[u8], name: &str) -> Result<BigUint> {
    if input.len() < 4 {
        return Err(Error::InvalidProof(format!(
            "Truncated proof: missing {name} length"
        )));
    }
    let (len_bytes, rest) = input.split_at(4);
    let len = u32::from_be_bytes(
        len_bytes
            .try_into()
            .unwrap_or_else(|_| unreachable!("Slice is exactly 4 bytes")),
    ) as usize;
    check_field_len(name, len)?;

    if rest.len() < len {
        return Err(Error::InvalidProof(format!(
            "Truncated proof: incomplete {name} data"
        )));
    }

    let (value, rest) = rest.split_at(len);
    *input = rest;
    Ok(BigUint::from_bytes_be(value))
}

#[cfg(test)]
mod tests {
    use num_traits::One;

    use super::*;

    fn sample() -> Proof {
        Proof::new(
            BigUint::from(0x0123_4567u32),
            BigUint::from(42u32),
            BigUint::from(7u32),
        )
    }

    #[test]
    fn encoding_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes[0], PROTOCOL_VERSION);
        assert_eq!(&bytes[1..5], &4u32.to_be_bytes());
        assert_eq!(&bytes[5..9], &[0x01, 0x23, 0x45, 0x67]);
        assert_eq!(bytes.len(), 1 + (4 + 4) + (4 + 1) + (4 + 1));
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = 9;
        assert!(matches!(
            Proof::from_bytes(&bytes),
            Err(Error::InvalidProof(msg)) if msg.contains("version")
        ));
    }

    #[test]
    fn rejects_truncation_and_trailing_bytes() {
        let bytes = sample().to_bytes().unwrap();
        assert!(Proof::from_bytes(&[]).is_err());
        for cut in 1..bytes.len() {
            assert!(Proof::from_bytes(&bytes[..cut]).is_err(), "cut at {cut}");
        }

        let mut extended = bytes.clone();
        extended.push(0);
        assert!(Proof::from_bytes(&extended).is_err());
    }

    #[test]
    fn hex_encoding() {
        let proof = sample();
        let encoded = proof.to_hex().unwrap();
        assert!(encoded.starts_with("0100000004"));
        assert_eq!(Proof::from_hex(&encoded).unwrap(), proof);
        assert!(matches!(
            Proof::from_hex("zz"),
            Err(Error::InvalidProof(msg)) if msg.contains("hex")
        ));
    }

    #[test]
    fn rejects_oversized_field() {
        let mut bytes = vec![PROTOCOL_VERSION];
        bytes.extend_from_slice(&((MAX_FIELD_SIZE as u32) + 1).to_be_bytes());
        assert!(matches!(
            Proof::from_bytes(&bytes),
            Err(Error::InvalidProof(msg)) if msg.contains("length")
        ));
    }

    #[test]
    fn refuses_to_encode_what_it_cannot_decode() {
        let widest = (BigUint::one() << (MAX_FIELD_SIZE * 8)) - 1u32;
        let proof = Proof::new(widest.clone(), BigUint::from(1u32), BigUint::from(1u32));
        let bytes = proof.to_bytes().unwrap();
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), proof);

        let oversized = Proof::new(widest + 1u32, BigUint::from(1u32), BigUint::from(1u32));
        assert!(matches!(
            oversized.to_bytes(),
            Err(Error::InvalidProof(msg)) if msg.contains("commitment length")
        ));
        assert!(oversized.to_hex().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let proof = sample();
        let bytes = bincode::serialize(&proof).unwrap();
        assert_eq!(bincode::deserialize::<Proof>(&bytes).unwrap(), proof);
    }

    #[test]
    fn serde_rejects_unknown_version() {
        let mut bytes = bincode::serialize(&sample()).unwrap();
        // bincode writes the fields in order, so the version comes first
        assert_eq!(bytes[0], PROTOCOL_VERSION);
        bytes[0] = 9;

        let err = bincode::deserialize::<Proof>(&bytes).unwrap_err();
        assert!(err.to_string().contains("version"), "{err}");
    }

    #[test]
    fn serde_rejects_oversized_field() {
        let oversized = Proof::new(
            BigUint::from(1u32),
            BigUint::one() << (MAX_FIELD_SIZE * 8),
            BigUint::from(1u32),
        );
        let bytes = bincode::serialize(&oversized).unwrap();

        let err = bincode::deserialize::<Proof>(&bytes).unwrap_err();
        assert!(err.to_string().contains("response length"), "{err}");
    }
}
