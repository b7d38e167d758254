//! ECDSA capability over secp256k1.
//!
//! [`Ecc`] owns the curve context. It is built once by the caller and passed by
//! reference to whatever needs to parse keys or check signatures; there is no
//! process-wide context.

use crate::SigHash;
use crate::address;
use bitcoin::secp256k1::{self, All, Message, PublicKey, Secp256k1, SecretKey, ecdsa};

/// ECC error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EccError {
    #[error("invalid SEC public key: {0}")]
    InvalidPoint(secp256k1::Error),
    #[error("invalid DER signature: {0}")]
    InvalidSignature(secp256k1::Error),
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(secp256k1::Error),
}

/// A point on the curve, i.e. a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point(PublicKey);

impl Point {
    /// SEC encoding, 33 bytes compressed or 65 bytes uncompressed.
    pub fn sec(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.0.serialize().to_vec()
        } else {
            self.0.serialize_uncompressed().to_vec()
        }
    }

    /// HASH160 of the SEC encoding.
    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        crate::hash::hash160(&self.sec(compressed))
    }

    pub fn address(&self, compressed: bool, testnet: bool) -> String {
        address::p2pkh_address(&self.hash160(compressed), testnet)
    }
}

/// An ECDSA signature with its S value normalized to the lower half order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(ecdsa::Signature);

impl Signature {
    /// Strict DER encoding.
    pub fn der(&self) -> Vec<u8> {
        self.0.serialize_der().to_vec()
    }
}

/// A secp256k1 secret scalar.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey(SecretKey);

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl PrivateKey {
    /// Parses a 32-byte big-endian secret.
    pub fn from_slice(secret: &[u8]) -> Result<Self, EccError> {
        SecretKey::from_slice(secret)
            .map(Self)
            .map_err(EccError::InvalidSecretKey)
    }

    /// Builds a key from a small integer secret.
    pub fn from_u64(secret: u64) -> Result<Self, EccError> {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&secret.to_be_bytes());
        Self::from_slice(&bytes)
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.0.secret_bytes()
    }

    /// Wallet Import Format encoding.
    pub fn wif(&self, compressed: bool, testnet: bool) -> String {
        address::wif(&self.secret_bytes(), compressed, testnet)
    }
}

/// Signature parsing, verification and signing over an explicit curve context.
pub struct Ecc {
    secp: Secp256k1<All>,
}

impl Default for Ecc {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ecc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ecc").finish_non_exhaustive()
    }
}

impl Ecc {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Parses a SEC-encoded public key.
    pub fn parse_point(&self, sec: &[u8]) -> Result<Point, EccError> {
        PublicKey::from_slice(sec)
            .map(Point)
            .map_err(EccError::InvalidPoint)
    }

    /// Parses a DER signature without the trailing sighash byte.
    ///
    /// Parsing is lax, matching what historical transactions carry on chain, and
    /// high-S signatures are normalized so that either form verifies.
    pub fn parse_signature(&self, der: &[u8]) -> Result<Signature, EccError> {
        let mut sig = ecdsa::Signature::from_der_lax(der).map_err(EccError::InvalidSignature)?;
        sig.normalize_s();
        Ok(Signature(sig))
    }

    pub fn verify(&self, point: &Point, z: &SigHash, sig: &Signature) -> bool {
        let msg = Message::from_digest(*z);
        self.secp.verify_ecdsa(&msg, &sig.0, &point.0).is_ok()
    }

    /// Deterministic (RFC6979) signature over `z`.
    pub fn sign(&self, key: &PrivateKey, z: &SigHash) -> Signature {
        let msg = Message::from_digest(*z);
        Signature(self.secp.sign_ecdsa(&msg, &key.0))
    }

    pub fn public_key(&self, key: &PrivateKey) -> Point {
        Point(PublicKey::from_secret_key(&self.secp, &key.0))
    }
}
