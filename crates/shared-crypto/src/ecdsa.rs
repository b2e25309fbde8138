//! # secp256k1 Keys
//!
//! Keys and signatures for test identities. Signing hashes the message with
//! SHA-256 and uses RFC 6979 nonces, so the same key and message always give
//! the same low-S signature. Public keys travel in 33-byte compressed form.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::Address;
use zeroize::Zeroize;

use crate::CryptoError;

pub const PUBLIC_KEY_LEN: usize = 33;
pub const SIGNATURE_LEN: usize = 64;
pub const SECRET_KEY_LEN: usize = 32;

#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Secp256k1PublicKey(#[serde_as(as = "Bytes")] [u8; PUBLIC_KEY_LEN]);

impl Secp256k1PublicKey {
    /// Parse compressed SEC1 bytes. The point must lie on the curve.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let key = Self::verifying_key_from(bytes)?;
        Ok(Self::from_verifying_key(&key))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    pub fn to_address(&self) -> Address {
        Address::derive(&self.0)
    }

    pub fn verify(&self, message: &[u8], signature: &Secp256k1Signature) -> Result<(), CryptoError> {
        let key = Self::verifying_key_from(&self.0)?;
        let signature = Signature::from_slice(&signature.0).map_err(|_| CryptoError::InvalidSignature)?;
        key.verify(message, &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }

    fn verifying_key_from(bytes: &[u8]) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out.copy_from_slice(key.to_encoded_point(true).as_bytes());
        Self(out)
    }
}

/// Compact `r || s` signature.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secp256k1Signature(#[serde_as(as = "Bytes")] [u8; SIGNATURE_LEN]);

impl Secp256k1Signature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        <[u8; SIGNATURE_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

/// A signing key with its public half precomputed.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    public_key: Secp256k1PublicKey,
}

impl Secp256k1KeyPair {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Key drawn from `rng`; a seeded rng reproduces the key.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_signing_key(SigningKey::random(rng))
    }

    /// Import a raw secret scalar. `secret` is wiped before returning.
    pub fn from_secret(mut secret: [u8; SECRET_KEY_LEN]) -> Result<Self, CryptoError> {
        let parsed = SigningKey::from_bytes((&secret).into());
        secret.zeroize();
        parsed
            .map(Self::from_signing_key)
            .map_err(|_| CryptoError::InvalidPrivateKey)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = Secp256k1PublicKey::from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    pub fn public_key(&self) -> Secp256k1PublicKey {
        self.public_key
    }

    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        let signature: Signature = self.signing_key.sign(message);
        Secp256k1Signature(signature.to_bytes().into())
    }
}
