use thiserror::Error;

/// Failures from key handling and signature checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("secp256k1 signature does not verify")]
    SignatureVerificationFailed,

    #[error("not a compressed secp256k1 public key")]
    InvalidPublicKey,

    #[error("secret scalar out of range")]
    InvalidPrivateKey,

    #[error("malformed compact signature")]
    InvalidSignature,

    /// Raw key material had the wrong size.
    #[error("key is {actual} bytes, want {expected}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
