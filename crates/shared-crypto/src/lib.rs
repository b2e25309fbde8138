//! # Shared Crypto
//!
//! Signing primitives for test identities.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Transaction signing |
//! | `identity` | secp256k1 + SHA-256 | Test accounts (key + derived address) |
//! | `hashing` | SHA-256 | Sign-doc and transaction hashes |

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod identity;

pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_hex};
pub use identity::{Identity, PrivateKey};

