//! # Test Identities
//!
//! A keypair plus the address derived from its public key. Identities are
//! created fresh per test and live only as long as the process.

use std::fmt;

use rand::{CryptoRng, RngCore};
use shared_types::Address;

use crate::ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};

/// A signing identity.
///
/// Two identities are equal iff their addresses match.
#[derive(Clone)]
pub struct Identity {
    keypair: Secp256k1KeyPair,
    address: Address,
}

impl Identity {
    /// New identity with a random private key.
    pub fn generate() -> Self {
        Self::from_keypair(Secp256k1KeyPair::generate())
    }

    /// New identity drawn from `rng`.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_keypair(Secp256k1KeyPair::generate_with(rng))
    }

    /// Wrap an existing keypair.
    pub fn from_keypair(keypair: Secp256k1KeyPair) -> Self {
        let address = keypair.public_key().to_address();
        Self { keypair, address }
    }

    /// Account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Public key, used for verification and sign-doc construction.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        self.keypair.public_key()
    }

    /// Signing handle. The private key is never exposed for anything else.
    pub fn private_key(&self) -> PrivateKey<'_> {
        PrivateKey(&self.keypair)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Identity {}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Borrowed signing capability of an [`Identity`].
pub struct PrivateKey<'a>(&'a Secp256k1KeyPair);

impl PrivateKey<'_> {
    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        self.0.sign(message)
    }
}
