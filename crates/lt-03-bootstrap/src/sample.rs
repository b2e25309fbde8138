//! Random sample values for tests.
//!
//! Every generator takes the RNG explicitly; use [`seeded`] for
//! reproducible runs.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use lt_02_ledger_modules::staking::{BondStatus, Delegation, Description, Validator};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_crypto::Identity;
use shared_types::{Address, Coin, Coins};

const MAX_SAMPLE_DURATION: Duration = Duration::from_secs(21 * 24 * 60 * 60);

/// Deterministic RNG.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// RNG seeded from the OS.
pub fn rng() -> StdRng {
    StdRng::from_entropy()
}

pub fn bool<R: Rng>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}

pub fn uint64<R: Rng>(rng: &mut R) -> u64 {
    rng.gen_range(0..10_000)
}

/// Alphanumeric string of length `n`.
pub fn string<R: Rng>(rng: &mut R, n: usize) -> String {
    Alphanumeric.sample_string(rng, n)
}

pub fn bytes<R: Rng>(rng: &mut R, n: usize) -> Vec<u8> {
    string(rng, n).into_bytes()
}

/// Lowercase ASCII letters only.
pub fn alpha_string<R: Rng>(rng: &mut R, n: usize) -> String {
    (0..n).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Digits and punctuation only.
pub fn non_alpha_string<R: Rng>(rng: &mut R, n: usize) -> String {
    const CHARSET: &[u8] = b"0123456789!@#$%^&*()_+";
    (0..n)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Random account address.
pub fn address<R: Rng>(rng: &mut R) -> Address {
    let mut seed = [0u8; 32];
    rng.fill(&mut seed);
    Address::derive(&seed)
}

/// A full identity drawn from `rng`.
pub fn identity<R: Rng + rand::CryptoRng>(rng: &mut R) -> Identity {
    Identity::generate_with(rng)
}

/// Coin with a random five-letter denom and an amount in `1..=10_000`.
pub fn coin<R: Rng>(rng: &mut R) -> Coin {
    Coin::new(alpha_string(rng, 5), rng.gen_range(1..=10_000))
}

/// Coin with a random denom and an amount in `min..max`.
pub fn coin_with_range<R: Rng>(rng: &mut R, min: u128, max: u128) -> Coin {
    Coin::new(alpha_string(rng, 5), rng.gen_range(min..max))
}

pub fn coin_with_range_amount<R: Rng>(rng: &mut R, denom: &str, min: u128, max: u128) -> Coin {
    Coin::new(denom, rng.gen_range(min..max))
}

/// Three random coins. Denoms may collide, in which case amounts are summed.
pub fn coins<R: Rng>(rng: &mut R) -> Coins {
    Coins::new([coin(rng), coin(rng), coin(rng)]).unwrap_or_default()
}

pub fn coins_with_range<R: Rng>(rng: &mut R, min: u128, max: u128) -> Coins {
    Coins::new([
        coin_with_range(rng, min, max),
        coin_with_range(rng, min, max),
        coin_with_range(rng, min, max),
    ])
    .unwrap_or_default()
}

/// Between one second and 21 days.
pub fn duration<R: Rng>(rng: &mut R) -> Duration {
    duration_from_range(rng, Duration::from_secs(1), MAX_SAMPLE_DURATION)
}

pub fn duration_from_range<R: Rng>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    rng.gen_range(min..max)
}

/// A time within the first second after the epoch.
pub fn time<R: Rng>(rng: &mut R) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(rng.gen_range(1..=1000))
        .single()
        .unwrap_or_default()
}

pub fn zero_time() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Bonded validator with random operator, key and power.
pub fn validator<R: Rng>(rng: &mut R) -> Validator {
    let tokens = rng.gen_range(1..=10_000u128);
    let mut pubkey = vec![0u8; 33];
    rng.fill(pubkey.as_mut_slice());
    Validator {
        operator_address: address(rng),
        consensus_pubkey: pubkey,
        description: Description::new(alpha_string(rng, 8)),
        status: BondStatus::Bonded,
        tokens,
        delegator_shares: tokens,
        commission_rate_bps: rng.gen_range(0..=2_000),
        min_self_delegation: 1,
    }
}

/// Delegation from `delegator` to a random validator.
pub fn delegation<R: Rng>(rng: &mut R, delegator: Address) -> Delegation {
    Delegation {
        delegator_address: delegator,
        validator_address: address(rng),
        shares: rng.gen_range(0..10_000),
    }
}
