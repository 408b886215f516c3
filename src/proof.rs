//! Membership proofs and their verification.
//!
//! A proof for element `x` is the accumulator value with `x` removed,
//! `π = a^(1/prime(x)) mod n`, and checks out when `π^prime(x) ≡ a (mod n)`.
//! Verification only touches public data: the factorization never leaves the
//! prover.
//!
//! Proofs carry the prime representative and the nonce that produced it.
//! The verifier replays exactly one hash for that nonce instead of searching,
//! so there is no ambiguity about which prime was used.

use crate::codec::hex_biguint;
use crate::error::Result;
use crate::hashing::{hash_to_prime, hash_to_prime_at};
use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// Witness that `key` is accumulated in `accumulator_value`.
///
/// Contains no secret material and is safe to hand to third parties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipProof {
    /// Element whose membership is proven.
    #[serde(with = "hex_biguint")]
    pub key: BigUint,
    /// Accumulator value at the time the proof was created.
    #[serde(with = "hex_biguint")]
    pub accumulator_value: BigUint,
    /// The accumulator value without `key`.
    #[serde(with = "hex_biguint")]
    pub proof_value: BigUint,
    /// RSA modulus of the accumulator.
    #[serde(with = "hex_biguint")]
    pub modulus: BigUint,
    /// Prime representative of `key`.
    #[serde(with = "hex_biguint")]
    pub prime: BigUint,
    /// Nonce that maps `key` to `prime`.
    #[serde(with = "hex_biguint")]
    pub nonce: BigUint,
}

impl MembershipProof {
    /// Checks this proof; see [`verify_proof`].
    pub fn verify(&self) -> bool {
        verify_proof(self)
    }

    /// Serializes the proof to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::Decode`](crate::AccumulatorError::Decode)
    /// if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a proof from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::Decode`](crate::AccumulatorError::Decode)
    /// for malformed input.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Verifies a membership proof using public information only.
///
/// Replays `hash_to_prime_at(key, nonce)`, requires it to match the carried
/// prime, and checks `proof_value^prime mod modulus == accumulator_value`.
/// Unreduced proof values and degenerate moduli are rejected.
pub fn verify_proof(proof: &MembershipProof) -> bool {
    if proof.modulus <= BigUint::one() || proof.proof_value >= proof.modulus {
        return false;
    }
    match hash_to_prime_at(&proof.key, &proof.nonce) {
        Some(prime) if prime == proof.prime => {}
        _ => return false,
    }
    proof.proof_value.modpow(&proof.prime, &proof.modulus) == proof.accumulator_value
}

/// Four-field verification: recomputes the canonical prime of `key` (the
/// search from nonce zero that [`Accumulator::add`](crate::Accumulator::add)
/// performs) and checks `proof_value^prime mod modulus == accumulator_value`.
pub fn verify_membership(
    proof_value: &BigUint,
    key: &BigUint,
    modulus: &BigUint,
    accumulator_value: &BigUint,
) -> bool {
    if *modulus <= BigUint::one() || proof_value >= modulus {
        return false;
    }
    match hash_to_prime(key) {
        Ok(rep) => proof_value.modpow(&rep.prime, modulus) == *accumulator_value,
        Err(_) => false,
    }
}
