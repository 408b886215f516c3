#![deny(missing_docs)]

//! # rsa_accumulator
//!
//! A strong-RSA cryptographic accumulator: a constant-size commitment to a
//! set of integers, with constant-size membership proofs.
//!
//! The accumulator lives in the group of units modulo `n = p·q`, where `p`
//! and `q` are safe primes.  Every element is mapped to a prime through a
//! deterministic hash-to-prime search, and the accumulator value is the
//! generator raised to the product of those primes.  The party that
//! generated the modulus keeps the factorization, which lets it delete
//! elements and issue proofs with a single modular exponentiation each.
//! Verifiers only need the public modulus.
//!
//! ## Features
//!
//! * **Accumulator state machine**: [`Accumulator`] with `add`, `delete`,
//!   `create_proof` and `is_member`.  Transitions consume the accumulator
//!   and return its successor; clones are cheap snapshots.
//! * **Membership proofs**: [`MembershipProof`], checked by
//!   [`verify_proof`] or the four-field [`verify_membership`] without any
//!   secret material.
//! * **Safe-prime generation**: [`generate_safe_prime`] and
//!   [`generate_distinct_safe_primes`], deterministic per seed, with
//!   `*_with_rng` variants for caller-supplied entropy.
//! * **Number theory**: [`is_probable_prime`] (Miller–Rabin),
//!   [`extended_euclid`] and [`inverse_mod`].
//! * **Hashing**: [`hash_to_prime`] and [`hash_to_big_integer`] over SHA-256.
//! * **Seeded randomness**: [`SimplePrng`], a BLAKE2b stream that implements
//!   [`rand::RngCore`].
//!
//! ## Usage
//!
//! ```rust
//! use rsa_accumulator::{hash_str_to_big_integer, Accumulator, AccumulatorParams};
//!
//! // Small parameters keep the doctest fast; production uses the defaults.
//! let params = AccumulatorParams::testing();
//! let acc = Accumulator::bootstrap(&params, 1, 2, 3).unwrap();
//!
//! let alice = hash_str_to_big_integer("alice");
//! let (acc, alice) = acc.add(alice).unwrap();
//! let proof = acc.create_proof(&alice).unwrap();
//! assert!(acc.public_state().verify(&proof));
//!
//! let (acc, _) = acc.delete(alice.clone()).unwrap();
//! assert!(!acc.is_member(&alice));
//! assert_eq!(acc.value(), acc.generator());
//! ```
//!
//! Seed-derived moduli are only as secret as their seeds.  Use
//! [`Accumulator::bootstrap_with_rng`] with an OS-backed RNG, or feed the
//! seeds from a high-entropy source, for anything beyond testing.

mod accumulator;
mod codec;
mod error;
mod hashing;
mod modular;
mod params;
mod primality;
mod primes;
mod prng;
mod proof;

pub use accumulator::{Accumulator, PublicState};
pub use codec::{decode_biguint, encode_biguint};
pub use error::{AccumulatorError, Result};
pub use hashing::{
    hash_str_to_big_integer, hash_to_big_integer, hash_to_prime, hash_to_prime_at,
    hash_to_prime_from, PrimeRepresentative, DEFAULT_HASH_ATTEMPTS, HASH_PRIME_CERTAINTY,
};
pub use modular::{extended_euclid, inverse_mod, ExtendedGcd};
pub use params::{AccumulatorParams, DEFAULT_CERTAINTY, DEFAULT_PRIME_BITS, MIN_PRIME_BITS};
pub use primality::is_probable_prime;
pub use primes::{
    generate_distinct_safe_primes, generate_distinct_safe_primes_with_rng,
    generate_probable_prime, generate_safe_prime, generate_safe_prime_with_rng, SafePrime,
};
pub use prng::{random_big_integer, random_big_integer_checked, SimplePrng};
pub use proof::{verify_membership, verify_proof, MembershipProof};
