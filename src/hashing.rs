//! Hashing helpers that map elements into the accumulator's exponent space.
//!
//! An element enters the accumulator through its *prime representative*:
//! SHA-256 of the big-endian encoding of `element + nonce`, read as an
//! unsigned integer, for the first nonce (counting up from zero) whose
//! digest is a probable prime.  The search is not invertible, so the nonce
//! is kept alongside the element and replayed later with
//! [`hash_to_prime_at`].

use crate::error::{AccumulatorError, Result};
use crate::primality::is_probable_prime;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::{Digest, Sha256};

/// Miller–Rabin rounds applied to hash-to-prime candidates.
pub const HASH_PRIME_CERTAINTY: u32 = 32;

/// Nonce budget used by [`hash_to_prime`].
pub const DEFAULT_HASH_ATTEMPTS: u64 = 100_000;

/// A prime representative together with the nonce that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimeRepresentative {
    /// Probable prime derived from the element.
    pub prime: BigUint,
    /// Nonce added to the element before hashing.
    pub nonce: BigUint,
}

/// Evaluates a single nonce: returns the digest of `element + nonce` when it
/// is a non-zero probable prime, `None` otherwise.
pub fn hash_to_prime_at(element: &BigUint, nonce: &BigUint) -> Option<BigUint> {
    let shifted = element + nonce;
    let candidate = BigUint::from_bytes_be(&Sha256::digest(shifted.to_bytes_be()));
    if !candidate.is_zero() && is_probable_prime(&candidate, HASH_PRIME_CERTAINTY) {
        Some(candidate)
    } else {
        None
    }
}

/// Searches nonces `start_nonce, start_nonce + 1, …` for a prime digest.
///
/// # Errors
///
/// Returns [`AccumulatorError::PrimeGenerationExhausted`] if none of the
/// first `max_attempts` nonces yields a prime.
pub fn hash_to_prime_from(
    element: &BigUint,
    start_nonce: &BigUint,
    max_attempts: u64,
) -> Result<PrimeRepresentative> {
    let mut nonce = start_nonce.clone();
    for _ in 0..max_attempts {
        if let Some(prime) = hash_to_prime_at(element, &nonce) {
            return Ok(PrimeRepresentative { prime, nonce });
        }
        nonce += BigUint::one();
    }
    Err(AccumulatorError::PrimeGenerationExhausted {
        attempts: max_attempts,
    })
}

/// Maps `element` to its canonical prime representative (search from nonce zero).
///
/// # Errors
///
/// Returns [`AccumulatorError::PrimeGenerationExhausted`] after
/// [`DEFAULT_HASH_ATTEMPTS`] nonces.
pub fn hash_to_prime(element: &BigUint) -> Result<PrimeRepresentative> {
    hash_to_prime_from(element, &BigUint::zero(), DEFAULT_HASH_ATTEMPTS)
}

/// Hashes an arbitrary message with SHA-256 and reads the digest as an integer.
///
/// Used to turn opaque identities into accumulator elements.
pub fn hash_to_big_integer(message: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(message))
}

/// [`hash_to_big_integer`] over the UTF-8 bytes of `message`.
pub fn hash_str_to_big_integer(message: &str) -> BigUint {
    hash_to_big_integer(message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{
        hash_str_to_big_integer, hash_to_big_integer, hash_to_prime, hash_to_prime_at,
        hash_to_prime_from, HASH_PRIME_CERTAINTY,
    };
    use crate::error::AccumulatorError;
    use crate::primality::is_probable_prime;
    use num_bigint::BigUint;

    fn from_hex(text: &str) -> BigUint {
        BigUint::parse_bytes(text.as_bytes(), 16).unwrap()
    }

    #[test]
    fn test_hash_to_big_integer_known_vectors() {
        assert_eq!(
            hash_to_big_integer(b""),
            from_hex("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_eq!(
            hash_str_to_big_integer("a"),
            from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb")
        );
    }

    #[test]
    fn test_hash_to_prime_is_prime_and_replayable() {
        for word in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            let element = hash_str_to_big_integer(word);
            let rep = hash_to_prime(&element).unwrap();
            assert!(is_probable_prime(&rep.prime, HASH_PRIME_CERTAINTY));
            assert_eq!(hash_to_prime_at(&element, &rep.nonce), Some(rep.prime.clone()));
            assert_eq!(hash_to_prime(&element).unwrap(), rep);
        }
    }

    #[test]
    fn test_earlier_nonces_are_not_prime() {
        let element = BigUint::from(12_345u32);
        let rep = hash_to_prime(&element).unwrap();
        let mut nonce = BigUint::default();
        while nonce < rep.nonce {
            assert_eq!(hash_to_prime_at(&element, &nonce), None);
            nonce += 1u8;
        }
    }

    #[test]
    fn test_search_from_stored_nonce_is_immediate() {
        let element = BigUint::from(3u8);
        let rep = hash_to_prime(&element).unwrap();
        let replay = hash_to_prime_from(&element, &rep.nonce, 1).unwrap();
        assert_eq!(replay, rep);
    }

    #[test]
    fn test_distinct_elements_get_distinct_primes() {
        let a = hash_to_prime(&hash_str_to_big_integer("alice")).unwrap();
        let b = hash_to_prime(&hash_str_to_big_integer("bob")).unwrap();
        assert_ne!(a.prime, b.prime);
    }

    #[test]
    fn test_zero_budget_exhausts() {
        let err = hash_to_prime_from(&BigUint::from(1u8), &BigUint::default(), 0).unwrap_err();
        assert_eq!(err, AccumulatorError::PrimeGenerationExhausted { attempts: 0 });
    }
}
