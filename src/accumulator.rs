//! The RSA accumulator state machine.
//!
//! An [`Accumulator`] represents a set through a single group element
//! `a = a₀^(∏ prime(e)) mod n`, where `n = p·q` is a product of two safe
//! primes and `a₀` is a quadratic residue fixed at construction.
//!
//! * **Add** raises `a` to the new element's prime: one modular
//!   exponentiation regardless of set size.
//! * **Delete** raises `a` to the inverse of the prime modulo the totient
//!   `(p-1)(q-1)`.  Knowing the factorization (the *trapdoor*) is what keeps
//!   deletion independent of how many elements are accumulated.
//! * **Create proof** performs the same trapdoor exponentiation without
//!   changing the state: the accumulator without `x` is exactly the witness
//!   that `x` is in it.
//!
//! Every transition consumes the accumulator and returns its successor.
//! Clone first to keep the predecessor; cloning is cheap because the
//! trapdoor and the witness map are shared behind [`Arc`], and the map is
//! only copied when a shared snapshot is updated.
//!
//! The accumulator is a single-writer state machine.  Callers sharing one
//! instance between producers must serialize `add`/`delete` themselves.

use crate::codec::hex_biguint;
use crate::error::{AccumulatorError, Result};
use crate::hashing::{hash_to_prime_from, PrimeRepresentative};
use crate::modular::inverse_mod;
use crate::params::AccumulatorParams;
use crate::primality::is_probable_prime;
use crate::primes::{generate_distinct_safe_primes, generate_distinct_safe_primes_with_rng};
use crate::prng::random_big_integer;
use crate::proof::{verify_proof, MembershipProof};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The secret factorization of the modulus.
///
/// Limbs are overwritten with zeros when the last handle is dropped.
struct Trapdoor {
    factor_p: BigUint,
    factor_q: BigUint,
    totient: BigUint,
}

impl Trapdoor {
    fn new(factor_p: BigUint, factor_q: BigUint) -> Self {
        let totient = (&factor_p - 1u8) * (&factor_q - 1u8);
        Self {
            factor_p,
            factor_q,
            totient,
        }
    }
}

impl fmt::Debug for Trapdoor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Trapdoor { .. }")
    }
}

impl Drop for Trapdoor {
    fn drop(&mut self) {
        scrub(&mut self.factor_p);
        scrub(&mut self.factor_q);
        scrub(&mut self.totient);
    }
}

/// Overwrites the limbs of `value` in place before it is released.
///
/// `BigUint` has no zeroize hook; `assign_from_slice` reuses the existing
/// allocation, so writing a zero slice of the same width clears it.
fn scrub(value: &mut BigUint) {
    let width = ((value.bits() + 31) / 32) as usize;
    value.assign_from_slice(&vec![0u32; width]);
}

/// Publishable view of an accumulator: modulus, generator and current value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicState {
    /// RSA modulus.
    #[serde(with = "hex_biguint")]
    pub modulus: BigUint,
    /// Empty-set value fixed at construction.
    #[serde(with = "hex_biguint")]
    pub generator: BigUint,
    /// Current accumulator value.
    #[serde(with = "hex_biguint")]
    pub value: BigUint,
}

impl PublicState {
    /// Checks that `proof` was issued against this exact state and verifies it.
    pub fn verify(&self, proof: &MembershipProof) -> bool {
        proof.modulus == self.modulus
            && proof.accumulator_value == self.value
            && verify_proof(proof)
    }

    /// Serializes the state to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::Decode`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a state from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::Decode`] for malformed input.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// An RSA accumulator snapshot.
///
/// Holds the public modulus and generator, the current value, the
/// element → nonce map needed to replay prime representatives, and (until
/// [`discard_trapdoor`](Self::discard_trapdoor)) the secret factorization.
#[derive(Clone)]
pub struct Accumulator {
    modulus: BigUint,
    generator: BigUint,
    value: BigUint,
    trapdoor: Option<Arc<Trapdoor>>,
    witness_data: Arc<HashMap<BigUint, BigUint>>,
    max_hash_attempts: u64,
}

impl fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("modulus_bits", &self.modulus.bits())
            .field("value", &self.value)
            .field("elements", &self.witness_data.len())
            .field("has_trapdoor", &self.trapdoor.is_some())
            .finish()
    }
}

impl PartialEq for Accumulator {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus
            && self.generator == other.generator
            && self.value == other.value
            && *self.witness_data == *other.witness_data
    }
}

impl Eq for Accumulator {}

impl Accumulator {
    /// Bootstraps an accumulator with the default 3072-bit parameters.
    ///
    /// Seeds make construction reproducible.  They are the only entropy, so
    /// a deployment must feed them from a high-entropy source or use
    /// [`bootstrap_with_rng`](Self::bootstrap_with_rng).
    ///
    /// # Errors
    ///
    /// Propagates prime-generation and sampling failures.
    pub fn new(seed1: u64, seed2: u64, seed3: u64) -> Result<Self> {
        Self::bootstrap(&AccumulatorParams::default(), seed1, seed2, seed3)
    }

    /// Bootstraps an accumulator from three seeds.
    ///
    /// `seed1` and `seed2` drive the two safe-prime searches and `seed3`
    /// samples the generator root `r ∈ (0, n)`; the generator is `r² mod n`.
    /// Identical inputs produce bit-identical accumulators.
    ///
    /// # Errors
    ///
    /// * [`AccumulatorError::InvalidParameters`] if `params` fails validation.
    /// * [`AccumulatorError::PrimeGenerationExhausted`] /
    ///   [`AccumulatorError::SamplingExhausted`] when a search cap is hit.
    pub fn bootstrap(
        params: &AccumulatorParams,
        seed1: u64,
        seed2: u64,
        seed3: u64,
    ) -> Result<Self> {
        params.validate()?;
        let (p, q) = generate_distinct_safe_primes(
            params.prime_bits,
            seed1,
            seed2,
            params.certainty,
            params.max_prime_attempts,
        )?;
        let modulus = &p * &q;
        let generator = seeded_generator(&modulus, seed3, params.max_sample_attempts)?;
        log::debug!("bootstrapped {}-bit accumulator from seeds", modulus.bits());
        Ok(Self::assemble(Trapdoor::new(p, q), modulus, generator, params))
    }

    /// Bootstraps an accumulator from a caller-supplied cryptographic RNG.
    ///
    /// # Errors
    ///
    /// Same as [`bootstrap`](Self::bootstrap).
    pub fn bootstrap_with_rng<R: RngCore + CryptoRng + ?Sized>(
        params: &AccumulatorParams,
        rng: &mut R,
    ) -> Result<Self> {
        params.validate()?;
        let (p, q) = generate_distinct_safe_primes_with_rng(
            params.prime_bits,
            params.certainty,
            params.max_prime_attempts,
            rng,
        )?;
        let modulus = &p * &q;
        let mut generator = None;
        for _ in 0..params.max_sample_attempts {
            let root = rng.gen_biguint_range(&BigUint::one(), &modulus);
            if let Some(candidate) = square_if_generator(&root, &modulus) {
                generator = Some(candidate);
                break;
            }
        }
        let generator = generator.ok_or(AccumulatorError::SamplingExhausted {
            attempts: params.max_sample_attempts,
        })?;
        log::debug!("bootstrapped {}-bit accumulator from caller rng", modulus.bits());
        Ok(Self::assemble(Trapdoor::new(p, q), modulus, generator, params))
    }

    /// Builds an accumulator from known factors.
    ///
    /// The factors must be distinct probable primes (at `params.certainty`);
    /// the generator is sampled from `generator_seed` as in
    /// [`bootstrap`](Self::bootstrap).
    ///
    /// # Errors
    ///
    /// * [`AccumulatorError::InvalidParameters`] for equal or composite factors.
    /// * [`AccumulatorError::SamplingExhausted`] if no generator is found.
    pub fn from_factors(
        factor_p: BigUint,
        factor_q: BigUint,
        generator_seed: u64,
        params: &AccumulatorParams,
    ) -> Result<Self> {
        if factor_p == factor_q {
            return Err(AccumulatorError::InvalidParameters(
                "factors must be distinct".to_string(),
            ));
        }
        for factor in [&factor_p, &factor_q] {
            if !is_probable_prime(factor, params.certainty) {
                return Err(AccumulatorError::InvalidParameters(format!(
                    "factor {factor} is not prime"
                )));
            }
        }
        let modulus = &factor_p * &factor_q;
        let generator = seeded_generator(&modulus, generator_seed, params.max_sample_attempts)?;
        Ok(Self::assemble(
            Trapdoor::new(factor_p, factor_q),
            modulus,
            generator,
            params,
        ))
    }

    fn assemble(
        trapdoor: Trapdoor,
        modulus: BigUint,
        generator: BigUint,
        params: &AccumulatorParams,
    ) -> Self {
        Self {
            value: generator.clone(),
            modulus,
            generator,
            trapdoor: Some(Arc::new(trapdoor)),
            witness_data: Arc::new(HashMap::new()),
            max_hash_attempts: params.max_hash_attempts,
        }
    }

    /// Accumulates `element`.
    ///
    /// Returns the successor state and the element.  Adding an element that
    /// is already present returns the state unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::PrimeGenerationExhausted`] if no prime
    /// representative is found within the hash-attempt cap.
    pub fn add(self, element: impl Into<BigUint>) -> Result<(Self, BigUint)> {
        let element = element.into();
        if self.witness_data.contains_key(&element) {
            return Ok((self, element));
        }
        let rep = hash_to_prime_from(&element, &BigUint::zero(), self.max_hash_attempts)?;
        let mut next = self;
        next.value = next.value.modpow(&rep.prime, &next.modulus);
        log::trace!("added element {:x} with nonce {}", element, rep.nonce);
        Arc::make_mut(&mut next.witness_data).insert(element.clone(), rep.nonce);
        Ok((next, element))
    }

    /// Removes `element` using the trapdoor.
    ///
    /// The new value is `a^(prime⁻¹ mod φ(n)) mod n`, exactly the value the
    /// accumulator would hold had `element` never been added.  Removing an
    /// absent element returns the state unchanged.
    ///
    /// # Errors
    ///
    /// * [`AccumulatorError::MissingTrapdoor`] after [`discard_trapdoor`](Self::discard_trapdoor).
    /// * [`AccumulatorError::NotCoprime`] if the prime divides the totient.
    pub fn delete(self, element: impl Into<BigUint>) -> Result<(Self, BigUint)> {
        let element = element.into();
        let nonce = match self.witness_data.get(&element) {
            Some(nonce) => nonce.clone(),
            None => return Ok((self, element)),
        };
        let (_, without) = self.value_without(&element, &nonce)?;
        let mut next = self;
        next.value = without;
        log::trace!("deleted element {:x}", element);
        Arc::make_mut(&mut next.witness_data).remove(&element);
        Ok((next, element))
    }

    /// Creates a membership proof for `element`.
    ///
    /// The proof value is what [`delete`](Self::delete) would produce; the
    /// accumulator itself is left untouched.
    ///
    /// # Errors
    ///
    /// * [`AccumulatorError::NotMember`] if `element` was never added.
    /// * [`AccumulatorError::MissingTrapdoor`] after [`discard_trapdoor`](Self::discard_trapdoor).
    /// * [`AccumulatorError::NotCoprime`] if the prime divides the totient.
    pub fn create_proof(&self, element: &BigUint) -> Result<MembershipProof> {
        let nonce = self
            .witness_data
            .get(element)
            .ok_or_else(|| AccumulatorError::NotMember {
                element: element.clone(),
            })?;
        let (rep, proof_value) = self.value_without(element, nonce)?;
        log::trace!("created proof for element {:x}", element);
        Ok(MembershipProof {
            key: element.clone(),
            accumulator_value: self.value.clone(),
            proof_value,
            modulus: self.modulus.clone(),
            prime: rep.prime,
            nonce: rep.nonce,
        })
    }

    /// Replays the prime of `element` at its stored nonce and strips it from
    /// the current value.
    fn value_without(
        &self,
        element: &BigUint,
        nonce: &BigUint,
    ) -> Result<(PrimeRepresentative, BigUint)> {
        let trapdoor = self
            .trapdoor
            .as_ref()
            .ok_or(AccumulatorError::MissingTrapdoor)?;
        let rep = hash_to_prime_from(element, nonce, 1)?;
        let inverse = inverse_mod(&rep.prime, &trapdoor.totient)?;
        let value = self.value.modpow(&inverse, &self.modulus);
        Ok((rep, value))
    }

    /// Returns `true` if `element` is currently accumulated.
    ///
    /// A plain lookup in the witness data; no modular arithmetic.
    pub fn is_member(&self, element: &BigUint) -> bool {
        self.witness_data.contains_key(element)
    }

    /// Drops this snapshot's handle on the factorization.
    ///
    /// The returned accumulator can still add elements, answer membership
    /// queries and publish its state, but `delete` and `create_proof` fail
    /// with [`AccumulatorError::MissingTrapdoor`].  Secret limbs are wiped
    /// once no other snapshot holds the trapdoor.
    pub fn discard_trapdoor(mut self) -> Self {
        self.trapdoor = None;
        self
    }

    /// Returns `true` while this snapshot can delete and prove.
    pub fn has_trapdoor(&self) -> bool {
        self.trapdoor.is_some()
    }

    /// Current accumulator value.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Empty-set value fixed at construction.
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// RSA modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The factors `(p, q)`, if the trapdoor is held.
    pub fn factors(&self) -> Option<(&BigUint, &BigUint)> {
        self.trapdoor
            .as_deref()
            .map(|trapdoor| (&trapdoor.factor_p, &trapdoor.factor_q))
    }

    /// The totient `(p-1)(q-1)`, if the trapdoor is held.
    pub fn totient(&self) -> Option<&BigUint> {
        self.trapdoor.as_deref().map(|trapdoor| &trapdoor.totient)
    }

    /// Number of accumulated elements.
    pub fn len(&self) -> usize {
        self.witness_data.len()
    }

    /// Returns `true` if nothing is accumulated.
    pub fn is_empty(&self) -> bool {
        self.witness_data.is_empty()
    }

    /// Iterates over the accumulated elements in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = &BigUint> + '_ {
        self.witness_data.keys()
    }

    /// Nonce recorded for `element`, if it is accumulated.
    pub fn nonce_of(&self, element: &BigUint) -> Option<&BigUint> {
        self.witness_data.get(element)
    }

    /// The publishable part of this snapshot.
    pub fn public_state(&self) -> PublicState {
        PublicState {
            modulus: self.modulus.clone(),
            generator: self.generator.clone(),
            value: self.value.clone(),
        }
    }
}

/// Squares `root` when the result can serve as a generator: `root` must be a
/// unit modulo `modulus` and its square must differ from one.
fn square_if_generator(root: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if !root.gcd(modulus).is_one() {
        return None;
    }
    let square = (root * root) % modulus;
    if square.is_one() {
        None
    } else {
        Some(square)
    }
}

/// Samples a quadratic-residue generator from `seed`, moving to the next
/// seed whenever the sampled root is unusable.
fn seeded_generator(modulus: &BigUint, seed: u64, max_attempts: u64) -> Result<BigUint> {
    let mut seed = seed;
    for _ in 0..max_attempts {
        let root = random_big_integer(&BigUint::zero(), modulus, seed, max_attempts)?;
        if let Some(generator) = square_if_generator(&root, modulus) {
            return Ok(generator);
        }
        seed = seed.wrapping_add(1);
    }
    Err(AccumulatorError::SamplingExhausted {
        attempts: max_attempts,
    })
}
