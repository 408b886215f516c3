//! Modular arithmetic over arbitrary-precision integers.
//!
//! The accumulator removes an element by raising the current value to the
//! inverse of its prime representative modulo the totient.  This module
//! provides the two pieces that make that possible: an iterative extended
//! Euclidean algorithm and a modular inverse built on top of it that refuses
//! to return a value when no inverse exists.

use crate::error::{AccumulatorError, Result};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Output of the extended Euclidean algorithm.
///
/// For inputs `a` and `b` the fields satisfy `a·s + b·t = gcd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedGcd {
    /// Greatest common divisor of the inputs.
    pub gcd: BigUint,
    /// Bézout coefficient of `a`.
    pub s: BigInt,
    /// Bézout coefficient of `b`.
    pub t: BigInt,
}

/// Runs the extended Euclidean algorithm on `a ≥ b ≥ 0`.
///
/// The loop keeps the remainder sequence and both coefficient sequences
/// side by side, so stack usage stays constant regardless of bit length.
/// When the returned `gcd` is one, `t mod a` is the multiplicative inverse
/// of `b` modulo `a`.
///
/// # Errors
///
/// Returns [`AccumulatorError::InvalidParameters`] if `a < b`.
pub fn extended_euclid(a: &BigUint, b: &BigUint) -> Result<ExtendedGcd> {
    if a < b {
        return Err(AccumulatorError::InvalidParameters(format!(
            "extended_euclid requires a >= b (a = {a}, b = {b})"
        )));
    }
    let mut r_prev = BigInt::from(a.clone());
    let mut r = BigInt::from(b.clone());
    let (mut s_prev, mut s) = (BigInt::one(), BigInt::zero());
    let (mut t_prev, mut t) = (BigInt::zero(), BigInt::one());
    while !r.is_zero() {
        // Both remainders are non-negative, so truncating division is the floor.
        let q = &r_prev / &r;
        let r_next = &r_prev - &q * &r;
        r_prev = std::mem::replace(&mut r, r_next);
        let s_next = &s_prev - &q * &s;
        s_prev = std::mem::replace(&mut s, s_next);
        let t_next = &t_prev - &q * &t;
        t_prev = std::mem::replace(&mut t, t_next);
    }
    Ok(ExtendedGcd {
        gcd: r_prev.magnitude().clone(),
        s: s_prev,
        t: t_prev,
    })
}

/// Computes `x⁻¹ mod phi`.
///
/// `x` is reduced modulo `phi` first, so representatives larger than the
/// modulus are accepted.  The result lies in `[0, phi)` and satisfies
/// `x · x⁻¹ ≡ 1 (mod phi)`.
///
/// # Errors
///
/// * [`AccumulatorError::NotCoprime`] if `gcd(x, phi) ≠ 1`.
/// * [`AccumulatorError::InvalidParameters`] if `phi` is zero.
pub fn inverse_mod(x: &BigUint, phi: &BigUint) -> Result<BigUint> {
    if phi.is_zero() {
        return Err(AccumulatorError::InvalidParameters(
            "cannot invert modulo zero".to_string(),
        ));
    }
    let reduced = x % phi;
    let egcd = extended_euclid(phi, &reduced)?;
    if !egcd.gcd.is_one() {
        return Err(AccumulatorError::NotCoprime { gcd: egcd.gcd });
    }
    let phi_signed = BigInt::from(phi.clone());
    Ok(egcd.t.mod_floor(&phi_signed).magnitude().clone())
}
