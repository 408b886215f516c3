//! Accumulator configuration.
//!
//! [`AccumulatorParams`] gathers the security size, the primality certainty
//! and the iteration caps that bound every retry loop.  The struct derives
//! `Deserialize` with per-field defaults, so a JSON document only needs the
//! keys it wants to override:
//!
//! ```
//! use rsa_accumulator::AccumulatorParams;
//!
//! let params = AccumulatorParams::from_json(r#"{ "prime_bits": 512 }"#).unwrap();
//! assert_eq!(params.prime_bits, 512);
//! assert_eq!(params.certainty, AccumulatorParams::default().certainty);
//! ```

use crate::error::{AccumulatorError, Result};
use serde::{Deserialize, Serialize};

/// Bit length of each safe prime in the default 3072-bit modulus.
pub const DEFAULT_PRIME_BITS: u64 = 1536;

/// Default Miller–Rabin rounds for modulus primes.
pub const DEFAULT_CERTAINTY: u32 = 40;

/// Smallest accepted safe-prime bit length.
pub const MIN_PRIME_BITS: u64 = 8;

/// Tunables for accumulator bootstrap and the bounded search loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccumulatorParams {
    /// Bit length of each safe prime; the modulus has twice as many bits.
    pub prime_bits: u64,
    /// Miller–Rabin rounds for modulus primes (error ≤ 4^-certainty).
    pub certainty: u32,
    /// Cap on candidates / seed increments during prime generation.
    pub max_prime_attempts: u64,
    /// Cap on nonces tried by hash-to-prime.
    pub max_hash_attempts: u64,
    /// Cap on rejected draws while sampling the generator.
    pub max_sample_attempts: u64,
}

impl Default for AccumulatorParams {
    fn default() -> Self {
        Self {
            prime_bits: DEFAULT_PRIME_BITS,
            certainty: DEFAULT_CERTAINTY,
            max_prime_attempts: 1_000_000,
            max_hash_attempts: crate::hashing::DEFAULT_HASH_ATTEMPTS,
            max_sample_attempts: 100_000,
        }
    }
}

impl AccumulatorParams {
    /// Small, fast parameters for tests and demos (64-bit safe primes).
    ///
    /// Offers no security whatsoever.
    pub fn testing() -> Self {
        Self {
            prime_bits: 64,
            certainty: 20,
            ..Self::default()
        }
    }

    /// Returns a copy with a different safe-prime bit length.
    pub fn with_prime_bits(mut self, prime_bits: u64) -> Self {
        self.prime_bits = prime_bits;
        self
    }

    /// Returns a copy with a different primality certainty.
    pub fn with_certainty(mut self, certainty: u32) -> Self {
        self.certainty = certainty;
        self
    }

    /// Bit length of the resulting modulus.
    pub fn modulus_bits(&self) -> u64 {
        self.prime_bits * 2
    }

    /// Parses parameters from JSON, filling absent keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::Decode`] for malformed JSON and
    /// [`AccumulatorError::InvalidParameters`] if [`validate`](Self::validate) fails.
    pub fn from_json(text: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AccumulatorError::InvalidParameters`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<()> {
        if self.prime_bits < MIN_PRIME_BITS {
            return Err(AccumulatorError::InvalidParameters(format!(
                "prime_bits must be at least {MIN_PRIME_BITS}, got {}",
                self.prime_bits
            )));
        }
        if self.certainty == 0 {
            return Err(AccumulatorError::InvalidParameters(
                "certainty must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("max_prime_attempts", self.max_prime_attempts),
            ("max_hash_attempts", self.max_hash_attempts),
            ("max_sample_attempts", self.max_sample_attempts),
        ] {
            if value == 0 {
                return Err(AccumulatorError::InvalidParameters(format!(
                    "{name} must be positive"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AccumulatorParams, DEFAULT_PRIME_BITS};
    use crate::error::AccumulatorError;

    #[test]
    fn test_default_targets_3072_bit_modulus() {
        let params = AccumulatorParams::default();
        assert_eq!(params.prime_bits, DEFAULT_PRIME_BITS);
        assert_eq!(params.modulus_bits(), 3072);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let params =
            AccumulatorParams::from_json(r#"{ "prime_bits": 128, "max_hash_attempts": 10 }"#)
                .unwrap();
        assert_eq!(params.prime_bits, 128);
        assert_eq!(params.max_hash_attempts, 10);
        assert_eq!(params.certainty, AccumulatorParams::default().certainty);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = AccumulatorParams::from_json(r#"{ "bits": 128 }"#).unwrap_err();
        assert!(matches!(err, AccumulatorError::Decode(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AccumulatorParams::from_json(r#"{ "prime_bits": 2 }"#).unwrap_err();
        assert!(matches!(err, AccumulatorError::InvalidParameters(_)));
        let params = AccumulatorParams::testing().with_certainty(0);
        assert!(params.validate().is_err());
        let params = AccumulatorParams {
            max_sample_attempts: 0,
            ..AccumulatorParams::testing()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let params = AccumulatorParams::testing().with_prime_bits(96);
        let text = serde_json::to_string(&params).unwrap();
        assert_eq!(AccumulatorParams::from_json(&text).unwrap(), params);
    }
}
