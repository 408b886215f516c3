//! Error type shared by every accumulator operation.
//!
//! All failures surface to the immediate caller as an [`AccumulatorError`];
//! nothing inside the crate swallows an error or substitutes a best-effort
//! value.

use num_bigint::BigUint;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AccumulatorError>;

/// Errors raised by the number-theory utilities and accumulator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorError {
    #[error("element {element:x} is not a member of the accumulator")]
    /// A proof was requested for an element absent from the witness data.
    NotMember {
        /// Element that was looked up.
        element: BigUint,
    },
    #[error("value is not invertible: gcd with the modulus is {gcd}")]
    /// Modular inversion was attempted on a value sharing a factor with the modulus.
    NotCoprime {
        /// Greatest common divisor that prevented inversion.
        gcd: BigUint,
    },
    #[error("invalid sampling range ({from}, {until})")]
    /// Bounded sampling was given an empty or inverted range.
    InvalidRange {
        /// Exclusive lower bound supplied by the caller.
        from: BigUint,
        /// Exclusive upper bound supplied by the caller.
        until: BigUint,
    },
    #[error("prime generation exhausted after {attempts} attempts")]
    /// A prime or hash-to-prime search exceeded its iteration bound.
    PrimeGenerationExhausted {
        /// Number of attempts performed before giving up.
        attempts: u64,
    },
    #[error("random sampling exhausted after {attempts} attempts")]
    /// Rejection sampling exceeded its iteration bound.
    SamplingExhausted {
        /// Number of attempts performed before giving up.
        attempts: u64,
    },
    #[error("trapdoor has been discarded")]
    /// The operation needs the factorization, which this accumulator no longer holds.
    MissingTrapdoor,
    #[error("invalid parameters: {0}")]
    /// Parameters or arguments outside the supported domain.
    InvalidParameters(String),
    #[error("decode error: {0}")]
    /// Input decoding/serialization failure.
    Decode(String),
}

impl From<serde_json::Error> for AccumulatorError {
    fn from(err: serde_json::Error) -> Self {
        AccumulatorError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AccumulatorError;
    use num_bigint::BigUint;

    #[test]
    fn test_error_messages() {
        let err = AccumulatorError::NotMember {
            element: BigUint::from(255u32),
        };
        assert_eq!(
            err.to_string(),
            "element ff is not a member of the accumulator"
        );
        let err = AccumulatorError::PrimeGenerationExhausted { attempts: 7 };
        assert_eq!(err.to_string(), "prime generation exhausted after 7 attempts");
    }

    #[test]
    fn test_json_errors_become_decode() {
        let err: AccumulatorError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, AccumulatorError::Decode(_)));
    }
}
