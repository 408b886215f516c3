//! Text encoding for big integers in serialized artifacts.
//!
//! Public accumulator state and membership proofs carry big integers as
//! lowercase big-endian hex strings.  The [`hex_biguint`] module plugs into
//! `#[serde(with = "...")]`.

use crate::error::{AccumulatorError, Result};
use num_bigint::BigUint;

/// Encodes `value` as lowercase big-endian hex (zero encodes as `"00"`).
pub fn encode_biguint(value: &BigUint) -> String {
    hex::encode(value.to_bytes_be())
}

/// Decodes a big-endian hex string produced by [`encode_biguint`].
///
/// # Errors
///
/// Returns [`AccumulatorError::Decode`] for empty or malformed input.
pub fn decode_biguint(text: &str) -> Result<BigUint> {
    if text.is_empty() {
        return Err(AccumulatorError::Decode("empty integer encoding".to_string()));
    }
    let bytes = hex::decode(text).map_err(|err| AccumulatorError::Decode(err.to_string()))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// Serde adapter for `BigUint` fields.
pub(crate) mod hex_biguint {
    use num_bigint::BigUint;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_biguint(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_biguint(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_biguint, encode_biguint};
    use crate::error::AccumulatorError;
    use num_bigint::BigUint;

    #[test]
    fn test_encoding_is_big_endian_hex() {
        assert_eq!(encode_biguint(&BigUint::from(0x01_02_ffu32)), "0102ff");
        assert_eq!(encode_biguint(&BigUint::default()), "00");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let value = (BigUint::from(1u8) << 300u32) + BigUint::from(12_345u32);
        assert_eq!(decode_biguint(&encode_biguint(&value)).unwrap(), value);
        assert_eq!(decode_biguint("00ff").unwrap(), BigUint::from(255u32));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        for text in ["", "xyz", "abc"] {
            let err = decode_biguint(text).unwrap_err();
            assert!(matches!(err, AccumulatorError::Decode(_)), "{text:?}");
        }
    }
}
