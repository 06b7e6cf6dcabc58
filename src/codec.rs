//! Order-preserving timestamp key encoding
//!
//! Timestamps are stored as fixed-width big-endian keys so that the
//! backend's bytewise key order matches numeric timestamp order, which is
//! what makes cursor range scans return points in ascending time order.
//!
//! A naive big-endian encoding of two's-complement integers breaks this for
//! negative values: `-1` encodes as `0xFF..FF`, sorting after every positive
//! timestamp. Flipping the sign bit before encoding maps the signed range
//! `[i64::MIN, i64::MAX]` onto the unsigned range `[0, u64::MAX]`
//! monotonically, so lexicographic key order equals timestamp order across
//! the whole domain.

use crate::error::CodecError;

/// Width of an encoded timestamp key in bytes
pub const KEY_LEN: usize = 8;

const SIGN_BIT: u64 = 1 << 63;

/// Encode a timestamp as an order-preserving fixed-width key
///
/// Total over all of `i64`: no input is rejected. For any `t1 < t2`,
/// `encode_timestamp(t1) < encode_timestamp(t2)` under bytewise comparison.
///
/// # Example
///
/// ```rust
/// use tickstore::codec::encode_timestamp;
///
/// assert!(encode_timestamp(-1) < encode_timestamp(0));
/// assert!(encode_timestamp(0) < encode_timestamp(1));
/// ```
pub fn encode_timestamp(timestamp: i64) -> [u8; KEY_LEN] {
    ((timestamp as u64) ^ SIGN_BIT).to_be_bytes()
}

/// Decode a key produced by [`encode_timestamp`]
///
/// Exact inverse for every encodable value. Fails with
/// [`CodecError::MalformedKey`] if the input is not exactly [`KEY_LEN`]
/// bytes.
pub fn decode_timestamp(key: &[u8]) -> Result<i64, CodecError> {
    let bytes: [u8; KEY_LEN] = key.try_into().map_err(|_| CodecError::MalformedKey {
        expected: KEY_LEN,
        actual: key.len(),
    })?;
    Ok((u64::from_be_bytes(bytes) ^ SIGN_BIT) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for t in [
            i64::MIN,
            i64::MIN + 1,
            -1_700_000_000_000,
            -1,
            0,
            1,
            1_700_000_000_000,
            i64::MAX - 1,
            i64::MAX,
        ] {
            assert_eq!(decode_timestamp(&encode_timestamp(t)).unwrap(), t);
        }
    }

    #[test]
    fn test_order_preserving_across_sign_boundary() {
        assert!(encode_timestamp(-1) < encode_timestamp(0));
        assert!(encode_timestamp(0) < encode_timestamp(1));
        assert!(encode_timestamp(i64::MIN) < encode_timestamp(-1));
        assert!(encode_timestamp(1) < encode_timestamp(i64::MAX));
    }

    #[test]
    fn test_order_preserving_adjacent_values() {
        let samples = [i64::MIN, -1_000_000, -1, 0, 1, 1_000_000, i64::MAX - 1];
        for &t in &samples {
            assert!(
                encode_timestamp(t) < encode_timestamp(t + 1),
                "ordering broken at {}",
                t
            );
        }
    }

    #[test]
    fn test_extremes_map_to_unsigned_extremes() {
        assert_eq!(encode_timestamp(i64::MIN), [0u8; 8]);
        assert_eq!(encode_timestamp(i64::MAX), [0xFFu8; 8]);
    }

    #[test]
    fn test_malformed_key_length() {
        assert_eq!(
            decode_timestamp(&[0u8; 7]),
            Err(CodecError::MalformedKey {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(
            decode_timestamp(&[0u8; 9]),
            Err(CodecError::MalformedKey {
                expected: 8,
                actual: 9
            })
        );
        assert!(decode_timestamp(&[]).is_err());
    }
}
