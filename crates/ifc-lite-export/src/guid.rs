// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC GlobalId encoding
//!
//! A GlobalId is a 128-bit GUID written as 22 characters of IFC's base64
//! alphabet, most significant digit first. The first character carries only
//! two bits, so it is always one of `0`..`3`.

use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Length of an encoded GlobalId
pub const GLOBAL_ID_LEN: usize = 22;

/// Encode a 128-bit value
pub fn compress(value: u128) -> String {
    (0..GLOBAL_ID_LEN)
        .map(|i| {
            let shift = 6 * (GLOBAL_ID_LEN - 1 - i);
            ALPHABET[((value >> shift) & 0x3f) as usize] as char
        })
        .collect()
}

/// Decode a GlobalId, `None` if it is malformed
pub fn expand(global_id: &str) -> Option<u128> {
    let bytes = global_id.as_bytes();
    if bytes.len() != GLOBAL_ID_LEN {
        return None;
    }
    let mut value: u128 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let digit = digit(b)?;
        if i == 0 && digit > 3 {
            return None;
        }
        value = (value << 6) | digit as u128;
    }
    Some(value)
}

#[inline]
fn digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'Z' => Some(b - b'A' + 10),
        b'a'..=b'z' => Some(b - b'a' + 36),
        b'_' => Some(62),
        b'$' => Some(63),
        _ => None,
    }
}

/// Whether `global_id` is a well-formed GlobalId
pub fn is_valid(global_id: &str) -> bool {
    expand(global_id).is_some()
}

/// Fresh random GlobalId
pub fn new_guid() -> String {
    compress(Uuid::new_v4().as_u128())
}

/// GlobalId derived from a seed; equal seeds give equal ids
///
/// Useful for elements that must keep their GlobalId across exports of the
/// same source model.
pub fn stable_guid(seed: &str) -> String {
    compress(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        // 0 and u128::MAX are the two ends of the range
        assert_eq!(compress(0), "0000000000000000000000");
        assert_eq!(compress(u128::MAX), "3$$$$$$$$$$$$$$$$$$$$$");
        assert_eq!(expand("3$$$$$$$$$$$$$$$$$$$$$"), Some(u128::MAX));
    }

    #[test]
    fn test_uuid_round_trip() {
        let uuid = Uuid::parse_str("a1b2c3d4-e5f6-4789-abcd-ef0123456789").unwrap();
        let encoded = compress(uuid.as_u128());
        assert_eq!(encoded.len(), GLOBAL_ID_LEN);
        assert_eq!(expand(&encoded), Some(uuid.as_u128()));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid(""));
        assert!(!is_valid("4000000000000000000000"));
        assert!(!is_valid("000000000000000000000"));
        assert!(!is_valid("00000000000000000000-0"));
    }

    #[test]
    fn test_generated_ids() {
        let a = new_guid();
        let b = new_guid();
        assert!(is_valid(&a));
        assert_ne!(a, b);

        assert_eq!(stable_guid("wall-17"), stable_guid("wall-17"));
        assert_ne!(stable_guid("wall-17"), stable_guid("wall-18"));
        assert!(is_valid(&stable_guid("wall-17")));
    }
}
