//! Key material identifying a distributed feed record.
//!
//! Keys render as lowercase hex for index rows and logs, and as lowercase
//! unpadded base32 inside feed URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::StoreError;

pub const KEY_LEN: usize = 32;

fn to_base32(bytes: &[u8]) -> String {
    let mut text = data_encoding::BASE32_NOPAD.encode(bytes);
    text.make_ascii_lowercase();
    text
}

fn parse_key(input: &str) -> Result<[u8; KEY_LEN], StoreError> {
    let bytes = if input.len() == KEY_LEN * 2 {
        hex::decode(input).map_err(|e| StoreError::BadKey(e.to_string()))?
    } else {
        data_encoding::BASE32_NOPAD
            .decode(input.to_ascii_uppercase().as_bytes())
            .map_err(|e| StoreError::BadKey(e.to_string()))?
    };
    bytes
        .try_into()
        .map_err(|_| StoreError::BadKey(format!("expected {} bytes", KEY_LEN)))
}

macro_rules! key_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; KEY_LEN]);

        impl $name {
            pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn to_base32(&self) -> String {
                to_base32(&self.0)
            }

            /// An all-zero key never identifies a live record.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = StoreError;

            /// Accepts lowercase hex or unpadded base32.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_key(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

key_type!(RecordKey, "Public key addressing a feed's distributed record.");
key_type!(EncryptionKey, "Secret key readers need to decrypt a feed record.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let key = RecordKey::from_bytes([7u8; KEY_LEN]);
        let parsed: RecordKey = key.to_hex().parse().unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn test_base32_round_trip() {
        let key = EncryptionKey::from_bytes([42u8; KEY_LEN]);
        let parsed: EncryptionKey = key.to_base32().parse().unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn test_bad_input_rejected() {
        assert!("zz".parse::<RecordKey>().is_err());
        assert!("".parse::<RecordKey>().is_err());
    }

    #[test]
    fn test_zero_key_detected() {
        assert!(RecordKey::from_bytes([0u8; KEY_LEN]).is_zero());
        assert!(!RecordKey::from_bytes([1u8; KEY_LEN]).is_zero());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let key = RecordKey::from_bytes([9u8; KEY_LEN]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_hex()));
        let back: RecordKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }
}
