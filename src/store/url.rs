//! Shareable feed addresses.
//!
//! A feed URL's authority encodes the record's public key; the fragment
//! carries the encryption key readers need. Both are lowercase unpadded
//! base32.

use std::fmt;
use std::str::FromStr;

use super::errors::StoreError;
use super::handle::{EncryptionKey, RecordKey};

pub const FEED_SCHEME: &str = "feed";
const FRAGMENT_KEY: &str = "encryptionKey=";

/// A parsed feed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedUrl {
    pub record_key: RecordKey,
    pub encryption_key: EncryptionKey,
}

impl FeedUrl {
    pub fn new(record_key: RecordKey, encryption_key: EncryptionKey) -> Self {
        Self { record_key, encryption_key }
    }
}

impl fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/#{}{}",
            FEED_SCHEME,
            self.record_key.to_base32(),
            FRAGMENT_KEY,
            self.encryption_key.to_base32()
        )
    }
}

impl FromStr for FeedUrl {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = format!("{}://", FEED_SCHEME);
        let rest = s
            .strip_prefix(&prefix)
            .ok_or_else(|| StoreError::BadKey(format!("feed url must start with '{}'", prefix)))?;
        let (authority, fragment) = rest
            .split_once('#')
            .ok_or_else(|| StoreError::BadKey("feed url is missing its fragment".into()))?;
        let encoded_key = fragment
            .strip_prefix(FRAGMENT_KEY)
            .ok_or_else(|| StoreError::BadKey("fragment does not carry an encryption key".into()))?;

        Ok(Self {
            record_key: authority.trim_end_matches('/').parse()?,
            encryption_key: encoded_key.parse()?,
        })
    }
}
