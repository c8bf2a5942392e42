//! Serialization utilities
//!
//! Serde adapters and key encoding helpers used by stored records.

/// Encode a `u64` as big-endian bytes so byte order matches numeric order
pub fn u64_to_bytes(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// (De)serialize a [`std::time::Duration`] as whole seconds
pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
