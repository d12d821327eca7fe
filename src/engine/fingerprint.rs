//! Chained BLAKE3 content fingerprints.
//!
//! A fingerprint stands for every byte of a file read so far. Each round
//! extends it with the next chunk:
//!
//! ```text
//! next = BLAKE3(prior digest (32 bytes) || new offset (u64 LE) || chunk)
//! ```
//!
//! Both prefix fields have a fixed width, so no two distinct
//! (prior, offset, chunk) triples produce the same hash input.

use std::fmt;

/// Length of a fingerprint digest in bytes.
pub const FINGERPRINT_LEN: usize = 32;

/// Digest of all bytes of a file seen up to some offset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Fingerprint of the empty input, shared by every file at offset 0.
    #[must_use]
    pub fn root() -> Self {
        Self(blake3::hash(&[]).into())
    }

    /// Extend this fingerprint with `chunk`, which ends at `new_offset`.
    #[must_use]
    pub fn chain(&self, new_offset: u64, chunk: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.0);
        hasher.update(&new_offset.to_le_bytes());
        hasher.update(chunk);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal form (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 bytes are plenty to tell buckets apart in logs.
        write!(f, "Fingerprint({}..)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
