//! Human-readable pass codes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

const PREFIX: &str = "GP";
const SUFFIX_LEN: usize = 6;
// No 0/O or 1/I so codes survive being read aloud at a front desk.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// `GP-<unix millis>-<6 random characters>`.
///
/// The storage-level unique constraint is the authoritative guarantee; the
/// timestamp plus suffix only makes collisions vanishingly rare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassCode(String);

impl PassCode {
    /// Generates a code for the given issuance instant.
    pub fn generate(issued_at: Timestamp) -> Self {
        Self::generate_with(issued_at, &mut rand::rng())
    }

    /// Generates a code drawing the suffix from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(issued_at: Timestamp, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
                SUFFIX_ALPHABET[idx] as char
            })
            .collect();
        Self(format!("{}-{}-{}", PREFIX, issued_at.as_unix_millis(), suffix))
    }

    /// Wraps a code loaded from storage.
    pub fn from_stored(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
