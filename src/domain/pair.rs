// ============================================================
// Layer 3 — SpellingPair Domain Type
// ============================================================
// One aligned training example: a sentence in Korean orthographic
// spelling and the same sentence in phonetic pronunciation.
//
// Example:
//   spelling:      "가격 1300원이야."
//   pronunciation: "가격 천삼백 원이야."
//
// The pairing comes from two line-aligned text files — line i of
// the spelling file corresponds to line i of the pronunciation
// file. Alignment is validated at load time, not here.

use serde::{Deserialize, Serialize};

/// A source spelling and its target pronunciation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellingPair {
    /// Orthographic form — what is written
    pub spelling: String,

    /// Phonetic form — what is spoken
    pub pronunciation: String,
}

impl SpellingPair {
    pub fn new(spelling: impl Into<String>, pronunciation: impl Into<String>) -> Self {
        Self {
            spelling:      spelling.into(),
            pronunciation: pronunciation.into(),
        }
    }

    /// True when either side is blank — such pairs carry no signal
    /// and are dropped by the training pipeline.
    pub fn is_blank(&self) -> bool {
        self.spelling.trim().is_empty() || self.pronunciation.trim().is_empty()
    }
}
