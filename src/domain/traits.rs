// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between layers. By programming against these traits
// the application layer never names a concrete loader or model:
//
//   - ParallelTextLoader implements PairSource
//   - PredictUseCase     implements PronunciationPredictor
//
// A future loader (TSV, database, ...) or predictor (beam search,
// rule-based G2P) slots in without changing the callers.

use anyhow::Result;
use crate::domain::pair::SpellingPair;

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Any component that can produce aligned spelling/pronunciation pairs.
pub trait PairSource {
    /// Load every available pair from this source.
    /// Fails if the source is internally misaligned.
    fn load_all(&self) -> Result<Vec<SpellingPair>>;
}

// ─── PronunciationPredictor ───────────────────────────────────────────────────
/// Any component that can turn a spelling into a pronunciation.
pub trait PronunciationPredictor {
    /// Predict the phonetic form of `spelling`.
    fn predict(&self, spelling: &str) -> Result<String>;
}
