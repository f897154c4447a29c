// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads the trained checkpoint and its tokenizer once, then
// answers spelling→pronunciation queries through the
// PronunciationPredictor trait.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::domain::traits::PronunciationPredictor;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::Inferencer;

pub struct PredictUseCase {
    tokenizer:  Tokenizer,
    inferencer: Inferencer,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let tok_store  = TokenizerStore::new(&checkpoint_dir);
        let tokenizer  = tok_store.load()?;
        let ckpt       = CheckpointManager::new(&checkpoint_dir);
        let inferencer = Inferencer::from_checkpoint(&ckpt, &tokenizer)?;
        Ok(Self { tokenizer, inferencer })
    }
}

impl PronunciationPredictor for PredictUseCase {
    fn predict(&self, spelling: &str) -> Result<String> {
        self.inferencer.transcribe(spelling, &self.tokenizer)
    }
}
