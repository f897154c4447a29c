// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Runs the full fine-tuning pipeline in order:
//
//   Step 1: Load aligned corpus files      (Layer 4 - data)
//   Step 2: Load or build the tokenizer    (Layer 6 - infra)
//   Step 3: Resolve special-token ids      (Layer 6 - infra)
//   Step 4: Build padded feature triples   (Layer 4 - data)
//   Step 5: Split train/validation         (Layer 4 - data)
//   Step 6: Build Burn datasets            (Layer 4 - data)
//   Step 7: Save config for inference      (Layer 6 - infra)
//   Step 8: Run the training loop          (Layer 5 - ml)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::G2pDataset,
    feature::FeatureBuilder,
    loader::ParallelTextLoader,
    splitter::split_train_val,
};
use crate::domain::traits::PairSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{SpecialTokens, TokenizerStore},
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for one run. Serialised to train_config.json
// so inference can rebuild the identical architecture. The vocab
// sizes and pad id are filled in from the tokenizer during
// execute(), before the config is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub src_file:          String,
    pub trg_file:          String,
    pub checkpoint_dir:    String,
    pub max_seq_length:    usize,
    pub batch_size:        usize,
    pub epochs:            usize,
    pub lr:                f64,
    pub hidden_size:       usize,
    pub num_attn_head:     usize,
    pub num_layers:        usize,
    pub feed_forward_size: usize,
    pub dropout:           f64,
    pub share_embeddings:  bool,
    /// Exclude [PAD] target positions from the loss.
    pub mask_pad_in_loss:  bool,
    /// Reject over-length sequences instead of truncating.
    pub strict_length:     bool,
    /// Filled from the tokenizer before training starts.
    pub src_vocab_size:    usize,
    pub trg_vocab_size:    usize,
    pub pad_id:            usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            src_file:          "data/spellings.txt".to_string(),
            trg_file:          "data/pronunciations.txt".to_string(),
            checkpoint_dir:    "checkpoints".to_string(),
            max_seq_length:    512,
            batch_size:        8,
            epochs:            10,
            lr:                1e-5,
            hidden_size:       256,
            num_attn_head:     4,
            num_layers:        6,
            feed_forward_size: 1024,
            dropout:           0.1,
            share_embeddings:  true,
            mask_pad_in_loss:  false,
            strict_length:     false,
            src_vocab_size:    0,
            trg_vocab_size:    0,
            pad_id:            0,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let mut cfg = self.config.clone();

        // ── Step 1: Load the aligned corpus ───────────────────────────────────
        tracing::info!("Loading corpus: '{}' / '{}'", cfg.src_file, cfg.trg_file);
        let loader = ParallelTextLoader::new(&cfg.src_file, &cfg.trg_file);
        let pairs  = loader.load_all()?;
        tracing::info!("Loaded {} spelling/pronunciation pairs", pairs.len());

        // ── Step 2: Tokenizer ─────────────────────────────────────────────────
        // Both sides of the corpus feed the fallback vocabulary so the
        // single tokenizer covers spellings and pronunciations alike.
        let corpus: Vec<String> = pairs
            .iter()
            .flat_map(|p| [p.spelling.clone(), p.pronunciation.clone()])
            .collect();
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.load_or_build(&corpus)?;

        // ── Step 3: Special tokens + vocab sizes ──────────────────────────────
        let special = SpecialTokens::resolve(&tokenizer)?;
        let vocab_size = tokenizer.get_vocab_size(true);
        cfg.src_vocab_size = vocab_size;
        cfg.trg_vocab_size = vocab_size;
        cfg.pad_id         = special.pad as usize;

        // ── Step 4: Feature triples ───────────────────────────────────────────
        let features = FeatureBuilder::new(
            &tokenizer,
            special,
            cfg.max_seq_length,
            cfg.strict_length,
        );
        let samples = pairs
            .iter()
            .map(|p| features.build_sample(p))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Built {} training samples", samples.len());

        // ── Step 5: Train / validation split (80/20) ──────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, 0.8);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len(),
        );

        // ── Step 6: Burn datasets ─────────────────────────────────────────────
        let train_dataset = G2pDataset::new(train_samples);
        let val_dataset   = G2pDataset::new(val_samples);

        // ── Step 7: Persist the (now complete) config ─────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&cfg)?;

        // ── Step 8: Train ─────────────────────────────────────────────────────
        run_training(&cfg, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}
