// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the spelling→pronunciation model on a parallel corpus
    Train(TrainArgs),

    /// Transcribe a spelling using a trained checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Text file with one spelling sentence per line
    #[arg(long, default_value = "data/spellings.txt")]
    pub src_file: String,

    /// Text file with the aligned pronunciation per line
    #[arg(long, default_value = "data/pronunciations.txt")]
    pub trg_file: String,

    /// Directory for model checkpoints, tokenizer and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Fixed canvas length every sequence is padded to
    #[arg(long, default_value_t = 512)]
    pub max_seq_length: usize,

    /// Number of pairs processed together in one forward pass
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-5)]
    pub lr: f64,

    /// Hidden dimension of the transformer
    /// Every token is represented as a vector of this size
    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    /// Number of attention heads in multi-head attention
    /// hidden_size must be divisible by this
    #[arg(long, default_value_t = 4)]
    pub num_attn_head: usize,

    /// Number of stacked encoder and decoder layers
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub feed_forward_size: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Use one embedding table for spellings and pronunciations
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub share_embeddings: bool,

    /// Exclude [PAD] target positions from the loss
    #[arg(long, default_value_t = false)]
    pub mask_pad_in_loss: bool,

    /// Reject over-length sequences instead of truncating them
    #[arg(long, default_value_t = false)]
    pub strict_length: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            src_file:          a.src_file,
            trg_file:          a.trg_file,
            checkpoint_dir:    a.checkpoint_dir,
            max_seq_length:    a.max_seq_length,
            batch_size:        a.batch_size,
            epochs:            a.epochs,
            lr:                a.lr,
            hidden_size:       a.hidden_size,
            num_attn_head:     a.num_attn_head,
            num_layers:        a.num_layers,
            feed_forward_size: a.feed_forward_size,
            dropout:           a.dropout,
            share_embeddings:  a.share_embeddings,
            mask_pad_in_loss:  a.mask_pad_in_loss,
            strict_length:     a.strict_length,
            // Resolved from the tokenizer when training starts.
            src_vocab_size:    0,
            trg_vocab_size:    0,
            pad_id:            0,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The spelling text to transcribe
    #[arg(long)]
    pub spelling: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_args_carry_over_into_config() {
        let args = TrainArgs {
            src_file:          "a.txt".to_string(),
            trg_file:          "b.txt".to_string(),
            checkpoint_dir:    "ckpt".to_string(),
            max_seq_length:    64,
            batch_size:        4,
            epochs:            2,
            lr:                3e-4,
            hidden_size:       128,
            num_attn_head:     4,
            num_layers:        2,
            feed_forward_size: 512,
            dropout:           0.2,
            share_embeddings:  true,
            mask_pad_in_loss:  true,
            strict_length:     true,
        };
        let cfg: TrainConfig = args.into();

        assert_eq!(cfg.src_file, "a.txt");
        assert_eq!(cfg.max_seq_length, 64);
        assert_eq!(cfg.num_attn_head, 4);
        assert!(cfg.mask_pad_in_loss);
        // Vocabulary facts are not known at parse time.
        assert_eq!(cfg.src_vocab_size, 0);
        assert_eq!(cfg.pad_id, 0);
    }
}
