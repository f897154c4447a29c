// ============================================================
// Error taxonomy
// ============================================================
// Every failure class the pipeline distinguishes. The design is
// fail-fast throughout: a single-operator training run has no
// caller to report partial success to, so nothing here is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum G2pError {
    /// Inconsistent model hyperparameters, caught at construction.
    #[error("configuration: {0}")]
    Configuration(String),

    /// Source/target corpus files are not line-aligned.
    #[error("data alignment: {src_path} has {src_lines} lines but {trg_path} has {trg_lines}")]
    DataAlignment {
        src_path:  String,
        trg_path:  String,
        src_lines: usize,
        trg_lines: usize,
    },

    /// A tokenized sequence does not fit in the fixed-length canvas.
    /// Raised only in strict mode; the default policy truncates with a warning.
    #[error("sequence length overflow: {length} tokens exceeds max_seq_length {max}")]
    SequenceLengthOverflow { length: usize, max: usize },

    /// Forward/backward pass produced a non-finite value, or the
    /// compute backend failed. Fatal — no partial-epoch checkpoint.
    #[error("compute: {0}")]
    RuntimeCompute(String),

    /// Tokenizer load/encode/decode failure, or a missing special token.
    #[error("tokenizer: {0}")]
    Tokenizer(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
