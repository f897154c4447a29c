// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs      — model weights per epoch via Burn's
//                        CompactRecorder, plus the architecture
//                        config JSON inference needs to rebuild
//                        the exact same model
//   tokenizer_store.rs — tokenizer persistence; loads a pretrained
//                        tokenizer.json or builds a word-level
//                        fallback vocabulary from the corpus
//   metrics.rs         — epoch-level training metrics to CSV

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer loading, fallback construction, special-token lookup
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
