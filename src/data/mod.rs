// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw parallel text files and the
// GPU-ready tensor batches:
//
//   spelling.txt / pronunciation.txt
//       │
//       ▼
//   ParallelTextLoader → aligned SpellingPairs (fails on mismatch)
//       │
//       ▼
//   FeatureBuilder     → tokenised, padded (encoder, decoder, target)
//       │                triples on the fixed-length canvas
//       ▼
//   G2pDataset         → implements Burn's Dataset trait
//       │
//       ▼
//   G2pBatcher         → stacks samples into [batch, seq] Int tensors
//       │
//       ▼
//   DataLoader         → shuffled batches into the training loop
//
// Each module owns exactly one step.

/// Loads the two line-aligned corpus files
pub mod loader;

/// Builds padded token-id feature triples from pairs
pub mod feature;

/// Implements Burn's Dataset trait for feature triples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
