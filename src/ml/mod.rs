// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework code lives here — no other layer imports
// from burn directly except the data layer's Dataset/Batcher
// impls. Isolating the framework keeps the rest of the tree
// testable without a GPU.
//
//   mask.rs       — padding / look-ahead attention mask builders
//   encoder.rs    — transformer encoder over the spelling sequence
//   decoder.rs    — decoder stack: masked self-attention,
//                   encoder-decoder cross-attention, FFN
//   model.rs      — full seq2seq model + projection head
//   loss.rs       — class-weighted cross-entropy
//   trainer.rs    — training loop (forward, loss, backward, Adam)
//   inferencer.rs — checkpoint load + greedy autoregressive decode
//
// Reference: Vaswani et al. (2017) Attention Is All You Need

/// Attention mask construction (padding + causal)
pub mod mask;

/// Encoder over source spelling token ids
pub mod encoder;

/// Decoder stack with cross-attention to encoder output
pub mod decoder;

/// Full spelling→pronunciation model
pub mod model;

/// Class-weighted cross-entropy loss
pub mod loss;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and decodes greedily
pub mod inferencer;
