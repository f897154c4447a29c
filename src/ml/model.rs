// ============================================================
// Layer 5 — Spell2Pron Model
// ============================================================
// The full sequence-to-sequence model:
//
//   spelling ids ──► SpellingEncoder ──► memory ─┐
//                                                ▼
//   pronunciation ids ──► DecoderStack (masked self-attn,
//                         cross-attn over memory, FFN)
//                                                │
//                                                ▼
//                         projection head ──► logits over
//                                             target vocabulary
//
// Configuration is validated before any parameter is allocated:
// an indivisible head count or a vocab mismatch under shared
// embeddings is a Configuration error, never a silent truncation.

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
};

use crate::error::G2pError;
use crate::ml::decoder::{DecoderStack, DecoderStackConfig};
use crate::ml::encoder::{SpellingEncoder, SpellingEncoderConfig};
use crate::ml::loss::WeightedCrossEntropy;
use crate::ml::mask::{decoder_self_attn_mask, padding_key_mask};

#[derive(Config, Debug)]
pub struct Spell2PronConfig {
    pub src_vocab_size: usize,
    pub trg_vocab_size: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
    #[config(default = 4)]
    pub num_attn_head: usize,
    #[config(default = 1024)]
    pub feed_forward_size: usize,
    #[config(default = 512)]
    pub max_seq_length: usize,
    #[config(default = 6)]
    pub num_layers: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    /// Reuse the encoder embedding tables for decoder input.
    /// Requires src and trg vocabularies to be the same size.
    #[config(default = false)]
    pub share_embeddings: bool,
    /// Vocabulary id of the [PAD] token.
    #[config(default = 0)]
    pub pad_id: usize,
}

impl Spell2PronConfig {
    /// Check internal consistency. Called by [`Self::init`]; callers that
    /// build configs from untrusted input can also call it directly.
    pub fn validate(&self) -> Result<(), G2pError> {
        if self.hidden_size % self.num_attn_head != 0 {
            return Err(G2pError::Configuration(format!(
                "hidden_size {} is not divisible by num_attn_head {}",
                self.hidden_size, self.num_attn_head,
            )));
        }
        if self.share_embeddings && self.src_vocab_size != self.trg_vocab_size {
            return Err(G2pError::Configuration(format!(
                "share_embeddings requires matching vocabularies, got src={} trg={}",
                self.src_vocab_size, self.trg_vocab_size,
            )));
        }
        Ok(())
    }

    /// Build the model, failing fast on an inconsistent configuration.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Spell2PronModel<B>, G2pError> {
        self.validate()?;

        let encoder = SpellingEncoderConfig::new(
            self.src_vocab_size,
            self.max_seq_length,
            self.hidden_size,
            self.num_attn_head,
            self.feed_forward_size,
            self.num_layers,
            self.dropout,
        )
        .init(device);

        let decoder = DecoderStackConfig::new(
            self.trg_vocab_size,
            self.max_seq_length,
            self.hidden_size,
            self.num_attn_head,
            self.feed_forward_size,
            self.num_layers,
            self.dropout,
        )
        .init(device);

        let projection = LinearConfig::new(self.hidden_size, self.trg_vocab_size).init(device);

        Ok(Spell2PronModel {
            encoder,
            decoder,
            projection,
            share_embeddings: self.share_embeddings,
            pad_id: self.pad_id,
        })
    }
}

#[derive(Module, Debug)]
pub struct Spell2PronModel<B: Backend> {
    pub encoder:    SpellingEncoder<B>,
    pub decoder:    DecoderStack<B>,
    /// Dense map from decoder hidden states to target-vocabulary logits.
    /// Raw scores — normalisation happens inside the loss.
    pub projection: Linear<B>,
    share_embeddings: bool,
    pad_id:           usize,
}

impl<B: Backend> Spell2PronModel<B> {
    /// Full forward pass.
    ///
    /// `encoder_ids`, `decoder_ids`: [batch, seq] →
    /// logits [batch, seq, trg_vocab_size].
    pub fn forward(
        &self,
        encoder_ids: Tensor<B, 2, Int>,
        decoder_ids: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let enc_key_mask = padding_key_mask(&encoder_ids, self.pad_id);
        let memory = self.encoder.forward(encoder_ids, enc_key_mask.clone());
        self.forward_with_memory(memory, enc_key_mask, decoder_ids)
    }

    /// Decode against externally supplied encoder hidden states.
    ///
    /// This is the encoder-capability seam: the memory tensor can come from
    /// the built-in encoder, a pretrained checkpoint, or a test stub.
    pub fn forward_with_memory(
        &self,
        memory:          Tensor<B, 3>,
        memory_key_mask: Tensor<B, 2, Bool>,
        decoder_ids:     Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let self_mask = decoder_self_attn_mask(&decoder_ids, self.pad_id);

        let embedded = if self.share_embeddings {
            self.encoder.embed(decoder_ids)
        } else {
            self.decoder.embed(decoder_ids)
        };

        let states = self
            .decoder
            .forward_embedded(embedded, memory, self_mask, memory_key_mask);

        self.projection.forward(states)
    }

    /// Forward pass plus flattened class-weighted loss.
    ///
    /// `targets`: [batch, seq] gold pronunciation ids.
    /// Returns (scalar loss, logits).
    pub fn forward_loss(
        &self,
        encoder_ids: Tensor<B, 2, Int>,
        decoder_ids: Tensor<B, 2, Int>,
        targets:     Tensor<B, 2, Int>,
        criterion:   &WeightedCrossEntropy<B>,
    ) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let logits = self.forward(encoder_ids, decoder_ids);
        let [batch_size, seq_len, vocab] = logits.dims();

        let flat_logits  = logits.clone().reshape([batch_size * seq_len, vocab]);
        let flat_targets = targets.reshape([batch_size * seq_len]);

        (criterion.forward(flat_logits, flat_targets), logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn tiny_config() -> Spell2PronConfig {
        Spell2PronConfig::new(40, 40)
            .with_hidden_size(32)
            .with_num_attn_head(4)
            .with_feed_forward_size(64)
            .with_max_seq_length(8)
            .with_num_layers(2)
            .with_dropout(0.0)
    }

    #[test]
    fn indivisible_head_count_is_a_configuration_error() {
        let cfg = Spell2PronConfig::new(100, 100)
            .with_hidden_size(256)
            .with_num_attn_head(5);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, G2pError::Configuration(_)));
    }

    #[test]
    fn divisible_head_count_constructs() {
        let device = Default::default();
        let cfg = Spell2PronConfig::new(100, 100)
            .with_hidden_size(256)
            .with_num_attn_head(4)
            .with_max_seq_length(8)
            .with_num_layers(1);
        assert!(cfg.init::<B>(&device).is_ok());
    }

    #[test]
    fn shared_embeddings_require_matching_vocabularies() {
        let cfg = Spell2PronConfig::new(100, 90).with_share_embeddings(true);
        assert!(matches!(
            cfg.validate().unwrap_err(),
            G2pError::Configuration(_)
        ));
    }

    #[test]
    fn logits_cover_target_vocabulary_per_position() {
        let device = Default::default();
        let model  = tiny_config().init::<B>(&device).unwrap();

        let enc = Tensor::<B, 1, Int>::from_ints([5, 6, 7, 0, 0, 0, 0, 0], &device).reshape([1, 8]);
        let dec = Tensor::<B, 1, Int>::from_ints([2, 5, 0, 0, 0, 0, 0, 0], &device).reshape([1, 8]);

        let logits = model.forward(enc, dec);
        assert_eq!(logits.dims(), [1, 8, 40]);
    }

    #[test]
    fn shared_embedding_forward_matches_shapes() {
        let device = Default::default();
        let model  = tiny_config().with_share_embeddings(true).init::<B>(&device).unwrap();

        let enc = Tensor::<B, 1, Int>::from_ints([5, 6, 0, 0, 0, 0, 0, 0], &device).reshape([1, 8]);
        let dec = Tensor::<B, 1, Int>::from_ints([2, 5, 6, 0, 0, 0, 0, 0], &device).reshape([1, 8]);

        let logits = model.forward(enc, dec);
        assert_eq!(logits.dims(), [1, 8, 40]);
    }

    #[test]
    fn external_memory_is_accepted() {
        let device = Default::default();
        let model  = tiny_config().init::<B>(&device).unwrap();

        // Stub encoder output, as a pretrained capability would supply.
        let memory   = Tensor::<B, 3>::zeros([1, 8, 32], &device);
        let key_mask = Tensor::<B, 2, Int>::zeros([1, 8], &device).equal_elem(1);
        let dec = Tensor::<B, 1, Int>::from_ints([2, 5, 6, 0, 0, 0, 0, 0], &device).reshape([1, 8]);

        let logits = model.forward_with_memory(memory, key_mask, dec);
        assert_eq!(logits.dims(), [1, 8, 40]);
    }
}
