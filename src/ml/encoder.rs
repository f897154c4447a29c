// ============================================================
// Layer 5 — Spelling Encoder
// ============================================================
// Transformer encoder over the source spelling sequence. The
// rest of the system treats it as a capability — token ids in,
// contextual hidden states out — so anything that produces a
// [batch, len, hidden] memory tensor can stand in for it (see
// Spell2PronModel::forward_with_memory). In production the
// weights come from a checkpoint of a pretrained encoder and are
// fine-tuned jointly with the decoder.

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

#[derive(Config, Debug)]
pub struct SpellingEncoderConfig {
    pub vocab_size:        usize,
    pub max_seq_length:    usize,
    pub hidden_size:       usize,
    pub num_attn_head:     usize,
    pub feed_forward_size: usize,
    pub num_layers:        usize,
    pub dropout:           f64,
}

impl SpellingEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SpellingEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.hidden_size).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_length, self.hidden_size).init(device);
        let layers = (0..self.num_layers)
            .map(|_| self.build_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.hidden_size).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        SpellingEncoder { token_embedding, position_embedding, layers, final_norm, dropout }
    }

    fn build_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.hidden_size, self.num_attn_head)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.hidden_size, self.feed_forward_size).init(device);
        let ffn_linear2 = LinearConfig::new(self.feed_forward_size, self.hidden_size).init(device);
        let norm1   = LayerNormConfig::new(self.hidden_size).init(device);
        let norm2   = LayerNormConfig::new(self.hidden_size).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

/// One encoder block: padded self-attention + FFN, post-norm residuals.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    self_attn:   MultiHeadAttention<B>,
    ffn_linear1: Linear<B>,
    ffn_linear2: Linear<B>,
    norm1:       LayerNorm<B>,
    norm2:       LayerNorm<B>,
    dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// `x`: [batch, seq, hidden]; `pad_mask`: [batch, seq], true at [PAD] keys.
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));

        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone())),
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct SpellingEncoder<B: Backend> {
    token_embedding:    Embedding<B>,
    position_embedding: Embedding<B>,
    layers:             Vec<EncoderBlock<B>>,
    final_norm:         LayerNorm<B>,
    dropout:            Dropout,
}

impl<B: Backend> SpellingEncoder<B> {
    /// Token + learned position embeddings: [batch, seq] → [batch, seq, hidden].
    /// Exposed separately so the decoder can reuse the same tables when
    /// embeddings are shared across the two vocabularies.
    pub fn embed(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = token_ids.dims();
        let tok_emb = self.token_embedding.forward(token_ids);

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        tok_emb + pos_emb
    }

    /// Encode a batch of spelling token ids into contextual hidden states.
    ///
    /// `token_ids`: [batch, seq]; `pad_mask`: [batch, seq] true at [PAD].
    /// Returns [batch, seq, hidden].
    pub fn forward(
        &self,
        token_ids: Tensor<B, 2, Int>,
        pad_mask:  Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let mut x = self.dropout.forward(self.embed(token_ids));
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }
        self.final_norm.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::mask::padding_key_mask;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn encoder_preserves_sequence_shape() {
        let device  = Default::default();
        let encoder = SpellingEncoderConfig::new(50, 16, 32, 4, 64, 2, 0.0).init::<B>(&device);

        let ids = Tensor::<B, 1, Int>::from_ints([5, 6, 7, 0, 0, 0, 0, 0], &device).reshape([1, 8]);
        let pad = padding_key_mask(&ids, 0);

        let hidden = encoder.forward(ids, pad);
        assert_eq!(hidden.dims(), [1, 8, 32]);
    }
}
