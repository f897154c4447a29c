// ============================================================
// Layer 5 — Decoder Stack
// ============================================================
// N identical decoder layers, each running three sub-steps:
//
//   (a) masked multi-head self-attention over decoder states,
//       restricted by the fused look-ahead + padding mask
//   (b) multi-head cross-attention: queries from the decoder
//       state, keys/values from encoder output, restricted by
//       the encoder key-padding mask
//   (c) position-wise feed-forward (Linear → GELU → Linear)
//
// Every sub-step is residual + layer norm and preserves the
// [batch, seq, hidden] shape.

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
pub struct DecoderStackConfig {
    pub vocab_size:        usize,
    pub max_seq_length:    usize,
    pub hidden_size:       usize,
    pub num_attn_head:     usize,
    pub feed_forward_size: usize,
    pub num_layers:        usize,
    pub dropout:           f64,
}

impl DecoderStackConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DecoderStack<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.hidden_size).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_length, self.hidden_size).init(device);
        let layers = (0..self.num_layers)
            .map(|_| self.build_layer(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.hidden_size).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        DecoderStack { token_embedding, position_embedding, layers, final_norm, dropout }
    }

    fn build_layer<B: Backend>(&self, device: &B::Device) -> DecoderLayer<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.hidden_size, self.num_attn_head)
            .with_dropout(self.dropout)
            .init(device);
        let cross_attn = MultiHeadAttentionConfig::new(self.hidden_size, self.num_attn_head)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.hidden_size, self.feed_forward_size).init(device);
        let ffn_linear2 = LinearConfig::new(self.feed_forward_size, self.hidden_size).init(device);
        DecoderLayer {
            self_attn,
            cross_attn,
            ffn_linear1,
            ffn_linear2,
            norm1:   LayerNormConfig::new(self.hidden_size).init(device),
            norm2:   LayerNormConfig::new(self.hidden_size).init(device),
            norm3:   LayerNormConfig::new(self.hidden_size).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// One decoder layer: masked self-attn → cross-attn → FFN.
#[derive(Module, Debug)]
pub struct DecoderLayer<B: Backend> {
    self_attn:   MultiHeadAttention<B>,
    cross_attn:  MultiHeadAttention<B>,
    ffn_linear1: Linear<B>,
    ffn_linear2: Linear<B>,
    norm1:       LayerNorm<B>,
    norm2:       LayerNorm<B>,
    norm3:       LayerNorm<B>,
    dropout:     Dropout,
}

impl<B: Backend> DecoderLayer<B> {
    /// - `x`:               [batch, seq, hidden] — decoder states
    /// - `memory`:          [batch, mem_len, hidden] — encoder output
    /// - `self_attn_mask`:  [batch, seq, seq] — fused causal + padding, true = blocked
    /// - `memory_key_mask`: [batch, mem_len] — true at encoder [PAD] keys
    pub fn forward(
        &self,
        x:               Tensor<B, 3>,
        memory:          Tensor<B, 3>,
        self_attn_mask:  Tensor<B, 3, Bool>,
        memory_key_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        // (a) masked self-attention — no future, no padding
        let self_input = MhaInput::self_attn(x.clone()).mask_attn(self_attn_mask);
        let self_out   = self.self_attn.forward(self_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(self_out));

        // (b) cross-attention into encoder memory — encoder padding blocked
        let cross_input = MhaInput::new(x.clone(), memory.clone(), memory)
            .mask_pad(memory_key_mask);
        let cross_out = self.cross_attn.forward(cross_input).context;
        let x = self.norm2.forward(x + self.dropout.forward(cross_out));

        // (c) position-wise feed-forward
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone())),
        );
        self.norm3.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct DecoderStack<B: Backend> {
    token_embedding:    Embedding<B>,
    position_embedding: Embedding<B>,
    layers:             Vec<DecoderLayer<B>>,
    final_norm:         LayerNorm<B>,
    dropout:            Dropout,
}

impl<B: Backend> DecoderStack<B> {
    /// Token + position embeddings for decoder input ids.
    pub fn embed(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = token_ids.dims();
        let tok_emb = self.token_embedding.forward(token_ids);

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        tok_emb + pos_emb
    }

    /// Run the stack over already-embedded decoder input.
    ///
    /// Split out from [`Self::forward`] so the model can substitute a shared
    /// embedding table (see `share_embeddings`).
    pub fn forward_embedded(
        &self,
        x:               Tensor<B, 3>,
        memory:          Tensor<B, 3>,
        self_attn_mask:  Tensor<B, 3, Bool>,
        memory_key_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let mut x = self.dropout.forward(x);
        for layer in &self.layers {
            x = layer.forward(
                x,
                memory.clone(),
                self_attn_mask.clone(),
                memory_key_mask.clone(),
            );
        }
        self.final_norm.forward(x)
    }

    /// `token_ids`: [batch, seq] → refined states [batch, seq, hidden].
    pub fn forward(
        &self,
        token_ids:       Tensor<B, 2, Int>,
        memory:          Tensor<B, 3>,
        self_attn_mask:  Tensor<B, 3, Bool>,
        memory_key_mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let x = self.embed(token_ids);
        self.forward_embedded(x, memory, self_attn_mask, memory_key_mask)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::mask::{decoder_self_attn_mask, padding_key_mask};
    use burn::backend::NdArray;

    type B = NdArray;

    fn small_config() -> DecoderStackConfig {
        DecoderStackConfig::new(40, 16, 32, 4, 64, 2, 0.0)
    }

    #[test]
    fn layer_preserves_shape() {
        let device = Default::default();
        let cfg    = small_config();
        let layer  = cfg.build_layer::<B>(&device);

        let dec_ids = Tensor::<B, 1, Int>::from_ints([2, 5, 6, 0], &device).reshape([1, 4]);
        let enc_ids = Tensor::<B, 1, Int>::from_ints([7, 8, 0, 0, 0, 0], &device).reshape([1, 6]);

        let x      = Tensor::<B, 3>::zeros([1, 4, 32], &device);
        let memory = Tensor::<B, 3>::zeros([1, 6, 32], &device);

        let out = layer.forward(
            x,
            memory,
            decoder_self_attn_mask(&dec_ids, 0),
            padding_key_mask(&enc_ids, 0),
        );
        assert_eq!(out.dims(), [1, 4, 32]);
    }

    #[test]
    fn stack_preserves_shape_across_layers() {
        let device = Default::default();
        let stack  = small_config().init::<B>(&device);

        let dec_ids = Tensor::<B, 1, Int>::from_ints([2, 5, 6, 7, 0, 0, 0, 0], &device)
            .reshape([1, 8]);
        let enc_ids = Tensor::<B, 1, Int>::from_ints([9, 10, 11, 0, 0], &device).reshape([1, 5]);
        let memory  = Tensor::<B, 3>::zeros([1, 5, 32], &device);

        let out = stack.forward(
            dec_ids.clone(),
            memory,
            decoder_self_attn_mask(&dec_ids, 0),
            padding_key_mask(&enc_ids, 0),
        );
        assert_eq!(out.dims(), [1, 8, 32]);
    }
}
