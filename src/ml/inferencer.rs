// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads the trained model from its checkpoint and turns a raw
// spelling into a pronunciation with greedy autoregressive
// decoding: the output buffer starts as a lone [CLS] and grows
// one argmax token per forward pass until [SEP] or the canvas is
// full. Each pass runs over the fixed-length canvas, so the
// padding and look-ahead masks keep the not-yet-generated tail
// invisible to every query position.

use anyhow::Result;
use burn::prelude::*;
use tokenizers::Tokenizer;

use crate::data::feature::FeatureBuilder;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::tokenizer_store::SpecialTokens;
use crate::ml::model::Spell2PronModel;
use crate::ml::trainer::model_config;

type InferBackend = burn::backend::Wgpu;

pub struct Inferencer {
    model:          Spell2PronModel<InferBackend>,
    special:        SpecialTokens,
    max_seq_length: usize,
    strict_length:  bool,
    device:         burn::backend::wgpu::WgpuDevice,
}

impl Inferencer {
    /// Rebuild the trained architecture from its saved config and
    /// restore the latest checkpoint into it. Dropout is zeroed —
    /// inference must be deterministic.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        tokenizer:    &Tokenizer,
    ) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt_manager.load_config()?;

        let model: Spell2PronModel<InferBackend> =
            model_config(&cfg).with_dropout(0.0).init(&device)?;
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        let special = SpecialTokens::resolve(tokenizer)?;
        Ok(Self {
            model,
            special,
            max_seq_length: cfg.max_seq_length,
            strict_length:  cfg.strict_length,
            device,
        })
    }

    /// Spelling text in, pronunciation text out.
    pub fn transcribe(&self, spelling: &str, tokenizer: &Tokenizer) -> Result<String> {
        let features = FeatureBuilder::new(
            tokenizer,
            self.special,
            self.max_seq_length,
            self.strict_length,
        );
        let encoder_ids = features.encode_source(spelling)?;

        let generated = greedy_decode(
            &self.model,
            &encoder_ids,
            self.special,
            self.max_seq_length,
            &self.device,
        );

        let text = tokenizer
            .decode(&generated, true)
            .map_err(|e| anyhow::anyhow!("Decode: {e}"))?;
        Ok(text.trim().to_string())
    }
}

/// Greedy autoregressive decoding over the fixed-length canvas.
///
/// `encoder_ids` must already be padded to `max_seq_length`. Returns the
/// generated ids without the [CLS] seed or the terminating [SEP].
pub fn greedy_decode<B: Backend>(
    model:          &Spell2PronModel<B>,
    encoder_ids:    &[u32],
    special:        SpecialTokens,
    max_seq_length: usize,
    device:         &B::Device,
) -> Vec<u32> {
    let enc_flat: Vec<i32> = encoder_ids.iter().map(|&x| x as i32).collect();
    let encoder = Tensor::<B, 1, Int>::from_ints(enc_flat.as_slice(), device)
        .reshape([1, max_seq_length]);

    let mut buffer: Vec<u32> = vec![special.cls];

    while buffer.len() < max_seq_length {
        // Re-run the forward pass with the buffer laid onto the canvas.
        let mut canvas: Vec<i32> = buffer.iter().map(|&x| x as i32).collect();
        canvas.resize(max_seq_length, special.pad as i32);
        let decoder = Tensor::<B, 1, Int>::from_ints(canvas.as_slice(), device)
            .reshape([1, max_seq_length]);

        let logits = model.forward(encoder.clone(), decoder);
        let [_, _, vocab] = logits.dims();

        // Next token = argmax at the last filled position.
        let pos = buffer.len() - 1;
        let next = logits
            .slice([0..1, pos..pos + 1, 0..vocab])
            .reshape([vocab])
            .argmax(0)
            .into_scalar()
            .elem::<i64>() as u32;

        if next == special.sep {
            break;
        }
        buffer.push(next);
    }

    buffer.split_off(1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::Spell2PronConfig;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn greedy_decode_stays_inside_the_canvas() {
        let device = Default::default();
        let model = Spell2PronConfig::new(30, 30)
            .with_hidden_size(16)
            .with_num_attn_head(2)
            .with_feed_forward_size(32)
            .with_max_seq_length(8)
            .with_num_layers(1)
            .with_dropout(0.0)
            .init::<B>(&device)
            .unwrap();

        let special = SpecialTokens { pad: 0, cls: 2, sep: 3 };
        let encoder_ids = [5u32, 6, 0, 0, 0, 0, 0, 0];

        let out = greedy_decode(&model, &encoder_ids, special, 8, &device);

        // [CLS] seed + generated tokens never exceed the canvas, every id is
        // in-vocabulary, and the terminator is consumed rather than emitted.
        assert!(out.len() <= 7);
        assert!(out.iter().all(|&id| id < 30));
        assert!(!out.contains(&special.sep));
    }
}
