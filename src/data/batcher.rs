// ============================================================
// Layer 4 — G2p Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks a Vec<G2pSample> into
// three [batch, seq] Int tensors for one forward pass. Sequence
// length is an explicit precondition checked here — the feature
// builder pads every sample to the same canvas, and a sample that
// slipped through with a different length would silently corrupt
// the reshape, so it panics instead.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::G2pSample;

/// A batch of G2p samples ready for the model.
#[derive(Debug, Clone)]
pub struct G2pBatch<B: Backend> {
    /// Spelling token ids — [batch, seq]
    pub encoder_ids: Tensor<B, 2, Int>,
    /// [CLS]-seeded pronunciation ids — [batch, seq]
    pub decoder_ids: Tensor<B, 2, Int>,
    /// Gold pronunciation ids — [batch, seq]
    pub targets:     Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct G2pBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> G2pBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn stack(&self, rows: Vec<&[u32]>, seq_len: usize) -> Tensor<B, 2, Int> {
        let batch_size = rows.len();
        let flat: Vec<i32> = rows
            .into_iter()
            .flat_map(|r| r.iter().map(|&x| x as i32))
            .collect();
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len])
    }
}

impl<B: Backend> Batcher<B, G2pSample, G2pBatch<B>> for G2pBatcher<B> {
    fn batch(&self, items: Vec<G2pSample>, _device: &B::Device) -> G2pBatch<B> {
        let seq_len = items[0].seq_length();
        assert!(
            items.iter().all(|s| s.encoder_ids.len() == seq_len
                && s.decoder_ids.len() == seq_len
                && s.target_ids.len() == seq_len),
            "batch contains samples with inconsistent sequence lengths",
        );

        let encoder_ids = self.stack(items.iter().map(|s| s.encoder_ids.as_slice()).collect(), seq_len);
        let decoder_ids = self.stack(items.iter().map(|s| s.decoder_ids.as_slice()).collect(), seq_len);
        let targets     = self.stack(items.iter().map(|s| s.target_ids.as_slice()).collect(), seq_len);

        G2pBatch { encoder_ids, decoder_ids, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn sample(fill: u32) -> G2pSample {
        G2pSample {
            encoder_ids: vec![fill, fill, 0, 0],
            decoder_ids: vec![2, fill, 0, 0],
            target_ids:  vec![fill, 3, 0, 0],
        }
    }

    #[test]
    fn batch_shapes_are_batch_by_seq() {
        let batcher = G2pBatcher::<B>::new(Default::default());
        let batch = batcher.batch(vec![sample(5), sample(6), sample(7)], &Default::default());

        assert_eq!(batch.encoder_ids.dims(), [3, 4]);
        assert_eq!(batch.decoder_ids.dims(), [3, 4]);
        assert_eq!(batch.targets.dims(), [3, 4]);
    }

    #[test]
    fn row_order_is_preserved() {
        let batcher = G2pBatcher::<B>::new(Default::default());
        let batch = batcher.batch(vec![sample(5), sample(9)], &Default::default());

        let flat = batch.encoder_ids.into_data().to_vec::<i64>().unwrap();
        assert_eq!(flat, vec![5, 5, 0, 0, 9, 9, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "inconsistent sequence lengths")]
    fn mixed_lengths_panic() {
        let batcher = G2pBatcher::<B>::new(Default::default());
        let mut short = sample(5);
        short.encoder_ids.pop();
        batcher.batch(vec![sample(6), short], &Default::default());
    }
}
