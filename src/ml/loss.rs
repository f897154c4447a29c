// ============================================================
// Layer 5 — Class-Weighted Cross-Entropy
// ============================================================
// Cross-entropy over flattened (batch×len) logits vs target ids,
// scaled per target class. The first four vocabulary slots are
// the special tokens ([PAD], [UNK], [CLS], [SEP]); they dominate
// padded sequences, so their contribution is suppressed:
//
//   weight([PAD]) = 0.001, weight([UNK]/[CLS]/[SEP]) = 0.01,
//   weight(everything else) = 1.0
//
// Normalisation is by position count, so a batch whose targets
// are all class c yields exactly weight(c) × the unweighted loss.
// Padding positions are included by default; `mask_padding`
// excludes them and normalises by the non-pad count instead.

use burn::prelude::*;
use burn::tensor::activation::log_softmax;

/// Per-class weight for the first four (special-token) vocabulary slots.
const SPECIAL_TOKEN_WEIGHTS: [f32; 4] = [0.001, 0.01, 0.01, 0.01];

/// Build the per-class weight vector for a target vocabulary.
pub fn class_weights(trg_vocab_size: usize) -> Vec<f32> {
    let mut weights = vec![1.0; trg_vocab_size];
    for (slot, &w) in SPECIAL_TOKEN_WEIGHTS.iter().enumerate() {
        if slot < trg_vocab_size {
            weights[slot] = w;
        }
    }
    weights
}

/// Class-weighted cross-entropy criterion.
///
/// Holds the weight vector as a tensor on the compute device so the
/// per-batch cost is a single gather.
pub struct WeightedCrossEntropy<B: Backend> {
    weights:      Tensor<B, 1>,
    pad_id:       usize,
    mask_padding: bool,
}

impl<B: Backend> WeightedCrossEntropy<B> {
    pub fn new(
        weights:      Vec<f32>,
        pad_id:       usize,
        mask_padding: bool,
        device:       &B::Device,
    ) -> Self {
        Self {
            weights: Tensor::<B, 1>::from_floats(weights.as_slice(), device),
            pad_id,
            mask_padding,
        }
    }

    /// `logits`: [n, trg_vocab] raw scores; `targets`: [n] gold ids.
    /// Returns the scalar loss.
    pub fn forward(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let log_probs = log_softmax(logits, 1);

        // Negative log-likelihood of the gold class at every position.
        let picked = log_probs
            .gather(1, targets.clone().unsqueeze_dim::<2>(1))
            .squeeze::<1>(1);
        let nll = picked.neg();

        let weights = self.weights.clone().gather(0, targets.clone());

        if self.mask_padding {
            let keep  = targets.not_equal_elem(self.pad_id as i32).float();
            let total = (nll * weights * keep.clone()).sum();
            total / keep.sum().clamp_min(1.0)
        } else {
            (nll * weights).mean()
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn scalar(t: Tensor<B, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    fn random_logits(n: usize, vocab: usize, device: &<B as Backend>::Device) -> Tensor<B, 2> {
        // Deterministic spread — enough asymmetry that the loss is not flat.
        let values: Vec<f32> = (0..n * vocab)
            .map(|i| ((i * 37 + 11) % 17) as f32 / 4.0)
            .collect();
        Tensor::<B, 1>::from_floats(values.as_slice(), device).reshape([n, vocab])
    }

    #[test]
    fn weight_vector_layout() {
        let w = class_weights(10);
        assert_eq!(w.len(), 10);
        assert_eq!(w[0], 0.001);
        assert_eq!(&w[1..4], &[0.01, 0.01, 0.01]);
        assert!(w[4..].iter().all(|&x| x == 1.0));
    }

    #[test]
    fn down_weighted_class_scales_the_loss() {
        let device = Default::default();
        let vocab  = 8;
        let logits = random_logits(6, vocab, &device);
        let targets = Tensor::<B, 1, Int>::zeros([6], &device); // all class 0

        let weighted = WeightedCrossEntropy::<B>::new(class_weights(vocab), 0, false, &device);
        let unweighted = WeightedCrossEntropy::<B>::new(vec![1.0; vocab], 0, false, &device);

        let lw = scalar(weighted.forward(logits.clone(), targets.clone()));
        let lu = scalar(unweighted.forward(logits, targets));

        assert!(lu.is_finite() && lu > 0.0);
        assert!((lw - 0.001 * lu).abs() < 1e-5, "weighted={lw} unweighted={lu}");
    }

    #[test]
    fn pad_masking_zeroes_an_all_pad_batch() {
        let device = Default::default();
        let vocab  = 8;
        let logits = random_logits(4, vocab, &device);
        let targets = Tensor::<B, 1, Int>::zeros([4], &device); // all [PAD]

        let criterion = WeightedCrossEntropy::<B>::new(vec![1.0; vocab], 0, true, &device);
        assert_eq!(scalar(criterion.forward(logits, targets)), 0.0);
    }

    #[test]
    fn pad_masking_keeps_only_real_positions() {
        let device = Default::default();
        let vocab  = 8;
        let logits = random_logits(4, vocab, &device);
        let mixed  = Tensor::<B, 1, Int>::from_ints([5, 6, 0, 0], &device);
        let real   = Tensor::<B, 1, Int>::from_ints([5, 6], &device);

        let masked   = WeightedCrossEntropy::<B>::new(vec![1.0; vocab], 0, true, &device);
        let plain    = WeightedCrossEntropy::<B>::new(vec![1.0; vocab], 0, false, &device);
        let real_logits = logits.clone().slice([0..2, 0..vocab]);

        let lm = scalar(masked.forward(logits, mixed));
        let lp = scalar(plain.forward(real_logits, real));
        assert!((lm - lp).abs() < 1e-5, "masked={lm} real-only={lp}");
    }
}
