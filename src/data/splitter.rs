// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffle then split, so the validation set is a representative
// sample of the corpus rather than its tail. Uses the rand
// crate's Fisher-Yates shuffle.

use rand::seq::SliceRandom;

/// Randomly shuffle `samples` and split into (train, validation).
/// `train_fraction` is the proportion kept for training, e.g. 0.8.
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sizes_follow_the_fraction() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val) = split_train_val(items, 0.8);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(), 20);
    }

    #[test]
    fn no_sample_is_lost() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val) = split_train_val(items, 0.7);
        assert_eq!(train.len() + val.len(), 50);
    }

    #[test]
    fn empty_corpus_splits_empty() {
        let (train, val) = split_train_val(Vec::<usize>::new(), 0.8);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn full_fraction_keeps_everything_for_training() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val) = split_train_val(items, 1.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
