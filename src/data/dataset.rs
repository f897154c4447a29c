use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One fully tokenised and padded training example.
/// All three sequences have length `max_seq_length`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct G2pSample {
    /// tokens(spelling) + [PAD]...
    pub encoder_ids: Vec<u32>,
    /// [CLS] + tokens(pronunciation) + [PAD]...
    pub decoder_ids: Vec<u32>,
    /// tokens(pronunciation) + [SEP] + [PAD]...
    pub target_ids:  Vec<u32>,
}

impl G2pSample {
    /// Sequence length shared by the three id vectors.
    pub fn seq_length(&self) -> usize {
        self.encoder_ids.len()
    }
}

pub struct G2pDataset {
    samples: Vec<G2pSample>,
}

impl G2pDataset {
    pub fn new(samples: Vec<G2pSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<G2pSample> for G2pDataset {
    fn get(&self, index: usize) -> Option<G2pSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
