// ============================================================
// Layer 4 — Feature Builder
// ============================================================
// Turns one SpellingPair into the three fixed-length id sequences
// the model trains on:
//
//   encoder input = tokens(spelling)                 + [PAD]...
//   decoder input = [CLS] + tokens(pronunciation)    + [PAD]...
//   target        = tokens(pronunciation) + [SEP]    + [PAD]...
//
// Decoder input and target are the same sentence shifted by one
// position — teacher forcing. All three are padded to exactly
// `max_seq_length` so batch shapes never vary.
//
// Overflow policy is explicit, never silent: a sequence longer
// than the canvas is truncated with a logged warning, or rejected
// outright in strict mode.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::dataset::G2pSample;
use crate::domain::pair::SpellingPair;
use crate::error::G2pError;
use crate::infra::tokenizer_store::SpecialTokens;

pub struct FeatureBuilder<'a> {
    tokenizer:      &'a Tokenizer,
    special:        SpecialTokens,
    max_seq_length: usize,
    /// Reject over-length sequences instead of truncating.
    strict_length:  bool,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(
        tokenizer:      &'a Tokenizer,
        special:        SpecialTokens,
        max_seq_length: usize,
        strict_length:  bool,
    ) -> Self {
        Self { tokenizer, special, max_seq_length, strict_length }
    }

    /// Build the padded (encoder, decoder, target) triple for one pair.
    pub fn build_sample(&self, pair: &SpellingPair) -> Result<G2pSample> {
        let src_ids = self.token_ids(&pair.spelling)?;
        let trg_ids = self.token_ids(&pair.pronunciation)?;

        let encoder_ids = self.fit(src_ids, "spelling")?;

        let mut decoder_ids = vec![self.special.cls];
        decoder_ids.extend_from_slice(&trg_ids);
        let decoder_ids = self.fit(decoder_ids, "decoder input")?;

        let mut target_ids = trg_ids;
        target_ids.push(self.special.sep);
        let target_ids = self.fit(target_ids, "target")?;

        Ok(G2pSample { encoder_ids, decoder_ids, target_ids })
    }

    /// Tokenise and pad raw source text for inference.
    pub fn encode_source(&self, text: &str) -> Result<Vec<u32>> {
        let ids = self.token_ids(text)?;
        self.fit(ids, "spelling")
    }

    fn token_ids(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| G2pError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Enforce the fixed-length canvas: truncate-with-warning or reject,
    /// then pad with [PAD] up to `max_seq_length`.
    fn fit(&self, mut ids: Vec<u32>, what: &str) -> Result<Vec<u32>> {
        if ids.len() > self.max_seq_length {
            if self.strict_length {
                return Err(G2pError::SequenceLengthOverflow {
                    length: ids.len(),
                    max:    self.max_seq_length,
                }
                .into());
            }
            tracing::warn!(
                "Truncating {} sequence from {} to {} tokens",
                what,
                ids.len(),
                self.max_seq_length,
            );
            ids.truncate(self.max_seq_length);
        }
        ids.resize(self.max_seq_length, self.special.pad);
        Ok(ids)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::tests::word_level_tokenizer;

    const MAX: usize = 8;

    fn builder_for(tokenizer: &Tokenizer, strict: bool) -> FeatureBuilder<'_> {
        let special = SpecialTokens::resolve(tokenizer).unwrap();
        FeatureBuilder::new(tokenizer, special, MAX, strict)
    }

    #[test]
    fn triple_is_padded_to_canvas_length() {
        let tok = word_level_tokenizer();
        let fb  = builder_for(&tok, false);

        let sample = fb
            .build_sample(&SpellingPair::new("가 나", "가 나"))
            .unwrap();

        assert_eq!(sample.encoder_ids.len(), MAX);
        assert_eq!(sample.decoder_ids.len(), MAX);
        assert_eq!(sample.target_ids.len(), MAX);
    }

    #[test]
    fn decoder_input_and_target_are_shifted() {
        let tok = word_level_tokenizer();
        let fb  = builder_for(&tok, false);
        let special = SpecialTokens::resolve(&tok).unwrap();

        let sample = fb
            .build_sample(&SpellingPair::new("가", "가 나"))
            .unwrap();

        // decoder: [CLS] 가 나 [PAD]...
        assert_eq!(sample.decoder_ids[0], special.cls);
        assert_eq!(&sample.decoder_ids[1..3], &sample.target_ids[0..2]);
        // target: 가 나 [SEP] [PAD]...
        assert_eq!(sample.target_ids[2], special.sep);
        assert_eq!(sample.target_ids[3], special.pad);
    }

    #[test]
    fn over_length_is_truncated_by_default() {
        let tok = word_level_tokenizer();
        let fb  = builder_for(&tok, false);

        let long = "가 나 다 라 마 가 나 다 라 마";
        let ids  = fb.encode_source(long).unwrap();
        assert_eq!(ids.len(), MAX);
    }

    #[test]
    fn over_length_is_rejected_in_strict_mode() {
        let tok = word_level_tokenizer();
        let fb  = builder_for(&tok, true);

        let long = "가 나 다 라 마 가 나 다 라 마";
        let err  = fb.encode_source(long).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<G2pError>().unwrap(),
            G2pError::SequenceLengthOverflow { length: 10, max: MAX },
        ));
    }

    #[test]
    fn tokenizer_round_trip_preserves_tokens() {
        let tok = word_level_tokenizer();
        let ids = tok.encode("가 나 다", false).unwrap().get_ids().to_vec();
        let back = tok.decode(&ids, true).unwrap();
        assert_eq!(back, "가 나 다");
    }
}
