// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// The model never sees text — only ids. This store owns the
// text↔id boundary:
//
//   - production path: a pretrained tokenizer.json (e.g. a Korean
//     wordpiece vocabulary) dropped into the checkpoint directory
//   - fallback path: build a whitespace word-level vocabulary from
//     the training corpus and write it in HuggingFace tokenizer
//     JSON format, so the pipeline runs without external artifacts
//
// Special-token ids are resolved by name at startup, never
// hardcoded — the class-weight vector and the feature builder both
// depend on them being correct for whatever vocabulary is loaded.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::error::G2pError;

/// Resolved ids of the special tokens the pipeline relies on.
#[derive(Debug, Clone, Copy)]
pub struct SpecialTokens {
    pub pad: u32,
    pub cls: u32,
    pub sep: u32,
}

impl SpecialTokens {
    /// Look up [PAD]/[CLS]/[SEP] in the loaded vocabulary.
    /// A vocabulary missing any of them cannot drive this pipeline.
    pub fn resolve(tokenizer: &Tokenizer) -> Result<Self> {
        let id = |token: &str| -> Result<u32> {
            tokenizer.token_to_id(token).ok_or_else(|| {
                G2pError::Tokenizer(format!("vocabulary has no {token} token")).into()
            })
        };
        Ok(Self {
            pad: id("[PAD]")?,
            cls: id("[CLS]")?,
            sep: id("[SEP]")?,
        })
    }
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load an existing tokenizer.json or build the fallback vocabulary.
    pub fn load_or_build(&self, texts: &[String]) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading tokenizer from '{}'", tok_path.display());
            self.load()
        } else {
            tracing::info!("No tokenizer.json found — building word-level vocabulary");
            self.build_and_save(texts)
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })
    }

    /// Build a whitespace word-level vocabulary over the corpus and write
    /// it in HuggingFace tokenizer JSON format. Special tokens take the
    /// first five ids — the loss class-weight layout assumes this order.
    fn build_and_save(&self, texts: &[String]) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        use std::collections::HashMap;
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for text in texts {
            for word in text.split_whitespace() {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        // Frequency order keeps common-word ids stable across rebuilds
        // of the same corpus.
        let mut words: Vec<(&str, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        let mut vocab = serde_json::json!({
            "[PAD]":  0,
            "[UNK]":  1,
            "[CLS]":  2,
            "[SEP]":  3,
            "[MASK]": 4,
        });

        let mut next_id = 5usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": "[PAD]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": "[UNK]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": "[CLS]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 3, "content": "[SEP]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 4, "content": "[MASK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": null,
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display(),
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}
