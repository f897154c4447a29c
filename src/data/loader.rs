// ============================================================
// Layer 4 — Parallel Text Loader
// ============================================================
// Reads the two UTF-8 corpus files: one sentence per line, line i
// of the spelling file aligned with line i of the pronunciation
// file. A line-count mismatch means the files are out of sync and
// every downstream pair would be wrong, so it is fatal — there is
// no safe partial recovery from misaligned data.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::pair::SpellingPair;
use crate::domain::traits::PairSource;
use crate::error::G2pError;

/// Loads aligned spelling/pronunciation pairs from two text files.
pub struct ParallelTextLoader {
    src_path: String,
    trg_path: String,
}

impl ParallelTextLoader {
    pub fn new(src_path: impl Into<String>, trg_path: impl Into<String>) -> Self {
        Self {
            src_path: src_path.into(),
            trg_path: trg_path.into(),
        }
    }
}

impl PairSource for ParallelTextLoader {
    fn load_all(&self) -> Result<Vec<SpellingPair>> {
        let src_lines = read_lines(&self.src_path)?;
        let trg_lines = read_lines(&self.trg_path)?;

        if src_lines.len() != trg_lines.len() {
            return Err(G2pError::DataAlignment {
                src_path:  self.src_path.clone(),
                trg_path:  self.trg_path.clone(),
                src_lines: src_lines.len(),
                trg_lines: trg_lines.len(),
            }
            .into());
        }

        let pairs: Vec<SpellingPair> = src_lines
            .into_iter()
            .zip(trg_lines)
            .map(|(s, t)| SpellingPair::new(s, t))
            .filter(|p| !p.is_blank())
            .collect();

        tracing::info!(
            "Loaded {} aligned pairs from '{}' / '{}'",
            pairs.len(),
            self.src_path,
            self.trg_path,
        );
        Ok(pairs)
    }
}

/// Read a file into per-line strings, stripping the line terminator only —
/// interior whitespace is meaningful to the tokenizer.
fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read corpus file '{}'", path.display()))?;

    let mut lines: Vec<String> = text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect();
    // A trailing newline produces one empty phantom line — drop it.
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("spell2pron_{}_{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn aligned_files_load_pairwise() {
        let src = write_temp("src_ok.txt", "가랑비에 옷 젖는 줄 모른다.\n가격 1300원이야.\n");
        let trg = write_temp("trg_ok.txt", "가랑비에 옫 전는 줄 모른다.\n가격 천삼백 워니야.\n");

        let pairs = ParallelTextLoader::new(&src, &trg).load_all().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].spelling, "가랑비에 옷 젖는 줄 모른다.");
        assert_eq!(pairs[1].pronunciation, "가격 천삼백 워니야.");
    }

    #[test]
    fn line_count_mismatch_is_fatal() {
        let src = write_temp("src_bad.txt", "하나\n둘\n셋\n");
        let trg = write_temp("trg_bad.txt", "하나\n둘\n");

        let err = ParallelTextLoader::new(&src, &trg).load_all().unwrap_err();
        let g2p = err.downcast_ref::<G2pError>().unwrap();
        assert!(matches!(g2p, G2pError::DataAlignment { src_lines: 3, trg_lines: 2, .. }));
    }

    #[test]
    fn blank_pairs_are_dropped() {
        let src = write_temp("src_blank.txt", "가\n\n나\n");
        let trg = write_temp("trg_blank.txt", "가\n\n나\n");

        let pairs = ParallelTextLoader::new(&src, &trg).load_all().unwrap();
        assert_eq!(pairs.len(), 2);
    }
}
