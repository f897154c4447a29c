// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per epoch so training runs leave a
// plottable record:
//
//   epoch,train_loss,val_loss,token_acc
//   1,5.124500,5.089200,0.113000
//   ...
//
// token_acc is the fraction of non-pad target positions whose
// argmax prediction matches the gold pronunciation token.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    /// Average weighted cross-entropy over training batches
    pub train_loss: f64,
    /// Average weighted cross-entropy on the validation set
    pub val_loss:   f64,
    /// Token-level accuracy on non-pad validation positions
    pub token_acc:  f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, token_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, token_acc }
    }

    /// True if this epoch improved over the previous best val_loss.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header only when the file is new, so one log
    /// can accumulate across runs.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,token_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.token_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improvement_compares_val_loss() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.4);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn rows_are_appended_under_a_single_header() {
        let dir = std::env::temp_dir()
            .join(format!("spell2pron_metrics_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let logger = MetricsLogger::new(dir.to_string_lossy().into_owned()).unwrap();

        logger.log(&EpochMetrics::new(1, 5.0, 5.1, 0.1)).unwrap();
        logger.log(&EpochMetrics::new(2, 4.2, 4.5, 0.2)).unwrap();

        let contents = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,val_loss,token_acc");
        assert!(lines[2].starts_with("2,"));
    }
}
