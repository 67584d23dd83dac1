// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per epoch to {checkpoint_dir}/metrics.csv:
//
//   epoch,train_acc,train_loss,val_acc,val_loss,seconds
//   0,0.412031,1.934120,0.701200,1.211877,14.221034
//   1,0.803311,0.911245,0.911400,0.522201,13.998712
//
// The header is written only when the file is new, so repeated
// runs against the same directory extend one log.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

const HEADER: &str = "epoch,train_acc,train_loss,val_acc,val_loss,seconds";

/// One row of metrics for a single training epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    /// Zero-based epoch number
    pub epoch: usize,

    /// Fraction of training samples classified correctly
    pub train_acc: f64,

    /// Mean of the per-batch training losses
    pub train_loss: f64,

    /// Fraction of validation samples classified correctly
    pub val_acc: f64,

    /// Mean of the per-batch validation losses
    pub val_loss: f64,

    /// Wall-clock time of the epoch including validation
    pub seconds: f64,
}

impl EpochMetrics {
    /// Returns true if this epoch's validation loss beats `best_val_loss`
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            self.epoch, self.train_acc, self.train_loss, self.val_acc, self.val_loss, self.seconds,
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    /// Path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(epoch: usize, val_loss: f64) -> EpochMetrics {
        EpochMetrics {
            epoch,
            train_acc: 0.5,
            train_loss: 1.25,
            val_acc: 0.75,
            val_loss,
            seconds: 2.0,
        }
    }

    #[test]
    fn test_is_improvement() {
        let m = metrics(2, 2.3);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_log_appends_rows_after_single_header() {
        let dir = std::env::temp_dir()
            .join(format!("mnist-center-loss-metrics-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let logger = MetricsLogger::new(dir.display().to_string()).unwrap();
        logger.log(&metrics(0, 1.0)).unwrap();

        // A second logger on the same directory keeps the existing file
        let again = MetricsLogger::new(dir.display().to_string()).unwrap();
        again.log(&metrics(1, 0.5)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "0,0.500000,1.250000,0.750000,1.000000,2.000000");
        assert_eq!(lines.len(), 3);
        let _ = fs::remove_dir_all(&dir);
    }
}
