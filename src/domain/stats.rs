// ============================================================
// Layer 3 — Epoch Statistics
// ============================================================
// Transient accumulators reset at the start of every epoch.
//
//   loss     = sum of per-batch mean losses / number of batches
//   accuracy = correctly classified samples / samples seen
//
// The loss is averaged per batch, not per sample.

/// Running loss and accuracy for one pass over a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpochStats {
    loss_sum: f64,
    batches:  usize,
    correct:  usize,
    samples:  usize,
}

impl EpochStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch: its mean loss, how many predictions were
    /// correct and how many samples it held.
    pub fn record_batch(&mut self, mean_loss: f64, correct: usize, samples: usize) {
        self.loss_sum += mean_loss;
        self.batches  += 1;
        self.correct  += correct;
        self.samples  += samples;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Mean of the per-batch losses, NaN before any batch.
    pub fn loss(&self) -> f64 {
        if self.batches > 0 {
            self.loss_sum / self.batches as f64
        } else {
            f64::NAN
        }
    }

    /// Fraction of correct predictions, 0 before any sample.
    pub fn accuracy(&self) -> f64 {
        if self.samples > 0 {
            self.correct as f64 / self.samples as f64
        } else {
            0.0
        }
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_is_mean_of_batch_means() {
        let mut s = EpochStats::new();
        s.record_batch(1.0, 10, 10);
        s.record_batch(3.0, 0, 2);
        // Batch sizes do not weight the loss
        assert_eq!(s.loss(), 2.0);
        assert_eq!(s.accuracy(), 10.0 / 12.0);
        assert_eq!(s.batches(), 2);
        assert_eq!(s.samples(), 12);
    }

    #[test]
    fn test_empty_stats() {
        let s = EpochStats::new();
        assert!(s.loss().is_nan());
        assert_eq!(s.accuracy(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut s = EpochStats::new();
        s.record_batch(0.5, 3, 4);
        s.reset();
        assert_eq!(s, EpochStats::new());
    }
}
