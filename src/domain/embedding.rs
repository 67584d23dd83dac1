// ============================================================
// Layer 3 — Embedding Points
// ============================================================
// During plotting epochs every sample's 2-D embedding is kept
// together with its label so the class clusters can be drawn.
// The set is filled batch by batch from flat host buffers.

use anyhow::{bail, Result};

/// One embedded sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingPoint {
    pub x:     f32,
    pub y:     f32,
    pub label: u8,
}

/// All embedding points collected over one pass of a dataset.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingSet {
    points: Vec<EmbeddingPoint>,
}

impl EmbeddingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of embeddings.
    ///
    /// `coords` is the row-major `[batch, 2]` embedding buffer and
    /// `labels` holds one label per row.
    pub fn extend_batch(&mut self, coords: &[f32], labels: &[u8]) -> Result<()> {
        if coords.len() != labels.len() * 2 {
            bail!(
                "Embedding buffer has {} values for {} labels; expected 2 per label",
                coords.len(),
                labels.len()
            );
        }

        self.points.extend(
            coords
                .chunks_exact(2)
                .zip(labels)
                .map(|(xy, &label)| EmbeddingPoint { x: xy[0], y: xy[1], label }),
        );
        Ok(())
    }

    pub fn points(&self) -> &[EmbeddingPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds as `(min_x, max_x, min_y, max_y)`, or None when empty.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let first = self.points.first()?;
        let init  = (first.x, first.x, first.y, first.y);
        Some(self.points.iter().fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_batch_pairs_coords_with_labels() {
        let mut set = EmbeddingSet::new();
        set.extend_batch(&[1.0, 2.0, -3.0, 4.0], &[7, 1]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.points()[1], EmbeddingPoint { x: -3.0, y: 4.0, label: 1 });
    }

    #[test]
    fn test_extend_batch_rejects_mismatched_lengths() {
        let mut set = EmbeddingSet::new();
        assert!(set.extend_batch(&[1.0, 2.0, 3.0], &[0, 1]).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_bounds() {
        let mut set = EmbeddingSet::new();
        assert!(set.bounds().is_none());
        set.extend_batch(&[1.0, -2.0, -5.0, 4.0, 0.5, 0.5], &[0, 1, 2]).unwrap();
        assert_eq!(set.bounds(), Some((-5.0, 1.0, -2.0, 4.0)));
    }
}
