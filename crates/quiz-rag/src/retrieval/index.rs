//! Brute-force in-memory vector index

use std::cmp::Ordering;

use crate::error::{Error, Result};

use super::similarity;

/// Exact nearest-neighbour index over one document's chunk embeddings.
///
/// Row `i` belongs to chunk `i` of the owning [`super::ChunkSet`].
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index, rejecting vectors whose length differs from the first
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);

        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dimensions {
                return Err(Error::embedding(format!(
                    "Embedding dimension mismatch at chunk {}: expected {}, got {}",
                    i,
                    dimensions,
                    v.len()
                )));
            }
        }

        let norms = vectors.iter().map(|v| similarity::l2_norm(v)).collect();

        Ok(Self {
            vectors,
            norms,
            dimensions,
        })
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector dimensionality (0 when empty)
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Top-k rows by cosine similarity, best first. Ties keep index order.
    /// Zero-norm rows are skipped.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Query embedding dims do not match index dims: index={}, query={}",
                self.dimensions,
                query.len()
            )));
        }

        let q_norm = similarity::l2_norm(query);
        if q_norm == 0.0 {
            return Err(Error::embedding("Query embedding norm is zero"));
        }

        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .zip(self.norms.iter())
            .enumerate()
            .filter(|(_, (_, norm))| **norm > 0.0)
            .map(|(i, (v, norm))| (i, similarity::cosine_with_norms(query, v, q_norm, *norm)))
            .collect();

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hits.truncate(k);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let result = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = VectorIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
        ])
        .unwrap();

        let hits = index.search(&[1.0, 0.1], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 2);
    }

    #[test]
    fn test_search_ties_keep_index_order() {
        let index = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 5).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_empty_and_mismatch() {
        let empty = VectorIndex::default();
        assert!(empty.search(&[1.0], 3).unwrap().is_empty());

        let index = VectorIndex::build(vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 3).is_err());
        assert!(index.search(&[0.0, 0.0], 3).is_err());
    }
}
