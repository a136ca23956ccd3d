//! Exact cosine nearest-neighbor search over a standardized feature matrix.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::RecommenderError;

pub const METRIC: &str = "cosine";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row in the indexed matrix.
    pub row: usize,
    /// Cosine distance, `1 - cosine_similarity`.
    pub distance: f64,
}

impl Neighbor {
    /// Similarity in `[0, 1]`.
    pub fn similarity(&self) -> f64 {
        (1.0 - self.distance).clamp(0.0, 1.0)
    }
}

/// Brute-force index: every query is scored against every stored row.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    matrix: Array2<f64>,
    norms: Array1<f64>,
}

impl NeighborIndex {
    pub fn build(matrix: Array2<f64>) -> Self {
        let norms = matrix
            .axis_iter(Axis(0))
            .map(|row| row.dot(&row).sqrt())
            .collect();
        Self { matrix, norms }
    }

    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn row(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.len()).then(|| self.matrix.row(row))
    }

    /// The `k` rows closest to `vector`, nearest first. `k` is clamped to the
    /// corpus size; equal distances keep row order.
    pub fn query(
        &self,
        vector: ArrayView1<'_, f64>,
        k: usize,
    ) -> Result<Vec<Neighbor>, RecommenderError> {
        if vector.len() != self.dimension() {
            return Err(RecommenderError::DimensionMismatch {
                expected: self.dimension(),
                got: vector.len(),
            });
        }

        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = vector.dot(&vector).sqrt();
        let mut neighbors: Vec<Neighbor> = self
            .matrix
            .axis_iter(Axis(0))
            .zip(self.norms.iter())
            .enumerate()
            .map(|(row, (stored, &norm))| Neighbor {
                row,
                distance: cosine_distance(vector, stored, query_norm, norm),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.row.cmp(&b.row))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

/// A zero-length vector has no direction; it is treated as orthogonal to everything.
fn cosine_distance(
    a: ArrayView1<'_, f64>,
    b: ArrayView1<'_, f64>,
    a_norm: f64,
    b_norm: f64,
) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 1.0;
    }
    1.0 - a.dot(&b) / (a_norm * b_norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn index() -> NeighborIndex {
        NeighborIndex::build(array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
        ])
    }

    #[test]
    fn test_self_is_nearest_at_zero_distance() {
        let index = index();
        let row = index.row(0).unwrap();
        let neighbors = index.query(row, 2).unwrap();

        assert_eq!(neighbors[0].row, 0);
        assert!(neighbors[0].distance.abs() < 1e-12);
        assert_eq!(neighbors[1].row, 1);
    }

    #[test]
    fn test_k_is_clamped_to_corpus_size() {
        let index = index();
        let neighbors = index.query(array![1.0, 0.0, 0.0].view(), 50).unwrap();

        assert_eq!(neighbors.len(), 4);
        assert!(index.query(array![1.0, 0.0, 0.0].view(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_results_ordered_by_distance() {
        let index = index();
        let neighbors = index.query(array![1.0, 0.0, 0.0].view(), 4).unwrap();

        let rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3]);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_similarity_is_clamped() {
        let index = index();
        let neighbors = index.query(array![1.0, 0.0, 0.0].view(), 4).unwrap();

        // Opposite direction: distance 2, similarity 0
        assert!((neighbors[3].distance - 2.0).abs() < 1e-12);
        assert_eq!(neighbors[3].similarity(), 0.0);
        let overshoot = Neighbor {
            row: 0,
            distance: -1e-16,
        };
        assert_eq!(overshoot.similarity(), 1.0);
        assert!(neighbors.iter().all(|n| (0.0..=1.0).contains(&n.similarity())));
    }

    #[test]
    fn test_ties_keep_row_order() {
        let matrix = array![[0.0, 1.0], [1.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        let index = NeighborIndex::build(matrix);
        let neighbors = index.query(array![1.0, 0.0].view(), 3).unwrap();

        let rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_vector_is_orthogonal() {
        let index = NeighborIndex::build(array![[0.0, 0.0], [1.0, 0.0]]);
        let neighbors = index.query(array![0.0, 0.0].view(), 2).unwrap();

        assert!(neighbors.iter().all(|n| n.distance == 1.0));
        assert!(neighbors.iter().all(|n| n.similarity() == 0.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = index();

        assert_eq!(
            index.query(array![1.0, 0.0].view(), 1).unwrap_err(),
            RecommenderError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        );
    }
}
