//! Sample matrix plus labels.
use crate::error::{Result, TrainError};
use ndarray::{s, Array2, ArrayView1, ArrayView2};

/// Row-major feature matrix (`samples × features`) with one label per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    data: Array2<f32>,
    labels: Vec<i32>,
}

impl Dataset {
    pub fn new(data: Array2<f32>, labels: Vec<i32>) -> Result<Self> {
        if data.nrows() != labels.len() {
            return Err(TrainError::RowMismatch {
                samples: data.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self { data, labels })
    }

    /// Stack equally long feature vectors into a matrix.
    ///
    /// An empty `rows` gives an empty `0 × 0` dataset.
    pub fn from_rows(rows: &[Vec<f32>], labels: Vec<i32>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(TrainError::ColumnMismatch {
                    row,
                    expected: cols,
                    actual: values.len(),
                });
            }
            flat.extend_from_slice(values);
        }
        let data = Array2::from_shape_vec((rows.len(), cols), flat)
            .map_err(|e| TrainError::Backend(e.to_string()))?;
        Self::new(data, labels)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn records(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    #[inline]
    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        self.data.row(i)
    }

    #[inline]
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Distinct labels in ascending order.
    pub fn classes(&self) -> Vec<i32> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Split off the last `max(1, floor(len * test_fraction))` rows as a
    /// test set. Returns `(train, test)`; both are empty for an empty dataset.
    pub fn split_holdout(&self, test_fraction: f64) -> (Dataset, Dataset) {
        let n = self.len();
        if n == 0 {
            return (self.clone(), self.clone());
        }
        let test = ((n as f64 * test_fraction).floor() as usize).clamp(1, n);
        let cut = n - test;
        let train = Dataset {
            data: self.data.slice(s![..cut, ..]).to_owned(),
            labels: self.labels[..cut].to_vec(),
        };
        let held_out = Dataset {
            data: self.data.slice(s![cut.., ..]).to_owned(),
            labels: self.labels[cut..].to_vec(),
        };
        (train, held_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Dataset {
        let rows: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32, 1.0]).collect();
        let labels = (0..n as i32).collect();
        Dataset::from_rows(&rows, labels).unwrap()
    }

    #[test]
    fn rejects_mismatched_rows_and_columns() {
        let err = Dataset::new(Array2::zeros((3, 2)), vec![1, 2]).unwrap_err();
        assert_eq!(
            err,
            TrainError::RowMismatch {
                samples: 3,
                labels: 2
            }
        );
        let err = Dataset::from_rows(&[vec![1.0, 2.0], vec![3.0]], vec![0, 1]).unwrap_err();
        assert_eq!(
            err,
            TrainError::ColumnMismatch {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn holdout_takes_the_tail() {
        let (train, test) = numbered(20).split_holdout(0.1);
        assert_eq!((train.len(), test.len()), (18, 2));
        assert_eq!(test.labels(), &[18, 19]);
        assert_eq!(test.row(0)[0], 18.0);
    }

    #[test]
    fn holdout_keeps_at_least_one_test_row() {
        let (train, test) = numbered(5).split_holdout(0.1);
        assert_eq!((train.len(), test.len()), (4, 1));
        let (train, test) = numbered(1).split_holdout(0.1);
        assert_eq!((train.len(), test.len()), (0, 1));
        let (train, test) = numbered(0).split_holdout(0.5);
        assert!(train.is_empty() && test.is_empty());
    }

    #[test]
    fn classes_are_sorted_and_unique() {
        let ds = Dataset::from_rows(&vec![vec![0.0]; 5], vec![2, -1, 2, 0, -1]).unwrap();
        assert_eq!(ds.classes(), vec![-1, 0, 2]);
    }
}
