//! k-nearest neighbours
//!
//! Euclidean distance over the non-class attributes. Nominal attributes differ by
//! 0 or 1; a missing value differs by the largest distance it could have on a
//! [0, 1] scale. Votes are unweighted and ties go to the lowest class index.

use crate::classifier::{argmax, ensure_trainable};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};

#[derive(Debug, Clone)]
pub struct KNearestNeighbors {
    k: usize,
    /// `(attribute index, is nominal)`
    features: Vec<(usize, bool)>,
    training: Vec<(Instance, usize)>,
    num_classes: usize,
}

impl KNearestNeighbors {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            features: Vec::new(),
            training: Vec::new(),
            num_classes: 0,
        }
    }

    fn difference(nominal: bool, a: Option<f64>, b: Option<f64>) -> f64 {
        match (a, b) {
            (Some(a), Some(b)) if nominal => {
                if a == b {
                    0.0
                } else {
                    1.0
                }
            }
            (Some(a), Some(b)) => a - b,
            (Some(v), None) | (None, Some(v)) if !nominal => v.max(1.0 - v),
            _ => 1.0,
        }
    }

    fn distance(&self, a: &Instance, b: &Instance) -> f64 {
        self.features
            .iter()
            .map(|&(index, nominal)| {
                let d = Self::difference(nominal, a.get(index), b.get(index));
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl Classifier for KNearestNeighbors {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        if self.k == 0 {
            return Err(SelectError::InvalidParameter("k must be at least 1".to_string()));
        }

        self.features = data
            .non_class_indices()
            .into_iter()
            .map(|i| (i, data.attribute(i).is_nominal()))
            .collect();
        self.training = data
            .instances()
            .iter()
            .enumerate()
            .map(|(i, instance)| (instance.clone(), data.class_value(i)))
            .collect();
        self.num_classes = data.num_classes();
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        if self.training.is_empty() {
            return Err(SelectError::NotTrained);
        }

        let mut neighbours: Vec<(f64, usize)> = self
            .training
            .iter()
            .map(|(row, class)| (self.distance(instance, row), *class))
            .collect();
        // Stable: equally distant rows keep training order
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = vec![0.0; self.num_classes];
        for &(_, class) in neighbours.iter().take(self.k) {
            votes[class] += 1.0;
        }
        Ok(argmax(&votes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_data;
    use crate::core::Attribute;

    #[test]
    fn test_nearest_cluster_wins() {
        let data = test_data::blobs();
        let mut knn = KNearestNeighbors::new(3);
        knn.fit(&data).unwrap();
        assert_eq!(knn.predict(&Instance::from_values(&[0.85, 0.2, 0.0])).unwrap(), 1);
        assert_eq!(knn.predict(&Instance::from_values(&[0.45, 0.8, 0.0])).unwrap(), 2);
    }

    #[test]
    fn test_vote_tie_goes_to_lowest_class() {
        let data = Dataset::new(
            "tie",
            vec![Attribute::numeric("x"), Attribute::nominal("class", vec!["a", "b"])],
            None,
            vec![
                Instance::from_values(&[0.0, 1.0]),
                Instance::from_values(&[1.0, 0.0]),
            ],
        )
        .unwrap();
        let mut knn = KNearestNeighbors::new(2);
        knn.fit(&data).unwrap();
        assert_eq!(knn.predict(&Instance::from_values(&[0.0, 0.0])).unwrap(), 0);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let data = test_data::weather();
        let mut knn = KNearestNeighbors::new(50);
        knn.fit(&data).unwrap();
        // Every row votes: the classes are balanced
        assert_eq!(knn.predict(&Instance::from_values(&[2.0, 0.0, 0.0])).unwrap(), 0);
    }

    #[test]
    fn test_missing_value_differences() {
        assert_eq!(KNearestNeighbors::difference(false, Some(0.2), None), 0.8);
        assert_eq!(KNearestNeighbors::difference(true, None, Some(1.0)), 1.0);
        assert_eq!(KNearestNeighbors::difference(true, Some(2.0), Some(2.0)), 0.0);
        assert_eq!(KNearestNeighbors::difference(false, None, None), 1.0);
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let mut knn = KNearestNeighbors::new(0);
        assert!(matches!(
            knn.fit(&test_data::blobs()),
            Err(SelectError::InvalidParameter(_))
        ));
    }
}
