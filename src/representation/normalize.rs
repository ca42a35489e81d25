//! Min-max rescaling to [0, 1]

use crate::core::{Dataset, Instance, Result, SelectError};

/// Fitted per-attribute min/max scaling
///
/// A degenerate column (min == max, or never observed) maps every value to 0.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// `(min, max)` per attribute, `None` for the class
    ranges: Vec<Option<(f64, f64)>>,
}

impl Normalizer {
    /// Fit ranges from `dataset`; every non-class attribute must be numeric
    pub fn fit(dataset: &Dataset) -> Result<Self> {
        let class_index = dataset.class_index();
        let mut ranges = Vec::with_capacity(dataset.num_attributes());

        for (index, attr) in dataset.attributes().iter().enumerate() {
            if index == class_index {
                ranges.push(None);
                continue;
            }
            if attr.is_nominal() {
                return Err(SelectError::Representation(format!(
                    "cannot normalize nominal attribute '{}'",
                    attr.name
                )));
            }

            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for value in dataset.instances().iter().filter_map(|i| i.get(index)) {
                min = min.min(value);
                max = max.max(value);
            }
            ranges.push(Some((min, max)));
        }

        Ok(Self { ranges })
    }

    fn scale(range: (f64, f64), value: f64) -> f64 {
        let (min, max) = range;
        if max > min {
            (value - min) / (max - min)
        } else {
            0.0
        }
    }

    pub fn transform_instance(&self, instance: &Instance) -> Instance {
        let values = instance
            .values()
            .iter()
            .zip(&self.ranges)
            .map(|(value, range)| match (value, range) {
                (Some(v), Some(range)) => Some(Self::scale(*range, *v)),
                (value, _) => *value,
            })
            .collect();
        Instance::new(values)
    }

    pub fn transform(&self, dataset: &Dataset) -> Result<Dataset> {
        let instances = dataset
            .instances()
            .iter()
            .map(|i| self.transform_instance(i))
            .collect();
        Dataset::new(
            dataset.relation(),
            dataset.attributes().to_vec(),
            Some(dataset.class_index()),
            instances,
        )
    }
}
