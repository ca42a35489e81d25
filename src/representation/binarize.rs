//! Nominal-to-indicator expansion

use crate::core::{Attribute, Dataset, Instance, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Copy,
    /// One indicator per domain label
    Expand(usize),
}

/// Fitted expansion of nominal non-class attributes into 0/1 numeric attributes
///
/// A dataset without nominal attributes yields an identity binarizer.
#[derive(Debug, Clone)]
pub struct Binarizer {
    slots: Vec<Slot>,
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl Binarizer {
    pub fn fit(dataset: &Dataset) -> Self {
        let source_class = dataset.class_index();
        let mut slots = Vec::with_capacity(dataset.num_attributes());
        let mut attributes = Vec::new();
        let mut class_index = 0;

        for (index, attr) in dataset.attributes().iter().enumerate() {
            if index == source_class {
                class_index = attributes.len();
            }
            if index != source_class && attr.is_nominal() {
                slots.push(Slot::Expand(attr.num_values()));
                for label in attr.domain() {
                    attributes.push(Attribute::numeric(format!("{}={}", attr.name, label)));
                }
            } else {
                slots.push(Slot::Copy);
                attributes.push(attr.clone());
            }
        }

        Self {
            slots,
            attributes,
            class_index,
        }
    }

    /// True when the dataset had no nominal attributes to expand
    pub fn is_identity(&self) -> bool {
        self.slots.iter().all(|s| *s == Slot::Copy)
    }

    pub fn output_attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn transform_instance(&self, instance: &Instance) -> Instance {
        let mut values = Vec::with_capacity(self.attributes.len());
        for (value, slot) in instance.values().iter().zip(&self.slots) {
            match slot {
                Slot::Copy => values.push(*value),
                Slot::Expand(width) => match value {
                    Some(v) => {
                        let hot = *v as usize;
                        values.extend((0..*width).map(|j| Some(if j == hot { 1.0 } else { 0.0 })));
                    }
                    None => values.extend(std::iter::repeat(None).take(*width)),
                },
            }
        }
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
            self.attributes.clone(),
            Some(self.class_index),
            instances,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_in_place() {
        let data = Dataset::new(
            "d",
            vec![
                Attribute::numeric("x"),
                Attribute::nominal("class", vec!["a", "b"]),
                Attribute::nominal("shape", vec!["round", "square", "flat"]),
            ],
            Some(1),
            vec![
                Instance::from_values(&[1.5, 0.0, 2.0]),
                Instance::new(vec![Some(2.0), Some(1.0), None]),
            ],
        )
        .unwrap();

        let binarizer = Binarizer::fit(&data);
        assert!(!binarizer.is_identity());
        let out = binarizer.transform(&data).unwrap();

        let names: Vec<&str> = out.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["x", "class", "shape=round", "shape=square", "shape=flat"]);
        assert_eq!(out.class_index(), 1);
        assert_eq!(
            out.instance(0).values(),
            &[Some(1.5), Some(0.0), Some(0.0), Some(0.0), Some(1.0)]
        );
        assert_eq!(
            out.instance(1).values(),
            &[Some(2.0), Some(1.0), None, None, None]
        );
    }

    #[test]
    fn test_no_nominal_attributes_is_identity() {
        let data = Dataset::new(
            "d",
            vec![Attribute::numeric("x"), Attribute::nominal("class", vec!["a", "b"])],
            None,
            vec![Instance::from_values(&[3.0, 1.0])],
        )
        .unwrap();

        let binarizer = Binarizer::fit(&data);
        assert!(binarizer.is_identity());
        assert_eq!(binarizer.transform(&data).unwrap(), data);
    }
}
