//! Immutable tabular dataset with a designated nominal class attribute

use crate::core::{Attribute, Instance, Result, SelectError};
use std::collections::HashSet;

/// Loaded tabular data
///
/// Every instance has exactly one slot per attribute and the class attribute is
/// nominal and never missing. These invariants are checked once, in [`Dataset::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    relation: String,
    attributes: Vec<Attribute>,
    class_index: usize,
    instances: Vec<Instance>,
}

impl Dataset {
    /// Create a dataset, defaulting the class to the last attribute
    pub fn new(
        relation: impl Into<String>,
        attributes: Vec<Attribute>,
        class_index: Option<usize>,
        instances: Vec<Instance>,
    ) -> Result<Self> {
        if attributes.is_empty() {
            return Err(SelectError::DataLoad(
                "dataset must declare at least one attribute".to_string(),
            ));
        }

        let class_index = class_index.unwrap_or(attributes.len() - 1);
        if class_index >= attributes.len() {
            return Err(SelectError::DataLoad(format!(
                "class index {class_index} out of range for {} attributes",
                attributes.len()
            )));
        }
        if !attributes[class_index].is_nominal() {
            return Err(SelectError::DataLoad(format!(
                "class attribute '{}' must be nominal",
                attributes[class_index].name
            )));
        }

        let mut names = HashSet::new();
        for attr in &attributes {
            if !names.insert(attr.name.as_str()) {
                return Err(SelectError::DataLoad(format!(
                    "duplicate attribute name '{}'",
                    attr.name
                )));
            }
        }

        for (row, instance) in instances.iter().enumerate() {
            if instance.len() != attributes.len() {
                return Err(SelectError::DataLoad(format!(
                    "instance {row} has {} values, expected {}",
                    instance.len(),
                    attributes.len()
                )));
            }
            if instance.is_missing(class_index) {
                return Err(SelectError::DataLoad(format!(
                    "instance {row} is missing its class value"
                )));
            }
            for (col, attr) in attributes.iter().enumerate() {
                if let Some(value) = instance.get(col) {
                    check_value(attr, value).map_err(|msg| {
                        SelectError::DataLoad(format!("instance {row}, attribute '{}': {msg}", attr.name))
                    })?;
                }
            }
        }

        Ok(Self {
            relation: relation.into(),
            attributes,
            class_index,
            instances,
        })
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> &Attribute {
        &self.attributes[index]
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance(&self, index: usize) -> &Instance {
        &self.instances[index]
    }

    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn class_attribute(&self) -> &Attribute {
        &self.attributes[self.class_index]
    }

    pub fn num_classes(&self) -> usize {
        self.class_attribute().num_values()
    }

    /// Encoded class of instance `index`
    pub fn class_value(&self, index: usize) -> usize {
        self.instances[index]
            .get(self.class_index)
            .map_or(0, |v| v as usize)
    }

    /// Indices of every attribute except the class, in schema order
    pub fn non_class_indices(&self) -> Vec<usize> {
        (0..self.attributes.len())
            .filter(|&i| i != self.class_index)
            .collect()
    }

    fn non_class_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.class_index)
            .map(|(_, attr)| attr)
    }

    /// At least one nominal attribute besides the class
    pub fn has_nominal_attributes(&self) -> bool {
        self.non_class_attributes().any(Attribute::is_nominal)
    }

    /// At least one numeric attribute besides the class
    pub fn has_numeric_attributes(&self) -> bool {
        self.non_class_attributes().any(Attribute::is_numeric)
    }

    pub fn is_fully_nominal(&self) -> bool {
        self.non_class_attributes().all(Attribute::is_nominal)
    }

    pub fn is_fully_numeric(&self) -> bool {
        self.non_class_attributes().all(Attribute::is_numeric)
    }

    /// Names of the non-class attributes
    pub fn attribute_names(&self) -> Vec<String> {
        self.non_class_attributes().map(|a| a.name.clone()).collect()
    }

    /// Domain of a nominal attribute, empty for numeric ones
    pub fn nominal_values(&self, index: usize) -> Vec<String> {
        self.attributes[index].domain().to_vec()
    }

    /// Schema index of a non-class attribute by name
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .enumerate()
            .position(|(i, a)| i != self.class_index && a.name == name)
    }

    /// Up to `max_samples` distinct rendered values of an attribute, in instance order
    pub fn sample_values(&self, index: usize, max_samples: usize) -> Vec<String> {
        let attr = &self.attributes[index];
        let mut seen = HashSet::new();
        let mut samples = Vec::new();

        for instance in &self.instances {
            if samples.len() >= max_samples {
                break;
            }
            let Some(value) = instance.get(index) else {
                continue;
            };
            let rendered = if attr.is_numeric() {
                if value.fract() == 0.0 {
                    format!("{}", value as i64)
                } else {
                    format!("{value:.2}")
                }
            } else {
                attr.domain()[value as usize].clone()
            };
            if seen.insert(rendered.clone()) {
                samples.push(rendered);
            }
        }

        samples
    }

    /// Number of instances per class, indexed by class value
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes()];
        for i in 0..self.instances.len() {
            counts[self.class_value(i)] += 1;
        }
        counts
    }

    /// Parse a user supplied value for attribute `index` into its numeric encoding
    ///
    /// Nominal labels resolve to their domain index, numeric text is parsed, and
    /// `?` or an empty string yields `NaN` (missing).
    pub fn resolve_value(&self, index: usize, text: &str) -> Result<f64> {
        let attr = self.attributes.get(index).ok_or_else(|| {
            SelectError::InvalidValue(format!("no attribute at index {index}"))
        })?;
        let text = text.trim();
        if text.is_empty() || text == "?" {
            return Ok(f64::NAN);
        }
        if attr.is_nominal() {
            attr.index_of(text).map(|i| i as f64).ok_or_else(|| {
                SelectError::InvalidValue(format!(
                    "'{text}' is not one of {:?} for attribute '{}'",
                    attr.domain(),
                    attr.name
                ))
            })
        } else {
            text.parse::<f64>().map_err(|_| {
                SelectError::InvalidValue(format!(
                    "'{text}' is not a number for attribute '{}'",
                    attr.name
                ))
            })
        }
    }

    /// New dataset with the same schema holding the given instances, in order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            relation: self.relation.clone(),
            attributes: self.attributes.clone(),
            class_index: self.class_index,
            instances: indices.iter().map(|&i| self.instances[i].clone()).collect(),
        }
    }
}

fn check_value(attr: &Attribute, value: f64) -> std::result::Result<(), String> {
    if !value.is_finite() {
        return Err(format!("non-finite value {value}"));
    }
    if attr.is_nominal() && (value < 0.0 || value.fract() != 0.0 || value as usize >= attr.num_values()) {
        return Err(format!(
            "{value} is not a valid index into a domain of {} labels",
            attr.num_values()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Dataset {
        let attributes = vec![
            Attribute::nominal("outlook", vec!["sunny", "overcast", "rainy"]),
            Attribute::numeric("temperature"),
            Attribute::nominal("play", vec!["yes", "no"]),
        ];
        let instances = vec![
            Instance::from_values(&[0.0, 85.0, 1.0]),
            Instance::from_values(&[1.0, 83.0, 0.0]),
            Instance::new(vec![Some(2.0), None, Some(0.0)]),
            Instance::from_values(&[0.0, 71.5, 1.0]),
        ];
        Dataset::new("weather", attributes, None, instances).unwrap()
    }

    #[test]
    fn test_class_defaults_to_last_attribute() {
        let data = weather();
        assert_eq!(data.class_index(), 2);
        assert_eq!(data.num_classes(), 2);
        assert_eq!(data.class_counts(), vec![2, 2]);
    }

    #[test]
    fn test_attribute_queries() {
        let data = weather();
        assert!(data.has_nominal_attributes());
        assert!(data.has_numeric_attributes());
        assert!(!data.is_fully_nominal());
        assert!(!data.is_fully_numeric());
        assert_eq!(data.attribute_names(), vec!["outlook", "temperature"]);
        assert_eq!(data.attribute_index("temperature"), Some(1));
        assert_eq!(data.attribute_index("play"), None);
        assert_eq!(data.nominal_values(0), vec!["sunny", "overcast", "rainy"]);
        assert!(data.nominal_values(1).is_empty());
    }

    #[test]
    fn test_sample_values() {
        let data = weather();
        assert_eq!(data.sample_values(0, 2), vec!["sunny", "overcast"]);
        assert_eq!(data.sample_values(1, 5), vec!["85", "83", "71.50"]);
    }

    #[test]
    fn test_resolve_value() {
        let data = weather();
        assert_eq!(data.resolve_value(0, "rainy").unwrap(), 2.0);
        assert_eq!(data.resolve_value(1, " 70.25 ").unwrap(), 70.25);
        assert!(data.resolve_value(1, "?").unwrap().is_nan());
        assert!(matches!(
            data.resolve_value(0, "foggy"),
            Err(SelectError::InvalidValue(_))
        ));
        assert!(matches!(
            data.resolve_value(1, "warm"),
            Err(SelectError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_rejects_missing_class() {
        let attributes = vec![Attribute::numeric("x"), Attribute::nominal("y", vec!["a", "b"])];
        let instances = vec![Instance::new(vec![Some(1.0), None])];
        let result = Dataset::new("bad", attributes, None, instances);
        assert!(matches!(result, Err(SelectError::DataLoad(_))));
    }

    #[test]
    fn test_rejects_numeric_class_and_bad_shapes() {
        let numeric_class = Dataset::new(
            "bad",
            vec![Attribute::numeric("x"), Attribute::numeric("y")],
            None,
            vec![],
        );
        assert!(numeric_class.is_err());

        let short_row = Dataset::new(
            "bad",
            vec![Attribute::numeric("x"), Attribute::nominal("y", vec!["a"])],
            None,
            vec![Instance::from_values(&[0.0])],
        );
        assert!(short_row.is_err());

        let out_of_domain = Dataset::new(
            "bad",
            vec![Attribute::numeric("x"), Attribute::nominal("y", vec!["a"])],
            None,
            vec![Instance::from_values(&[0.0, 3.0])],
        );
        assert!(out_of_domain.is_err());
    }

    #[test]
    fn test_subset_keeps_schema() {
        let data = weather();
        let subset = data.subset(&[3, 0]);
        assert_eq!(subset.num_instances(), 2);
        assert_eq!(subset.attributes(), data.attributes());
        assert_eq!(subset.instance(0), data.instance(3));
    }
}
