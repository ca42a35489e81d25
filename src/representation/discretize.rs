//! Unsupervised equal-width discretization

use crate::core::{Attribute, Dataset, Instance, Result, SelectError};

/// Fitted equal-width binning of every numeric non-class attribute
#[derive(Debug, Clone)]
pub struct Discretizer {
    /// Upper cut points per attribute, `None` for attributes passed through
    cut_points: Vec<Option<Vec<f64>>>,
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl Discretizer {
    /// Fit `bins` equal-width intervals per numeric attribute from `dataset`
    pub fn fit(dataset: &Dataset, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(SelectError::InvalidParameter(
                "bin count must be at least 1".to_string(),
            ));
        }
        if !dataset.has_numeric_attributes() {
            return Err(SelectError::Representation(
                "no numeric attributes to discretize".to_string(),
            ));
        }

        let class_index = dataset.class_index();
        let mut cut_points = Vec::with_capacity(dataset.num_attributes());
        let mut attributes = Vec::with_capacity(dataset.num_attributes());

        for (index, attr) in dataset.attributes().iter().enumerate() {
            if index == class_index || attr.is_nominal() {
                cut_points.push(None);
                attributes.push(attr.clone());
                continue;
            }

            let (min, max) = value_range(dataset, index);
            let cuts = match (min, max) {
                (Some(min), Some(max)) if max > min => {
                    let width = (max - min) / bins as f64;
                    (1..bins).map(|i| min + width * i as f64).collect()
                }
                _ => Vec::new(),
            };
            attributes.push(Attribute::nominal(attr.name.clone(), bin_labels(&cuts)));
            cut_points.push(Some(cuts));
        }

        Ok(Self {
            cut_points,
            attributes,
            class_index,
        })
    }

    /// Schema produced by this discretizer
    pub fn output_attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Bin one value: the first interval whose upper cut point is >= the value
    fn bin(cuts: &[f64], value: f64) -> usize {
        cuts.iter().position(|&c| value <= c).unwrap_or(cuts.len())
    }

    pub fn transform_instance(&self, instance: &Instance) -> Instance {
        let values = instance
            .values()
            .iter()
            .zip(&self.cut_points)
            .map(|(value, cuts)| match (value, cuts) {
                (Some(v), Some(cuts)) => Some(Self::bin(cuts, *v) as f64),
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
            self.attributes.clone(),
            Some(self.class_index),
            instances,
        )
    }
}

fn value_range(dataset: &Dataset, index: usize) -> (Option<f64>, Option<f64>) {
    dataset
        .instances()
        .iter()
        .filter_map(|i| i.get(index))
        .fold((None, None), |(min, max), v| {
            (
                Some(min.map_or(v, |m: f64| m.min(v))),
                Some(max.map_or(v, |m: f64| m.max(v))),
            )
        })
}

/// Interval labels `(-inf-c1]`, `(c1-c2]`, ..., `(ck-inf)`; a single bin is `All`
fn bin_labels(cuts: &[f64]) -> Vec<String> {
    if cuts.is_empty() {
        return vec!["All".to_string()];
    }

    let short: Vec<String> = cuts.iter().map(|&c| format_cut(c)).collect();
    let unique = short.windows(2).all(|w| w[0] != w[1]);
    let rendered = if unique {
        short
    } else {
        cuts.iter().map(|c| c.to_string()).collect()
    };

    let mut labels = Vec::with_capacity(cuts.len() + 1);
    labels.push(format!("(-inf-{}]", rendered[0]));
    for pair in rendered.windows(2) {
        labels.push(format!("({}-{}]", pair[0], pair[1]));
    }
    labels.push(format!("({}-inf)", rendered[rendered.len() - 1]));
    labels
}

fn format_cut(value: f64) -> String {
    let text = format!("{value:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> Dataset {
        let attributes = vec![
            Attribute::numeric("size"),
            Attribute::numeric("constant"),
            Attribute::nominal("shape", vec!["round", "square"]),
            Attribute::nominal("class", vec!["a", "b"]),
        ];
        let instances = vec![
            Instance::from_values(&[0.0, 5.0, 0.0, 0.0]),
            Instance::from_values(&[2.5, 5.0, 1.0, 0.0]),
            Instance::from_values(&[7.5, 5.0, 0.0, 1.0]),
            Instance::new(vec![None, Some(5.0), Some(1.0), Some(1.0)]),
            Instance::from_values(&[10.0, 5.0, 1.0, 1.0]),
        ];
        Dataset::new("sizes", attributes, None, instances).unwrap()
    }

    #[test]
    fn test_equal_width_bins() {
        let data = sizes();
        let discretizer = Discretizer::fit(&data, 4).unwrap();
        let out = discretizer.transform(&data).unwrap();

        assert_eq!(
            out.nominal_values(0),
            vec!["(-inf-2.5]", "(2.5-5]", "(5-7.5]", "(7.5-inf)"]
        );
        let bins: Vec<Option<f64>> = out.instances().iter().map(|i| i.get(0)).collect();
        assert_eq!(bins, vec![Some(0.0), Some(0.0), Some(2.0), None, Some(3.0)]);
    }

    #[test]
    fn test_constant_attribute_single_bin() {
        let data = sizes();
        let out = Discretizer::fit(&data, 10).unwrap().transform(&data).unwrap();
        assert_eq!(out.nominal_values(1), vec!["All"]);
        assert!(out.instances().iter().all(|i| i.get(1) == Some(0.0)));
    }

    #[test]
    fn test_nominal_and_class_pass_through() {
        let data = sizes();
        let out = Discretizer::fit(&data, 3).unwrap().transform(&data).unwrap();
        assert_eq!(out.attribute(2), data.attribute(2));
        assert_eq!(out.class_attribute(), data.class_attribute());
        assert_eq!(out.class_counts(), data.class_counts());
    }

    #[test]
    fn test_out_of_range_values() {
        let data = sizes();
        let discretizer = Discretizer::fit(&data, 4).unwrap();
        let low = discretizer.transform_instance(&Instance::from_values(&[-3.0, 5.0, 0.0, 0.0]));
        let high = discretizer.transform_instance(&Instance::from_values(&[99.0, 5.0, 0.0, 0.0]));
        assert_eq!(low.get(0), Some(0.0));
        assert_eq!(high.get(0), Some(3.0));
    }

    #[test]
    fn test_requires_numeric_attributes() {
        let data = Dataset::new(
            "nominal",
            vec![
                Attribute::nominal("a", vec!["x", "y"]),
                Attribute::nominal("class", vec!["p", "n"]),
            ],
            None,
            vec![Instance::from_values(&[0.0, 1.0])],
        )
        .unwrap();
        assert!(matches!(
            Discretizer::fit(&data, 10),
            Err(SelectError::Representation(_))
        ));
        assert!(matches!(
            Discretizer::fit(&sizes(), 0),
            Err(SelectError::InvalidParameter(_))
        ));
    }
}
