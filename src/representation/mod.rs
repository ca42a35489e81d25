//! Derived encodings of a dataset
//!
//! A [`Representation`] pairs a derived dataset with the fitted transforms that
//! produced it, so a raw record in the original schema can be re-encoded exactly
//! the way the training data was.
//!
//! The selection grid uses three representations:
//!
//! - `original`: identity
//! - `discretized`: numeric attributes binned into equal-width intervals
//! - `numeric-normalized`: nominal attributes expanded into indicators, then
//!   every attribute rescaled to [0, 1]

pub mod binarize;
pub mod discretize;
pub mod normalize;

pub use self::binarize::Binarizer;
pub use self::discretize::Discretizer;
pub use self::normalize::Normalizer;

use crate::core::{Dataset, Instance, Result, SelectError, SelectorConfig};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

/// Name of a representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    Original,
    Discretized,
    Binarized,
    Normalized,
    NumericNormalized,
}

impl RepresentationKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Discretized => "discretized",
            Self::Binarized => "binarized",
            Self::Normalized => "normalized",
            Self::NumericNormalized => "numeric-normalized",
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fitted, re-appliable transform step
#[derive(Debug, Clone)]
pub enum Transform {
    Discretize(Discretizer),
    Binarize(Binarizer),
    Normalize(Normalizer),
}

impl Transform {
    /// Encode one instance of the step's input schema
    pub fn apply(&self, instance: &Instance) -> Instance {
        match self {
            Self::Discretize(t) => t.transform_instance(instance),
            Self::Binarize(t) => t.transform_instance(instance),
            Self::Normalize(t) => t.transform_instance(instance),
        }
    }
}

/// A derived dataset and the transform chain that produced it
#[derive(Debug, Clone)]
pub struct Representation {
    kind: RepresentationKind,
    dataset: Dataset,
    transforms: Vec<Transform>,
    source_width: usize,
}

impl Representation {
    /// Identity representation of `dataset`
    pub fn original(dataset: &Dataset) -> Self {
        Self {
            kind: RepresentationKind::Original,
            dataset: dataset.clone(),
            transforms: Vec::new(),
            source_width: dataset.num_attributes(),
        }
    }

    fn derived(kind: RepresentationKind, source: &Dataset, dataset: Dataset, transform: Transform) -> Self {
        Self {
            kind,
            dataset,
            transforms: vec![transform],
            source_width: source.num_attributes(),
        }
    }

    /// Chain `next`, which was derived from this representation's dataset
    pub fn then(self, next: Representation, kind: RepresentationKind) -> Self {
        let mut transforms = self.transforms;
        transforms.extend(next.transforms);
        Self {
            kind,
            dataset: next.dataset,
            transforms,
            source_width: self.source_width,
        }
    }

    pub fn kind(&self) -> RepresentationKind {
        self.kind
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Attribute count of the schema this representation was derived from
    pub fn source_width(&self) -> usize {
        self.source_width
    }

    /// Re-encode an instance of the source schema into this representation
    pub fn encode(&self, raw: &Instance) -> Result<Instance> {
        if raw.len() != self.source_width {
            return Err(SelectError::SchemaMismatch {
                expected: self.source_width,
                actual: raw.len(),
            });
        }
        Ok(self
            .transforms
            .iter()
            .fold(raw.clone(), |instance, t| t.apply(&instance)))
    }
}

/// Convert numeric non-class attributes to nominal bins
pub fn discretize(dataset: &Dataset, bins: usize) -> Result<Representation> {
    let discretizer = Discretizer::fit(dataset, bins)?;
    let data = discretizer.transform(dataset)?;
    Ok(Representation::derived(
        RepresentationKind::Discretized,
        dataset,
        data,
        Transform::Discretize(discretizer),
    ))
}

/// Expand nominal non-class attributes into indicator attributes
pub fn binarize(dataset: &Dataset) -> Result<Representation> {
    let binarizer = Binarizer::fit(dataset);
    let data = binarizer.transform(dataset)?;
    Ok(Representation::derived(
        RepresentationKind::Binarized,
        dataset,
        data,
        Transform::Binarize(binarizer),
    ))
}

/// Rescale every non-class attribute to [0, 1]
pub fn normalize(dataset: &Dataset) -> Result<Representation> {
    let normalizer = Normalizer::fit(dataset)?;
    let data = normalizer.transform(dataset)?;
    Ok(Representation::derived(
        RepresentationKind::Normalized,
        dataset,
        data,
        Transform::Normalize(normalizer),
    ))
}

/// `normalize(binarize(dataset))`
pub fn to_numeric_normalized(dataset: &Dataset) -> Result<Representation> {
    let binarized = binarize(dataset)?;
    let normalized = normalize(binarized.dataset())?;
    Ok(binarized.then(normalized, RepresentationKind::NumericNormalized))
}

/// The representations available to the selection grid
#[derive(Debug, Clone)]
pub struct RepresentationSet {
    original: Arc<Representation>,
    discretized: Option<Arc<Representation>>,
    numeric_normalized: Option<Arc<Representation>>,
}

impl RepresentationSet {
    /// Derive every representation; a failed derivation is logged and left absent
    pub fn derive(dataset: &Dataset, config: &SelectorConfig) -> Self {
        let discretized = match discretize(dataset, config.discretize_bins) {
            Ok(rep) => Some(Arc::new(rep)),
            Err(e) => {
                warn!("Could not create discretized data: {e}");
                None
            }
        };

        let numeric_normalized = match to_numeric_normalized(dataset) {
            Ok(rep) => Some(Arc::new(rep)),
            Err(e) => {
                warn!("Could not create numeric normalized data: {e}");
                None
            }
        };

        debug!(
            "Representations: discretized={}, numeric-normalized={}",
            discretized.is_some(),
            numeric_normalized.is_some()
        );

        Self {
            original: Arc::new(Representation::original(dataset)),
            discretized,
            numeric_normalized,
        }
    }

    pub fn original(&self) -> &Arc<Representation> {
        &self.original
    }

    /// Look up a representation by kind, `None` when it was not derived
    pub fn get(&self, kind: RepresentationKind) -> Option<&Arc<Representation>> {
        match kind {
            RepresentationKind::Original => Some(&self.original),
            RepresentationKind::Discretized => self.discretized.as_ref(),
            RepresentationKind::NumericNormalized => self.numeric_normalized.as_ref(),
            RepresentationKind::Binarized | RepresentationKind::Normalized => None,
        }
    }
}
