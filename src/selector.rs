//! Winner selection and full-data retraining

use crate::core::{Dataset, EvaluationResult, Result, SelectError};
use crate::predictor::TrainedModel;
use crate::registry::Candidate;
use crate::representation::Representation;
use log::info;
use std::sync::Arc;

/// Position of the winning result
///
/// Failed results never win. The first remaining result is the initial best and
/// a later one replaces it only with a strictly greater accuracy, so ties go to
/// the earlier registry entry.
pub fn select_best(results: &[EvaluationResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, result) in results.iter().enumerate() {
        if result.is_failure() {
            continue;
        }
        match best {
            Some(b) if result.accuracy <= results[b].accuracy => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Fit a fresh instance of the winning candidate on its whole representation
///
/// The candidate already succeeded under cross-validation, so any failure here
/// is reported as [`SelectError::RetrainFailed`].
pub fn retrain(
    winner: &EvaluationResult,
    candidate: &Candidate,
    representation: Arc<Representation>,
    original: &Dataset,
) -> Result<TrainedModel> {
    let mut classifier = candidate.build();
    classifier
        .fit(representation.dataset())
        .map_err(|e| SelectError::RetrainFailed {
            candidate: candidate.name.clone(),
            reason: e.to_string(),
        })?;

    info!(
        "Retrained {} on {} instances ({} representation)",
        candidate.name,
        representation.dataset().num_instances(),
        representation.kind()
    );

    Ok(TrainedModel::new(
        winner.slot,
        candidate.name.clone(),
        candidate.algorithm.clone(),
        winner.accuracy,
        representation,
        original,
        classifier,
    ))
}
