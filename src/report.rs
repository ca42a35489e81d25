//! Run reports
//!
//! A [`RunReport`] captures the ordered results of one selection run and the
//! winner that was retrained, so a run can be archived as JSON next to its data.

use crate::api::SelectionEngine;
use crate::core::{EvaluationResult, Result, SelectError, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Summary of the retrained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerSummary {
    pub slot: usize,
    pub name: String,
    /// Cross-validated accuracy, in percent
    pub accuracy: f64,
    /// Representation the model was retrained on
    pub representation: String,
}

/// Serializable record of a selection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Library version that produced the report
    pub library_version: String,
    pub relation: String,
    pub num_instances: usize,
    /// RFC 3339 creation time
    pub created_at: String,
    pub config: SelectorConfig,
    /// Results in registry order
    pub results: Vec<EvaluationResult>,
    pub winner: Option<WinnerSummary>,
}

impl RunReport {
    /// Snapshot the last run of `engine`
    pub fn from_engine(engine: &SelectionEngine) -> Self {
        let winner = engine.best_model().map(|model| WinnerSummary {
            slot: model.slot(),
            name: model.name().to_string(),
            accuracy: model.accuracy(),
            representation: model.representation().kind().to_string(),
        });

        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            relation: engine.dataset().relation().to_string(),
            num_instances: engine.dataset().num_instances(),
            created_at: chrono::Utc::now().to_rfc3339(),
            config: engine.config().clone(),
            results: engine.results(),
            winner,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SelectError::SerializationError(e.to_string()))
    }

    /// Save report to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SelectError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SelectError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load report from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SelectError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SelectError::SerializationError(e.to_string()))
    }

    /// Print the results table and the winner
    pub fn print_summary(&self) {
        println!("=== Model Selection: {} ===", self.relation);
        println!(
            "Instances: {}, folds: {}, seed: {}",
            self.num_instances, self.config.folds, self.config.seed
        );
        println!();
        for result in &self.results {
            match &result.failure {
                Some(reason) => println!("  {:<36} failed: {}", result.name, reason),
                None => println!(
                    "  {:<36} {:>7.2}%  ({}/{})",
                    result.name, result.accuracy, result.correct, result.total
                ),
            }
        }
        println!();
        match &self.winner {
            Some(w) => println!(
                "Best: {} with {:.2}% ({} representation)",
                w.name, w.accuracy, w.representation
            ),
            None => println!("Best: none, every candidate failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn report() -> RunReport {
        RunReport {
            library_version: "0.1.0".to_string(),
            relation: "toy".to_string(),
            num_instances: 10,
            created_at: chrono::Utc::now().to_rfc3339(),
            config: SelectorConfig::default(),
            results: vec![
                EvaluationResult::scored(0, "A", 9, 10),
                EvaluationResult::failed(1, "B", 10, "diverged"),
            ],
            winner: Some(WinnerSummary {
                slot: 0,
                name: "A".to_string(),
                accuracy: 90.0,
                representation: "original".to_string(),
            }),
        }
    }

    #[test]
    fn test_json_skips_absent_failure() {
        let json = report().to_json().unwrap();
        assert!(json.contains("\"failure\": \"diverged\""));
        assert_eq!(json.matches("\"failure\"").count(), 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&report().created_at).is_ok());
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let report = report();
        let file = NamedTempFile::new()?;
        report.save_to_file(file.path())?;

        let loaded = RunReport::load_from_file(file.path())?;
        assert_eq!(loaded, report);
        Ok(())
    }

    #[test]
    fn test_load_rejects_garbage() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        assert!(matches!(
            RunReport::load_from_file(file.path()),
            Err(SelectError::SerializationError(_))
        ));
    }
}
