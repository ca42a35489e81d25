//! CSV format dataset loader
//!
//! Supports loading datasets from CSV files where:
//! - The first row holds the attribute names
//! - The last column is the class (unless another column is named)
//! - Columns whose values all parse as numbers are numeric, others are nominal
//! - An empty field or `?` is a missing value

use crate::core::{Attribute, DataSource, Dataset, Instance, Result, SelectError};
use crate::data::split_fields;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loader for CSV files with a header row
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    class_attribute: Option<String>,
}

impl CsvLoader {
    /// Create a loader that uses the last column as the class
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the named column as the class instead of the last one
    pub fn with_class_attribute(mut self, name: impl Into<String>) -> Self {
        self.class_attribute = Some(name.into());
        self
    }

    /// Load a dataset from a CSV file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let file = File::open(path.as_ref()).map_err(SelectError::IoError)?;
        let relation = path
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset")
            .to_string();
        self.load_reader_named(BufReader::new(file), relation)
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<Dataset> {
        self.load_reader_named(reader, "dataset".to_string())
    }

    fn load_reader_named<R: BufRead>(&self, reader: R, relation: String) -> Result<Dataset> {
        let mut header: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<String>> = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SelectError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields = split_fields(line).map_err(|message| SelectError::Parse {
                line: line_num + 1,
                message,
            })?;

            match &header {
                None => {
                    if fields.len() < 2 {
                        return Err(SelectError::Parse {
                            line: line_num + 1,
                            message: "header needs at least two columns".to_string(),
                        });
                    }
                    header = Some(fields);
                }
                Some(names) => {
                    if fields.len() != names.len() {
                        return Err(SelectError::Parse {
                            line: line_num + 1,
                            message: format!(
                                "expected {} fields, found {}",
                                names.len(),
                                fields.len()
                            ),
                        });
                    }
                    rows.push(fields);
                }
            }
        }

        let names = header.ok_or(SelectError::EmptyDataset)?;
        if rows.is_empty() {
            return Err(SelectError::EmptyDataset);
        }

        let class_index = match &self.class_attribute {
            Some(name) => names.iter().position(|n| n == name).ok_or_else(|| {
                SelectError::DataLoad(format!("class column '{name}' not found"))
            })?,
            None => names.len() - 1,
        };

        let attributes: Vec<Attribute> = names
            .iter()
            .enumerate()
            .map(|(col, name)| infer_attribute(name, &rows, col, col == class_index))
            .collect();

        let instances = rows
            .iter()
            .map(|row| {
                let values = row
                    .iter()
                    .zip(&attributes)
                    .map(|(field, attr)| {
                        if is_missing(field) {
                            None
                        } else if attr.is_nominal() {
                            attr.index_of(field).map(|i| i as f64)
                        } else {
                            field.parse::<f64>().ok()
                        }
                    })
                    .collect();
                Instance::new(values)
            })
            .collect();

        Dataset::new(relation, attributes, Some(class_index), instances)
    }
}

impl DataSource for CsvLoader {
    fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        self.load_file(path)
    }
}

fn is_missing(field: &str) -> bool {
    field.is_empty() || field == "?"
}

/// Numeric when every present value parses, nominal (first-seen order) otherwise
fn infer_attribute(name: &str, rows: &[Vec<String>], col: usize, is_class: bool) -> Attribute {
    let present = rows.iter().map(|r| r[col].as_str()).filter(|f| !is_missing(f));

    if !is_class && present.clone().all(|f| f.parse::<f64>().is_ok()) {
        return Attribute::numeric(name);
    }

    let mut domain: Vec<String> = Vec::new();
    for field in present {
        if !domain.iter().any(|d| d == field) {
            domain.push(field.to_string());
        }
    }
    Attribute::nominal(name, domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_csv_basic() {
        let data = "sepal,color,species\n5.1,red,setosa\n6.2,blue,virginica\n4.9,red,setosa\n";
        let dataset = CsvLoader::new().load_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.num_instances(), 3);
        assert_eq!(dataset.num_attributes(), 3);
        assert!(dataset.attribute(0).is_numeric());
        assert_eq!(dataset.nominal_values(1), vec!["red", "blue"]);
        assert_eq!(dataset.nominal_values(2), vec!["setosa", "virginica"]);
        assert_eq!(dataset.class_index(), 2);
        assert_eq!(dataset.instance(1).get(1), Some(1.0));
    }

    #[test]
    fn test_csv_numeric_class_becomes_nominal() {
        let data = "x,label\n1.0,1\n2.0,-1\n3.0,1\n";
        let dataset = CsvLoader::new().load_reader(Cursor::new(data)).unwrap();
        assert!(dataset.class_attribute().is_nominal());
        assert_eq!(dataset.nominal_values(1), vec!["1", "-1"]);
    }

    #[test]
    fn test_csv_missing_values_and_comments() {
        let data = "# Comment\nx,y,c\n1.0,,a\n\n?,2.0,b\n";
        let dataset = CsvLoader::new().load_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.num_instances(), 2);
        assert!(dataset.instance(0).is_missing(1));
        assert!(dataset.instance(1).is_missing(0));
        assert!(dataset.attribute(0).is_numeric());
    }

    #[test]
    fn test_csv_named_class() {
        let data = "c,x\na,1\nb,2\n";
        let dataset = CsvLoader::new()
            .with_class_attribute("c")
            .load_reader(Cursor::new(data))
            .unwrap();
        assert_eq!(dataset.class_index(), 0);
    }

    #[test]
    fn test_csv_invalid_format() {
        // Too few columns
        let result = CsvLoader::new().load_reader(Cursor::new("x\n1\n"));
        assert!(result.is_err());

        // Ragged row
        let result = CsvLoader::new().load_reader(Cursor::new("x,c\n1,a\n2\n"));
        assert!(matches!(result, Err(SelectError::Parse { line: 3, .. })));

        // Header only
        let result = CsvLoader::new().load_reader(Cursor::new("x,c\n"));
        assert!(matches!(result, Err(SelectError::EmptyDataset)));
    }
}
