//! ARFF format dataset loader
//!
//! Supports the dense attribute-relation file format:
//!
//! ```text
//! % comment
//! @relation weather
//! @attribute outlook {sunny, overcast, rainy}
//! @attribute temperature numeric
//! @attribute play {yes, no}
//! @data
//! sunny,85,no
//! rainy,?,yes
//! ```
//!
//! `numeric`, `real` and `integer` attributes are numeric; `{...}` declares a
//! nominal domain. `?` marks a missing value.

use crate::core::{Attribute, DataSource, Dataset, Instance, Result, SelectError};
use crate::data::split_fields;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loader for ARFF files
#[derive(Debug, Clone, Default)]
pub struct ArffLoader {
    class_attribute: Option<String>,
}

impl ArffLoader {
    /// Create a loader that uses the last attribute as the class
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the named attribute as the class instead of the last one
    pub fn with_class_attribute(mut self, name: impl Into<String>) -> Self {
        self.class_attribute = Some(name.into());
        self
    }

    /// Load a dataset from an ARFF file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let file = File::open(path).map_err(SelectError::IoError)?;
        self.load_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<Dataset> {
        let mut relation = String::new();
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut instances = Vec::new();
        let mut in_data = false;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SelectError::IoError)?;
            let line = line.trim();
            let line_no = line_num + 1;

            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            if in_data {
                instances.push(parse_row(line, &attributes, line_no)?);
                continue;
            }

            let lower = line.to_ascii_lowercase();
            if lower.starts_with("@relation") {
                relation = unquote(line["@relation".len()..].trim()).to_string();
            } else if lower.starts_with("@attribute") {
                attributes.push(parse_attribute(line["@attribute".len()..].trim(), line_no)?);
            } else if lower.starts_with("@data") {
                in_data = true;
            } else {
                return Err(SelectError::Parse {
                    line: line_no,
                    message: format!("unexpected header line: {line}"),
                });
            }
        }

        if !in_data {
            return Err(SelectError::DataLoad("missing @data section".to_string()));
        }
        if instances.is_empty() {
            return Err(SelectError::EmptyDataset);
        }

        let class_index = match &self.class_attribute {
            Some(name) => Some(
                attributes
                    .iter()
                    .position(|a| &a.name == name)
                    .ok_or_else(|| {
                        SelectError::DataLoad(format!("class attribute '{name}' not declared"))
                    })?,
            ),
            None => None,
        };

        Dataset::new(relation, attributes, class_index, instances)
    }
}

impl DataSource for ArffLoader {
    fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        self.load_file(path)
    }
}

/// Parse the remainder of an `@attribute` line
fn parse_attribute(rest: &str, line_no: usize) -> Result<Attribute> {
    let (name, type_decl) = split_name(rest).ok_or_else(|| SelectError::Parse {
        line: line_no,
        message: format!("malformed attribute declaration: {rest}"),
    })?;

    if type_decl.starts_with('{') {
        let inner = type_decl
            .strip_prefix('{')
            .and_then(|s| s.trim_end().strip_suffix('}'))
            .ok_or_else(|| SelectError::Parse {
                line: line_no,
                message: format!("unterminated nominal domain for '{name}'"),
            })?;
        let values = split_fields(inner).map_err(|message| SelectError::Parse {
            line: line_no,
            message,
        })?;
        if values.iter().any(String::is_empty) {
            return Err(SelectError::Parse {
                line: line_no,
                message: format!("empty label in domain of '{name}'"),
            });
        }
        return Ok(Attribute::nominal(name, values));
    }

    match type_decl.to_ascii_lowercase().as_str() {
        "numeric" | "real" | "integer" => Ok(Attribute::numeric(name)),
        other => Err(SelectError::Parse {
            line: line_no,
            message: format!("unsupported attribute type '{other}' for '{name}'"),
        }),
    }
}

/// Split an attribute declaration into its (possibly quoted) name and type
fn split_name(rest: &str) -> Option<(String, &str)> {
    let first = rest.chars().next()?;
    if first == '\'' || first == '"' {
        let end = rest[1..].find(first)? + 1;
        Some((rest[1..end].to_string(), rest[end + 1..].trim()))
    } else {
        let end = rest.find(char::is_whitespace)?;
        Some((rest[..end].to_string(), rest[end..].trim()))
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

fn parse_row(line: &str, attributes: &[Attribute], line_no: usize) -> Result<Instance> {
    if line.starts_with('{') {
        return Err(SelectError::Parse {
            line: line_no,
            message: "sparse ARFF rows are not supported".to_string(),
        });
    }

    let fields = split_fields(line).map_err(|message| SelectError::Parse {
        line: line_no,
        message,
    })?;
    if fields.len() != attributes.len() {
        return Err(SelectError::Parse {
            line: line_no,
            message: format!(
                "expected {} values, found {}",
                attributes.len(),
                fields.len()
            ),
        });
    }

    let mut values = Vec::with_capacity(fields.len());
    for (field, attr) in fields.iter().zip(attributes) {
        if field == "?" {
            values.push(None);
        } else if attr.is_nominal() {
            let index = attr.index_of(field).ok_or_else(|| SelectError::Parse {
                line: line_no,
                message: format!("'{field}' is not in the domain of '{}'", attr.name),
            })?;
            values.push(Some(index as f64));
        } else {
            let value = field.parse::<f64>().map_err(|_| SelectError::Parse {
                line: line_no,
                message: format!("invalid numeric value '{field}' for '{}'", attr.name),
            })?;
            values.push(Some(value));
        }
    }

    Ok(Instance::new(values))
}
