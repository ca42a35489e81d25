//! Data loading and dataset sources
//!
//! This module provides [`DataSource`] implementations for the tabular
//! formats the selector accepts.

pub mod arff;
pub mod csv;

pub use self::arff::*;
pub use self::csv::*;

use crate::core::{DataSource, Dataset, Result, SelectError};
use std::path::Path;

/// Load a dataset, picking the loader from the file extension
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("arff") => ArffLoader::new().load_dataset(path),
        Some("csv") => CsvLoader::new().load_dataset(path),
        _ => Err(SelectError::DataLoad(format!(
            "unsupported file type: {}",
            path.display()
        ))),
    }
}

/// Split a comma separated line, honouring single and double quotes
pub(crate) fn split_fields(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    // Length of the quoted text once its closing quote has been seen
    let mut quoted_len: Option<usize> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                quoted_len = Some(current.len());
            }
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' if current.trim().is_empty() && quoted_len.is_none() => {
                    current.clear();
                    quote = Some(c);
                }
                ',' => {
                    fields.push(finish_field(&current, quoted_len));
                    current.clear();
                    quoted_len = None;
                }
                _ => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    fields.push(finish_field(&current, quoted_len));
    Ok(fields)
}

fn finish_field(raw: &str, quoted_len: Option<usize>) -> String {
    match quoted_len {
        Some(len) => raw[..len].to_string(),
        None => raw.trim().to_string(),
    }
}
