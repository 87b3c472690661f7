use crate::domain::{SedError, SedResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!("{value:>width$.precision$}")
}

pub fn format_scientific_f64(value: f64, width: usize) -> String {
    format!("{value:>width$.4E}")
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> SedResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SedError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, normalize_text_artifact(content)).map_err(|source| SedError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> SedResult<String> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(normalize_text_artifact(&json))
}

/// Pretty JSON with a single trailing newline.
pub fn write_json_report<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> SedResult<()> {
    write_text_artifact(path.as_ref(), &to_json_text(value)?)
}
