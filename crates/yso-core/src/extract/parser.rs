use super::model::{CandidateTable, ModelSet, SourceModelSet};
use super::schema::{
    ByteRange, FAMILY_MARKER_LINE, FamilyMarkers, HEADER_LINE_COUNT, SOURCE_N_DATA,
    SOURCE_N_FITS, SOURCE_NAME, detect_family_markers, field_schema, is_source_header,
};
use crate::common::SelectionConfig;
use crate::domain::{ModelFamily, ParserResult, SedError};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Family the caller expects; a contradicting marker line is rejected.
    pub expected_family: Option<ModelFamily>,
    pub assume_disk_only_without_markers: bool,
}

impl ParseOptions {
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self {
            expected_family: None,
            assume_disk_only_without_markers: config.assume_disk_only_without_markers,
        }
    }

    pub fn with_expected_family(mut self, family: Option<ModelFamily>) -> Self {
        self.expected_family = family;
        self
    }
}

pub fn parse_model_file(path: impl AsRef<Path>, options: &ParseOptions) -> ParserResult<ModelSet> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_model_source(path, &source, options)
}

pub fn parse_model_source(
    path: &Path,
    source: &str,
    options: &ParseOptions,
) -> ParserResult<ModelSet> {
    let lines: Vec<&str> = source.lines().collect();
    let body = lines.get(HEADER_LINE_COUNT..).unwrap_or(&[]);
    let headers: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, line)| is_source_header(line))
        .map(|(index, _)| index)
        .collect();

    let Some(family) = resolve_family(
        path,
        lines.get(FAMILY_MARKER_LINE).copied(),
        options,
        !headers.is_empty(),
    )?
    else {
        debug!(
            path = %path.display(),
            "no family markers and no sources; returning empty set"
        );
        return Ok(ModelSet::empty(path, None));
    };

    let leading_end = headers.first().copied().unwrap_or(body.len());
    let orphaned = body[..leading_end]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .count();
    if orphaned > 0 {
        warn!(
            path = %path.display(),
            lines = orphaned,
            "ignoring candidate lines before the first source header"
        );
    }

    let mut sources = Vec::with_capacity(headers.len());
    for (position, &header_index) in headers.iter().enumerate() {
        let end = headers.get(position + 1).copied().unwrap_or(body.len());
        sources.push(parse_source_block(
            path,
            family,
            body,
            header_index,
            end,
        )?);
    }

    let set = ModelSet {
        path: path.to_path_buf(),
        family: Some(family),
        sources,
    };
    debug!(
        path = %path.display(),
        family = %family,
        sources = set.sources.len(),
        candidates = set.candidate_count(),
        "parsed model file"
    );
    Ok(set)
}

fn resolve_family(
    path: &Path,
    marker_line: Option<&str>,
    options: &ParseOptions,
    has_sources: bool,
) -> ParserResult<Option<ModelFamily>> {
    let Some(marker_line) = marker_line else {
        return Ok(options.expected_family);
    };

    match (detect_family_markers(marker_line), options.expected_family) {
        (FamilyMarkers::Detected(detected), Some(expected)) if detected != expected => {
            Err(SedError::format(
                path,
                format!("markers identify {detected} but {expected} was expected"),
            ))
        }
        (FamilyMarkers::Detected(detected), _) => Ok(Some(detected)),
        (FamilyMarkers::Absent, Some(ModelFamily::DiskOnly)) => Ok(Some(ModelFamily::DiskOnly)),
        (FamilyMarkers::Absent, Some(expected)) => Err(SedError::format(
            path,
            format!("no envelope or disk.rmin markers on line 2 but {expected} was expected"),
        )),
        (FamilyMarkers::Absent, None) if options.assume_disk_only_without_markers => {
            Ok(Some(ModelFamily::DiskOnly))
        }
        (FamilyMarkers::Absent, None) if !has_sources => Ok(None),
        (FamilyMarkers::Absent, None) => Err(SedError::format(
            path,
            "no envelope or disk.rmin markers on line 2; pass the expected family \
             or allow the disk-only default",
        )),
    }
}

/// One-based line number in the whole file for a body index.
fn file_line_number(body_index: usize) -> usize {
    body_index + HEADER_LINE_COUNT + 1
}

fn parse_source_block(
    path: &Path,
    family: ModelFamily,
    body: &[&str],
    header_index: usize,
    end: usize,
) -> ParserResult<SourceModelSet> {
    let header = body[header_index];
    let header_line = file_line_number(header_index);
    let name = SOURCE_NAME.slice(header).trim().to_string();
    let n_data = parse_count(path, header_line, header, "n_data", SOURCE_N_DATA)?;
    let init_n_fits = parse_count(path, header_line, header, "n_fits", SOURCE_N_FITS)?;

    let schema = field_schema(family);
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(end - header_index - 1); schema.len()];
    for (index, line) in body
        .iter()
        .enumerate()
        .take(end)
        .skip(header_index + 1)
    {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = file_line_number(index);
        for (field, column) in schema.iter().zip(values.iter_mut()) {
            column.push(parse_value(
                path,
                line_number,
                line,
                field.parameter.as_str(),
                field.range,
            )?);
        }
    }

    let columns: BTreeMap<_, _> = schema
        .iter()
        .map(|field| field.parameter)
        .zip(values)
        .collect();
    let candidates = CandidateTable::from_columns(columns)?;
    if u32::try_from(candidates.len()).ok() != Some(init_n_fits) {
        debug!(
            path = %path.display(),
            source = %name,
            declared = init_n_fits,
            found = candidates.len(),
            "candidate count differs from source header"
        );
    }
    Ok(SourceModelSet::new(name, n_data, init_n_fits, candidates))
}

fn parse_value(
    path: &Path,
    line_number: usize,
    line: &str,
    field: &str,
    range: ByteRange,
) -> ParserResult<f64> {
    let text = range.slice(line);
    text.trim()
        .parse::<f64>()
        .map_err(|_| SedError::parse(path, line_number, field, text))
}

fn parse_count(
    path: &Path,
    line_number: usize,
    line: &str,
    field: &str,
    range: ByteRange,
) -> ParserResult<u32> {
    let value = parse_value(path, line_number, line, field, range)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(SedError::parse(path, line_number, field, range.slice(line)))
    }
}
