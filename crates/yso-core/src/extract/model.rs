use crate::domain::{ModelFamily, Parameter, SedError, SedResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Column-oriented candidate storage for one source.
///
/// All columns always share one length. Rows can only be removed through
/// [`CandidateTable::retain_mask`], which filters every column together.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CandidateTable {
    columns: BTreeMap<Parameter, Vec<f64>>,
}

impl CandidateTable {
    pub fn from_columns(columns: BTreeMap<Parameter, Vec<f64>>) -> SedResult<Self> {
        let mut lengths = columns.iter().map(|(parameter, values)| (parameter, values.len()));
        if let Some((first_parameter, expected)) = lengths.next() {
            if let Some((parameter, length)) = lengths.find(|(_, length)| *length != expected) {
                return Err(SedError::InvalidInput(format!(
                    "candidate column `{parameter}` has {length} rows but `{first_parameter}` has {expected}"
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, parameter: Parameter) -> Option<&[f64]> {
        self.columns.get(&parameter).map(Vec::as_slice)
    }

    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.columns.keys().copied()
    }

    /// Adds or replaces a derived column. The length must match the table.
    pub fn insert_column(&mut self, parameter: Parameter, values: Vec<f64>) -> SedResult<()> {
        if !self.columns.is_empty() && values.len() != self.len() {
            return Err(SedError::InvalidInput(format!(
                "derived column `{parameter}` has {} rows but the table has {}",
                values.len(),
                self.len()
            )));
        }
        self.columns.insert(parameter, values);
        Ok(())
    }

    /// Keeps row `i` in every column iff `keep[i]`; returns the number removed.
    pub fn retain_mask(&mut self, keep: &[bool]) -> SedResult<usize> {
        let before = self.len();
        if keep.len() != before {
            return Err(SedError::InvalidInput(format!(
                "keep-mask has {} entries but the table has {before} rows",
                keep.len()
            )));
        }
        for values in self.columns.values_mut() {
            let mut flags = keep.iter();
            values.retain(|_| flags.next().copied().unwrap_or(false));
        }
        Ok(before - self.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceModelSet {
    pub name: String,
    pub n_data: u32,
    /// Fit count declared by the source header.
    pub init_n_fits: u32,
    /// Candidates currently held, updated by every filtering stage.
    pub n_fits: usize,
    pub candidates: CandidateTable,
}

impl SourceModelSet {
    pub fn new(name: String, n_data: u32, init_n_fits: u32, candidates: CandidateTable) -> Self {
        Self {
            name,
            n_data,
            init_n_fits,
            n_fits: candidates.len(),
            candidates,
        }
    }

    pub fn chi2(&self) -> &[f64] {
        self.candidates.column(Parameter::Chi2).unwrap_or(&[])
    }

    pub fn retain_mask(&mut self, keep: &[bool]) -> SedResult<usize> {
        let removed = self.candidates.retain_mask(keep)?;
        self.n_fits = self.candidates.len();
        Ok(removed)
    }
}

/// Sources of one parameter file, in file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSet {
    pub path: PathBuf,
    /// `None` only for a file too short to carry the marker line.
    pub family: Option<ModelFamily>,
    pub sources: Vec<SourceModelSet>,
}

impl ModelSet {
    pub fn empty(path: impl Into<PathBuf>, family: Option<ModelFamily>) -> Self {
        Self {
            path: path.into(),
            family,
            sources: Vec::new(),
        }
    }

    pub fn source(&self, name: &str) -> Option<&SourceModelSet> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn candidate_count(&self) -> usize {
        self.sources.iter().map(|source| source.candidates.len()).sum()
    }
}
