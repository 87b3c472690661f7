//! Renders parameter files in the fitter's fixed-width layout.
//!
//! Used to build fixtures and to re-emit filtered sets in the same format the
//! parser reads.

use super::model::ModelSet;
use super::schema::{
    ByteRange, HEADER_LINE_COUNT, SOURCE_N_DATA, SOURCE_N_FITS, SOURCE_NAME,
    candidate_line_width, field_schema,
};
use crate::domain::{ModelFamily, Parameter, SedError, SedResult};
use std::collections::BTreeMap;

const RANK: ByteRange = ByteRange::new(0, 5);
const MODEL_NAME: ByteRange = ByteRange::new(7, 40);

/// Values for one candidate line; unset parameters render as `0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateRow {
    values: BTreeMap<Parameter, f64>,
}

impl CandidateRow {
    pub fn uniform(value: f64) -> Self {
        Self {
            values: Parameter::ALL.into_iter().map(|p| (p, value)).collect(),
        }
    }

    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.values.insert(parameter, value);
        self
    }

    pub fn value(&self, parameter: Parameter) -> f64 {
        self.values.get(&parameter).copied().unwrap_or(0.0)
    }
}

pub fn column_title(parameter: Parameter) -> &'static str {
    match parameter {
        Parameter::Chi2 => "chi2",
        Parameter::Av => "av",
        Parameter::Scale => "scale",
        Parameter::StarRadius => "star.radius",
        Parameter::StarTemperature => "star.temperature",
        Parameter::DiskMass => "disk.mass",
        Parameter::DiskRmax => "disk.rmax",
        Parameter::DiskBeta => "disk.beta",
        Parameter::DiskP => "disk.p",
        Parameter::DiskH100 => "disk.h100",
        Parameter::DiskRmin => "disk.rmin",
        Parameter::EnvelopeRho0 => "envelope.rho_0",
        Parameter::EnvelopeRc => "envelope.rc",
        Parameter::CavityPower => "cavity.power",
        Parameter::CavityTheta0 => "cavity.theta_0",
        Parameter::CavityRho0 => "cavity.rho_0",
        Parameter::EnvelopeRmin => "envelope.rmin",
        Parameter::AmbientDensity => "ambient.density",
        Parameter::AmbientTemperature => "ambient.temperature",
        Parameter::Scattering => "scattering",
        Parameter::Inclination => "inclination",
        Parameter::Luminosity => "luminosity",
    }
}

pub fn render_header_lines(family: ModelFamily) -> [String; HEADER_LINE_COUNT] {
    let titles: Vec<&str> = field_schema(family)
        .iter()
        .map(|field| column_title(field.parameter))
        .collect();
    let title_line = format!(" fit  model_name  {}", titles.join("  "));
    let rule = "-".repeat(title_line.len());
    [
        format!(" Parameter file for model grid {family}"),
        title_line,
        rule,
    ]
}

pub fn render_source_header(name: &str, n_data: u32, n_fits: u32) -> SedResult<String> {
    let mut line = " ".repeat(SOURCE_N_FITS.end);
    place_left(&mut line, SOURCE_NAME, name, "source name")?;
    place_right(&mut line, SOURCE_N_DATA, &n_data.to_string(), "n_data")?;
    place_right(&mut line, SOURCE_N_FITS, &n_fits.to_string(), "n_fits")?;
    Ok(line)
}

pub fn render_candidate_line(
    family: ModelFamily,
    rank: usize,
    row: &CandidateRow,
) -> SedResult<String> {
    let mut line = " ".repeat(candidate_line_width(family));
    place_right(&mut line, RANK, &rank.to_string(), "rank")?;
    place_left(&mut line, MODEL_NAME, &format!("model_{rank:07}"), "model name")?;
    for field in field_schema(family) {
        let text = format_value(row.value(field.parameter), field.range.width())
            .ok_or_else(|| {
                SedError::InvalidInput(format!(
                    "value {} of `{}` does not fit in {} columns",
                    row.value(field.parameter),
                    field.parameter,
                    field.range.width()
                ))
            })?;
        place_right(&mut line, field.range, &text, field.parameter.as_str())?;
    }
    Ok(line)
}

/// Renders a complete file from `(name, n_data, candidates)` blocks.
pub fn render_model_file(
    family: ModelFamily,
    sources: &[(&str, u32, Vec<CandidateRow>)],
) -> SedResult<String> {
    let mut lines: Vec<String> = render_header_lines(family).into();
    for (name, n_data, rows) in sources {
        let n_fits = u32::try_from(rows.len())
            .map_err(|_| SedError::InvalidInput(format!("too many candidates for {name}")))?;
        lines.push(render_source_header(name, *n_data, n_fits)?);
        for (index, row) in rows.iter().enumerate() {
            lines.push(render_candidate_line(family, index + 1, row)?);
        }
    }
    Ok(lines.join("\n") + "\n")
}

/// Re-emits a parsed (and possibly filtered) set. Derived columns are dropped.
pub fn render_model_set(set: &ModelSet) -> SedResult<String> {
    let family = set.family.ok_or_else(|| {
        SedError::InvalidInput(format!(
            "'{}' has no model family to render",
            set.path.display()
        ))
    })?;
    let blocks = set
        .sources
        .iter()
        .map(|source| {
            let rows = (0..source.candidates.len())
                .map(|index| {
                    source
                        .candidates
                        .parameters()
                        .fold(CandidateRow::default(), |row, parameter| {
                            let value = source
                                .candidates
                                .column(parameter)
                                .and_then(|values| values.get(index))
                                .copied()
                                .unwrap_or(0.0);
                            row.with(parameter, value)
                        })
                })
                .collect();
            (source.name.as_str(), source.n_data, rows)
        })
        .collect::<Vec<_>>();
    render_model_file(family, &blocks)
}

/// Shortest round-tripping text that fits `width`, preferring plain notation.
fn format_value(value: f64, width: usize) -> Option<String> {
    let plain = value.to_string();
    if plain.len() <= width {
        return Some(plain);
    }
    let scientific = format!("{value:e}");
    (scientific.len() <= width).then_some(scientific)
}

fn place_right(line: &mut String, range: ByteRange, text: &str, what: &str) -> SedResult<()> {
    check_fits(range, text, what)?;
    let padded = format!("{text:>width$}", width = range.width());
    line.replace_range(range.start..range.end, &padded);
    Ok(())
}

fn place_left(line: &mut String, range: ByteRange, text: &str, what: &str) -> SedResult<()> {
    check_fits(range, text, what)?;
    let padded = format!("{text:<width$}", width = range.width());
    line.replace_range(range.start..range.end, &padded);
    Ok(())
}

fn check_fits(range: ByteRange, text: &str, what: &str) -> SedResult<()> {
    if text.len() > range.width() || !text.is_ascii() {
        return Err(SedError::InvalidInput(format!(
            "{what} '{text}' does not fit in {} ASCII columns",
            range.width()
        )));
    }
    Ok(())
}
