//! Fixed byte layout of fitter parameter files.

use crate::domain::{ModelFamily, Parameter};

/// Lines at the top of every file that never carry source data.
pub const HEADER_LINE_COUNT: usize = 3;
/// Zero-based index of the column-title line carrying the family markers.
pub const FAMILY_MARKER_LINE: usize = 1;

pub const ENVELOPE_MARKER: &str = "envelope";
pub const DISK_RMIN_MARKER: &str = "disk.rmin";

/// Source-header lines start with exactly this much indentation.
pub const SOURCE_HEADER_INDENT: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn width(self) -> usize {
        self.end - self.start
    }

    /// Text of the range, clamped to the line length. Out-of-range slices and
    /// slices that split a multi-byte character read as empty.
    pub fn slice(self, line: &str) -> &str {
        let end = self.end.min(line.len());
        if self.start >= end {
            return "";
        }
        line.get(self.start..end).unwrap_or("")
    }
}

pub const SOURCE_NAME: ByteRange = ByteRange::new(13, 30);
pub const SOURCE_N_DATA: ByteRange = ByteRange::new(39, 41);
pub const SOURCE_N_FITS: ByteRange = ByteRange::new(48, 52);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub parameter: Parameter,
    pub range: ByteRange,
}

const fn field(parameter: Parameter, start: usize, end: usize) -> FieldSpec {
    FieldSpec {
        parameter,
        range: ByteRange::new(start, end),
    }
}

const DISK_ONLY_FIELDS: [FieldSpec; 12] = [
    field(Parameter::Chi2, 45, 52),
    field(Parameter::Av, 56, 63),
    field(Parameter::Scale, 69, 74),
    field(Parameter::StarRadius, 76, 85),
    field(Parameter::StarTemperature, 87, 96),
    field(Parameter::DiskMass, 98, 108),
    field(Parameter::DiskRmax, 109, 118),
    field(Parameter::DiskBeta, 120, 129),
    field(Parameter::DiskP, 130, 140),
    field(Parameter::DiskH100, 141, 151),
    field(Parameter::Scattering, 152, 162),
    field(Parameter::Inclination, 163, 173),
];

const DISK_INNER_HOLE_FIELDS: [FieldSpec; 13] = [
    field(Parameter::Chi2, 45, 52),
    field(Parameter::Av, 56, 63),
    field(Parameter::Scale, 69, 74),
    field(Parameter::StarRadius, 76, 85),
    field(Parameter::StarTemperature, 87, 96),
    field(Parameter::DiskMass, 98, 108),
    field(Parameter::DiskRmax, 109, 118),
    field(Parameter::DiskBeta, 120, 129),
    field(Parameter::DiskP, 130, 140),
    field(Parameter::DiskH100, 141, 151),
    field(Parameter::DiskRmin, 152, 162),
    field(Parameter::Scattering, 163, 173),
    field(Parameter::Inclination, 174, 184),
];

const DISK_ENVELOPE_FIELDS: [FieldSpec; 19] = [
    field(Parameter::Chi2, 45, 52),
    field(Parameter::Av, 56, 63),
    field(Parameter::Scale, 69, 74),
    field(Parameter::StarRadius, 76, 85),
    field(Parameter::StarTemperature, 87, 96),
    field(Parameter::DiskMass, 98, 108),
    field(Parameter::DiskRmax, 109, 118),
    field(Parameter::DiskBeta, 120, 129),
    field(Parameter::DiskP, 130, 140),
    field(Parameter::DiskH100, 141, 151),
    field(Parameter::EnvelopeRho0, 153, 163),
    field(Parameter::EnvelopeRc, 164, 174),
    field(Parameter::CavityPower, 175, 184),
    field(Parameter::CavityTheta0, 185, 195),
    field(Parameter::CavityRho0, 196, 206),
    field(Parameter::AmbientDensity, 207, 217),
    field(Parameter::AmbientTemperature, 218, 229),
    field(Parameter::Scattering, 230, 240),
    field(Parameter::Inclination, 241, 251),
];

const DISK_ENVELOPE_INNER_HOLE_FIELDS: [FieldSpec; 21] = [
    field(Parameter::Chi2, 45, 52),
    field(Parameter::Av, 56, 63),
    field(Parameter::Scale, 69, 74),
    field(Parameter::StarRadius, 76, 85),
    field(Parameter::StarTemperature, 87, 96),
    field(Parameter::DiskMass, 98, 108),
    field(Parameter::DiskRmax, 109, 118),
    field(Parameter::DiskBeta, 120, 129),
    field(Parameter::DiskP, 130, 140),
    field(Parameter::DiskH100, 141, 151),
    field(Parameter::EnvelopeRho0, 153, 163),
    field(Parameter::EnvelopeRc, 164, 174),
    field(Parameter::CavityPower, 175, 184),
    field(Parameter::CavityTheta0, 185, 195),
    field(Parameter::CavityRho0, 196, 206),
    field(Parameter::DiskRmin, 207, 217),
    field(Parameter::EnvelopeRmin, 218, 229),
    field(Parameter::AmbientDensity, 230, 240),
    field(Parameter::AmbientTemperature, 241, 251),
    field(Parameter::Scattering, 252, 261),
    field(Parameter::Inclination, 262, 273),
];

/// Candidate-line fields of `family`, in file order.
pub fn field_schema(family: ModelFamily) -> &'static [FieldSpec] {
    match family {
        ModelFamily::DiskOnly => &DISK_ONLY_FIELDS,
        ModelFamily::DiskInnerHole => &DISK_INNER_HOLE_FIELDS,
        ModelFamily::DiskEnvelope => &DISK_ENVELOPE_FIELDS,
        ModelFamily::DiskEnvelopeInnerHole => &DISK_ENVELOPE_INNER_HOLE_FIELDS,
    }
}

/// Byte length of the longest candidate line the schema reads.
pub fn candidate_line_width(family: ModelFamily) -> usize {
    field_schema(family)
        .iter()
        .map(|field| field.range.end)
        .max()
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyMarkers {
    Detected(ModelFamily),
    /// Neither marker present; consistent with `sp_s_i_01` but not proof of it.
    Absent,
}

pub fn detect_family_markers(marker_line: &str) -> FamilyMarkers {
    let envelope = marker_line.contains(ENVELOPE_MARKER);
    let disk_rmin = marker_line.contains(DISK_RMIN_MARKER);
    match (envelope, disk_rmin) {
        (true, true) => FamilyMarkers::Detected(ModelFamily::DiskEnvelopeInnerHole),
        (true, false) => FamilyMarkers::Detected(ModelFamily::DiskEnvelope),
        (false, true) => FamilyMarkers::Detected(ModelFamily::DiskInnerHole),
        (false, false) => FamilyMarkers::Absent,
    }
}

pub fn is_source_header(line: &str) -> bool {
    line.len() > SOURCE_HEADER_INDENT
        && line.as_bytes()[..SOURCE_HEADER_INDENT]
            .iter()
            .all(|byte| *byte == b' ')
}
