pub mod errors;

pub use errors::{ParserResult, SedError, SedErrorCategory, SedResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The four model grids the upstream fitter writes parameter files for.
///
/// Variant order is the tie-break order used by the model tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ModelFamily {
    /// `sp--s-i`: star + passive disk, no inner hole.
    #[serde(rename = "sp_s_i_01")]
    DiskOnly,
    /// `sp--h-i`: star + passive disk with a variable inner radius.
    #[serde(rename = "sp_h_i_02")]
    DiskInnerHole,
    /// `spubsmi`: star + disk + Ulrich envelope + bipolar cavity + ambient medium.
    #[serde(rename = "spubsmi_16")]
    DiskEnvelope,
    /// `spubhmi`: as `spubsmi` with variable disk and envelope inner radii.
    #[serde(rename = "spubhmi_17")]
    DiskEnvelopeInnerHole,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 4] = [
        Self::DiskOnly,
        Self::DiskInnerHole,
        Self::DiskEnvelope,
        Self::DiskEnvelopeInnerHole,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiskOnly => "sp_s_i_01",
            Self::DiskInnerHole => "sp_h_i_02",
            Self::DiskEnvelope => "spubsmi_16",
            Self::DiskEnvelopeInnerHole => "spubhmi_17",
        }
    }

    /// Grid name without the numeric suffix.
    pub const fn grid_name(self) -> &'static str {
        match self {
            Self::DiskOnly => "sp_s_i",
            Self::DiskInnerHole => "sp_h_i",
            Self::DiskEnvelope => "spubsmi",
            Self::DiskEnvelopeInnerHole => "spubhmi",
        }
    }

    /// Numeric grid identifier used in the fitter's file names (`pars_01...`).
    pub const fn flag(self) -> u8 {
        match self {
            Self::DiskOnly => 1,
            Self::DiskInnerHole => 2,
            Self::DiskEnvelope => 16,
            Self::DiskEnvelopeInnerHole => 17,
        }
    }

    /// Number of models enumerated in the full grid for this family.
    pub const fn grid_size(self) -> usize {
        match self {
            Self::DiskOnly | Self::DiskInnerHole => 10_000,
            Self::DiskEnvelope => 40_000,
            Self::DiskEnvelopeInnerHole => 80_000,
        }
    }
}

impl Display for ModelFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = SedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| {
                normalized == family.as_str()
                    || normalized == family.grid_name()
                    || normalized.parse::<u8>().ok() == Some(family.flag())
            })
            .ok_or_else(|| {
                SedError::InvalidInput(format!(
                    "unknown model family '{value}'; expected one of 01, 02, 16, 17 or sp_s_i_01, sp_h_i_02, spubsmi_16, spubhmi_17"
                ))
            })
    }
}

/// Photometric data regime a fit was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Ir,
    Survey,
}

impl Regime {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ir => "ir",
            Self::Survey => "survey",
        }
    }
}

impl Display for Regime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One per-candidate column of a parameter file, plus the derived luminosity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Parameter {
    #[serde(rename = "chi2")]
    Chi2,
    #[serde(rename = "av")]
    Av,
    #[serde(rename = "scale")]
    Scale,
    #[serde(rename = "star_rad")]
    StarRadius,
    #[serde(rename = "star_temp")]
    StarTemperature,
    #[serde(rename = "d_mass")]
    DiskMass,
    #[serde(rename = "rmax")]
    DiskRmax,
    #[serde(rename = "d_beta")]
    DiskBeta,
    #[serde(rename = "disk_p")]
    DiskP,
    #[serde(rename = "disk_h100")]
    DiskH100,
    #[serde(rename = "disk_rmin")]
    DiskRmin,
    #[serde(rename = "env_rho_0")]
    EnvelopeRho0,
    #[serde(rename = "env_rc")]
    EnvelopeRc,
    #[serde(rename = "cav_power")]
    CavityPower,
    #[serde(rename = "cav_theta_0")]
    CavityTheta0,
    #[serde(rename = "cav_rho_0")]
    CavityRho0,
    #[serde(rename = "env_rmin")]
    EnvelopeRmin,
    #[serde(rename = "amb_den")]
    AmbientDensity,
    #[serde(rename = "amb_temp")]
    AmbientTemperature,
    #[serde(rename = "scattering")]
    Scattering,
    #[serde(rename = "inclination")]
    Inclination,
    #[serde(rename = "lum")]
    Luminosity,
}

impl Parameter {
    pub const ALL: [Parameter; 22] = [
        Self::Chi2,
        Self::Av,
        Self::Scale,
        Self::StarRadius,
        Self::StarTemperature,
        Self::DiskMass,
        Self::DiskRmax,
        Self::DiskBeta,
        Self::DiskP,
        Self::DiskH100,
        Self::DiskRmin,
        Self::EnvelopeRho0,
        Self::EnvelopeRc,
        Self::CavityPower,
        Self::CavityTheta0,
        Self::CavityRho0,
        Self::EnvelopeRmin,
        Self::AmbientDensity,
        Self::AmbientTemperature,
        Self::Scattering,
        Self::Inclination,
        Self::Luminosity,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chi2 => "chi2",
            Self::Av => "av",
            Self::Scale => "scale",
            Self::StarRadius => "star_rad",
            Self::StarTemperature => "star_temp",
            Self::DiskMass => "d_mass",
            Self::DiskRmax => "rmax",
            Self::DiskBeta => "d_beta",
            Self::DiskP => "disk_p",
            Self::DiskH100 => "disk_h100",
            Self::DiskRmin => "disk_rmin",
            Self::EnvelopeRho0 => "env_rho_0",
            Self::EnvelopeRc => "env_rc",
            Self::CavityPower => "cav_power",
            Self::CavityTheta0 => "cav_theta_0",
            Self::CavityRho0 => "cav_rho_0",
            Self::EnvelopeRmin => "env_rmin",
            Self::AmbientDensity => "amb_den",
            Self::AmbientTemperature => "amb_temp",
            Self::Scattering => "scattering",
            Self::Inclination => "inclination",
            Self::Luminosity => "lum",
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for Parameter {
    type Err = SedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let normalized = normalized.strip_suffix("_arr").unwrap_or(&normalized);
        let normalized = match normalized {
            "chi_2" => "chi2",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|parameter| parameter.as_str() == normalized)
            .ok_or_else(|| SedError::InvalidInput(format!("unknown parameter '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelFamily, Parameter, Regime};

    #[test]
    fn family_tags_parse_from_flags_and_names() {
        assert_eq!("01".parse::<ModelFamily>().unwrap(), ModelFamily::DiskOnly);
        assert_eq!("2".parse::<ModelFamily>().unwrap(), ModelFamily::DiskInnerHole);
        assert_eq!(
            "spubsmi".parse::<ModelFamily>().unwrap(),
            ModelFamily::DiskEnvelope
        );
        assert_eq!(
            "spubhmi_17".parse::<ModelFamily>().unwrap(),
            ModelFamily::DiskEnvelopeInnerHole
        );
        assert!("18".parse::<ModelFamily>().is_err());
    }

    #[test]
    fn partial_grid_names_are_rejected() {
        assert_eq!(
            "SP_S_I".parse::<ModelFamily>().unwrap(),
            ModelFamily::DiskOnly
        );
        assert_eq!(
            "sp_h_i".parse::<ModelFamily>().unwrap(),
            ModelFamily::DiskInnerHole
        );
        assert_eq!(
            "spubhmi".parse::<ModelFamily>().unwrap(),
            ModelFamily::DiskEnvelopeInnerHole
        );
        for partial in ["sp", "sp_s", "sp_h", "spub", "spubs", "sp_s_i_0"] {
            assert!(
                partial.parse::<ModelFamily>().is_err(),
                "'{partial}' should not name a family"
            );
        }
    }

    #[test]
    fn family_order_matches_tree_tie_break_order() {
        let mut families = vec![
            ModelFamily::DiskEnvelopeInnerHole,
            ModelFamily::DiskOnly,
            ModelFamily::DiskEnvelope,
            ModelFamily::DiskInnerHole,
        ];
        families.sort();
        assert_eq!(families, ModelFamily::ALL.to_vec());
    }

    #[test]
    fn grid_sizes_follow_family() {
        let sizes: Vec<usize> = ModelFamily::ALL.iter().map(|f| f.grid_size()).collect();
        assert_eq!(sizes, vec![10_000, 10_000, 40_000, 80_000]);
    }

    #[test]
    fn parameter_names_accept_dataframe_column_spellings() {
        assert_eq!(
            "star_temp_arr".parse::<Parameter>().unwrap(),
            Parameter::StarTemperature
        );
        assert_eq!("chi_2_arr".parse::<Parameter>().unwrap(), Parameter::Chi2);
        assert_eq!("lum".parse::<Parameter>().unwrap(), Parameter::Luminosity);
        assert!("teff".parse::<Parameter>().is_err());
    }

    #[test]
    fn serde_names_match_display_names() {
        for parameter in Parameter::ALL {
            let json = serde_json::to_string(&parameter).unwrap();
            assert_eq!(json, format!("\"{parameter}\""));
        }
        assert_eq!(serde_json::to_string(&Regime::Survey).unwrap(), "\"survey\"");
        assert_eq!(
            serde_json::to_string(&ModelFamily::DiskEnvelope).unwrap(),
            "\"spubsmi_16\""
        );
    }
}
