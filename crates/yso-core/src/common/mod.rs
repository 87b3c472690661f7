pub mod config;
pub mod constants;

pub use config::{
    CutThresholds, SelectionConfig, load_selection_config, validate_critical_delta_prob,
};
