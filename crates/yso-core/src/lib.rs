pub mod common;
pub mod cuts;
pub mod domain;
pub mod extract;
pub mod numerics;
pub mod report;
pub mod selection;
pub mod stats;
pub mod workflow;

pub use domain::{ModelFamily, Parameter, Regime, SedError, SedErrorCategory, SedResult};
