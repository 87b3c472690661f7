//! Fixed-width parameter-file reading.

mod model;
mod parser;
mod schema;
pub mod writer;

pub use model::{CandidateTable, ModelSet, SourceModelSet};
pub use parser::{ParseOptions, parse_model_file, parse_model_source};
pub use schema::{
    ByteRange, FamilyMarkers, FieldSpec, candidate_line_width, detect_family_markers,
    field_schema,
};
