//! chem-core: steps, pipelines, reporters y modelo de valencias para la
//! curación de lotes de moléculas.
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod report;
pub mod step;
pub mod valence;

pub use chem_domain::Molecule;
pub use errors::{CurationError, ErrorCode};
pub use report::{shared, MarkdownReporter, ReportEntry, Reporter, ReporterState, SharedReporter, TestReporter};
pub use step::{assign_record_ids, Batch, Filter, FilterStep, Pipeline, ProcessingStep, StepCore};
pub use valence::{AtomConfiguration, ReferenceTable, TableLayout, ValenceModel};
