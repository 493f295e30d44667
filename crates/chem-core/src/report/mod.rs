//! Entradas de reporte y reporters.
//!
//! - `ReportEntry`: incidencia inmutable (código, step, posición, registro).
//! - `Reporter`: contrato `initialize/append/finalize/clear` con máquina de
//!   estados `Uninitialized -> Collecting -> Finalized`.
//! - `MarkdownReporter`: diferido, ordena y renderiza al finalizar.
//! - `TestReporter`: streaming, clasifica contra una lista permitida.

mod entry;
pub mod markdown;
pub mod reporter;
mod test_reporter;

pub use entry::ReportEntry;
pub use markdown::{fingerprint_entries, FinalizedReport, MarkdownReporter, ReportExport};
pub use reporter::{shared, Reporter, ReporterState, SharedReporter};
pub use test_reporter::TestReporter;
