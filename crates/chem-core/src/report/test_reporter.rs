//! Reporter de prueba en streaming: clasifica cada entrada al llegar contra
//! una lista de códigos permitidos. Existe para poder afirmar el
//! comportamiento de steps y pipelines sin inspeccionar reportes renderizados.

use std::collections::HashSet;

use crate::errors::{CurationError, ErrorCode};
use crate::report::reporter::{Lifecycle, Reporter, ReporterState};
use crate::report::ReportEntry;

#[derive(Debug, Default)]
pub struct TestReporter {
    allowed: HashSet<ErrorCode>,
    lifecycle: Lifecycle,
    entries: Vec<ReportEntry>,
    seen: Vec<ErrorCode>,
    allowed_count: usize,
    not_allowed_count: usize,
}

impl TestReporter {
    pub fn new() -> Self { Self::default() }

    pub fn allowing<I: IntoIterator<Item = ErrorCode>>(codes: I) -> Self {
        Self { allowed: codes.into_iter().collect(),
               ..Self::default() }
    }

    pub fn allowed_count(&self) -> usize { self.allowed_count }

    pub fn not_allowed_count(&self) -> usize { self.not_allowed_count }

    /// Códigos recibidos en orden de llegada; sobrevive a `finalize` hasta el
    /// siguiente `initialize`.
    pub fn seen_codes(&self) -> &[ErrorCode] { &self.seen }

    fn reset_counters(&mut self) {
        self.entries.clear();
        self.seen.clear();
        self.allowed_count = 0;
        self.not_allowed_count = 0;
    }
}

impl Reporter for TestReporter {
    fn initialize(&mut self) -> Result<(), CurationError> {
        self.lifecycle.begin()?;
        self.reset_counters();
        Ok(())
    }

    fn append(&mut self, entry: ReportEntry) -> Result<(), CurationError> {
        self.lifecycle.ensure_collecting()?;
        if self.allowed.contains(&entry.code()) {
            self.allowed_count += 1;
        } else {
            self.not_allowed_count += 1;
        }
        self.seen.push(entry.code());
        self.entries.push(entry);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), CurationError> {
        let fatal = self.lifecycle.end()?;
        self.entries.clear();
        if fatal {
            return Err(CurationError::Reporter("run ended with a fatal exception".into()));
        }
        if self.not_allowed_count > 0 {
            return Err(CurationError::Reporter(format!("{} entries with codes outside the allowed set: {:?}",
                                                       self.not_allowed_count,
                                                       self.seen
                                                           .iter()
                                                           .filter(|c| !self.allowed.contains(c))
                                                           .collect::<Vec<_>>())));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.reset_counters();
        self.lifecycle.reset();
    }

    fn state(&self) -> ReporterState { self.lifecycle.state() }

    fn ended_with_fatal(&self) -> bool { self.lifecycle.fatal() }

    fn set_ended_with_fatal(&mut self, fatal: bool) { self.lifecycle.set_fatal(fatal); }

    fn entries(&self) -> &[ReportEntry] { &self.entries }
}
