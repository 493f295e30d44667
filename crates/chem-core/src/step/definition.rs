use chem_domain::Molecule;
use log::{error, warn};

use crate::errors::{CurationError, ErrorCode};
use crate::report::{shared, MarkdownReporter, ReportEntry, SharedReporter};
use crate::step::prepare::{assign_record_ids, clone_batch};

/// Lote de registros que consume y produce un step.
pub type Batch = Vec<Molecule>;

/// Campos comunes de todo step: identidad, reporter, campo de ID externo y
/// posición jerárquica. Una posición presente implica que un pipeline padre
/// es dueño de la finalización del reporter.
pub struct StepCore {
    name: String,
    reporter: SharedReporter,
    external_id_field: Option<String>,
    position: Option<String>,
}

impl StepCore {
    /// Step con un `MarkdownReporter` en memoria propio.
    pub fn new(name: &str) -> Self { Self::with_reporter(name, shared(MarkdownReporter::in_memory(name))) }

    pub fn with_reporter(name: &str, reporter: SharedReporter) -> Self {
        Self { name: name.to_string(),
               reporter,
               external_id_field: None,
               position: None }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn reporter(&self) -> SharedReporter { self.reporter.clone() }

    pub fn set_reporter(&mut self, reporter: SharedReporter) { self.reporter = reporter; }

    pub fn external_id_field(&self) -> Option<&str> { self.external_id_field.as_deref() }

    pub fn set_external_id_field(&mut self, field: Option<String>) { self.external_id_field = field; }

    pub fn position(&self) -> Option<&str> { self.position.as_deref() }

    pub fn set_position(&mut self, position: Option<String>) { self.position = position; }

    fn entry(&self, code: ErrorCode, record: Option<&Molecule>, detail: Option<String>) -> Result<ReportEntry, CurationError> {
        match ReportEntry::new(code, &self.name, self.position(), record, self.external_id_field(), detail.clone()) {
            Ok(entry) => Ok(entry),
            // un registro sin Record ID no puede portar su código original
            Err(CurationError::InvalidEntry(reason)) => {
                let detail = format!("{code} not attributable ({reason}){}",
                                     detail.map(|d| format!(": {d}")).unwrap_or_default());
                ReportEntry::new(ErrorCode::RecordIdMissing, &self.name, self.position(), None, None, Some(detail))
            }
            Err(e) => Err(e),
        }
    }

    /// Registra una condición de exclusión (no es un fallo).
    pub fn report_condition(&self, record: &Molecule, code: ErrorCode, detail: Option<String>) -> Result<(), CurationError> {
        let entry = self.entry(code, Some(record), detail)?;
        self.reporter.borrow_mut().append(entry)
    }

    /// Hook único para fallos por registro: clasifica, agrega la entrada y
    /// decide la fatalidad. Los fallos recuperables devuelven `Ok` (el
    /// llamador descarta el registro); los demás se devuelven como error
    /// después de quedar reportados.
    pub fn report_issue(&self, record: Option<&Molecule>, cause: CurationError) -> Result<(), CurationError> {
        let code = cause.code();
        let entry = self.entry(code, record, Some(cause.to_string()))?;
        self.reporter.borrow_mut().append(entry)?;
        let id = record.and_then(|r| r.record_id()).unwrap_or("-");
        if cause.is_recoverable() {
            warn!("[{}@{}] record {} dropped: {}", self.name, self.position().unwrap_or("top"), id, cause);
            Ok(())
        } else {
            error!("[{}@{}] fatal failure on record {}: {}", self.name, self.position().unwrap_or("top"), id, cause);
            Err(cause)
        }
    }
}

/// Unidad de trabajo: consume un lote, produce un lote y reporta incidencias.
pub trait ProcessingStep {
    fn core(&self) -> &StepCore;

    fn core_mut(&mut self) -> &mut StepCore;

    /// Forma "librería": no clona la entrada ni finaliza el reporter. El
    /// reporter debe estar en `Collecting`.
    fn run(&self, batch: Batch) -> Result<Batch, CurationError>;

    fn name(&self) -> &str { self.core().name() }

    fn position(&self) -> Option<&str> { self.core().position() }

    fn reporter(&self) -> SharedReporter { self.core().reporter() }

    fn external_id_field(&self) -> Option<&str> { self.core().external_id_field() }

    fn set_position(&mut self, position: Option<String>) { self.core_mut().set_position(position); }

    fn set_reporter(&mut self, reporter: SharedReporter) { self.core_mut().set_reporter(reporter); }

    fn set_external_id_field(&mut self, field: Option<String>) { self.core_mut().set_external_id_field(field); }

    /// Steps hijos (sólo los compuestos tienen).
    fn children(&self) -> &[Box<dyn ProcessingStep>] { &[] }

    /// Forma de conveniencia. Asigna Record IDs si se pide, clona si se pide
    /// (descartando y reportando los registros que no se pueden copiar) y
    /// delega en `run`. Sólo un step sin posición (no anidado) inicializa y
    /// finaliza el reporter; ante un fallo fatal el reporte se finaliza igual
    /// y se devuelve el error original.
    fn run_standalone(&self, batch: Batch, clone_first: bool, assign_ids: bool) -> Result<Batch, CurationError> {
        let top_level = self.position().is_none();
        let reporter = self.reporter();
        if top_level {
            reporter.borrow_mut().initialize()?;
        }
        let mut batch = batch;
        if assign_ids {
            assign_record_ids(&mut batch);
        }
        let prepared = if clone_first { clone_batch(batch, self.core()) } else { Ok(batch) };
        let result = prepared.and_then(|b| self.run(b));
        if !top_level {
            return result;
        }
        let mut reporter = reporter.borrow_mut();
        match result {
            Ok(out) => {
                reporter.finalize()?;
                Ok(out)
            }
            Err(e) => {
                reporter.set_ended_with_fatal(true);
                // el error de finalize sólo repite el fatal; prima el original
                let _ = reporter.finalize();
                Err(e)
            }
        }
    }
}
