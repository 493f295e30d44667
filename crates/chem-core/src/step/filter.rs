//! Especialización de step cuya unidad de trabajo es un predicado de
//! exclusión por registro. Un filtro nunca transforma: los registros que
//! pasan salen idénticos y en el orden original.

use chem_domain::Molecule;
use log::debug;
use rayon::prelude::*;

use crate::errors::{CurationError, ErrorCode};
use crate::report::SharedReporter;
use crate::step::definition::{Batch, ProcessingStep, StepCore};

pub trait Filter: Sync {
    /// Nombre estable del filtro (identidad del step en los reportes).
    fn name(&self) -> String;

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError>;

    /// Código a reportar cuando un registro se excluye. `None` para filtros
    /// cuya exclusión es el propósito mismo y no merece entrada.
    fn exclusion_code(&self) -> Option<ErrorCode> { None }

    /// Permite al step propagar el campo de ID externo a filtros que lo leen.
    fn bind_external_id_field(&mut self, _field: Option<&str>) {}
}

pub struct FilterStep<F: Filter> {
    core: StepCore,
    filter: F,
    parallel: bool,
}

impl<F: Filter> FilterStep<F> {
    pub fn new(filter: F) -> Self {
        let core = StepCore::new(&filter.name());
        Self { core,
               filter,
               parallel: false }
    }

    pub fn with_reporter(filter: F, reporter: SharedReporter) -> Self {
        let core = StepCore::with_reporter(&filter.name(), reporter);
        Self { core,
               filter,
               parallel: false }
    }

    /// Evalúa los predicados en paralelo (rayon). Las entradas de reporte se
    /// aplican después, secuencialmente y en el orden de los registros.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn filter(&self) -> &F { &self.filter }

    /// Descarta, reportando `RecordIdMissing`, los registros que llegan sin
    /// Record ID (o con uno en blanco). Ningún predicado los evalúa.
    fn admit(&self, batch: Batch) -> Result<Batch, CurationError> {
        let mut admitted = Vec::with_capacity(batch.len());
        for record in batch {
            if record.record_id().is_some_and(|id| !id.trim().is_empty()) {
                admitted.push(record);
            } else {
                let cause = CurationError::issue(ErrorCode::RecordIdMissing, "record reached the filter without a record id");
                self.core.report_issue(Some(&record), cause)?;
            }
        }
        Ok(admitted)
    }

    fn apply(&self, record: Molecule, outcome: Result<bool, CurationError>, kept: &mut Batch) -> Result<(), CurationError> {
        match outcome {
            Ok(false) => kept.push(record),
            Ok(true) => {
                if let Some(code) = self.filter.exclusion_code() {
                    self.core.report_condition(&record, code, None)?;
                }
            }
            Err(cause) => self.core.report_issue(Some(&record), cause)?,
        }
        Ok(())
    }
}

impl<F: Filter> ProcessingStep for FilterStep<F> {
    fn core(&self) -> &StepCore { &self.core }

    fn core_mut(&mut self) -> &mut StepCore { &mut self.core }

    fn set_external_id_field(&mut self, field: Option<String>) {
        self.filter.bind_external_id_field(field.as_deref());
        self.core.set_external_id_field(field);
    }

    fn run(&self, batch: Batch) -> Result<Batch, CurationError> {
        let total = batch.len();
        let batch = self.admit(batch)?;
        let mut kept = Vec::with_capacity(total);
        if self.parallel {
            let filter = &self.filter;
            let outcomes: Vec<Result<bool, CurationError>> = batch.par_iter().map(|r| filter.is_excluded(r)).collect();
            for (record, outcome) in batch.into_iter().zip(outcomes) {
                self.apply(record, outcome, &mut kept)?;
            }
        } else {
            for record in batch {
                let outcome = self.filter.is_excluded(&record);
                self.apply(record, outcome, &mut kept)?;
            }
        }
        debug!("[{}@{}] kept {}/{} records",
               self.core.name(),
               self.core.position().unwrap_or("top"),
               kept.len(),
               total);
        Ok(kept)
    }
}
