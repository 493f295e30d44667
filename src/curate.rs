//! Ejecución de punta a punta: lote JSON + descripción de pipeline →
//! registros conservados + reporte finalizado.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use chem_core::report::FinalizedReport;
use chem_core::{Batch, CurationError, Molecule, ProcessingStep};
use chem_filters::{build_step, BuildContext, StepSpec};
use log::{info, warn};

use crate::config::CurationConfig;

/// Resultado de una corrida. Un fallo fatal no impide que el reporte se haya
/// finalizado: queda en `report` y el error en `failure`.
#[derive(Debug)]
pub struct CurationRun {
    pub input_count: usize,
    pub kept: Batch,
    pub report: Option<FinalizedReport>,
    pub failure: Option<CurationError>,
}

impl CurationRun {
    pub fn succeeded(&self) -> bool { self.failure.is_none() }

    pub fn dropped(&self) -> usize { self.input_count.saturating_sub(self.kept.len()) }
}

pub fn load_batch(path: impl AsRef<Path>) -> Result<Batch, CurationError> {
    let raw = fs::read_to_string(path.as_ref())?;
    let batch: Vec<Molecule> = serde_json::from_str(&raw)?;
    Ok(batch)
}

pub fn load_step_spec(path: impl AsRef<Path>) -> Result<StepSpec, CurationError> { StepSpec::from_json(&fs::read_to_string(path.as_ref())?) }

/// Construye los steps, asigna Record IDs, clona el lote y lo ejecuta con un
/// `MarkdownReporter` que escribe en `config.report_dir`. Sólo los errores de
/// preparación (tabla, descripción de pipeline) se devuelven como `Err`.
pub fn curate(batch: Batch, spec: &StepSpec, config: &CurationConfig) -> Result<CurationRun, CurationError> {
    let model = config.valence_model()?;
    let title = match spec {
        StepSpec::Pipeline { name, .. } => name.clone(),
        _ => "curation".to_string(),
    };
    let reporter = Rc::new(RefCell::new(config.reporter(&title)));
    let ctx = BuildContext::new(reporter.clone(), model).with_external_id_field(config.external_id_field.clone())
                                                        .with_parallel(config.parallel_filters);
    let step = build_step(spec, &ctx)?;

    let input_count = batch.len();
    info!("curating {input_count} records with '{}'", step.name());
    let result = step.run_standalone(batch, true, true);
    let report = reporter.borrow().last_report().cloned();
    match result {
        Ok(kept) => {
            info!("'{}' kept {}/{} records", step.name(), kept.len(), input_count);
            Ok(CurationRun { input_count,
                             kept,
                             report,
                             failure: None })
        }
        Err(e) => {
            warn!("'{}' aborted: {e}", step.name());
            Ok(CurationRun { input_count,
                             kept: Vec::new(),
                             report,
                             failure: Some(e) })
        }
    }
}
