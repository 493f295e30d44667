//! Preparación previa al primer step: asignación de Record IDs y clonado.

use chem_domain::Molecule;
use log::debug;

use crate::errors::{CurationError, ErrorCode};
use crate::step::definition::{Batch, StepCore};

/// Asigna a cada registro su posición 1-based como Record ID. Se llama una
/// sola vez por lote, antes del primer step.
pub fn assign_record_ids(batch: &mut [Molecule]) {
    for (i, record) in batch.iter_mut().enumerate() {
        record.set_record_id((i + 1).to_string());
    }
    debug!("assigned record ids 1..={}", batch.len());
}

/// Copia profunda validada del lote. Un registro que no se puede copiar se
/// reporta como `CloneFailed` y se descarta; el resto continúa.
pub fn clone_batch(batch: Batch, core: &StepCore) -> Result<Batch, CurationError> {
    let mut out = Vec::with_capacity(batch.len());
    for record in &batch {
        match record.try_clone() {
            Ok(copy) => out.push(copy),
            Err(e) => core.report_issue(Some(record), CurationError::issue(ErrorCode::CloneFailed, e.to_string()))?,
        }
    }
    Ok(out)
}
