use std::sync::Arc;

use chem_core::errors::{CurationError, ErrorCode};
use chem_core::{Filter, ValenceModel};
use chem_domain::Molecule;
use log::debug;

use crate::filters::structure_of;

/// Excluye estructuras con algún átomo cuya configuración no figura en la
/// tabla de valencias. El modelo se comparte (`Arc`) entre filtros e hilos.
#[derive(Debug, Clone)]
pub struct ValenceFilter {
    model: Arc<ValenceModel>,
}

impl ValenceFilter {
    pub fn new(model: Arc<ValenceModel>) -> Self { Self { model } }

    pub fn model(&self) -> &ValenceModel { &self.model }
}

impl Filter for ValenceFilter {
    fn name(&self) -> String { "valence".to_string() }

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError> {
        match self.model.first_invalid_atom(structure_of(record)?)? {
            Some(index) => {
                debug!("record {} invalid valence at atom {index}", record.record_id().unwrap_or("-"));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn exclusion_code(&self) -> Option<ErrorCode> { Some(ErrorCode::InvalidValence) }
}
