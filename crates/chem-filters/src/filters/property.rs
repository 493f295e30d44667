//! Presencia de propiedades requeridas.

use chem_core::errors::{CurationError, ErrorCode};
use chem_core::Filter;
use chem_domain::Molecule;

/// Excluye registros sin un valor no vacío en la propiedad requerida.
///
/// La variante de ID externo no fija el campo al construirse: lo recibe del
/// step (y éste del pipeline) mediante `bind_external_id_field`, y siempre lee
/// ese campo, nunca el Record ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPresenceFilter {
    field: Option<String>,
    external_id: bool,
}

impl PropertyPresenceFilter {
    pub fn new(field: &str) -> Self {
        Self { field: Some(field.to_string()),
               external_id: false }
    }

    pub fn external_id() -> Self {
        Self { field: None,
               external_id: true }
    }

    pub fn field(&self) -> Option<&str> { self.field.as_deref() }

    pub fn is_external_id(&self) -> bool { self.external_id }
}

impl Filter for PropertyPresenceFilter {
    fn name(&self) -> String {
        if self.external_id {
            "require_external_id".to_string()
        } else {
            format!("require_property({})", self.field.as_deref().unwrap_or_default())
        }
    }

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError> {
        let field = self.field
                        .as_deref()
                        .ok_or_else(|| CurationError::Unexpected("external id field not configured".into()))?;
        Ok(record.property(field).map(|v| v.trim().is_empty()).unwrap_or(true))
    }

    fn exclusion_code(&self) -> Option<ErrorCode> { Some(ErrorCode::MissingRequiredField) }

    fn bind_external_id_field(&mut self, field: Option<&str>) {
        if self.external_id {
            self.field = field.map(str::to_string);
        }
    }
}
