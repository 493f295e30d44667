use chem_domain::Molecule;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::errors::{CurationError, ErrorCode};

/// Incidencia inmutable emitida por un step.
///
/// Para los códigos que no están en la lista blanca `is_structure_optional`
/// la entrada exige un registro con Record ID no vacío; construirla sin él es
/// un error de construcción, no una entrada degradada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    code: ErrorCode,
    step: String,
    position: Option<String>,
    record_id: Option<String>,
    external_id: Option<String>,
    detail: Option<String>,
    record: Option<Molecule>,
}

impl ReportEntry {
    /// `external_id_field` es el nombre de la propiedad que guarda el ID
    /// externo; si el registro la tiene, se copia a la entrada.
    pub fn new(code: ErrorCode,
               step: &str,
               position: Option<&str>,
               record: Option<&Molecule>,
               external_id_field: Option<&str>,
               detail: Option<String>)
               -> Result<Self, CurationError> {
        let record_id = record.and_then(|r| r.record_id()).filter(|id| !id.trim().is_empty());
        if !code.is_structure_optional() {
            if record.is_none() {
                return Err(CurationError::InvalidEntry(format!("{code} requires a record")));
            }
            if record_id.is_none() {
                return Err(CurationError::InvalidEntry(format!("{code} requires a non-blank record id")));
            }
        }
        let external_id = match (record, external_id_field) {
            (Some(r), Some(field)) => r.property(field).map(str::to_string),
            _ => None,
        };
        Ok(Self { code,
                  step: step.to_string(),
                  position: position.map(str::to_string),
                  record_id: record_id.map(str::to_string),
                  external_id,
                  detail,
                  record: record.cloned() })
    }

    pub fn code(&self) -> ErrorCode { self.code }

    pub fn step(&self) -> &str { &self.step }

    pub fn position(&self) -> Option<&str> { self.position.as_deref() }

    pub fn record_id(&self) -> Option<&str> { self.record_id.as_deref() }

    pub fn external_id(&self) -> Option<&str> { self.external_id.as_deref() }

    pub fn detail(&self) -> Option<&str> { self.detail.as_deref() }

    pub fn record(&self) -> Option<&Molecule> { self.record.as_ref() }

    /// Orden de reporte: posición jerárquica (numérica por segmento, sin
    /// posición primero), luego código, luego Record ID numérico.
    pub fn report_order(&self, other: &Self) -> Ordering {
        position_key(self.position())
            .cmp(&position_key(other.position()))
            .then(self.code.cmp(&other.code))
            .then_with(|| id_key(self.record_id()).cmp(&id_key(other.record_id())))
    }
}

fn position_key(position: Option<&str>) -> Vec<u64> {
    position.map(|p| p.split('.').map(|s| s.parse::<u64>().unwrap_or(u64::MAX)).collect())
            .unwrap_or_default()
}

fn id_key(id: Option<&str>) -> (u64, String) {
    match id {
        Some(s) => (s.parse::<u64>().unwrap_or(u64::MAX), s.to_string()),
        None => (0, String::new()),
    }
}
