use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DomainError, Structure};

/// Registro que fluye por el pipeline de curación.
///
/// - `record_id`: identificador asignado por el proceso (único en el lote).
///   Se asigna una sola vez antes del primer step y nunca se reasigna.
/// - `properties`: metadatos del archivo fuente (p. ej. el ID externo del
///   proveedor). Se conserva el orden de inserción.
/// - `structure`: `None` cuando la fuente no pudo producir una estructura.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Molecule {
    #[serde(default)]
    record_id: Option<String>,
    #[serde(default)]
    properties: IndexMap<String, String>,
    #[serde(default)]
    structure: Option<Structure>,
}

impl Molecule {
    pub fn new(structure: Structure) -> Self {
        Self { record_id: None,
               properties: IndexMap::new(),
               structure: Some(structure) }
    }

    /// Registro sin estructura (entrada ilegible en la fuente).
    pub fn without_structure() -> Self { Self::default() }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    pub fn record_id(&self) -> Option<&str> { self.record_id.as_deref() }

    pub fn set_record_id(&mut self, id: impl Into<String>) { self.record_id = Some(id.into()); }

    pub fn property(&self, name: &str) -> Option<&str> { self.properties.get(name).map(String::as_str) }

    pub fn properties(&self) -> &IndexMap<String, String> { &self.properties }

    pub fn set_property(&mut self, name: &str, value: &str) { self.properties.insert(name.to_string(), value.to_string()); }

    pub fn structure(&self) -> Option<&Structure> { self.structure.as_ref() }

    /// Copia profunda validada. Falla si la estructura está corrupta (enlaces
    /// hacia átomos inexistentes), de modo que el llamador pueda descartar sólo
    /// ese registro.
    pub fn try_clone(&self) -> Result<Molecule, DomainError> {
        if let Some(structure) = &self.structure {
            structure.check_integrity()?;
        }
        Ok(self.clone())
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.record_id, &self.structure) {
            (Some(id), Some(s)) => write!(f, "<record {}: {} atoms>", id, s.atoms.len()),
            (Some(id), None) => write!(f, "<record {}: no structure>", id),
            (None, Some(s)) => write!(f, "<unassigned record: {} atoms>", s.atoms.len()),
            (None, None) => write!(f, "<unassigned record: no structure>"),
        }
    }
}
