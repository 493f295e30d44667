//! Modelo de validación de valencias sobre `ReferenceTable`.
//!
//! Despacho O(1) al grupo del número atómico y luego un barrido lineal de las
//! pocas filas del grupo: carga, pi y sigma deben coincidir exactamente y los
//! hidrógenos implícitos no pueden superar el techo de la fila.

use std::sync::Arc;

use chem_domain::Structure;

use crate::constants::WILDCARD_GROUP_KEY;
use crate::errors::{CurationError, ErrorCode};
use crate::valence::table::ReferenceTable;

/// Configuración atómica a evaluar. Los atributos opcionales reflejan lo que
/// entrega la representación externa; su ausencia es un error del llamador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomConfiguration {
    pub group_key: Option<i32>,
    pub charge: Option<i32>,
    pub pi_bonds: i32,
    pub sigma_bonds: i32,
    pub implicit_hydrogens: Option<i32>,
}

impl AtomConfiguration {
    pub fn new(group_key: i32, charge: i32, pi_bonds: i32, sigma_bonds: i32, implicit_hydrogens: i32) -> Self {
        Self { group_key: Some(group_key),
               charge: Some(charge),
               pi_bonds,
               sigma_bonds,
               implicit_hydrogens: Some(implicit_hydrogens) }
    }

    /// Extrae la configuración del átomo `index` de la estructura.
    pub fn from_atom(structure: &Structure, index: usize) -> Result<Self, CurationError> {
        let atom = structure.atoms
                            .get(index)
                            .ok_or_else(|| CurationError::Unexpected(format!("atom {index} out of range")))?;
        Ok(Self { group_key: atom.atomic_number,
                  charge: atom.formal_charge,
                  pi_bonds: structure.pi_bond_count(index)?,
                  sigma_bonds: structure.sigma_bond_count(index)?,
                  implicit_hydrogens: atom.implicit_hydrogens })
    }
}

#[derive(Debug, Clone)]
pub struct ValenceModel {
    table: Arc<ReferenceTable>,
    wildcard_valid: bool,
}

impl ValenceModel {
    pub fn new(table: Arc<ReferenceTable>, wildcard_valid: bool) -> Self { Self { table, wildcard_valid } }

    pub fn table(&self) -> &ReferenceTable { &self.table }

    pub fn wildcard_valid(&self) -> bool { self.wildcard_valid }

    pub fn is_valid(&self, config: &AtomConfiguration) -> Result<bool, CurationError> {
        let group_key = config.group_key
                              .ok_or_else(|| CurationError::issue(ErrorCode::AtomicNumberNull, "atomic number not set"))?;
        if self.wildcard_valid && group_key == WILDCARD_GROUP_KEY {
            return Ok(true);
        }
        let charge = config.charge
                           .ok_or_else(|| CurationError::issue(ErrorCode::FormalChargeNull, "formal charge not set"))?;
        let hydrogens =
            config.implicit_hydrogens
                  .ok_or_else(|| CurationError::issue(ErrorCode::ImplicitHydrogenCountNull, "implicit hydrogen count not set"))?;

        let slot = self.table.group(group_key);
        if slot.is_absent() {
            return Ok(false);
        }
        Ok(self.table.group_entries(group_key).iter().any(|e| {
                                                         e.charge == charge
                                                         && e.pi_bonds == config.pi_bonds
                                                         && e.sigma_bonds == config.sigma_bonds
                                                         && hydrogens <= e.max_implicit_h
                                                     }))
    }

    /// Índice del primer átomo inválido, o `None` si todos son válidos. Una
    /// estructura con enlaces rotos no es evaluable y falla como inesperado.
    pub fn first_invalid_atom(&self, structure: &Structure) -> Result<Option<usize>, CurationError> {
        structure.check_integrity()?;
        for index in 0..structure.atoms.len() {
            let config = AtomConfiguration::from_atom(structure, index)?;
            if !self.is_valid(&config)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn is_valid_structure(&self, structure: &Structure) -> Result<bool, CurationError> {
        Ok(self.first_invalid_atom(structure)?.is_none())
    }
}
