use chem_core::constants::{MAX_ATOMIC_NUMBER, WILDCARD_GROUP_KEY};
use chem_core::errors::{CurationError, ErrorCode};
use chem_core::Filter;
use chem_domain::Molecule;

use crate::filters::structure_of;

/// Excluye estructuras con números atómicos fuera de `[1, 118]`. Con
/// `allow_wildcard` el 0 (pseudo-átomos, grupos R) se acepta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtomicNumberFilter {
    allow_wildcard: bool,
}

impl AtomicNumberFilter {
    pub fn new(allow_wildcard: bool) -> Self { Self { allow_wildcard } }

    pub fn allow_wildcard(&self) -> bool { self.allow_wildcard }

    fn accepts(&self, z: i32) -> bool { (1..=MAX_ATOMIC_NUMBER).contains(&z) || (self.allow_wildcard && z == WILDCARD_GROUP_KEY) }
}

impl Filter for AtomicNumberFilter {
    fn name(&self) -> String { "atomic_number".to_string() }

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError> {
        for (i, atom) in structure_of(record)?.atoms.iter().enumerate() {
            let z = atom.atomic_number
                        .ok_or_else(|| CurationError::issue(ErrorCode::AtomicNumberNull, format!("atom {i} ({})", atom.symbol)))?;
            if !self.accepts(z) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn exclusion_code(&self) -> Option<ErrorCode> { Some(ErrorCode::InvalidAtomicNumber) }
}
