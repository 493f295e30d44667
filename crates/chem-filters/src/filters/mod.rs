//! Implementaciones de `chem_core::Filter`.

mod atomic_number;
mod property;
mod threshold;
mod valence;

pub use atomic_number::AtomicNumberFilter;
pub use property::PropertyPresenceFilter;
pub use threshold::{Direction, Metric, ThresholdFilter};
pub use valence::ValenceFilter;

use chem_core::errors::{CurationError, ErrorCode};
use chem_domain::{Molecule, Structure};

/// Estructura del registro o `StructureNull` recuperable.
pub(crate) fn structure_of(record: &Molecule) -> Result<&Structure, CurationError> {
    record.structure()
          .ok_or_else(|| CurationError::issue(ErrorCode::StructureNull, "record has no structure"))
}
