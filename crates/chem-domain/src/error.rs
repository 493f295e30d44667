use thiserror::Error;

/// Errores de la capa de dominio (representación de registros).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    ValidationError(String),
    #[error("atom index {index} out of range (atom count {atom_count})")]
    AtomIndexOutOfRange { index: usize, atom_count: usize },
}
