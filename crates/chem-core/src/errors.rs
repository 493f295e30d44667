//! Taxonomía de incidencias y error del core.
//!
//! `ErrorCode` es el conjunto cerrado de motivos que puede contener un
//! reporte. `CurationError` es la unión etiquetada que recorre los steps: la
//! clasificación de un fallo es un `match`, nunca un parseo de mensajes.

use chem_domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StructureNull,
    RecordIdMissing,
    AtomicNumberNull,
    FormalChargeNull,
    ImplicitHydrogenCountNull,
    MassNull,
    InvalidThreshold,
    InvalidAtomicNumber,
    InvalidValence,
    MissingRequiredField,
    CloneFailed,
    FormatError,
    IndexError,
    UnexpectedException,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 14] = [ErrorCode::StructureNull,
                                      ErrorCode::RecordIdMissing,
                                      ErrorCode::AtomicNumberNull,
                                      ErrorCode::FormalChargeNull,
                                      ErrorCode::ImplicitHydrogenCountNull,
                                      ErrorCode::MassNull,
                                      ErrorCode::InvalidThreshold,
                                      ErrorCode::InvalidAtomicNumber,
                                      ErrorCode::InvalidValence,
                                      ErrorCode::MissingRequiredField,
                                      ErrorCode::CloneFailed,
                                      ErrorCode::FormatError,
                                      ErrorCode::IndexError,
                                      ErrorCode::UnexpectedException];

    /// Códigos que pueden reportarse sin un registro asociado (fallos no
    /// atribuibles a una estructura concreta).
    pub fn is_structure_optional(self) -> bool {
        matches!(self,
                 ErrorCode::RecordIdMissing | ErrorCode::FormatError | ErrorCode::IndexError | ErrorCode::UnexpectedException)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::StructureNull => "STRUCTURE_NULL",
            ErrorCode::RecordIdMissing => "RECORD_ID_MISSING",
            ErrorCode::AtomicNumberNull => "ATOMIC_NUMBER_NULL",
            ErrorCode::FormalChargeNull => "FORMAL_CHARGE_NULL",
            ErrorCode::ImplicitHydrogenCountNull => "IMPLICIT_HYDROGEN_COUNT_NULL",
            ErrorCode::MassNull => "MASS_NULL",
            ErrorCode::InvalidThreshold => "INVALID_THRESHOLD",
            ErrorCode::InvalidAtomicNumber => "INVALID_ATOMIC_NUMBER",
            ErrorCode::InvalidValence => "INVALID_VALENCE",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::CloneFailed => "CLONE_FAILED",
            ErrorCode::FormatError => "FORMAT_ERROR",
            ErrorCode::IndexError => "INDEX_ERROR",
            ErrorCode::UnexpectedException => "UNEXPECTED_EXCEPTION",
        }
    }

    /// Descripción legible usada en los reportes.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::StructureNull => "The record carries no structure",
            ErrorCode::RecordIdMissing => "The record has no process-assigned identifier",
            ErrorCode::AtomicNumberNull => "An atom has no atomic number",
            ErrorCode::FormalChargeNull => "An atom has no formal charge",
            ErrorCode::ImplicitHydrogenCountNull => "An atom has no implicit hydrogen count",
            ErrorCode::MassNull => "The structure has no exact mass",
            ErrorCode::InvalidThreshold => "A filter threshold is invalid",
            ErrorCode::InvalidAtomicNumber => "The structure contains an invalid atomic number",
            ErrorCode::InvalidValence => "The structure contains an atom with an invalid valence",
            ErrorCode::MissingRequiredField => "A required field is missing or blank",
            ErrorCode::CloneFailed => "The record could not be cloned",
            ErrorCode::FormatError => "The reference table source is malformed",
            ErrorCode::IndexError => "A reference table index is out of range",
            ErrorCode::UnexpectedException => "Unexpected failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Error)]
pub enum CurationError {
    /// Fallo clasificable de un registro: se reporta, se descarta el registro
    /// y el lote continúa.
    #[error("{code}: {detail}")]
    Issue { code: ErrorCode, detail: String },
    /// Fallo de construcción o consulta de la tabla de referencia.
    #[error("{code}: {detail}")]
    Table { code: ErrorCode, detail: String },
    #[error("reporter: {0}")]
    Reporter(String),
    #[error("invalid report entry: {0}")]
    InvalidEntry(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl CurationError {
    pub fn issue(code: ErrorCode, detail: impl Into<String>) -> Self { CurationError::Issue { code, detail: detail.into() } }

    pub fn format(detail: impl Into<String>) -> Self {
        CurationError::Table { code: ErrorCode::FormatError,
                               detail: detail.into() }
    }

    pub fn index(detail: impl Into<String>) -> Self {
        CurationError::Table { code: ErrorCode::IndexError,
                               detail: detail.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CurationError::Issue { code, .. } | CurationError::Table { code, .. } => *code,
            _ => ErrorCode::UnexpectedException,
        }
    }

    /// Sólo las incidencias por registro son recuperables; todo lo demás
    /// aborta el lote.
    pub fn is_recoverable(&self) -> bool { matches!(self, CurationError::Issue { .. }) }
}

impl From<DomainError> for CurationError {
    fn from(e: DomainError) -> Self { CurationError::Unexpected(e.to_string()) }
}
