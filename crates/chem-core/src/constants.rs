//! Constantes del core de curación.
//!
//! Agrupa los valores que fijan el formato de la tabla de valencias y el
//! rango de claves de grupo (número atómico) que el índice directo cubre.

/// Mayor número atómico soportado por la tabla de valencias.
pub const MAX_ATOMIC_NUMBER: i32 = 118;

/// Clave de grupo comodín (pseudo-átomos, grupos R). Sólo se considera válida
/// cuando el modelo de validación se construye con `wildcard_valid = true`.
pub const WILDCARD_GROUP_KEY: i32 = 0;

/// Offset centinela de un grupo sin entradas en la tabla.
pub const ABSENT_OFFSET: i32 = -1;

/// Campos enteros por fila: clave, carga, enlaces pi, enlaces sigma, máximo de
/// hidrógenos implícitos.
pub const TABLE_FIELD_COUNT: usize = 5;

/// Filas de datos de la tabla de valencias embebida (`data/valence_list.tsv`).
pub const EMBEDDED_VALENCE_ROWS: usize = 186;

/// Versión lógica del formato de reporte. Entra en el fingerprint del reporte
/// para que un cambio de formato invalide comparaciones entre corridas.
pub const REPORT_FORMAT_VERSION: &str = "R1.0";
