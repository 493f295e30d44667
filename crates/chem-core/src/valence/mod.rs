//! Tabla de referencia de valencias y modelo de validación.
//!
//! La tabla se construye una vez (típicamente al inicio del proceso) y se
//! comparte como `Arc<ReferenceTable>` de sólo lectura entre todos los
//! validadores, incluso entre hilos.

pub mod model;
pub mod table;

pub use model::{AtomConfiguration, ValenceModel};
pub use table::{GroupSlot, ReferenceTable, TableEntry, TableLayout};
