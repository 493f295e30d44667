//! chem-curation
//!
//! Fachada de la curación de lotes de moléculas:
//! - Re-exporta `chem_domain`, `chem_core` y `chem_filters`.
//! - Expone `config` para leer la configuración del entorno (.env).
//! - Expone `curate` para ejecutar una descripción de pipeline sobre un lote
//!   y obtener el reporte finalizado.
//!
//! Puede usarse desde `chem-cli` o por otros crates/clientes.

pub mod config;
pub mod curate;

pub use chem_core;
pub use chem_domain;
pub use chem_filters;

pub use config::{ConfigError, CurationConfig};
pub use curate::{curate, load_batch, load_step_spec, CurationRun};
