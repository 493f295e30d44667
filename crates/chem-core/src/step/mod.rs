//! Definiciones relacionadas a Steps.
//!
//! Un step consume un lote de registros y produce otro, reportando cada
//! incidencia al reporter compartido. Este módulo define:
//! - `ProcessingStep` y `StepCore`: contrato común y campos compartidos.
//! - `Filter` / `FilterStep`: especialización por predicado de exclusión.
//! - `Pipeline`: step compuesto con posiciones jerárquicas.
//! - `assign_record_ids` / `clone_batch`: preparación del lote.

mod definition;
pub mod filter;
pub mod pipeline;
pub mod prepare;

pub use definition::{Batch, ProcessingStep, StepCore};
pub use filter::{Filter, FilterStep};
pub use pipeline::Pipeline;
pub use prepare::{assign_record_ids, clone_batch};
