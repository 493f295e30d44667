//! chem-filters: filtros concretos sobre registros de moléculas y el
//! mecanismo declarativo (`StepSpec`) para armar pipelines desde JSON.
//!
//! Este crate provee:
//! - `ThresholdFilter`: conteos y masa con dirección `AtMost`/`AtLeast`.
//! - `PropertyPresenceFilter`: propiedad requerida o ID externo.
//! - `AtomicNumberFilter` y `ValenceFilter`: validez química por átomo.
//! - `StepSpec` + `build_step`: única vía de configuración de pipelines.

pub mod filters;
pub mod spec;

pub use filters::{AtomicNumberFilter, Direction, Metric, PropertyPresenceFilter, ThresholdFilter, ValenceFilter};
pub use spec::{build_step, BuildContext, StepSpec};
