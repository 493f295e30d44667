//! Descripción declarativa de steps (JSON) y su construcción.
//!
//! Un `StepSpec` es un árbol: las hojas son filtros y los nodos `pipeline`
//! agrupan hijos. `build_step` es la única vía para convertir la descripción
//! en steps ejecutables; el reporter, el campo de ID externo, el modelo de
//! valencias y el modo paralelo vienen del `BuildContext`.

use std::sync::Arc;

use chem_core::errors::{CurationError, ErrorCode};
use chem_core::{Filter, FilterStep, Pipeline, ProcessingStep, SharedReporter, ValenceModel};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::filters::{AtomicNumberFilter, Direction, Metric, PropertyPresenceFilter, ThresholdFilter, ValenceFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    Threshold {
        metric: Metric,
        direction: Direction,
        threshold: f64,
    },
    PropertyPresence {
        field: String,
    },
    ExternalIdPresence,
    AtomicNumber {
        #[serde(default)]
        allow_wildcard: bool,
    },
    Valence,
    Pipeline {
        #[serde(default = "default_pipeline_name")]
        name: String,
        steps: Vec<StepSpec>,
    },
}

fn default_pipeline_name() -> String { "pipeline".to_string() }

impl StepSpec {
    pub fn from_json(raw: &str) -> Result<Self, CurationError> { Ok(serde_json::from_str(raw)?) }
}

/// Dependencias compartidas por todos los steps construidos.
pub struct BuildContext {
    pub reporter: SharedReporter,
    pub model: Arc<ValenceModel>,
    pub external_id_field: Option<String>,
    pub parallel: bool,
}

impl BuildContext {
    pub fn new(reporter: SharedReporter, model: Arc<ValenceModel>) -> Self {
        Self { reporter,
               model,
               external_id_field: None,
               parallel: false }
    }

    pub fn with_external_id_field(mut self, field: Option<String>) -> Self {
        self.external_id_field = field;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn filter_step<F: Filter + 'static>(&self, filter: F) -> Box<dyn ProcessingStep> {
        let mut step = FilterStep::with_reporter(filter, self.reporter.clone()).parallel(self.parallel);
        step.set_external_id_field(self.external_id_field.clone());
        Box::new(step)
    }
}

pub fn build_step(spec: &StepSpec, ctx: &BuildContext) -> Result<Box<dyn ProcessingStep>, CurationError> {
    let step = match spec {
        StepSpec::Threshold { metric, direction, threshold } => {
            ctx.filter_step(ThresholdFilter::new(*metric, *direction, *threshold)?)
        }
        StepSpec::PropertyPresence { field } => {
            if field.trim().is_empty() {
                return Err(CurationError::issue(ErrorCode::MissingRequiredField, "property_presence needs a field name"));
            }
            ctx.filter_step(PropertyPresenceFilter::new(field))
        }
        StepSpec::ExternalIdPresence => {
            if ctx.external_id_field.is_none() {
                return Err(CurationError::issue(ErrorCode::MissingRequiredField,
                                                "external_id_presence requires an external id field"));
            }
            ctx.filter_step(PropertyPresenceFilter::external_id())
        }
        StepSpec::AtomicNumber { allow_wildcard } => ctx.filter_step(AtomicNumberFilter::new(*allow_wildcard)),
        StepSpec::Valence => ctx.filter_step(ValenceFilter::new(ctx.model.clone())),
        StepSpec::Pipeline { name, steps } => {
            let mut pipeline = Pipeline::with_reporter(name, ctx.reporter.clone());
            pipeline.set_external_id_field(ctx.external_id_field.clone());
            for child in steps {
                pipeline.add_boxed(build_step(child, ctx)?);
            }
            Box::new(pipeline)
        }
    };
    debug!("built step '{}'", step.name());
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chem_core::{shared, ReferenceTable, TestReporter};

    fn ctx() -> BuildContext {
        let table = ReferenceTable::embedded_valence_list().unwrap();
        BuildContext::new(shared(TestReporter::new()), Arc::new(ValenceModel::new(Arc::new(table), false)))
    }

    const PIPELINE: &str = r#"{
        "kind": "pipeline",
        "name": "lead_like",
        "steps": [
            { "kind": "atomic_number" },
            { "kind": "threshold", "metric": "heavy_atom_count", "direction": "at_most", "threshold": 30 },
            { "kind": "pipeline", "steps": [
                { "kind": "threshold", "metric": { "atom_count": { "include_implicit_h": true } },
                  "direction": "at_least", "threshold": 2 },
                { "kind": "valence" }
            ] }
        ]
    }"#;

    #[test]
    fn parses_and_builds_nested_tree() {
        let spec = StepSpec::from_json(PIPELINE).unwrap();
        let step = build_step(&spec, &ctx()).unwrap();
        assert_eq!(step.name(), "lead_like");
        assert_eq!(step.position(), None);
        let children = step.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[1].name(), "max_heavy_atom_count(30)");
        assert_eq!(children[2].name(), "pipeline");
        let grandchildren = children[2].children();
        assert_eq!(grandchildren[0].name(), "min_atom_count_with_h(2)");
        assert_eq!(grandchildren[1].position(), Some("3.2"));
    }

    #[test]
    fn invalid_threshold_fails_the_build() {
        let spec = StepSpec::Threshold { metric: Metric::BondCount,
                                         direction: Direction::AtMost,
                                         threshold: -2.0 };
        let err = build_step(&spec, &ctx()).err().unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidThreshold);
    }

    #[test]
    fn external_id_presence_needs_a_field() {
        assert!(build_step(&StepSpec::ExternalIdPresence, &ctx()).is_err());
        let ctx = ctx().with_external_id_field(Some("vendor_id".into()));
        let step = build_step(&StepSpec::ExternalIdPresence, &ctx).unwrap();
        assert_eq!(step.external_id_field(), Some("vendor_id"));
    }

    #[test]
    fn unknown_kind_is_a_json_error() {
        let err = StepSpec::from_json(r#"{ "kind": "smarts_match" }"#).unwrap_err();
        assert!(matches!(err, CurationError::Json(_)));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = StepSpec::from_json(PIPELINE).unwrap();
        let again = StepSpec::from_json(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(spec, again);
    }
}
