//! Step compuesto: ejecuta sus hijos en orden pasando el lote de uno a otro.
//!
//! Al agregar un hijo el pipeline le transfiere su reporter y su campo de ID
//! externo, y le asigna la posición `"<posición del padre>.<i>"` (o `"<i>"`
//! si el pipeline es de nivel superior), con `i` 1-based. Cuando cambia la
//! posición del propio pipeline (porque se anida en otro) se recalculan las
//! posiciones de todos los descendientes.

use log::debug;

use crate::errors::CurationError;
use crate::report::SharedReporter;
use crate::step::definition::{Batch, ProcessingStep, StepCore};

pub struct Pipeline {
    core: StepCore,
    steps: Vec<Box<dyn ProcessingStep>>,
}

impl Pipeline {
    pub fn new(name: &str) -> Self {
        Self { core: StepCore::new(name),
               steps: Vec::new() }
    }

    pub fn with_reporter(name: &str, reporter: SharedReporter) -> Self {
        Self { core: StepCore::with_reporter(name, reporter),
               steps: Vec::new() }
    }

    pub fn add_step<S: ProcessingStep + 'static>(&mut self, step: S) -> &mut Self { self.add_boxed(Box::new(step)) }

    pub fn add_boxed(&mut self, mut step: Box<dyn ProcessingStep>) -> &mut Self {
        step.set_external_id_field(self.core.external_id_field().map(str::to_string));
        step.set_reporter(self.core.reporter());
        step.set_position(Some(self.child_position(self.steps.len() + 1)));
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Box<dyn ProcessingStep>] { &self.steps }

    pub fn len(&self) -> usize { self.steps.len() }

    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    fn child_position(&self, ordinal: usize) -> String {
        match self.core.position() {
            Some(parent) => format!("{parent}.{ordinal}"),
            None => ordinal.to_string(),
        }
    }

    fn renumber_children(&mut self) {
        for i in 0..self.steps.len() {
            let position = self.child_position(i + 1);
            self.steps[i].set_position(Some(position));
        }
    }
}

impl ProcessingStep for Pipeline {
    fn core(&self) -> &StepCore { &self.core }

    fn core_mut(&mut self) -> &mut StepCore { &mut self.core }

    fn children(&self) -> &[Box<dyn ProcessingStep>] { &self.steps }

    fn set_position(&mut self, position: Option<String>) {
        self.core.set_position(position);
        self.renumber_children();
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        for step in &mut self.steps {
            step.set_reporter(reporter.clone());
        }
        self.core.set_reporter(reporter);
    }

    fn set_external_id_field(&mut self, field: Option<String>) {
        for step in &mut self.steps {
            step.set_external_id_field(field.clone());
        }
        self.core.set_external_id_field(field);
    }

    /// Pliega el lote a través de los hijos; el primer fallo fatal corta la
    /// ejecución (ya quedó reportado por el hijo que lo produjo).
    fn run(&self, batch: Batch) -> Result<Batch, CurationError> {
        let mut batch = batch;
        for step in &self.steps {
            let before = batch.len();
            batch = step.run(batch)?;
            debug!("[{}] step '{}' @{}: {} -> {} records",
                   self.core.name(),
                   step.name(),
                   step.position().unwrap_or("-"),
                   before,
                   batch.len());
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::report::{shared, Reporter, ReporterState, TestReporter};
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::step::filter::{Filter, FilterStep};
    use chem_domain::Molecule;

    struct Never(&'static str);

    impl Filter for Never {
        fn name(&self) -> String { self.0.to_string() }

        fn is_excluded(&self, _record: &Molecule) -> Result<bool, CurationError> { Ok(false) }
    }

    struct Exploding;

    impl Filter for Exploding {
        fn name(&self) -> String { "exploding".into() }

        fn is_excluded(&self, _record: &Molecule) -> Result<bool, CurationError> { Err(CurationError::Unexpected("kaboom".into())) }
    }

    fn positions(p: &Pipeline) -> Vec<Option<String>> { p.steps().iter().map(|s| s.position().map(str::to_string)).collect() }

    #[test]
    fn children_get_positions_reporter_and_external_field() {
        let reporter = shared(TestReporter::new());
        let mut p = Pipeline::with_reporter("p", reporter.clone());
        p.set_external_id_field(Some("vendor".into()));
        p.add_step(FilterStep::new(Never("a"))).add_step(FilterStep::new(Never("b")));
        assert_eq!(positions(&p), vec![Some("1".into()), Some("2".into())]);
        for s in p.steps() {
            assert!(Rc::ptr_eq(&s.reporter(), &reporter));
            assert_eq!(s.external_id_field(), Some("vendor"));
        }
    }

    #[test]
    fn nesting_renumbers_descendants() {
        let mut inner = Pipeline::new("inner");
        let mut innermost = Pipeline::new("innermost");
        innermost.add_step(FilterStep::new(Never("x")));
        inner.add_step(FilterStep::new(Never("a"))).add_step(innermost);
        assert_eq!(positions(&inner), vec![Some("1".into()), Some("2".into())]);
        assert_eq!(inner.steps()[1].children()[0].position(), Some("2.1"));

        let mut outer = Pipeline::new("outer");
        outer.add_step(FilterStep::new(Never("first"))).add_step(inner);
        let nested = &outer.steps()[1];
        assert_eq!(nested.position(), Some("2"));
        assert_eq!(nested.children()[0].position(), Some("2.1"));
        assert_eq!(nested.children()[1].children()[0].position(), Some("2.2.1"));

        outer.set_position(Some("3".into()));
        let nested = &outer.steps()[1];
        assert_eq!(outer.steps()[0].position(), Some("3.1"));
        assert_eq!(nested.children()[1].position(), Some("3.2.2"));
        assert_eq!(nested.children()[1].children()[0].position(), Some("3.2.2.1"));

        outer.set_position(None);
        assert_eq!(outer.steps()[1].children()[1].children()[0].position(), Some("2.2.1"));
    }

    #[test]
    fn fatal_child_aborts_and_is_reported_once() {
        let reporter = Rc::new(RefCell::new(TestReporter::allowing([ErrorCode::UnexpectedException])));
        let mut p = Pipeline::with_reporter("p", reporter.clone());
        p.add_step(FilterStep::new(Never("a"))).add_step(FilterStep::new(Exploding)).add_step(FilterStep::new(Never("c")));
        let mut batch = vec![Molecule::default(), Molecule::default()];
        crate::step::prepare::assign_record_ids(&mut batch);
        let err = p.run_standalone(batch, false, false).unwrap_err();
        assert!(matches!(err, CurationError::Unexpected(_)));
        let r = reporter.borrow();
        assert_eq!(r.state(), ReporterState::Finalized);
        assert_eq!(r.seen_codes(), &[ErrorCode::UnexpectedException]);
    }

    #[test]
    fn nested_pipeline_does_not_finalize() {
        let reporter = Rc::new(RefCell::new(TestReporter::new()));
        let mut inner = Pipeline::new("inner");
        inner.add_step(FilterStep::new(Never("a")));
        let mut outer = Pipeline::with_reporter("outer", reporter.clone());
        outer.add_step(inner);
        reporter.borrow_mut().initialize().unwrap();
        let out = outer.steps()[0].run_standalone(vec![Molecule::default()], false, true).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(reporter.borrow().state(), ReporterState::Collecting);
    }
}
