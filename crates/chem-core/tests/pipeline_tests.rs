use std::cell::RefCell;
use std::rc::Rc;

use chem_core::{assign_record_ids, shared, CurationError, ErrorCode, Filter, FilterStep, MarkdownReporter, Molecule, Pipeline,
                ProcessingStep, Reporter, ReporterState, TestReporter};
use chem_domain::{Atom, Bond, BondOrder, Structure};

/// Excluye registros con más de `max` átomos.
struct MaxAtoms(usize);

impl Filter for MaxAtoms {
    fn name(&self) -> String { format!("max_atoms({})", self.0) }

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError> {
        let s = record.structure()
                      .ok_or_else(|| CurationError::issue(ErrorCode::StructureNull, "no structure"))?;
        Ok(s.atom_count(false) > self.0)
    }
}

/// Pasa todo salvo el registro `id`, que dispara un fallo fatal.
struct FailsOn(&'static str);

impl Filter for FailsOn {
    fn name(&self) -> String { "fails_on".into() }

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError> {
        if record.record_id() == Some(self.0) {
            return Err(CurationError::Unexpected(format!("record {} is poison", self.0)));
        }
        Ok(false)
    }
}

fn atoms(n: usize) -> Molecule { Molecule::new(Structure::new((0..n).map(|_| Atom::new("C", 6, 4)).collect(), vec![])) }

fn ids(batch: &[Molecule]) -> Vec<String> { batch.iter().filter_map(|m| m.record_id().map(str::to_string)).collect() }

#[test]
fn pipeline_folds_children_in_order() {
    let reporter = Rc::new(RefCell::new(TestReporter::allowing([ErrorCode::StructureNull])));
    let mut pipeline = Pipeline::with_reporter("curation", reporter.clone());
    pipeline.add_step(FilterStep::new(MaxAtoms(8))).add_step(FilterStep::new(MaxAtoms(5)));
    let batch = vec![atoms(3), atoms(9), Molecule::without_structure(), atoms(6), atoms(5)];
    let out = pipeline.run_standalone(batch, true, true).unwrap();
    assert_eq!(ids(&out), vec!["1", "5"]);
    let r = reporter.borrow();
    assert_eq!(r.allowed_count(), 1);
    assert_eq!(r.state(), ReporterState::Finalized);
}

#[test]
fn unassigned_batch_is_dropped_by_the_first_child() {
    let reporter = Rc::new(RefCell::new(TestReporter::allowing([ErrorCode::RecordIdMissing])));
    let mut pipeline = Pipeline::with_reporter("curation", reporter.clone());
    pipeline.add_step(FilterStep::new(MaxAtoms(8))).add_step(FilterStep::new(MaxAtoms(5)));
    let out = pipeline.run_standalone(vec![atoms(3), atoms(9), atoms(5)], false, false).unwrap();
    assert!(out.is_empty());
    let r = reporter.borrow();
    assert_eq!(r.allowed_count(), 3);
    assert_eq!(r.seen_codes(), &[ErrorCode::RecordIdMissing; 3]);
}

#[test]
fn moving_a_pipeline_under_another_prefixes_descendants() {
    let mut inner = Pipeline::new("inner");
    let mut deepest = Pipeline::new("deepest");
    deepest.add_step(FilterStep::new(MaxAtoms(1)));
    inner.add_step(FilterStep::new(MaxAtoms(2))).add_step(deepest);
    let before: Vec<Option<String>> = inner.steps().iter().map(|s| s.position().map(str::to_string)).collect();
    assert_eq!(before, vec![Some("1".to_string()), Some("2".to_string())]);

    let mut outer = Pipeline::new("outer");
    outer.add_step(FilterStep::new(MaxAtoms(3))).add_step(inner);

    fn collect(step: &dyn ProcessingStep, out: &mut Vec<String>) {
        for child in step.children() {
            out.push(child.position().unwrap_or("-").to_string());
            collect(child.as_ref(), out);
        }
    }
    let mut positions = Vec::new();
    collect(&outer, &mut positions);
    assert_eq!(positions, vec!["1", "2", "2.1", "2.2", "2.2.1"]);
}

#[test]
fn fatal_failure_aborts_batch_and_finalizes_report() {
    let reporter = Rc::new(RefCell::new(MarkdownReporter::in_memory("poison")));
    let mut pipeline = Pipeline::with_reporter("poison", reporter.clone());
    pipeline.add_step(FilterStep::new(MaxAtoms(4))).add_step(FilterStep::new(FailsOn("2")));
    let batch = vec![atoms(1), atoms(2), atoms(7)];
    let err = pipeline.run_standalone(batch, false, true).unwrap_err();
    assert!(!err.is_recoverable());

    let r = reporter.borrow();
    assert_eq!(r.state(), ReporterState::Finalized);
    assert!(r.entries().is_empty());
    let report = r.last_report().unwrap();
    assert!(report.export.ended_with_fatal);
    let codes: Vec<ErrorCode> = report.export.entries.iter().map(|e| e.code()).collect();
    assert_eq!(codes, vec![ErrorCode::UnexpectedException]);
    assert_eq!(report.export.entries[0].position(), Some("2"));
    assert_eq!(report.export.entries[0].record_id(), Some("2"));
}

#[test]
fn corrupt_records_are_dropped_at_clone_time() {
    let reporter = Rc::new(RefCell::new(TestReporter::allowing([ErrorCode::CloneFailed])));
    let step = FilterStep::with_reporter(MaxAtoms(10), reporter.clone());
    let corrupt = Molecule::new(Structure::new(vec![Atom::new("C", 6, 4)], vec![Bond::new(0, 3, BondOrder::Single)]));
    let out = step.run_standalone(vec![atoms(2), corrupt, atoms(3)], true, true).unwrap();
    assert_eq!(ids(&out), vec!["1", "3"]);
    assert_eq!(reporter.borrow().seen_codes(), &[ErrorCode::CloneFailed]);
}

#[test]
fn library_form_requires_an_open_reporter() {
    let reporter = shared(TestReporter::allowing([ErrorCode::StructureNull]));
    let step = FilterStep::with_reporter(MaxAtoms(1), reporter.clone());
    let mut batch = vec![Molecule::without_structure()];
    assign_record_ids(&mut batch);
    // sin initialize el append del reporte falla y el error no es recuperable
    let err = step.run(batch.clone()).unwrap_err();
    assert!(matches!(err, CurationError::Reporter(_)));

    reporter.borrow_mut().initialize().unwrap();
    assert!(step.run(batch).unwrap().is_empty());
    // la forma librería no finaliza
    assert_eq!(reporter.borrow().state(), ReporterState::Collecting);
}

#[test]
fn reporter_is_reusable_across_runs() {
    let reporter = Rc::new(RefCell::new(MarkdownReporter::in_memory("reuse")));
    let step = FilterStep::with_reporter(MaxAtoms(1), reporter.clone());
    step.run_standalone(vec![atoms(1), Molecule::without_structure()], false, true).unwrap();
    let first = reporter.borrow().last_report().unwrap().export.clone();
    step.run_standalone(vec![atoms(1), Molecule::without_structure()], false, true).unwrap();
    let second = reporter.borrow().last_report().unwrap().export.clone();
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(second.entries.len(), 1);
}
