//! Corrida completa: lote y pipeline desde archivos JSON, reporte escrito en
//! disco y reproducible desde su export.

use std::collections::HashMap;
use std::fs;

use chem_curation::chem_core::report::{fingerprint_entries, ReportExport};
use chem_curation::chem_core::ErrorCode;
use chem_curation::config::{EXTERNAL_ID_FIELD, REPORT_DIR};
use chem_curation::{curate, load_batch, load_step_spec, CurationConfig};

const BATCH: &str = r#"[
  { "properties": { "vendor_id": "V-1", "name": "ethanol" },
    "structure": { "atoms": [ { "symbol": "C", "atomic_number": 6, "formal_charge": 0, "implicit_hydrogens": 3 },
                              { "symbol": "C", "atomic_number": 6, "formal_charge": 0, "implicit_hydrogens": 2 },
                              { "symbol": "O", "atomic_number": 8, "formal_charge": 0, "implicit_hydrogens": 1 } ],
                   "bonds": [ { "begin": 0, "end": 1, "order": "single" }, { "begin": 1, "end": 2, "order": "single" } ],
                   "exact_mass": 46.042 } },
  { "properties": { "name": "no vendor" },
    "structure": { "atoms": [ { "symbol": "C", "atomic_number": 6, "formal_charge": 0, "implicit_hydrogens": 4 } ],
                   "bonds": [], "exact_mass": 16.031 } },
  { "properties": { "vendor_id": "V-3" } },
  { "properties": { "vendor_id": "V-4" },
    "structure": { "atoms": [ { "symbol": "C", "atomic_number": 6, "formal_charge": 0, "implicit_hydrogens": 2 },
                              { "symbol": "O", "atomic_number": 8, "formal_charge": 0, "implicit_hydrogens": 0 } ],
                   "bonds": [ { "begin": 0, "end": 1, "order": "triple" } ],
                   "exact_mass": 28.0 } },
  { "properties": { "vendor_id": "V-5" },
    "structure": { "atoms": [ { "symbol": "C", "atomic_number": 6, "formal_charge": 0, "implicit_hydrogens": 4 } ],
                   "bonds": [] } }
]"#;

const PIPELINE: &str = r#"{
  "kind": "pipeline",
  "name": "small organics",
  "steps": [
    { "kind": "external_id_presence" },
    { "kind": "pipeline", "name": "chemistry", "steps": [
        { "kind": "atomic_number" },
        { "kind": "valence" }
    ] },
    { "kind": "threshold", "metric": "exact_mass", "direction": "at_most", "threshold": 500 }
  ]
}"#;

fn config(dir: &std::path::Path) -> CurationConfig {
    let vars: HashMap<String, String> = [(REPORT_DIR, dir.to_string_lossy().to_string()), (EXTERNAL_ID_FIELD, "vendor_id".to_string())]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    CurationConfig::from_map(&vars).unwrap()
}

#[test]
fn curates_batch_from_files_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let batch_path = dir.path().join("batch.json");
    let pipeline_path = dir.path().join("pipeline.json");
    fs::write(&batch_path, BATCH).unwrap();
    fs::write(&pipeline_path, PIPELINE).unwrap();

    let batch = load_batch(&batch_path).unwrap();
    let spec = load_step_spec(&pipeline_path).unwrap();
    let reports = dir.path().join("reports");
    let run = curate(batch, &spec, &config(&reports)).unwrap();

    assert!(run.succeeded());
    assert_eq!(run.kept.len(), 1);
    assert_eq!(run.kept[0].property("name"), Some("ethanol"));
    assert_eq!(run.dropped(), 4);

    let report = run.report.expect("report");
    let export = &report.export;
    let summary: Vec<(Option<&str>, ErrorCode, Option<&str>)> =
        export.entries.iter().map(|e| (e.position(), e.code(), e.record_id())).collect();
    assert_eq!(summary,
               vec![(Some("1"), ErrorCode::MissingRequiredField, Some("2")),
                    (Some("2.1"), ErrorCode::StructureNull, Some("3")),
                    (Some("2.2"), ErrorCode::InvalidValence, Some("4")),
                    (Some("3"), ErrorCode::MassNull, Some("5"))]);
    assert_eq!(export.entries[3].external_id(), Some("V-5"));

    let md_path = report.markdown_path.expect("markdown written");
    let markdown = fs::read_to_string(md_path).unwrap();
    assert!(markdown.contains("# Curation report: small organics"));
    assert!(markdown.contains("| INVALID_VALENCE | 1 |"));
}

#[test]
fn exported_report_replays_to_the_same_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let batch: Vec<_> = serde_json::from_str(BATCH).unwrap();
    let spec = chem_curation::chem_filters::StepSpec::from_json(PIPELINE).unwrap();

    let first = curate(batch.clone(), &spec, &config(dir.path())).unwrap().report.unwrap();
    let second = curate(batch, &spec, &config(dir.path())).unwrap().report.unwrap();
    assert_ne!(first.export.run_id, second.export.run_id);
    assert_eq!(first.export.fingerprint, second.export.fingerprint);

    let replayed = ReportExport::read(first.json_path.unwrap()).unwrap();
    assert_eq!(replayed, first.export);
    assert_eq!(fingerprint_entries(&replayed.entries).unwrap(), first.export.fingerprint);
}

#[test]
fn missing_external_id_field_fails_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let spec = chem_curation::chem_filters::StepSpec::from_json(PIPELINE).unwrap();
    let mut config = config(dir.path());
    config.external_id_field = None;
    let err = curate(Vec::new(), &spec, &config).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingRequiredField);
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
