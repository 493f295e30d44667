//! Reporter diferido: acumula en memoria y renderiza una sola vez al
//! finalizar (markdown + export JSON reproducible).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::REPORT_FORMAT_VERSION;
use crate::errors::{CurationError, ErrorCode};
use crate::hashing::{hash_str, to_canonical_json};
use crate::report::reporter::{Lifecycle, Reporter, ReporterState};
use crate::report::ReportEntry;

/// Export JSON de una corrida finalizada. Permite reproducir o comparar el
/// reporte sin re-ejecutar el pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportExport {
    pub format_version: String,
    pub title: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finalized_at: DateTime<Utc>,
    pub ended_with_fatal: bool,
    pub fingerprint: String,
    pub entries: Vec<ReportEntry>,
}

impl ReportExport {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, CurationError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Resultado de la última finalización.
#[derive(Debug, Clone)]
pub struct FinalizedReport {
    pub export: ReportExport,
    pub markdown: String,
    pub markdown_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

/// Fingerprint de una lista de entradas ya ordenada: hash del JSON canónico.
/// Independiente del run id y de las marcas de tiempo.
pub fn fingerprint_entries(entries: &[ReportEntry]) -> Result<String, CurationError> {
    let value = serde_json::json!({
        "format_version": REPORT_FORMAT_VERSION,
        "entries": serde_json::to_value(entries)?,
    });
    Ok(hash_str(&to_canonical_json(&value)))
}

pub struct MarkdownReporter {
    title: String,
    output_dir: Option<PathBuf>,
    lifecycle: Lifecycle,
    entries: Vec<ReportEntry>,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    last_report: Option<FinalizedReport>,
}

impl MarkdownReporter {
    /// Reporter que sólo renderiza en memoria (`last_report`).
    pub fn in_memory(title: &str) -> Self {
        Self { title: title.to_string(),
               output_dir: None,
               lifecycle: Lifecycle::default(),
               entries: Vec::new(),
               run_id: Uuid::new_v4(),
               started_at: Utc::now(),
               last_report: None }
    }

    /// Reporter que además escribe `report_<ts>_<run>.md` y `.json` en `dir`.
    pub fn to_dir(title: &str, dir: impl Into<PathBuf>) -> Self {
        let mut r = Self::in_memory(title);
        r.output_dir = Some(dir.into());
        r
    }

    pub fn output_dir(&self) -> Option<&Path> { self.output_dir.as_deref() }

    pub fn last_report(&self) -> Option<&FinalizedReport> { self.last_report.as_ref() }

    fn render(&self, export: &ReportExport) -> String {
        let mut md = String::new();
        md.push_str(&format!("# Curation report: {}\n\n", export.title));
        md.push_str(&format!("- Run: `{}`\n", export.run_id));
        md.push_str(&format!("- Started: {}\n", export.started_at.to_rfc3339()));
        md.push_str(&format!("- Finalized: {}\n", export.finalized_at.to_rfc3339()));
        md.push_str(&format!("- Entries: {}\n", export.entries.len()));
        md.push_str(&format!("- Fingerprint: `{}`\n", export.fingerprint));
        if export.ended_with_fatal {
            md.push_str("- Status: **ended with fatal exception**\n\n");
        } else {
            md.push_str("- Status: completed\n\n");
        }

        let mut per_code: BTreeMap<ErrorCode, usize> = BTreeMap::new();
        for e in &export.entries {
            *per_code.entry(e.code()).or_default() += 1;
        }
        md.push_str("## Summary\n\n");
        if per_code.is_empty() {
            md.push_str("No issues were reported.\n");
            return md;
        }
        md.push_str("| Code | Count | Description |\n|---|---:|---|\n");
        for (code, count) in &per_code {
            md.push_str(&format!("| {} | {} | {} |\n", code, count, code.description()));
        }

        md.push_str("\n## Entries\n\n");
        md.push_str("| # | Position | Step | Code | Record ID | External ID | Detail |\n|---:|---|---|---|---|---|---|\n");
        for (i, e) in export.entries.iter().enumerate() {
            md.push_str(&format!("| {} | {} | {} | {} | {} | {} | {} |\n",
                                 i + 1,
                                 e.position().unwrap_or("-"),
                                 escape_cell(e.step()),
                                 e.code(),
                                 e.record_id().unwrap_or("-"),
                                 e.external_id().map(escape_cell).unwrap_or_else(|| "-".into()),
                                 e.detail().map(escape_cell).unwrap_or_else(|| "-".into())));
        }
        md
    }

    fn persist(&self, export: &ReportExport, markdown: &str) -> Result<(Option<PathBuf>, Option<PathBuf>), CurationError> {
        let Some(dir) = &self.output_dir else {
            return Ok((None, None));
        };
        fs::create_dir_all(dir)?;
        let stem = format!("report_{}_{}", export.started_at.format("%Y%m%dT%H%M%S"), export.run_id.simple());
        let md_path = dir.join(format!("{stem}.md"));
        let json_path = dir.join(format!("{stem}.json"));
        fs::write(&md_path, markdown)?;
        fs::write(&json_path, serde_json::to_string_pretty(export)?)?;
        Ok((Some(md_path), Some(json_path)))
    }

    fn build_report(&self, mut entries: Vec<ReportEntry>, fatal: bool) -> Result<FinalizedReport, CurationError> {
        entries.sort_by(|a, b| a.report_order(b));
        let fingerprint = fingerprint_entries(&entries)?;
        let export = ReportExport { format_version: REPORT_FORMAT_VERSION.to_string(),
                                    title: self.title.clone(),
                                    run_id: self.run_id,
                                    started_at: self.started_at,
                                    finalized_at: Utc::now(),
                                    ended_with_fatal: fatal,
                                    fingerprint,
                                    entries };
        let markdown = self.render(&export);
        let (markdown_path, json_path) = self.persist(&export, &markdown)?;
        Ok(FinalizedReport { export,
                             markdown,
                             markdown_path,
                             json_path })
    }
}

fn escape_cell(s: &str) -> String { s.replace('|', "\\|").replace('\n', " ") }

impl Reporter for MarkdownReporter {
    fn initialize(&mut self) -> Result<(), CurationError> {
        self.lifecycle.begin()?;
        self.entries.clear();
        self.run_id = Uuid::new_v4();
        self.started_at = Utc::now();
        Ok(())
    }

    fn append(&mut self, entry: ReportEntry) -> Result<(), CurationError> {
        self.lifecycle.ensure_collecting()?;
        self.entries.push(entry);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), CurationError> {
        let fatal = self.lifecycle.end()?;
        let entries = std::mem::take(&mut self.entries);
        let built = self.build_report(entries, fatal);
        match built {
            Ok(report) => {
                info!("report '{}' finalized: {} entries, fingerprint {}{}",
                      self.title,
                      report.export.entries.len(),
                      report.export.fingerprint,
                      report.markdown_path
                            .as_ref()
                            .map(|p| format!(", written to {}", p.display()))
                            .unwrap_or_default());
                self.last_report = Some(report);
            }
            Err(e) => return Err(e),
        }
        if fatal {
            return Err(CurationError::Reporter("run ended with a fatal exception".into()));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.lifecycle.reset();
    }

    fn state(&self) -> ReporterState { self.lifecycle.state() }

    fn ended_with_fatal(&self) -> bool { self.lifecycle.fatal() }

    fn set_ended_with_fatal(&mut self, fatal: bool) { self.lifecycle.set_fatal(fatal); }

    fn entries(&self) -> &[ReportEntry] { &self.entries }
}
