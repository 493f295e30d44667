use std::fs;
use std::path::PathBuf;
use std::process::exit;

use chem_curation::config::init_dotenv;
use chem_curation::{curate, load_batch, load_step_spec, CurationConfig};

const USAGE: &str =
    "Uso: chem-curate run --input <batch.json> --pipeline <pipeline.json> [--table <valence.tsv>] [--report-dir <dir>] [--output <kept.json>]";

#[derive(Debug, Default)]
struct RunArgs {
    input: Option<PathBuf>,
    pipeline: Option<PathBuf>,
    table: Option<PathBuf>,
    report_dir: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut parsed = RunArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = args.get(i).map(PathBuf::from).ok_or_else(|| format!("falta el valor de {flag}"))?;
        match flag {
            "--input" => parsed.input = Some(value),
            "--pipeline" => parsed.pipeline = Some(value),
            "--table" => parsed.table = Some(value),
            "--report-dir" => parsed.report_dir = Some(value),
            "--output" => parsed.output = Some(value),
            other => return Err(format!("opción desconocida: {other}")),
        }
        i += 1;
    }
    Ok(parsed)
}

fn main() {
    // Cargar .env si existe para obtener CHEM_*
    init_dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] != "run" {
        eprintln!("{USAGE}");
        exit(2);
    }
    let run = match parse_run_args(&args[2..]) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("[chem-curate] {e}");
            eprintln!("{USAGE}");
            exit(2);
        }
    };
    let (Some(input), Some(pipeline)) = (run.input.clone(), run.pipeline.clone()) else {
        eprintln!("{USAGE}");
        exit(2);
    };

    let mut config = match CurationConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[chem-curate] configuración inválida: {e}");
            exit(2);
        }
    };
    if let Some(table) = run.table {
        config.valence_table = Some(table);
    }
    if let Some(dir) = run.report_dir {
        config.report_dir = dir;
    }

    let batch = match load_batch(&input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("[chem-curate] no se pudo leer el lote {}: {e}", input.display());
            exit(1);
        }
    };
    let spec = match load_step_spec(&pipeline) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[chem-curate] no se pudo leer el pipeline {}: {e}", pipeline.display());
            exit(1);
        }
    };

    let outcome = match curate(batch, &spec, &config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("[chem-curate] error de preparación: {e}");
            exit(1);
        }
    };

    if let Some(report) = &outcome.report {
        match &report.markdown_path {
            Some(p) => println!("reporte: {} (fingerprint {})", p.display(), report.export.fingerprint),
            None => println!("reporte en memoria (fingerprint {})", report.export.fingerprint),
        }
    }
    if let Some(e) = &outcome.failure {
        eprintln!("[chem-curate] corrida abortada: {e}");
        exit(3);
    }
    println!("registros: {} conservados, {} descartados (de {})",
             outcome.kept.len(),
             outcome.dropped(),
             outcome.input_count);

    if let Some(path) = run.output {
        let written = serde_json::to_string_pretty(&outcome.kept).map_err(|e| e.to_string())
                                                                 .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("[chem-curate] no se pudo escribir {}: {e}", path.display());
            exit(1);
        }
        println!("lote curado: {}", path.display());
    }
}
