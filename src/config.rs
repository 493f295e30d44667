//! Configuración de la curación desde variables de entorno.
//!
//! El archivo `.env` se carga una sola vez (perezosamente). Los valores
//! presentes pero mal formados son errores; los ausentes toman su default.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use chem_core::constants::MAX_ATOMIC_NUMBER;
use chem_core::{CurationError, MarkdownReporter, ReferenceTable, TableLayout, ValenceModel};
use dotenvy::dotenv;
use log::debug;
use once_cell::sync::Lazy;
use thiserror::Error;

pub const REPORT_DIR: &str = "CHEM_REPORT_DIR";
pub const VALENCE_TABLE: &str = "CHEM_VALENCE_TABLE";
pub const EXTERNAL_ID_FIELD: &str = "CHEM_EXTERNAL_ID_FIELD";
pub const WILDCARD_VALID: &str = "CHEM_WILDCARD_VALID";
pub const PARALLEL_FILTERS: &str = "CHEM_PARALLEL_FILTERS";

const KEYS: [&str; 5] = [REPORT_DIR, VALENCE_TABLE, EXTERNAL_ID_FIELD, WILDCARD_VALID, PARALLEL_FILTERS];

const DEFAULT_REPORT_DIR: &str = "./reports";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be true or false, got '{value}'")]
    InvalidBool { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurationConfig {
    /// Directorio de los reportes markdown/json.
    pub report_dir: PathBuf,
    /// Tabla de valencias externa; `None` usa la tabla embebida.
    pub valence_table: Option<PathBuf>,
    /// Propiedad que guarda el ID externo de cada registro.
    pub external_id_field: Option<String>,
    pub wildcard_valid: bool,
    pub parallel_filters: bool,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self { report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
               valence_table: None,
               external_id_field: None,
               wildcard_valid: false,
               parallel_filters: false }
    }
}

impl CurationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Lazy::force(&DOTENV_LOADED);
        let vars: HashMap<String, String> = KEYS.iter()
                                                .filter_map(|k| env::var(k).ok().map(|v| (k.to_string(), v)))
                                                .collect();
        Self::from_map(&vars)
    }

    /// Igual que `from_env` pero sobre un mapa explícito. Los valores en
    /// blanco cuentan como ausentes.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let config = Self { report_dir: get(REPORT_DIR).map(PathBuf::from)
                                                       .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR)),
                            valence_table: get(VALENCE_TABLE).map(PathBuf::from),
                            external_id_field: get(EXTERNAL_ID_FIELD).map(str::to_string),
                            wildcard_valid: parse_bool(WILDCARD_VALID, get(WILDCARD_VALID))?,
                            parallel_filters: parse_bool(PARALLEL_FILTERS, get(PARALLEL_FILTERS))? };
        debug!("curation config: {config:?}");
        Ok(config)
    }

    pub fn load_table(&self) -> Result<ReferenceTable, CurationError> {
        match &self.valence_table {
            Some(path) => ReferenceTable::from_path(path, TableLayout::open(MAX_ATOMIC_NUMBER)),
            None => ReferenceTable::embedded_valence_list(),
        }
    }

    /// Construye la tabla una vez y la comparte con el modelo.
    pub fn valence_model(&self) -> Result<Arc<ValenceModel>, CurationError> {
        Ok(Arc::new(ValenceModel::new(Arc::new(self.load_table()?), self.wildcard_valid)))
    }

    pub fn reporter(&self, title: &str) -> MarkdownReporter { MarkdownReporter::to_dir(title, self.report_dir.clone()) }
}

fn parse_bool(key: &'static str, value: Option<&str>) -> Result<bool, ConfigError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ConfigError::InvalidBool { key,
                                                      value: other.to_string() }),
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() { Lazy::force(&DOTENV_LOADED); }
