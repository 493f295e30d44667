//! Tabla de referencia ordenada con índice directo por grupo.
//!
//! Cada fila es una configuración válida `(clave, carga, pi, sigma, max_h)`.
//! Las filas llegan ordenadas por clave, y el índice guarda para cada clave
//! posible en `[0, max_group_key]` el par `(offset, count)` de su bloque
//! contiguo. Las claves sin filas quedan con el centinela `(-1, 0)`, de modo
//! que la búsqueda es O(1) incluso para claves ausentes.
//!
//! La tabla es inmutable una vez construida: no hay API de mutación y las
//! consultas de fila devuelven copias.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use log::debug;
use serde::Deserialize;

use crate::constants::{ABSENT_OFFSET, EMBEDDED_VALENCE_ROWS, MAX_ATOMIC_NUMBER, TABLE_FIELD_COUNT};
use crate::errors::CurationError;

const EMBEDDED_VALENCE_LIST: &str = include_str!("../../data/valence_list.tsv");

/// Fila de la tabla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TableEntry {
    pub group_key: i32,
    pub charge: i32,
    pub pi_bonds: i32,
    pub sigma_bonds: i32,
    pub max_implicit_h: i32,
}

impl TableEntry {
    fn field(&self, index: usize) -> Option<i32> {
        match index {
            0 => Some(self.group_key),
            1 => Some(self.charge),
            2 => Some(self.pi_bonds),
            3 => Some(self.sigma_bonds),
            4 => Some(self.max_implicit_h),
            _ => None,
        }
    }
}

/// Puntero de grupo: offset de la primera fila y cantidad de filas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSlot {
    pub offset: i32,
    pub count: usize,
}

impl GroupSlot {
    pub const ABSENT: GroupSlot = GroupSlot { offset: ABSENT_OFFSET,
                                              count: 0 };

    pub fn is_absent(&self) -> bool { self.offset == ABSENT_OFFSET }
}

/// Forma declarada de la fuente: filas esperadas (si se conocen) y clave máxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub rows: Option<usize>,
    pub max_group_key: i32,
}

impl TableLayout {
    /// Layout de la tabla de valencias embebida.
    pub const EMBEDDED_VALENCE: TableLayout = TableLayout { rows: Some(EMBEDDED_VALENCE_ROWS),
                                                            max_group_key: MAX_ATOMIC_NUMBER };

    /// Layout para archivos externos cuyo número de filas no se declara.
    pub fn open(max_group_key: i32) -> Self { Self { rows: None, max_group_key } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: Vec<TableEntry>,
    index: Vec<GroupSlot>,
    lowest_key: Option<i32>,
    highest_key: Option<i32>,
}

impl ReferenceTable {
    /// Construye la tabla en una sola pasada. La primera línea es cabecera y se
    /// ignora; las líneas vacías se saltan.
    pub fn from_reader<R: Read>(reader: R, layout: TableLayout) -> Result<Self, CurationError> {
        if layout.max_group_key < 0 {
            return Err(CurationError::format(format!("negative maximum group key {}", layout.max_group_key)));
        }
        let max_key = layout.max_group_key;
        let mut rdr = csv::ReaderBuilder::new().delimiter(b'\t')
                                               .has_headers(true)
                                               .flexible(true)
                                               .trim(csv::Trim::All)
                                               .from_reader(reader);
        let headers = rdr.headers().map_err(|e| CurationError::format(format!("unreadable header: {e}")))?;
        if headers.is_empty() {
            return Err(CurationError::format("missing header line"));
        }

        let mut entries: Vec<TableEntry> = Vec::with_capacity(layout.rows.unwrap_or(0));
        let mut index: Vec<GroupSlot> = Vec::with_capacity(max_key as usize + 1);
        let mut current: Option<i32> = None;

        for result in rdr.records() {
            let record = result.map_err(|e| CurationError::format(e.to_string()))?;
            let line_no = record.position().map(|p| p.line()).unwrap_or_default();
            let row = entries.len();
            if let Some(expected) = layout.rows {
                if row >= expected {
                    return Err(CurationError::format(format!("more than {expected} declared rows")));
                }
            }
            let entry = parse_row(&record, line_no)?;
            let key = entry.group_key;
            if key < 0 || key > max_key {
                return Err(CurationError::format(format!("group key {key} outside [0, {max_key}] at line {}", line_no)));
            }
            match current {
                Some(prev) if key < prev => {
                    return Err(CurationError::format(format!("group key {key} after {prev} at line {}: keys must not decrease",
                                                             line_no)));
                }
                Some(prev) if key == prev => {}
                _ => {
                    // cerrar el grupo anterior y rellenar las claves saltadas
                    let first_missing = match current {
                        Some(prev) => {
                            close_group(&mut index, prev, row);
                            prev + 1
                        }
                        None => 0,
                    };
                    for _ in first_missing..key {
                        index.push(GroupSlot::ABSENT);
                    }
                    index.push(GroupSlot { offset: row as i32,
                                           count: 0 });
                    current = Some(key);
                }
            }
            entries.push(entry);
        }

        if let Some(expected) = layout.rows {
            if entries.len() != expected {
                return Err(CurationError::format(format!("declared {expected} rows but read {}", entries.len())));
            }
        }
        let first_missing = match current {
            Some(last) => {
                close_group(&mut index, last, entries.len());
                last + 1
            }
            None => 0,
        };
        for _ in first_missing..=max_key {
            index.push(GroupSlot::ABSENT);
        }

        let lowest_key = entries.first().map(|e| e.group_key);
        debug!("reference table built: {} rows, keys {:?}..={:?}", entries.len(), lowest_key, current);
        Ok(Self { entries,
                  index,
                  lowest_key,
                  highest_key: current })
    }

    pub fn from_path(path: impl AsRef<Path>, layout: TableLayout) -> Result<Self, CurationError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), layout)
    }

    /// Tabla de valencias embebida (subconjunto orgánico e iones comunes).
    pub fn embedded_valence_list() -> Result<Self, CurationError> {
        Self::from_reader(EMBEDDED_VALENCE_LIST.as_bytes(), TableLayout::EMBEDDED_VALENCE)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn lowest_key(&self) -> Option<i32> { self.lowest_key }

    pub fn highest_key(&self) -> Option<i32> { self.highest_key }

    pub fn entry_at(&self, row: usize, field: usize) -> Result<i32, CurationError> {
        let entry = self.entry(row)?;
        entry.field(field)
             .ok_or_else(|| CurationError::index(format!("field {field} outside [0, {TABLE_FIELD_COUNT})")))
    }

    /// Copia de la fila `row`.
    pub fn entry(&self, row: usize) -> Result<TableEntry, CurationError> {
        self.entries
            .get(row)
            .copied()
            .ok_or_else(|| CurationError::index(format!("row {row} outside [0, {})", self.entries.len())))
    }

    /// Slot del grupo; claves fuera de `[lowest, highest]` devuelven el
    /// centinela sin error.
    pub fn group(&self, key: i32) -> GroupSlot {
        match (self.lowest_key, self.highest_key) {
            (Some(low), Some(high)) if key >= low && key <= high => self.index[key as usize],
            _ => GroupSlot::ABSENT,
        }
    }

    pub fn group_pointer(&self, key: i32) -> i32 { self.group(key).offset }

    pub fn group_count(&self, key: i32) -> usize { self.group(key).count }

    /// Filas del grupo (vacío si la clave está ausente).
    pub fn group_entries(&self, key: i32) -> &[TableEntry] {
        let slot = self.group(key);
        if slot.is_absent() {
            return &[];
        }
        let start = slot.offset as usize;
        &self.entries[start..start + slot.count]
    }
}

fn close_group(index: &mut [GroupSlot], key: i32, next_row: usize) {
    let slot = &mut index[key as usize];
    slot.count = next_row - slot.offset as usize;
}

fn parse_row(record: &StringRecord, line_no: u64) -> Result<TableEntry, CurationError> {
    if record.len() != TABLE_FIELD_COUNT {
        return Err(CurationError::format(format!("line {line_no}: expected {TABLE_FIELD_COUNT} fields, found {}",
                                                 record.len())));
    }
    record.deserialize(None)
          .map_err(|e| CurationError::format(format!("line {line_no}: {e}")))
}
