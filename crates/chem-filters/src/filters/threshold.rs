//! Filtro de umbral parametrizado por métrica y dirección.
//!
//! `AtMost` y `AtLeast` comparten una única comparación contra el umbral; el
//! umbral es inclusivo en ambas direcciones.

use std::cmp::Ordering;
use std::fmt;

use chem_core::errors::{CurationError, ErrorCode};
use chem_core::Filter;
use chem_domain::{Molecule, Structure};
use serde::{Deserialize, Serialize};

use crate::filters::structure_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AtomCount {
        #[serde(default)]
        include_implicit_h: bool,
    },
    HeavyAtomCount,
    BondCount,
    ExactMass,
}

impl Metric {
    pub fn value(self, structure: &Structure) -> Result<f64, CurationError> {
        match self {
            Metric::AtomCount { include_implicit_h } => Ok(structure.atom_count(include_implicit_h) as f64),
            Metric::HeavyAtomCount => Ok(structure.heavy_atom_count() as f64),
            Metric::BondCount => Ok(structure.bond_count() as f64),
            Metric::ExactMass => match structure.exact_mass() {
                Some(mass) if mass.is_finite() => Ok(mass),
                Some(mass) => Err(CurationError::issue(ErrorCode::MassNull, format!("exact mass is not finite ({mass})"))),
                None => Err(CurationError::issue(ErrorCode::MassNull, "exact mass not set")),
            },
        }
    }

    /// Las métricas de conteo sólo admiten umbrales enteros.
    pub fn is_count(self) -> bool { !matches!(self, Metric::ExactMass) }

    fn label(self) -> &'static str {
        match self {
            Metric::AtomCount { include_implicit_h: true } => "atom_count_with_h",
            Metric::AtomCount { include_implicit_h: false } => "atom_count",
            Metric::HeavyAtomCount => "heavy_atom_count",
            Metric::BondCount => "bond_count",
            Metric::ExactMass => "exact_mass",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Excluye valores por encima del umbral (filtro "max").
    AtMost,
    /// Excluye valores por debajo del umbral (filtro "min").
    AtLeast,
}

impl Direction {
    /// Decide a partir del orden `valor` vs `umbral`. `Equal` nunca excluye.
    pub fn excludes(self, ordering: Ordering) -> bool {
        match (self, ordering) {
            (Direction::AtMost, Ordering::Greater) => true,
            (Direction::AtLeast, Ordering::Less) => true,
            _ => false,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::AtMost => Direction::AtLeast,
            Direction::AtLeast => Direction::AtMost,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdFilter {
    metric: Metric,
    direction: Direction,
    threshold: f64,
}

impl ThresholdFilter {
    /// Falla con `InvalidThreshold` si el umbral es negativo, no finito o, en
    /// métricas de conteo, fraccionario.
    pub fn new(metric: Metric, direction: Direction, threshold: f64) -> Result<Self, CurationError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(CurationError::issue(ErrorCode::InvalidThreshold,
                                            format!("{} threshold must be a finite non-negative number, got {threshold}",
                                                    metric.label())));
        }
        if metric.is_count() && threshold.fract() != 0.0 {
            return Err(CurationError::issue(ErrorCode::InvalidThreshold,
                                            format!("{} threshold must be a whole number, got {threshold}", metric.label())));
        }
        Ok(Self { metric,
                  direction,
                  threshold })
    }

    pub fn at_most(metric: Metric, threshold: f64) -> Result<Self, CurationError> { Self::new(metric, Direction::AtMost, threshold) }

    pub fn at_least(metric: Metric, threshold: f64) -> Result<Self, CurationError> { Self::new(metric, Direction::AtLeast, threshold) }

    pub fn metric(&self) -> Metric { self.metric }

    pub fn direction(&self) -> Direction { self.direction }

    pub fn threshold(&self) -> f64 { self.threshold }

    /// Mismo umbral y métrica, dirección contraria.
    pub fn mirrored(&self) -> Self {
        Self { direction: self.direction.opposite(),
               ..self.clone() }
    }
}

impl fmt::Display for ThresholdFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.direction {
            Direction::AtMost => "max",
            Direction::AtLeast => "min",
        };
        write!(f, "{prefix}_{}({})", self.metric.label(), self.threshold)
    }
}

impl Filter for ThresholdFilter {
    fn name(&self) -> String { self.to_string() }

    fn is_excluded(&self, record: &Molecule) -> Result<bool, CurationError> {
        let value = self.metric.value(structure_of(record)?)?;
        let ordering = value.partial_cmp(&self.threshold)
                            .ok_or_else(|| CurationError::Unexpected(format!("{value} is not comparable")))?;
        Ok(self.direction.excludes(ordering))
    }
}
