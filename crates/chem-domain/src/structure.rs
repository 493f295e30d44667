// structure.rs
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Orden de enlace. El número de enlaces pi de un enlace es `orden - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
}

impl BondOrder {
    pub fn numeric(self) -> i32 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }

    pub fn pi_count(self) -> i32 { self.numeric() - 1 }
}

/// Átomo tal como lo entrega la librería externa. Los atributos son
/// opcionales: un lector puede dejar sin asignar número atómico, carga o
/// hidrógenos implícitos, y es el validador quien decide si eso es un error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    #[serde(default)]
    pub atomic_number: Option<i32>,
    #[serde(default)]
    pub formal_charge: Option<i32>,
    #[serde(default)]
    pub implicit_hydrogens: Option<i32>,
}

impl Atom {
    /// Átomo neutro con todos los atributos asignados.
    pub fn new(symbol: &str, atomic_number: i32, implicit_hydrogens: i32) -> Self {
        Self { symbol: symbol.to_string(),
               atomic_number: Some(atomic_number),
               formal_charge: Some(0),
               implicit_hydrogens: Some(implicit_hydrogens) }
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.formal_charge = Some(charge);
        self
    }

    /// Hidrógeno explícito (cuenta como átomo pero no como átomo pesado).
    pub fn is_hydrogen(&self) -> bool { self.atomic_number == Some(1) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(begin: usize, end: usize, order: BondOrder) -> Self { Self { begin, end, order } }

    pub fn involves(&self, atom: usize) -> bool { self.begin == atom || self.end == atom }
}

/// Grafo molecular mínimo: átomos, enlaces y una masa exacta opcional que
/// calcula la librería externa (aquí no existe un modelo de masas/isótopos).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Structure {
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub bonds: Vec<Bond>,
    #[serde(default)]
    pub exact_mass: Option<f64>,
}

impl Structure {
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self { Self { atoms, bonds, exact_mass: None } }

    pub fn with_exact_mass(mut self, mass: f64) -> Self {
        self.exact_mass = Some(mass);
        self
    }

    /// Número de átomos. Con `include_implicit_h` se suman los hidrógenos
    /// implícitos (un atributo ausente cuenta como 0 en este conteo).
    pub fn atom_count(&self, include_implicit_h: bool) -> usize {
        let explicit = self.atoms.len();
        if !include_implicit_h {
            return explicit;
        }
        self.atoms
            .iter()
            .filter_map(|a| a.implicit_hydrogens)
            .filter(|h| *h > 0)
            .map(|h| h as usize)
            .fold(explicit, usize::saturating_add)
    }

    pub fn heavy_atom_count(&self) -> usize { self.atoms.iter().filter(|a| !a.is_hydrogen()).count() }

    pub fn bond_count(&self) -> usize { self.bonds.len() }

    pub fn exact_mass(&self) -> Option<f64> { self.exact_mass }

    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index >= self.atoms.len() {
            return Err(DomainError::AtomIndexOutOfRange { index,
                                                          atom_count: self.atoms.len() });
        }
        Ok(())
    }

    /// Enlaces sigma del átomo: uno por cada enlace explícito que lo toca.
    pub fn sigma_bond_count(&self, index: usize) -> Result<i32, DomainError> {
        self.check_index(index)?;
        Ok(self.bonds.iter().filter(|b| b.involves(index)).count() as i32)
    }

    /// Enlaces pi del átomo: suma de `orden - 1` sobre sus enlaces.
    pub fn pi_bond_count(&self, index: usize) -> Result<i32, DomainError> {
        self.check_index(index)?;
        Ok(self.bonds.iter().filter(|b| b.involves(index)).map(|b| b.order.pi_count()).sum())
    }

    /// Verifica que cada enlace apunte a átomos existentes y distintos.
    pub fn check_integrity(&self) -> Result<(), DomainError> {
        for (i, bond) in self.bonds.iter().enumerate() {
            self.check_index(bond.begin)?;
            self.check_index(bond.end)?;
            if bond.begin == bond.end {
                return Err(DomainError::ValidationError(format!("bond {i} is a self loop on atom {}", bond.begin)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethene() -> Structure {
        Structure::new(vec![Atom::new("C", 6, 2), Atom::new("C", 6, 2)],
                       vec![Bond::new(0, 1, BondOrder::Double)])
    }

    #[test]
    fn counts_bonds_per_atom() {
        let s = ethene();
        assert_eq!(s.sigma_bond_count(0).unwrap(), 1);
        assert_eq!(s.pi_bond_count(0).unwrap(), 1);
        assert!(matches!(s.sigma_bond_count(5), Err(DomainError::AtomIndexOutOfRange { index: 5, atom_count: 2 })));
    }

    #[test]
    fn atom_count_with_and_without_implicit_h() {
        let s = ethene();
        assert_eq!(s.atom_count(false), 2);
        assert_eq!(s.atom_count(true), 6);
        assert_eq!(s.heavy_atom_count(), 2);
    }

    #[test]
    fn implicit_h_sum_does_not_overflow_i32() {
        let s = Structure::new(vec![Atom::new("C", 6, i32::MAX), Atom::new("C", 6, 1), Atom::new("O", 8, -2)], vec![]);
        assert_eq!(s.atom_count(true), 3 + i32::MAX as usize + 1);
    }

    #[test]
    fn integrity_rejects_dangling_bond() {
        let s = Structure::new(vec![Atom::new("C", 6, 4)], vec![Bond::new(0, 3, BondOrder::Single)]);
        assert!(s.check_integrity().is_err());
    }
}
