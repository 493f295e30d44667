// chem-domain library entry point
//
// Frontera con la representación externa de estructuras: el core de curación
// sólo necesita un slot de identidad (Record ID), lectura de atributos
// (conteos, masa, configuración atómica) y una copia profunda que puede fallar.
pub mod error;
pub mod molecule;
pub mod structure;
pub use error::DomainError;
pub use molecule::Molecule;
pub use structure::{Atom, Bond, BondOrder, Structure};
