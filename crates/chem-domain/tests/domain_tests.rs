use chem_domain::{Atom, Bond, BondOrder, DomainError, Molecule, Structure};

fn acetaldehyde() -> Structure {
    // CH3-CH=O
    Structure::new(vec![Atom::new("C", 6, 3), Atom::new("C", 6, 1), Atom::new("O", 8, 0)],
                   vec![Bond::new(0, 1, BondOrder::Single), Bond::new(1, 2, BondOrder::Double)]).with_exact_mass(44.026)
}

#[test]
fn test_record_id_is_settable_and_readable() {
    let mut mol = Molecule::new(acetaldehyde());
    assert_eq!(mol.record_id(), None);
    mol.set_record_id("7");
    assert_eq!(mol.record_id(), Some("7"));
}

#[test]
fn test_properties_keep_insertion_order() {
    let mol = Molecule::new(acetaldehyde()).with_property("b", "2").with_property("a", "1");
    let keys: Vec<&str> = mol.properties().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["b", "a"]);
    assert_eq!(mol.property("a"), Some("1"));
    assert_eq!(mol.property("missing"), None);
}

#[test]
fn test_try_clone_copies_everything() {
    let mut mol = Molecule::new(acetaldehyde()).with_property("ext", "X-1");
    mol.set_record_id("1");
    let copy = mol.try_clone().unwrap();
    assert_eq!(copy, mol);
}

#[test]
fn test_try_clone_fails_on_corrupt_structure() {
    let broken = Structure::new(vec![Atom::new("C", 6, 4)], vec![Bond::new(0, 9, BondOrder::Single)]);
    let mol = Molecule::new(broken);
    assert!(matches!(mol.try_clone(), Err(DomainError::AtomIndexOutOfRange { index: 9, .. })));
}

#[test]
fn test_record_without_structure_clones() {
    let mol = Molecule::without_structure().with_property("ext", "bad-entry");
    assert!(mol.structure().is_none());
    assert!(mol.try_clone().is_ok());
}

#[test]
fn test_molecule_deserializes_with_optional_attributes() {
    let json = r#"{
        "properties": {"vendor_id": "V-9"},
        "structure": {
            "atoms": [{"symbol": "C", "atomic_number": 6, "formal_charge": 0, "implicit_hydrogens": 4}, {"symbol": "*"}],
            "bonds": [{"begin": 0, "end": 1, "order": "single"}]
        }
    }"#;
    let mol: Molecule = serde_json::from_str(json).unwrap();
    let s = mol.structure().unwrap();
    assert_eq!(s.atoms[1].atomic_number, None);
    assert_eq!(s.bonds[0].order, BondOrder::Single);
    assert_eq!(s.exact_mass(), None);
    assert_eq!(mol.property("vendor_id"), Some("V-9"));
}
