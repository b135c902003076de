//! Atomic masses and molar-mass calculation for parsed formulas. The charge
//! marker of an ion is ignored here, electrons do not contribute to the mass.

use crate::Stoichiometry::equation_balancer::BalanceError;
use crate::Stoichiometry::formula_parser::{ParsedFormula, parse_formula_token};
use log::info;
use thiserror::Error;

// Element data for the mass table
pub struct Element {
    symbol: &'static str,
    atomic_mass: f64,
}

const ELEMENTS: &[Element] = &[
    Element {
        symbol: "H",
        atomic_mass: 1.008,
    },
    Element {
        symbol: "He",
        atomic_mass: 4.0026,
    },
    Element {
        symbol: "Li",
        atomic_mass: 6.94,
    },
    Element {
        symbol: "Be",
        atomic_mass: 9.0122,
    },
    Element {
        symbol: "B",
        atomic_mass: 10.81,
    },
    Element {
        symbol: "C",
        atomic_mass: 12.011,
    },
    Element {
        symbol: "N",
        atomic_mass: 14.007,
    },
    Element {
        symbol: "O",
        atomic_mass: 15.999,
    },
    Element {
        symbol: "F",
        atomic_mass: 18.998,
    },
    Element {
        symbol: "Ne",
        atomic_mass: 20.18,
    },
    Element {
        symbol: "Na",
        atomic_mass: 22.99,
    },
    Element {
        symbol: "Mg",
        atomic_mass: 24.305,
    },
    Element {
        symbol: "Al",
        atomic_mass: 26.98,
    },
    Element {
        symbol: "Si",
        atomic_mass: 28.085,
    },
    Element {
        symbol: "P",
        atomic_mass: 30.974,
    },
    Element {
        symbol: "S",
        atomic_mass: 32.065,
    },
    Element {
        symbol: "Cl",
        atomic_mass: 35.45,
    },
    Element {
        symbol: "Ar",
        atomic_mass: 39.948,
    },
    Element {
        symbol: "K",
        atomic_mass: 39.102,
    },
    Element {
        symbol: "Ca",
        atomic_mass: 40.08,
    },
    Element {
        symbol: "Sc",
        atomic_mass: 44.9559,
    },
    Element {
        symbol: "Ti",
        atomic_mass: 47.867,
    },
    Element {
        symbol: "V",
        atomic_mass: 50.9415,
    },
    Element {
        symbol: "Cr",
        atomic_mass: 51.9961,
    },
    Element {
        symbol: "Mn",
        atomic_mass: 54.938,
    },
    Element {
        symbol: "Fe",
        atomic_mass: 55.845,
    },
    Element {
        symbol: "Co",
        atomic_mass: 58.933,
    },
    Element {
        symbol: "Ni",
        atomic_mass: 58.69,
    },
    Element {
        symbol: "Cu",
        atomic_mass: 63.546,
    },
    Element {
        symbol: "Zn",
        atomic_mass: 65.38,
    },
    Element {
        symbol: "Ga",
        atomic_mass: 69.723,
    },
    Element {
        symbol: "Ge",
        atomic_mass: 72.64,
    },
    Element {
        symbol: "As",
        atomic_mass: 74.9216,
    },
    Element {
        symbol: "Se",
        atomic_mass: 78.96,
    },
    Element {
        symbol: "Br",
        atomic_mass: 79.904,
    },
    Element {
        symbol: "Kr",
        atomic_mass: 83.798,
    },
    Element {
        symbol: "Rb",
        atomic_mass: 85.4678,
    },
    Element {
        symbol: "Sr",
        atomic_mass: 87.62,
    },
    Element {
        symbol: "Y",
        atomic_mass: 88.9059,
    },
    Element {
        symbol: "Zr",
        atomic_mass: 91.224,
    },
    Element {
        symbol: "Nb",
        atomic_mass: 92.9064,
    },
    Element {
        symbol: "Mo",
        atomic_mass: 95.94,
    },
    Element {
        symbol: "Tc",
        atomic_mass: 98.0,
    },
    Element {
        symbol: "Ru",
        atomic_mass: 101.07,
    },
    Element {
        symbol: "Rh",
        atomic_mass: 102.9055,
    },
    Element {
        symbol: "Pd",
        atomic_mass: 106.42,
    },
    Element {
        symbol: "Ag",
        atomic_mass: 107.868,
    },
    Element {
        symbol: "Cd",
        atomic_mass: 112.411,
    },
    Element {
        symbol: "Sn",
        atomic_mass: 118.71,
    },
    Element {
        symbol: "Sb",
        atomic_mass: 121.76,
    },
    Element {
        symbol: "I",
        atomic_mass: 126.904,
    },
    Element {
        symbol: "Xe",
        atomic_mass: 131.293,
    },
    Element {
        symbol: "Cs",
        atomic_mass: 132.9055,
    },
    Element {
        symbol: "Ba",
        atomic_mass: 137.327,
    },
    Element {
        symbol: "W",
        atomic_mass: 183.84,
    },
    Element {
        symbol: "Pt",
        atomic_mass: 195.084,
    },
    Element {
        symbol: "Au",
        atomic_mass: 196.967,
    },
    Element {
        symbol: "Hg",
        atomic_mass: 200.59,
    },
    Element {
        symbol: "Pb",
        atomic_mass: 207.2,
    },
    Element {
        symbol: "U",
        atomic_mass: 238.029,
    },
    // Add more elements here...
];

#[derive(Debug, Error)]
pub enum MolMassError {
    #[error("unknown element '{symbol}' in formula '{formula}'")]
    UnknownElement { symbol: String, formula: String },
    #[error(transparent)]
    Parse(#[from] BalanceError),
}

pub fn atomic_mass_of(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|e| e.symbol == symbol)
        .map(|e| e.atomic_mass)
}

/// Sums the atomic masses over a parsed composition.
pub fn molar_mass_of(parsed: &ParsedFormula) -> Result<f64, MolMassError> {
    let mut molar_mass = 0.0;
    for (symbol, count) in &parsed.composition {
        match atomic_mass_of(symbol) {
            Some(mass) => molar_mass += mass * *count as f64,
            None => {
                return Err(MolMassError::UnknownElement {
                    symbol: symbol.clone(),
                    formula: parsed.formula.clone(),
                });
            }
        }
    }
    Ok(molar_mass)
}

/// Parses a single formula and returns its molar mass in g/mol together with
/// the element counts. State suffixes and charge markers are accepted.
pub fn calculate_molar_mass(formula: &str) -> Result<(f64, Vec<(String, i64)>), MolMassError> {
    let parsed = parse_formula_token(formula, true)?;
    let molar_mass = molar_mass_of(&parsed)?;
    Ok((molar_mass, parsed.composition))
}

pub fn calculate_molar_mass_of_vector_of_subs(
    vec_of_formulae: &[&str],
) -> Result<Vec<f64>, MolMassError> {
    info!("\n___________CALCULATE MOLAR MASS OF VECTOR OF SUBS___________");
    let mut molar_masses = Vec::new();
    for formula in vec_of_formulae {
        let (molar_mass, _) = calculate_molar_mass(formula)?;
        info!("M({}) = {:.3} g/mol", formula, molar_mass);
        molar_masses.push(molar_mass);
    }
    info!("___________CALCULATE MOLAR MASS OF VECTOR OF SUBS ENDED___________");
    Ok(molar_masses)
}
