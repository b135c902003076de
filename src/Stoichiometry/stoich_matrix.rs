//! # Stoichiometric Matrix Module
//!
//! Assembles the conservation matrix `M` of an equation: one row per element
//! in first-appearance order (scanning reactants, then products), one column
//! per distinct (formula, state) compound in term order, entry = atom count
//! times the side sign (+1 reactant, -1 product). With charge balancing on,
//! one extra row carries the net charges under the same convention. A valid
//! coefficient vector `x` satisfies `M·x = 0`.
//!
//! A compound mentioned on both sides keeps a single column whose entries
//! cancel to zero; the solver then reports it as unbalanceable unless the
//! whole equation is the degenerate identity case.

use crate::Stoichiometry::equation_balancer::Compound;
use crate::Stoichiometry::formula_parser::ParsedFormula;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use prettytable::{Cell, Row, Table};

/// Conservation matrix with its row and column labeling.
#[derive(Debug, Clone, PartialEq)]
pub struct StoichMatrix {
    /// Element symbols, one matrix row each, in first-appearance order.
    pub elements: Vec<String>,
    /// Distinct compounds, one matrix column each, in term order (left side
    /// first).
    pub compounds: Vec<Compound>,
    /// Rational entries, `rows[element or charge][compound]`.
    pub rows: Vec<Vec<BigRational>>,
    /// Whether the last row is the charge row.
    pub has_charge_row: bool,
}

impl StoichMatrix {
    /// Builds the matrix from the parsed sides. Per-side duplicates are
    /// expected to be collapsed already; a compound present on both sides
    /// contributes net sign 0.
    pub fn assemble(
        left: &[ParsedFormula],
        right: &[ParsedFormula],
        charge_mode: bool,
    ) -> StoichMatrix {
        struct Slot<'a> {
            compound: Compound,
            parsed: &'a ParsedFormula,
            on_left: bool,
            on_right: bool,
        }

        let mut slots: Vec<Slot> = Vec::new();
        let terms = left
            .iter()
            .map(|p| (p, true))
            .chain(right.iter().map(|p| (p, false)));
        for (parsed, is_left) in terms {
            let compound = parsed.compound();
            if let Some(slot) = slots.iter_mut().find(|s| s.compound == compound) {
                if is_left {
                    slot.on_left = true;
                } else {
                    slot.on_right = true;
                }
            } else {
                slots.push(Slot {
                    compound,
                    parsed,
                    on_left: is_left,
                    on_right: !is_left,
                });
            }
        }

        let mut elements: Vec<String> = Vec::new();
        for slot in &slots {
            for (symbol, _) in &slot.parsed.composition {
                if !elements.iter().any(|e| e == symbol) {
                    elements.push(symbol.clone());
                }
            }
        }

        let sign = |slot: &Slot| (slot.on_left as i64) - (slot.on_right as i64);
        let mut rows: Vec<Vec<BigRational>> = Vec::new();
        for symbol in &elements {
            rows.push(
                slots
                    .iter()
                    .map(|slot| {
                        BigRational::from_integer(BigInt::from(
                            slot.parsed.count_of(symbol) * sign(slot),
                        ))
                    })
                    .collect(),
            );
        }
        if charge_mode {
            rows.push(
                slots
                    .iter()
                    .map(|slot| BigRational::from_integer(BigInt::from(slot.parsed.charge * sign(slot))))
                    .collect(),
            );
        }

        StoichMatrix {
            elements,
            compounds: slots.into_iter().map(|s| s.compound).collect(),
            rows,
            has_charge_row: charge_mode,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.compounds.len()
    }

    /// Label of row `i`: the element symbol, or `"charge"` for the last row
    /// in charge mode.
    pub fn row_label(&self, i: usize) -> &str {
        if i < self.elements.len() {
            &self.elements[i]
        } else {
            "charge"
        }
    }

    /// `M·x` for the given coefficient vector; every entry of the result is
    /// zero exactly when conservation holds.
    pub fn residual(&self, coefficients: &[BigRational]) -> Vec<BigRational> {
        self.rows
            .iter()
            .map(|row| {
                let mut sum = BigRational::zero();
                for (entry, coefficient) in row.iter().zip(coefficients) {
                    sum += entry * coefficient;
                }
                sum
            })
            .collect()
    }

    /// Renders the labeled matrix as a text table.
    pub fn to_table_string(&self) -> String {
        let mut table = Table::new();
        let mut header = vec![Cell::new("")];
        for compound in &self.compounds {
            header.push(Cell::new(&compound.to_string()));
        }
        table.add_row(Row::new(header));
        for (i, row) in self.rows.iter().enumerate() {
            let mut cells = vec![Cell::new(self.row_label(i))];
            for entry in row {
                cells.push(Cell::new(&entry.to_string()));
            }
            table.add_row(Row::new(cells));
        }
        table.to_string()
    }

    /// Prints the labeled matrix to stdout.
    pub fn pretty_print_matrix(&self) {
        print!("{}", self.to_table_string());
    }
}
