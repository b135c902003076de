//! # Stoichiometry Module
//!
//! Balancing of chemical reaction equations by exact linear algebra: an equation
//! string is tokenized into compound terms, every formula is parsed into element
//! counts (and, in charge-balance mode, a net ionic charge), the counts are
//! assembled into a rational conservation matrix and the one-dimensional null
//! space of that matrix yields the stoichiometric coefficients.
//!
//! ## Mathematical Model
//!
//! For an equation with compounds `c_1..c_n` the conservation system is
//!
//! ```text
//! M·x = 0,   M[e][j] = (atoms of element e in c_j) · s_j
//! ```
//!
//! where `s_j` is +1 for reactant-side compounds and -1 for product-side
//! compounds. A compound written on both sides occupies a single column whose
//! entries carry the net sign. A chemically well-posed equation gives `M` a one-dimensional
//! null space; its positive representative, scaled to smallest integers (or
//! renormalized so the first reactant is exactly 1), is the balanced set of
//! coefficients. When charge balance is requested one extra row holds the net
//! charges with the same sign convention.
//!
//! ### Nomenclature
//!
//! | Symbol | Description |
//! |--------|-------------|
//! | `M` | stoichiometric (conservation) matrix, rational entries |
//! | `x` | vector of stoichiometric coefficients, one per compound |
//! | `m` | number of element rows (+1 if the charge row is present) |
//! | `n` | number of distinct (formula, state) compounds |
//!
//! All arithmetic on the solving path is performed over arbitrary-precision
//! rationals; floating point appears only in the molar mass helper, which is
//! not part of the solving path.

/// Orchestrator and public API: settings, error taxonomy, result shapes,
/// the `balance` entry point and the step-by-step `EquationBalancer` pipeline.
pub mod equation_balancer;
/// Splits a raw equation string on its separator (`=`, `->`, `=>`) and each
/// side on `+` into compound tokens, with charge-aware splitting rules.
pub mod equation_parser;
/// Recursive-descent parser for one compound token: element counts, nested
/// groups, state symbol, optional ionic charge marker.
pub mod formula_parser;
/// Molar masses of parsed formulas from a built-in atomic weight table.
pub mod molmass;
/// Scales a raw null-space vector to smallest positive integers or pins the
/// first reactant to 1 in fractional mode.
pub mod normalizer;
/// Gauss-Jordan elimination over exact rationals, free-column analysis and
/// extraction of the spanning null-space vector.
pub mod rational_solver;
/// Builds the element-by-compound conservation matrix, reactants positive,
/// products negative, with the optional charge row.
pub mod stoich_matrix;

mod balancer_tests;
