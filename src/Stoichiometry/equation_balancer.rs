//! # Equation Balancer Module
//!
//! ## Purpose
//! Public API of the balancing engine. A raw equation string such as
//! `"Fe + O2 = Fe2O3"` is turned into a [`BalancedEquation`] carrying the
//! stoichiometric coefficient of every compound, or into a typed
//! [`BalanceError`] when the input is malformed, unbalanceable or ambiguous.
//!
//! ## Key Components
//! - **`balance`**: one-shot entry point, equation string + settings in,
//!   balanced result out
//! - **`EquationBalancer`**: step-by-step pipeline (parse, construct matrix,
//!   solve, normalize) with every intermediate kept in a public field
//! - **`BalancerSettings`** / **`BalanceRequest`**: per-call configuration and
//!   the JSON request shape a transport layer marshals
//! - **`BalanceError`**: the error taxonomy with stable kind names
//!
//! ## Usage Pattern
//! ```rust
//! use StoiBal::Stoichiometry::equation_balancer::{balance, BalancerSettings};
//!
//! let eq = balance("H2 + O2 = H2O", BalancerSettings::new()).unwrap();
//! assert_eq!(eq.to_equation_string(), "2H2 + O2 = 2H2O");
//! ```
//!
//! ## Error Kinds
//! | Kind | Meaning |
//! |------|---------|
//! | `MalformedEquationError` | tokenization or formula parsing failed |
//! | `UnbalanceableError` | only the trivial solution, or a sign contradiction |
//! | `AmbiguousEquationError` | null space dimension >= 2, refused to guess |
//! | `InternalInvariantError` | post-solve verification failed, solver bug |
//!
//! The engine holds no state between calls; every invocation allocates and
//! discards its own matrix and vectors, so calls may run in parallel freely.

use crate::Stoichiometry::equation_parser::tokenize_equation;
use crate::Stoichiometry::formula_parser::{ParsedFormula, parse_formula_token};
use crate::Stoichiometry::normalizer::{normalize_fractional, normalize_integer};
use crate::Stoichiometry::rational_solver::solve_nullspace;
use crate::Stoichiometry::stoich_matrix::StoichMatrix;
use log::{debug, error, info};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Aggregation state annotation of a compound: `(s)`, `(l)`, `(g)` or `(aq)`.
///
/// The state is part of compound identity: `H2O(l)` and `H2O(g)` occupy
/// different matrix columns and may carry different coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateSymbol {
    Solid,
    Liquid,
    Gas,
    Aqueous,
}

impl StateSymbol {
    /// Parenthesized rendering used in formulas and in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateSymbol::Solid => "(s)",
            StateSymbol::Liquid => "(l)",
            StateSymbol::Gas => "(g)",
            StateSymbol::Aqueous => "(aq)",
        }
    }

    /// Recognizes the bare mark between the parentheses, e.g. `"aq"`.
    pub fn from_mark(mark: &str) -> Option<StateSymbol> {
        match mark {
            "s" => Some(StateSymbol::Solid),
            "l" => Some(StateSymbol::Liquid),
            "g" => Some(StateSymbol::Gas),
            "aq" => Some(StateSymbol::Aqueous),
            _ => None,
        }
    }
}

impl fmt::Display for StateSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for StateSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A chemical species as written in the equation: formula text (charge marker
/// included, state suffix stripped) plus the optional state symbol.
///
/// Identity is the (formula, state) pair of strings, so `Fe^2+` and `Fe^3+`
/// are distinct compounds, as are `H2O(l)` and `H2O(g)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Compound {
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateSymbol>,
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}{}", self.formula, state),
            None => write!(f, "{}", self.formula),
        }
    }
}

/// Stoichiometric coefficient at the public boundary.
///
/// Integral values are always the `Integer` variant, in both modes, so a
/// fractional-mode result serializes `2` rather than `{"numerator": 2,
/// "denominator": 1}`. `Fraction` is only constructed in lowest terms with a
/// denominator greater than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Coefficient {
    Integer(i64),
    Fraction { numerator: i64, denominator: i64 },
}

impl Coefficient {
    pub fn is_one(&self) -> bool {
        matches!(self, Coefficient::Integer(1))
    }

    /// Exact rational value, used for the post-solve conservation check.
    pub fn as_rational(&self) -> BigRational {
        match self {
            Coefficient::Integer(n) => BigRational::from_integer(BigInt::from(*n)),
            Coefficient::Fraction {
                numerator,
                denominator,
            } => BigRational::new(BigInt::from(*numerator), BigInt::from(*denominator)),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Integer(n) => write!(f, "{}", n),
            Coefficient::Fraction {
                numerator,
                denominator,
            } => write!(f, "{}/{}", numerator, denominator),
        }
    }
}

/// Which normalization the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoefficientMode {
    /// Smallest coprime positive integers.
    #[default]
    Integer,
    /// First reactant pinned to exactly 1, the rest exact rationals.
    Fractional,
}

/// Per-call settings of the engine. The defaults are integer coefficients
/// with charge balancing off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalancerSettings {
    pub mode: CoefficientMode,
    /// When enabled, charge markers (`Fe^3+`, `OH-`) are parsed and one extra
    /// conservation row keeps the net charge balanced.
    pub charge_balance: bool,
}

impl BalancerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fractional() -> Self {
        BalancerSettings {
            mode: CoefficientMode::Fractional,
            charge_balance: false,
        }
    }

    pub fn ionic() -> Self {
        BalancerSettings {
            charge_balance: true,
            ..Default::default()
        }
    }
}

/// JSON request shape of the balancing operation:
/// `{"equation": "...", "fractional": false, "charge_balance": false}`,
/// both flags optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub equation: String,
    #[serde(default)]
    pub fractional: bool,
    #[serde(default)]
    pub charge_balance: bool,
}

impl BalanceRequest {
    pub fn settings(&self) -> BalancerSettings {
        BalancerSettings {
            mode: if self.fractional {
                CoefficientMode::Fractional
            } else {
                CoefficientMode::Integer
            },
            charge_balance: self.charge_balance,
        }
    }

    pub fn run(&self) -> Result<BalancedEquation, BalanceError> {
        balance(&self.equation, self.settings())
    }
}

/// Error taxonomy of the engine. Every failure of a balancing call is exactly
/// one of these; nothing is retried internally since the computation is
/// deterministic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// Tokenization or formula parsing failed: missing or duplicated
    /// separator, empty side or term, invalid formula syntax, a leading
    /// coefficient typed into a term, or a bad/disallowed charge marker.
    #[error("malformed equation: {0}")]
    MalformedEquation(String),
    /// The conservation system admits only the trivial all-zero solution, or
    /// its unique solution direction contains a zero or negative coefficient.
    #[error("equation cannot be balanced: {0}")]
    Unbalanceable(String),
    /// The null space has dimension two or more; the equation mixes several
    /// independent balances and the engine refuses to pick one arbitrarily.
    #[error("equation admits multiple independent balances: {0}")]
    AmbiguousEquation(String),
    /// Post-solve verification failed or an intermediate contract was broken.
    /// Indicates a bug in the solver, not in the input.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl BalanceError {
    /// Stable kind name used in serialized failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            BalanceError::MalformedEquation(_) => "MalformedEquationError",
            BalanceError::Unbalanceable(_) => "UnbalanceableError",
            BalanceError::AmbiguousEquation(_) => "AmbiguousEquationError",
            BalanceError::InternalInvariant(_) => "InternalInvariantError",
        }
    }

    /// Failure shape for transport layers:
    /// `{"errorKind": "...", "message": "..."}`.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error_kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Serializable failure report, see [`BalanceError::report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    #[serde(rename = "errorKind")]
    pub error_kind: &'static str,
    pub message: String,
}

/// One compound of a balanced equation together with its coefficient.
/// Serializes flat: `{"formula": "H2O", "state": "(g)", "coefficient": 2}`
/// with `state` omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancedTerm {
    #[serde(flatten)]
    pub compound: Compound,
    pub coefficient: Coefficient,
}

/// Result of a successful balance: the left and right term lists in original
/// order, each compound with its coefficient, tagged by the normalization
/// mode that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancedEquation {
    pub left: Vec<BalancedTerm>,
    pub right: Vec<BalancedTerm>,
    #[serde(skip)]
    pub mode: CoefficientMode,
}

impl BalancedEquation {
    /// Renders the balanced equation back to text, e.g. `"2H2 + O2 = 2H2O"`.
    /// Coefficients equal to 1 are omitted, fractions are written `7/2`, the
    /// state symbol stays attached to its compound. The separator is always
    /// `=` regardless of what the input used.
    pub fn to_equation_string(&self) -> String {
        let render_side = |terms: &[BalancedTerm]| {
            terms
                .iter()
                .map(|term| {
                    if term.coefficient.is_one() {
                        term.compound.to_string()
                    } else {
                        format!("{}{}", term.coefficient, term.compound)
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        format!("{} = {}", render_side(&self.left), render_side(&self.right))
    }

    /// Prints the result as a table of side/compound/state/coefficient.
    pub fn pretty_print_balanced(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("side"),
            Cell::new("compound"),
            Cell::new("state"),
            Cell::new("coefficient"),
        ]));
        for (side_name, terms) in [("reactant", &self.left), ("product", &self.right)] {
            for term in terms {
                let state = term
                    .compound
                    .state
                    .map(|s| s.as_str())
                    .unwrap_or("-");
                table.add_row(Row::new(vec![
                    Cell::new(side_name),
                    Cell::new(&term.compound.formula),
                    Cell::new(state),
                    Cell::new(&term.coefficient.to_string()),
                ]));
            }
        }
        table.printstd();
    }
}

impl fmt::Display for BalancedEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_equation_string())
    }
}

/// Step-by-step balancing pipeline. Every intermediate lives in a public
/// field so callers can inspect the parsed terms, the conservation matrix and
/// the raw null-space vector after the corresponding step has run.
///
/// The steps must run in order: [`parse`](EquationBalancer::parse),
/// [`construct_matrix`](EquationBalancer::construct_matrix),
/// [`solve`](EquationBalancer::solve),
/// [`normalize`](EquationBalancer::normalize).
/// [`balance`](EquationBalancer::balance) runs all of them.
///
/// # Example
/// ```rust
/// use StoiBal::Stoichiometry::equation_balancer::{BalancerSettings, EquationBalancer};
///
/// let mut balancer = EquationBalancer::new("Fe + O2 = Fe2O3", BalancerSettings::new());
/// balancer.parse().unwrap();
/// balancer.construct_matrix().unwrap();
/// balancer.solve().unwrap();
/// balancer.normalize().unwrap();
/// let eq = balancer.balanced.unwrap();
/// assert_eq!(eq.to_equation_string(), "4Fe + 3O2 = 2Fe2O3");
/// ```
#[derive(Debug, Clone)]
pub struct EquationBalancer {
    /// Raw input equation.
    pub equation: String,
    pub settings: BalancerSettings,
    /// Parsed reactant terms, per-side duplicates collapsed to the first
    /// mention.
    pub left: Vec<ParsedFormula>,
    /// Parsed product terms, same convention.
    pub right: Vec<ParsedFormula>,
    /// Conservation matrix, present after `construct_matrix`.
    pub matrix: Option<StoichMatrix>,
    /// Positive null-space vector, one entry per matrix column, present after
    /// `solve`.
    pub raw_solution: Vec<BigRational>,
    /// Final result, present after `normalize`.
    pub balanced: Option<BalancedEquation>,
}

impl EquationBalancer {
    pub fn new(equation: &str, settings: BalancerSettings) -> Self {
        EquationBalancer {
            equation: equation.to_string(),
            settings,
            left: Vec::new(),
            right: Vec::new(),
            matrix: None,
            raw_solution: Vec::new(),
            balanced: None,
        }
    }

    /// Tokenizes the equation and parses every compound token. Duplicate
    /// mentions of the same (formula, state) within one side collapse to the
    /// first mention, since they denote the same compound.
    pub fn parse(&mut self) -> Result<(), BalanceError> {
        let charge_mode = self.settings.charge_balance;
        let tokens = tokenize_equation(&self.equation, charge_mode)?;
        debug!(
            "tokenized sides: left {:?}, right {:?}",
            tokens.left, tokens.right
        );
        let parse_side = |raw: &[String]| -> Result<Vec<ParsedFormula>, BalanceError> {
            let mut parsed: Vec<ParsedFormula> = Vec::new();
            for token in raw {
                let formula = parse_formula_token(token, charge_mode)?;
                if !parsed.iter().any(|p| p.compound() == formula.compound()) {
                    parsed.push(formula);
                }
            }
            Ok(parsed)
        };
        self.left = parse_side(&tokens.left)?;
        self.right = parse_side(&tokens.right)?;
        Ok(())
    }

    /// Assembles the conservation matrix from the parsed terms.
    pub fn construct_matrix(&mut self) -> Result<(), BalanceError> {
        if self.left.is_empty() || self.right.is_empty() {
            return Err(BalanceError::InternalInvariant(
                "parse must run before construct_matrix".to_string(),
            ));
        }
        let matrix = StoichMatrix::assemble(&self.left, &self.right, self.settings.charge_balance);
        debug!("stoichiometric matrix:\n{}", matrix.to_table_string());
        self.matrix = Some(matrix);
        Ok(())
    }

    /// Extracts the one-dimensional null space of the matrix; fails when the
    /// system is trivial-only, ambiguous or sign-contradictory.
    pub fn solve(&mut self) -> Result<(), BalanceError> {
        let matrix = self.matrix.as_ref().ok_or_else(|| {
            BalanceError::InternalInvariant("construct_matrix must run before solve".to_string())
        })?;
        self.raw_solution = solve_nullspace(matrix)?;
        debug!("raw null-space vector: {:?}", self.raw_solution);
        Ok(())
    }

    /// Normalizes the raw vector per the requested mode, re-verifies
    /// conservation with the final coefficients and partitions them back into
    /// the left/right term lists.
    pub fn normalize(&mut self) -> Result<(), BalanceError> {
        let matrix = self.matrix.as_ref().ok_or_else(|| {
            BalanceError::InternalInvariant("solve must run before normalize".to_string())
        })?;
        if self.raw_solution.is_empty() {
            return Err(BalanceError::InternalInvariant(
                "solve must run before normalize".to_string(),
            ));
        }
        let coefficients = match self.settings.mode {
            CoefficientMode::Integer => normalize_integer(&self.raw_solution)?,
            CoefficientMode::Fractional => normalize_fractional(&self.raw_solution, 0)?,
        };

        // conservation must survive normalization exactly
        let rationals: Vec<BigRational> = coefficients.iter().map(Coefficient::as_rational).collect();
        for (i, residual) in matrix.residual(&rationals).iter().enumerate() {
            if !residual.is_zero() {
                error!(
                    "conservation check failed for the {} row, residual {}",
                    matrix.row_label(i),
                    residual
                );
                return Err(BalanceError::InternalInvariant(format!(
                    "conservation of {} is violated by the computed coefficients",
                    matrix.row_label(i)
                )));
            }
        }

        let pick_terms = |terms: &[ParsedFormula]| -> Result<Vec<BalancedTerm>, BalanceError> {
            terms
                .iter()
                .map(|parsed| {
                    let compound = parsed.compound();
                    let column = matrix
                        .compounds
                        .iter()
                        .position(|c| *c == compound)
                        .ok_or_else(|| {
                            BalanceError::InternalInvariant(format!(
                                "compound '{}' is missing from the matrix columns",
                                compound
                            ))
                        })?;
                    Ok(BalancedTerm {
                        compound,
                        coefficient: coefficients[column].clone(),
                    })
                })
                .collect()
        };
        let balanced = BalancedEquation {
            left: pick_terms(&self.left)?,
            right: pick_terms(&self.right)?,
            mode: self.settings.mode,
        };
        info!("balanced: {}", balanced);
        self.balanced = Some(balanced);
        Ok(())
    }

    /// Runs the whole pipeline and returns the balanced equation.
    pub fn balance(&mut self) -> Result<BalancedEquation, BalanceError> {
        info!("\n____________________BALANCING CHEMICAL EQUATION____________________");
        info!(
            "equation: '{}', mode: {:?}, charge balance: {}",
            self.equation.trim(),
            self.settings.mode,
            self.settings.charge_balance
        );
        self.parse()?;
        self.construct_matrix()?;
        self.solve()?;
        self.normalize()?;
        info!("____________________BALANCING ENDED____________________");
        self.balanced.clone().ok_or_else(|| {
            BalanceError::InternalInvariant("balancing finished without a result".to_string())
        })
    }
}

/// Balances one chemical equation.
///
/// # Arguments
/// * `equation` - raw equation text, sides separated by `=`, `->` or `=>`,
///   terms joined with `+`
/// * `settings` - coefficient mode and charge-balance flag
///
/// # Returns
/// The balanced equation, or the typed error describing why it cannot be
/// produced.
///
/// # Example
/// ```rust
/// use StoiBal::Stoichiometry::equation_balancer::{balance, BalancerSettings};
///
/// let eq = balance("C2H6 + O2 = CO2 + H2O", BalancerSettings::new()).unwrap();
/// assert_eq!(eq.to_equation_string(), "2C2H6 + 7O2 = 4CO2 + 6H2O");
/// ```
pub fn balance(
    equation: &str,
    settings: BalancerSettings,
) -> Result<BalancedEquation, BalanceError> {
    let mut balancer = EquationBalancer::new(equation, settings);
    balancer.balance()
}

/// Balances every equation of the vector, one independent result per input.
pub fn balance_vector_of_equations(
    equations: Vec<&str>,
    settings: BalancerSettings,
) -> Vec<Result<BalancedEquation, BalanceError>> {
    info!("\n____________________BALANCING VECTOR OF EQUATIONS____________________");
    let results = equations
        .iter()
        .map(|equation| balance(equation, settings))
        .collect();
    info!("____________________BALANCING VECTOR OF EQUATIONS ENDED____________________");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn int_term(formula: &str, coefficient: i64) -> BalancedTerm {
        BalancedTerm {
            compound: Compound {
                formula: formula.to_string(),
                state: None,
            },
            coefficient: Coefficient::Integer(coefficient),
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BalanceError::MalformedEquation("x".to_string()).kind(),
            "MalformedEquationError"
        );
        assert_eq!(
            BalanceError::Unbalanceable("x".to_string()).kind(),
            "UnbalanceableError"
        );
        assert_eq!(
            BalanceError::AmbiguousEquation("x".to_string()).kind(),
            "AmbiguousEquationError"
        );
        assert_eq!(
            BalanceError::InternalInvariant("x".to_string()).kind(),
            "InternalInvariantError"
        );
    }

    #[test]
    fn test_error_report_shape() {
        let report = BalanceError::MalformedEquation("no separator found".to_string()).report();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "errorKind": "MalformedEquationError",
                "message": "malformed equation: no separator found"
            })
        );
    }

    #[test]
    fn test_request_settings() {
        let request: BalanceRequest =
            serde_json::from_str(r#"{"equation": "H2 + O2 = H2O", "fractional": true}"#).unwrap();
        assert_eq!(request.settings().mode, CoefficientMode::Fractional);
        assert!(!request.settings().charge_balance);

        let bare: BalanceRequest = serde_json::from_str(r#"{"equation": "H2 = H2"}"#).unwrap();
        assert_eq!(bare.settings(), BalancerSettings::new());
    }

    #[test]
    fn test_coefficient_display_and_value() {
        assert_eq!(Coefficient::Integer(3).to_string(), "3");
        let half = Coefficient::Fraction {
            numerator: 7,
            denominator: 2,
        };
        assert_eq!(half.to_string(), "7/2");
        assert_eq!(half.as_rational().to_string(), "7/2");
        assert!(Coefficient::Integer(1).is_one());
        assert!(!Coefficient::Integer(2).is_one());
    }

    #[test]
    fn test_equation_rendering() {
        let eq = BalancedEquation {
            left: vec![int_term("H2", 2), int_term("O2", 1)],
            right: vec![int_term("H2O", 2)],
            mode: CoefficientMode::Integer,
        };
        assert_eq!(eq.to_equation_string(), "2H2 + O2 = 2H2O");
        assert_eq!(format!("{}", eq), "2H2 + O2 = 2H2O");
    }

    #[test]
    fn test_rendering_with_state_and_fraction() {
        let eq = BalancedEquation {
            left: vec![int_term("C2H6", 1)],
            right: vec![BalancedTerm {
                compound: Compound {
                    formula: "H2O".to_string(),
                    state: Some(StateSymbol::Gas),
                },
                coefficient: Coefficient::Fraction {
                    numerator: 3,
                    denominator: 2,
                },
            }],
            mode: CoefficientMode::Fractional,
        };
        assert_eq!(eq.to_equation_string(), "C2H6 = 3/2H2O(g)");
    }

    #[test]
    fn test_term_serialization() {
        let term = BalancedTerm {
            compound: Compound {
                formula: "H2O".to_string(),
                state: Some(StateSymbol::Gas),
            },
            coefficient: Coefficient::Integer(2),
        };
        assert_eq!(
            serde_json::to_value(&term).unwrap(),
            json!({"formula": "H2O", "state": "(g)", "coefficient": 2})
        );

        let stateless = int_term("O2", 1);
        assert_eq!(
            serde_json::to_value(&stateless).unwrap(),
            json!({"formula": "O2", "coefficient": 1})
        );
    }

    #[test]
    fn test_pretty_print_smoke() {
        let eq = BalancedEquation {
            left: vec![int_term("Fe", 4), int_term("O2", 3)],
            right: vec![int_term("Fe2O3", 2)],
            mode: CoefficientMode::Integer,
        };
        eq.pretty_print_balanced();
    }
}
