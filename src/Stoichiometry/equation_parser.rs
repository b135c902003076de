//! # Equation Parser Module
//!
//! Splits a raw equation string into compound tokens. Exactly one separator
//! (`=`, `->` or `=>`) divides reactants from products; each side is split on
//! `+` into terms, surrounding whitespace trimmed.
//!
//! In charge-balance mode a `+` can also be a cation charge marker. It is
//! treated as one in exactly two positions: right after `^` (with optional
//! magnitude digits in between, `Fe^3+`) and as the last non-whitespace
//! character of its side (`Na = Na+`). Every other `+` joins terms, so the
//! un-careted spelling `H+ + OH- = H2O` splits into an empty term and errors;
//! the caret form `H^+ + OH^- = H2O` is the supported spelling.
//!
//! Note on `->`: a bare trailing anion written with no space directly before
//! the arrow (`...2->`) loses its `-` to the separator match; equations with
//! bare anion markers read best with `=`.

use crate::Stoichiometry::equation_balancer::BalanceError;
use regex::Regex;

/// Tokenized equation: raw term strings per side plus the separator found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationTokens {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub separator: String,
}

/// Splits `equation` into left/right compound tokens.
///
/// # Example
/// ```rust
/// use StoiBal::Stoichiometry::equation_parser::tokenize_equation;
///
/// let tokens = tokenize_equation("C2H6 + O2 -> CO2 + H2O", false).unwrap();
/// assert_eq!(tokens.left, vec!["C2H6", "O2"]);
/// assert_eq!(tokens.right, vec!["CO2", "H2O"]);
/// assert_eq!(tokens.separator, "->");
/// ```
pub fn tokenize_equation(
    equation: &str,
    charge_mode: bool,
) -> Result<EquationTokens, BalanceError> {
    // longest alternatives first, so "=>" is one match and not "=" twice
    let re = Regex::new(r"=>|->|=").unwrap();
    let matches: Vec<_> = re.find_iter(equation).collect();
    let separator = match matches.len() {
        0 => {
            return Err(BalanceError::MalformedEquation(
                "no separator found: use '=', '->' or '=>' between sides".to_string(),
            ));
        }
        1 => matches[0],
        n => {
            return Err(BalanceError::MalformedEquation(format!(
                "multiple separators found ({} of them): exactly one of '=', '->', '=>' is allowed",
                n
            )));
        }
    };
    let left = split_side(&equation[..separator.start()], charge_mode, "left")?;
    let right = split_side(&equation[separator.end()..], charge_mode, "right")?;
    Ok(EquationTokens {
        left,
        right,
        separator: separator.as_str().to_string(),
    })
}

/// Splits one side on joining `+` characters and trims each token.
fn split_side(side: &str, charge_mode: bool, which: &str) -> Result<Vec<String>, BalanceError> {
    if side.trim().is_empty() {
        return Err(BalanceError::MalformedEquation(format!(
            "empty {} side",
            which
        )));
    }
    let chars: Vec<char> = side.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '+' && !(charge_mode && is_charge_plus(&chars, i)) {
            push_token(&mut tokens, &current, which)?;
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_token(&mut tokens, &current, which)?;
    Ok(tokens)
}

fn push_token(tokens: &mut Vec<String>, raw: &str, which: &str) -> Result<(), BalanceError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(BalanceError::MalformedEquation(format!(
            "empty compound term on the {} side",
            which
        )));
    }
    tokens.push(token.to_string());
    Ok(())
}

/// A `+` belongs to a charge marker when it closes a caret form or ends the
/// side; everywhere else it joins terms.
fn is_charge_plus(chars: &[char], i: usize) -> bool {
    let mut j = i;
    while j > 0 && chars[j - 1].is_ascii_digit() {
        j -= 1;
    }
    if j > 0 && chars[j - 1] == '^' {
        return true;
    }
    chars[i + 1..].iter().all(|c| c.is_whitespace())
}
