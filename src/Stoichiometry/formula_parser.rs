//! # Formula Parser Module
//!
//! Turns one compound token into element counts, a net ionic charge and a
//! state symbol. The grammar, by recursive descent over a char cursor:
//!
//! ```text
//! formula := item+
//! item    := (element | '(' formula ')' | '[' formula ']') count?
//! element := uppercase lowercase*
//! count   := digit+            (>= 1, default 1 when absent)
//! ```
//!
//! A trailing `(s)`, `(l)`, `(g)` or `(aq)` is the state symbol, never a
//! group; any other parenthesized tail is part of the formula. Nesting is
//! unlimited and `[` `]` pair interchangeably with `(` `)`, so
//! `K4[Fe(CN)6]` parses.
//!
//! Charge markers are parsed only in charge-balance mode, at the end of the
//! formula body: `Fe^3+`, `SO4^2-`, `SO4^-2`, `H^+`, and the bare signs
//! `OH-` / `Na+` meaning magnitude 1. Digits before a bare sign are always a
//! subscript (`O2-` is the superoxide ion, two oxygens, charge -1); a
//! magnitude above 1 needs the caret, e.g. `Mg^2+`.
//!
//! Leading integers (`2H2O` typed as one token) are rejected: coefficients
//! are the engine's output, not its input.

use crate::Stoichiometry::equation_balancer::{BalanceError, Compound, StateSymbol};
use regex::Regex;

/// Parse result for one compound token.
///
/// `formula` keeps the charge marker but not the state suffix, and is the
/// identity string used to match compounds across the equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFormula {
    pub formula: String,
    pub state: Option<StateSymbol>,
    /// Element counts in first-appearance order, repeated elements merged
    /// into their first slot (`CH3COOH` gives `[(C,2),(H,4),(O,2)]`).
    pub composition: Vec<(String, i64)>,
    pub charge: i64,
}

impl ParsedFormula {
    pub fn compound(&self) -> Compound {
        Compound {
            formula: self.formula.clone(),
            state: self.state,
        }
    }

    /// Atom count of `symbol` in this formula, 0 when absent.
    pub fn count_of(&self, symbol: &str) -> i64 {
        self.composition
            .iter()
            .find(|(s, _)| s.as_str() == symbol)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Parses one compound token.
///
/// # Arguments
/// * `token` - the compound as written, e.g. `"Fe2(SO4)3"` or `"H2O(g)"`
/// * `charge_mode` - whether charge markers are legal; outside charge mode
///   any `^` or trailing sign is rejected
///
/// # Example
/// ```rust
/// use StoiBal::Stoichiometry::formula_parser::parse_formula_token;
///
/// let parsed = parse_formula_token("Fe2(SO4)3", false).unwrap();
/// assert_eq!(parsed.count_of("O"), 12);
/// assert_eq!(parsed.charge, 0);
/// ```
pub fn parse_formula_token(token: &str, charge_mode: bool) -> Result<ParsedFormula, BalanceError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(BalanceError::MalformedEquation(
            "empty compound term".to_string(),
        ));
    }
    let (body, state) = strip_state(trimmed);
    if body.is_empty() {
        return Err(BalanceError::MalformedEquation(format!(
            "missing formula before state symbol in term '{}'",
            trimmed
        )));
    }
    let (bare, charge) = extract_charge(body, charge_mode, trimmed)?;
    if bare.is_empty() {
        return Err(BalanceError::MalformedEquation(format!(
            "missing formula in term '{}'",
            trimmed
        )));
    }
    if bare.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(BalanceError::MalformedEquation(format!(
            "leading coefficient in term '{}': coefficients are computed, not typed",
            trimmed
        )));
    }
    let mut scanner = FormulaScanner::new(bare, trimmed);
    let composition = scanner.parse_sequence(0)?;
    Ok(ParsedFormula {
        formula: body.to_string(),
        state,
        composition,
        charge,
    })
}

/// Splits off a trailing state symbol; any other parenthesized tail stays in
/// the formula.
fn strip_state(token: &str) -> (&str, Option<StateSymbol>) {
    let re = Regex::new(r"^(.*)\((s|l|g|aq)\)$").unwrap();
    if let Some(caps) = re.captures(token) {
        if let (Some(body), Some(mark)) = (caps.get(1), caps.get(2)) {
            if let Some(state) = StateSymbol::from_mark(mark.as_str()) {
                return (body.as_str(), Some(state));
            }
        }
    }
    (token, None)
}

/// Splits off the charge marker and returns (formula body, net charge).
/// Caret forms carry an explicit magnitude in either digit order; a bare
/// trailing sign means magnitude 1.
fn extract_charge<'a>(
    body: &'a str,
    charge_mode: bool,
    token: &str,
) -> Result<(&'a str, i64), BalanceError> {
    if !charge_mode {
        if body.contains('^') || body.ends_with('+') || body.ends_with('-') {
            return Err(BalanceError::MalformedEquation(format!(
                "charge marker in term '{}' but charge-balance mode is disabled",
                token
            )));
        }
        return Ok((body, 0));
    }
    if let Some(caret) = body.find('^') {
        let marker = &body[caret + 1..];
        let re = Regex::new(r"^(?:(\d+)([+-])|([+-])(\d*))$").unwrap();
        let caps = re.captures(marker).ok_or_else(|| {
            BalanceError::MalformedEquation(format!(
                "cannot parse charge marker '^{}' in term '{}'",
                marker, token
            ))
        })?;
        let (sign, digits) = if let Some(sign) = caps.get(2) {
            (sign.as_str(), caps.get(1).map_or("1", |m| m.as_str()))
        } else if let Some(sign) = caps.get(3) {
            let digits = caps.get(4).map_or("", |m| m.as_str());
            (sign.as_str(), if digits.is_empty() { "1" } else { digits })
        } else {
            return Err(BalanceError::MalformedEquation(format!(
                "cannot parse charge marker '^{}' in term '{}'",
                marker, token
            )));
        };
        let magnitude: i64 = digits.parse().map_err(|_| {
            BalanceError::MalformedEquation(format!(
                "charge magnitude out of range in term '{}'",
                token
            ))
        })?;
        if magnitude == 0 {
            return Err(BalanceError::MalformedEquation(format!(
                "zero charge magnitude in term '{}'",
                token
            )));
        }
        let charge = if sign == "+" { magnitude } else { -magnitude };
        return Ok((&body[..caret], charge));
    }
    if let Some(stripped) = body.strip_suffix('+') {
        return Ok((stripped, 1));
    }
    if let Some(stripped) = body.strip_suffix('-') {
        return Ok((stripped, -1));
    }
    Ok((body, 0))
}

fn merge_count(
    items: &mut Vec<(String, i64)>,
    symbol: &str,
    add: i64,
    token: &str,
) -> Result<(), BalanceError> {
    if let Some(slot) = items.iter_mut().find(|(s, _)| s.as_str() == symbol) {
        slot.1 = slot.1.checked_add(add).ok_or_else(|| {
            BalanceError::MalformedEquation(format!("atom count overflow in term '{}'", token))
        })?;
    } else {
        items.push((symbol.to_string(), add));
    }
    Ok(())
}

fn closing_for(open: char) -> char {
    if open == '(' { ')' } else { ']' }
}

/// Char cursor over the formula body; `token` is the original term text for
/// error messages.
struct FormulaScanner<'a> {
    chars: Vec<char>,
    pos: usize,
    token: &'a str,
}

impl<'a> FormulaScanner<'a> {
    fn new(body: &str, token: &'a str) -> Self {
        FormulaScanner {
            chars: body.chars().collect(),
            pos: 0,
            token,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Reads the optional integer after an element or group, default 1.
    fn parse_count(&mut self) -> Result<i64, BalanceError> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Ok(1);
        }
        let value: i64 = digits.parse().map_err(|_| {
            BalanceError::MalformedEquation(format!(
                "multiplier '{}' out of range in term '{}'",
                digits, self.token
            ))
        })?;
        if value == 0 {
            return Err(BalanceError::MalformedEquation(format!(
                "zero multiplier in term '{}'",
                self.token
            )));
        }
        Ok(value)
    }

    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<(String, i64)>, BalanceError> {
        let mut items: Vec<(String, i64)> = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(open @ ('(' | '[')) => {
                    self.bump();
                    let inner = self.parse_sequence(depth + 1)?;
                    if self.peek() != Some(closing_for(open)) {
                        return Err(BalanceError::MalformedEquation(format!(
                            "unclosed group '{}' in term '{}'",
                            open, self.token
                        )));
                    }
                    self.bump();
                    if inner.is_empty() {
                        return Err(BalanceError::MalformedEquation(format!(
                            "empty group in term '{}'",
                            self.token
                        )));
                    }
                    let multiplier = self.parse_count()?;
                    for (symbol, count) in inner {
                        let scaled = count.checked_mul(multiplier).ok_or_else(|| {
                            BalanceError::MalformedEquation(format!(
                                "atom count overflow in term '{}'",
                                self.token
                            ))
                        })?;
                        merge_count(&mut items, &symbol, scaled, self.token)?;
                    }
                }
                Some(')') | Some(']') => {
                    if depth == 0 {
                        return Err(BalanceError::MalformedEquation(format!(
                            "unmatched closing bracket in term '{}'",
                            self.token
                        )));
                    }
                    break;
                }
                Some(c) if c.is_ascii_uppercase() => {
                    let mut symbol = String::new();
                    symbol.push(c);
                    self.bump();
                    while let Some(lower) = self.peek() {
                        if lower.is_ascii_lowercase() {
                            symbol.push(lower);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let count = self.parse_count()?;
                    merge_count(&mut items, &symbol, count, self.token)?;
                }
                Some(c) => {
                    return Err(BalanceError::MalformedEquation(format!(
                        "unexpected character '{}' in term '{}'",
                        c, self.token
                    )));
                }
            }
        }
        Ok(items)
    }
}
