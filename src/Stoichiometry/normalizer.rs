//! # Normalizer Module
//!
//! Turns the raw rational null-space vector into presentable coefficients.
//! Integer mode clears denominators with their LCM and divides through by
//! the GCD, so the result is the unique minimal positive integer vector.
//! Fractional mode divides every entry by the first reactant's entry, which
//! pins that reactant to exactly 1.
//!
//! Arithmetic stays in `BigInt`/`BigRational` until the very end; only the
//! finished coefficients are narrowed to `i64`, and a value outside that
//! range is reported as an internal invariant violation rather than wrapped.

use crate::Stoichiometry::equation_balancer::{BalanceError, Coefficient};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

/// Scales the solution vector to the minimal positive integer coefficients.
pub fn normalize_integer(solution: &[BigRational]) -> Result<Vec<Coefficient>, BalanceError> {
    let mut lcm = BigInt::one();
    for value in solution {
        lcm = lcm.lcm(value.denom());
    }
    let scaled: Vec<BigInt> = solution
        .iter()
        .map(|value| value.numer() * (&lcm / value.denom()))
        .collect();

    let mut gcd = BigInt::zero();
    for value in &scaled {
        gcd = gcd.gcd(value);
    }
    if gcd.is_zero() {
        return Err(BalanceError::InternalInvariant(
            "cannot normalize an all-zero solution vector".to_string(),
        ));
    }

    scaled
        .iter()
        .map(|value| {
            let reduced = value / &gcd;
            match reduced.to_i64() {
                Some(n) => Ok(Coefficient::Integer(n)),
                None => Err(BalanceError::InternalInvariant(
                    "balanced coefficient exceeds the representable integer range".to_string(),
                )),
            }
        })
        .collect()
}

/// Divides the solution vector by the entry at `reference`, conventionally
/// the first reactant. Entries that divide evenly still come out as plain
/// integers.
pub fn normalize_fractional(
    solution: &[BigRational],
    reference: usize,
) -> Result<Vec<Coefficient>, BalanceError> {
    let Some(pin) = solution.get(reference) else {
        return Err(BalanceError::InternalInvariant(format!(
            "fractional reference index {} is out of range",
            reference
        )));
    };
    if pin.is_zero() {
        return Err(BalanceError::InternalInvariant(
            "fractional reference coefficient is zero".to_string(),
        ));
    }
    solution
        .iter()
        .map(|value| rational_to_coefficient(&(value / pin)))
        .collect()
}

/// Narrows an exact rational to the wire-format coefficient, keeping
/// integral values as plain integers.
pub fn rational_to_coefficient(value: &BigRational) -> Result<Coefficient, BalanceError> {
    let overflow = || {
        BalanceError::InternalInvariant(
            "balanced coefficient exceeds the representable integer range".to_string(),
        )
    };
    if value.is_integer() {
        return value
            .numer()
            .to_i64()
            .map(Coefficient::Integer)
            .ok_or_else(overflow);
    }
    let numerator = value.numer().to_i64().ok_or_else(overflow)?;
    let denominator = value.denom().to_i64().ok_or_else(overflow)?;
    Ok(Coefficient::Fraction {
        numerator,
        denominator,
    })
}
