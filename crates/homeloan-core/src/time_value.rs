use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::HomeLoanError;
use crate::types::{Percent, Rate};
use crate::HomeLoanResult;

const LN_2: Decimal = dec!(0.6931471805599453094172321215);
const LN_SERIES_TERMS: u32 = 40;

/// Months per year; every monthly figure is the annual figure divided by this.
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert a percent quote (3.8) into a decimal rate (0.038).
pub fn percent_to_rate(percent: Percent) -> Rate {
    percent / dec!(100)
}

/// Natural logarithm for x > 0.
///
/// Range-reduces into [0.5, 2] with ln(x) = ln(x / 2^n) + n * ln(2), then sums
/// ln(v) = 2 * sum_{k>=0} z^(2k+1) / (2k+1) with z = (v - 1) / (v + 1).
pub fn decimal_ln(x: Decimal) -> HomeLoanResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(HomeLoanError::InvalidInput {
            field: "ln argument".into(),
            reason: format!("logarithm is undefined for {x}"),
        });
    }
    if x == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }

    let two = dec!(2);
    let mut val = x;
    let mut adjust = Decimal::ZERO;
    while val > two {
        val /= two;
        adjust += LN_2;
    }
    while val < dec!(0.5) {
        val *= two;
        adjust -= LN_2;
    }

    let z = (val - Decimal::ONE) / (val + Decimal::ONE);
    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for k in 1..LN_SERIES_TERMS {
        term *= z2;
        if term.is_zero() {
            break;
        }
        sum += term / Decimal::from(2 * k + 1);
    }
    Ok(two * sum + adjust)
}

/// base^n by square-and-multiply. Fails instead of panicking when the power
/// leaves the Decimal range.
pub fn decimal_powi(base: Decimal, n: u32) -> HomeLoanResult<Decimal> {
    base.checked_powu(u64::from(n)).ok_or_else(|| overflow(n))
}

/// Accumulated value of n unit payments at the end of each period:
/// (q^n - 1) / (q - 1), or n when q == 1.
pub fn annuity_accumulation_factor(q: Decimal, n: u32) -> HomeLoanResult<Decimal> {
    if q == Decimal::ONE {
        return Ok(Decimal::from(n));
    }
    (decimal_powi(q, n)? - Decimal::ONE)
        .checked_div(q - Decimal::ONE)
        .ok_or_else(|| overflow(n))
}

fn overflow(n: u32) -> HomeLoanError {
    HomeLoanError::InvalidInput {
        field: "years".into(),
        reason: format!("compounding over {n} periods exceeds the supported range"),
    }
}
