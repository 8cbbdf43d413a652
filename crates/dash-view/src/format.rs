//! Number formatting for KPI cards and cell renderers.
//!
//! Rounding goes through `rust_decimal` so money never picks up binary
//! floating point noise.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

fn rounded(n: f64, dp: u32) -> Option<Decimal> {
    let mut d = Decimal::from_f64(n)?
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if d.is_zero() {
        d.set_sign_positive(true);
    }
    Some(d)
}

/// Thousands-grouped number with up to three fraction digits: `1,234.5`.
pub fn group_thousands(n: f64) -> String {
    match rounded(n, 3) {
        Some(d) => grouped(d.normalize()),
        None => n.to_string(),
    }
}

/// Fixed number of fraction digits, no grouping: `fixed(4.5, 2) == "4.50"`.
pub fn fixed(n: f64, dp: u32) -> String {
    match rounded(n, dp) {
        Some(mut d) => {
            d.rescale(dp);
            d.to_string()
        }
        None => n.to_string(),
    }
}

/// Dollar amount with grouping: `$125,000`.
pub fn usd(n: f64) -> String {
    format!("${}", group_thousands(n))
}

/// Dollar amount with cents: `$4.50`.
pub fn usd_cents(n: f64) -> String {
    format!("${}", fixed(n, 2))
}

pub fn percent(n: f64, dp: u32) -> String {
    format!("{}%", fixed(n, dp))
}

fn grouped(d: Decimal) -> String {
    let text = d.abs().to_string();
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut out = String::with_capacity(text.len() + int.len() / 3 + 1);
    if d.is_sign_negative() && !d.is_zero() {
        out.push('-');
    }
    let len = int.len();
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn groups_like_locale_strings() {
        assert_eq!(group_thousands(48210.0), "48,210");
        assert_eq!(group_thousands(1_234_567.891), "1,234,567.891");
        assert_eq!(group_thousands(-1234.5), "-1,234.5");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(1.23456), "1.235");
    }

    #[test]
    fn fixed_pads_fraction() {
        assert_eq!(fixed(4.5, 2), "4.50");
        assert_eq!(fixed(12.0, 1), "12.0");
        assert_eq!(fixed(3.14159, 2), "3.14");
        assert_eq!(fixed(-0.001, 2), "0.00");
    }

    #[test]
    fn currency_and_percent() {
        assert_eq!(usd(125_000.0), "$125,000");
        assert_eq!(usd_cents(2.3), "$2.30");
        assert_eq!(percent(4.25, 1), "4.3%");
        assert_eq!(usd(f64::NAN), "$NaN");
    }

    proptest! {
        #[test]
        fn grouping_preserves_digits(n in 0u64..10_000_000_000) {
            let s = group_thousands(n as f64);
            prop_assert_eq!(s.replace(',', ""), n.to_string());
            prop_assert!(s.split(',').skip(1).all(|g| g.len() == 3));
        }
    }
}
