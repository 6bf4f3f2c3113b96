use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Largest amount accepted from a form or a stored rate: 100 billion pesos.
pub const MAX_AMOUNT_MINOR: i64 = 10_000_000_000_000;

/// Converts a peso amount to minor units (hundredths), rounding half away from zero.
/// Amounts beyond `MAX_AMOUNT_MINOR` in either direction are `None`.
pub fn to_minor(amount: Decimal) -> Option<i64> {
    let amount_minor = amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()?;
    (amount_minor.abs() <= MAX_AMOUNT_MINOR).then_some(amount_minor)
}

pub fn from_minor(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, 2)
}

/// Colombian peso formatting: `$ 3.150,00`.
pub fn format_cop(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    let digits = (abs / 100).to_string();
    let cents = abs % 100;

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}$ {grouped},{cents:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pesos_convert_to_minor_units() {
        assert_eq!(to_minor(Decimal::from(3150)), Some(315_000));
        assert_eq!(to_minor(Decimal::from_str("70.5").unwrap()), Some(7_050));
        assert_eq!(to_minor(Decimal::from_str("0.005").unwrap()), Some(1));
    }

    #[test]
    fn huge_amounts_are_out_of_range() {
        assert_eq!(to_minor(Decimal::MAX), None);
        assert_eq!(
            to_minor(Decimal::from_str("1000000000000000000000000000").unwrap()),
            None
        );
        assert_eq!(to_minor(Decimal::from(900_000_000_000_000_000_i64)), None);
        assert_eq!(
            to_minor(Decimal::from(MAX_AMOUNT_MINOR / 100)),
            Some(MAX_AMOUNT_MINOR)
        );
    }

    #[test]
    fn minor_units_convert_back() {
        assert_eq!(from_minor(7_050), Decimal::from_str("70.50").unwrap());
    }

    #[test]
    fn amounts_are_formatted_for_colombia() {
        assert_eq!(format_cop(315_000), "$ 3.150,00");
        assert_eq!(format_cop(0), "$ 0,00");
        assert_eq!(format_cop(123_456_789), "$ 1.234.567,89");
        assert_eq!(format_cop(-50_000), "-$ 500,00");
    }
}
