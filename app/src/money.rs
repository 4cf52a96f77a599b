//! Exact monetary amounts. All invoice totals are stored as integer cents;
//! the decimal form only exists at the API boundary.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("total must be a decimal number with at most 2 fraction digits (e.g. 10.05)")]
pub struct ParseMoneyError;

/// Hundredths of a US dollar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cents(pub i64);

impl Cents {
    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }
}

/// Converts a decimal string like "10.05" into cents, using integer
/// arithmetic only. Accepts `^\d+(\.\d{1,2})?$`; the fractional part is
/// right-padded to two digits ("10.5" means 1050 cents).
pub fn parse_decimal(input: &str) -> Result<Cents, ParseMoneyError> {
    let input = input.trim();
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseMoneyError);
    }
    let fraction_cents = match fraction.len() {
        0 if !input.contains('.') => 0,
        1 => parse_digits(fraction)? * 10,
        2 => parse_digits(fraction)?,
        _ => return Err(ParseMoneyError),
    };
    let whole: i64 = whole.parse().map_err(|_| ParseMoneyError)?;
    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction_cents))
        .map(Cents)
        .ok_or(ParseMoneyError)
}

fn parse_digits(s: &str) -> Result<i64, ParseMoneyError> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().map_err(|_| ParseMoneyError)
    } else {
        Err(ParseMoneyError)
    }
}

/// Formats cents as US dollars with thousands grouping and 0-2 fraction
/// digits: 1000 -> "$10", 1050 -> "$10.5", 1005 -> "$10.05".
pub fn format_usd(cents: Cents) -> String {
    let dollars = group_thousands(cents.0 / 100);
    match cents.0 % 100 {
        0 => format!("${}", dollars),
        tens if tens % 10 == 0 => format!("${}.{}", dollars, tens / 10),
        frac => format!("${}.{:02}", dollars, frac),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_amounts() {
        assert_eq!(parse_decimal("10"), Ok(Cents(1000)));
        assert_eq!(parse_decimal("100"), Ok(Cents(10000)));
        assert_eq!(parse_decimal("0"), Ok(Cents(0)));
    }

    #[test]
    fn parses_fractions_without_float_drift() {
        assert_eq!(parse_decimal("10.05"), Ok(Cents(1005)));
        assert_eq!(parse_decimal("0.1"), Ok(Cents(10)));
        assert_eq!(parse_decimal("10.5"), Ok(Cents(1050)));
        assert_eq!(parse_decimal("12.3"), Ok(Cents(1230)));
        // 29.99 is the classic float-drift case: 29.99 * 100 = 2998.9999...
        assert_eq!(parse_decimal("29.99"), Ok(Cents(2999)));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(parse_decimal(" 10.05 "), Ok(Cents(1005)));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "", ".", ".5", "10.", "10.123", "1,000", "-1", "+1", "1e3", "abc", "10.0.5", "10a",
        ] {
            assert_eq!(parse_decimal(bad), Err(ParseMoneyError), "input {:?}", bad);
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn formats_with_up_to_two_fraction_digits() {
        assert_eq!(format_usd(Cents(0)), "$0");
        assert_eq!(format_usd(Cents(1000)), "$10");
        assert_eq!(format_usd(Cents(1050)), "$10.5");
        assert_eq!(format_usd(Cents(1005)), "$10.05");
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_usd(Cents(123456789)), "$1,234,567.89");
        assert_eq!(format_usd(Cents(100000000)), "$1,000,000");
    }
}
