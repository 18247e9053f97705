use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

const CURRENCY_SYMBOL: &str = "₱";

/// Formats an amount as pesos with thousands separators and two decimal places,
/// e.g. `₱1,234.56` or `-₱1,234.56`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    // Always two digits after the point, even for whole amounts.
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "{}{}{}.{}",
        sign,
        CURRENCY_SYMBOL,
        group_thousands(whole),
        fraction
    )
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `Jan 5, 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `Monday, January 5, 2026`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("0", "₱0.00")]
    #[case("5", "₱5.00")]
    #[case("1234.56", "₱1,234.56")]
    #[case("999.999", "₱1,000.00")]
    #[case("1234567.8", "₱1,234,567.80")]
    #[case("100000", "₱100,000.00")]
    #[case("0.005", "₱0.01")]
    #[case("-0.004", "₱0.00")]
    #[case("-1234.56", "-₱1,234.56")]
    #[case("-0.5", "-₱0.50")]
    fn currency(#[case] amount: &str, #[case] expected: &str) {
        assert_eq!(format_currency(Decimal::from_str(amount).unwrap()), expected);
    }

    #[test]
    fn dates() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2026");
        assert_eq!(format_long_date(date), "Monday, January 5, 2026");
    }
}
