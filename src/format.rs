//! Value formatting used when binding application data to the form.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Smallest subscription accepted by the programme, printed on the form.
pub const MINIMUM_SUBSCRIPTION: i64 = 5_000;
/// Largest subscription accepted by the programme, printed on the form.
pub const MAXIMUM_SUBSCRIPTION: i64 = 50_000_000;

/// Amounts are supported up to (but excluding) one quadrillion Naira.
const AMOUNT_LIMIT: u64 = 1_000_000_000_000_000;

const UNITS: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];
const SCALES: [&str; 5] = ["", "Thousand", "Million", "Billion", "Trillion"];

/// An amount split into whole Naira and Kobo after rounding to two decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NairaAmount {
    pub naira: u64,
    pub kobo: u8,
}

impl NairaAmount {
    /// Splits `amount`, returning `None` for negative amounts or amounts beyond the supported
    /// range.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return None;
        }
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let naira = rounded.trunc().to_u64()?;
        if naira >= AMOUNT_LIMIT {
            return None;
        }
        let kobo = ((rounded - rounded.trunc()) * Decimal::ONE_HUNDRED).to_u8()?;
        Some(Self { naira, kobo })
    }

    /// Naira digits without grouping, e.g. `"5000"`.
    pub fn naira_digits(&self) -> String {
        self.naira.to_string()
    }

    /// Two-digit Kobo part, e.g. `"05"`.
    pub fn kobo_digits(&self) -> String {
        format!("{:02}", self.kobo)
    }

    /// Display form printed on the form, e.g. `"N5,000.00"`.
    pub fn display(&self) -> String {
        format!("N{}.{:02}", group_thousands(self.naira), self.kobo)
    }

    /// The amount in words, e.g. `"Fifty Million Naira and Twenty Five Kobo"`.
    pub fn in_words(&self) -> String {
        let mut words = format!("{} Naira", number_to_words(self.naira));
        if self.kobo > 0 {
            words.push_str(" and ");
            words.push_str(&number_to_words(u64::from(self.kobo)));
            words.push_str(" Kobo");
        }
        words
    }
}

/// Converts a monetary amount to its Naira and Kobo wording.
///
/// Returns `None` when the amount is negative or too large to be spelled out.
pub fn amount_in_words(amount: Decimal) -> Option<String> {
    NairaAmount::from_decimal(amount).map(|amount| amount.in_words())
}

/// Formats an amount for display with thousands separators and the Naira prefix.
pub fn format_naira(amount: Decimal) -> Option<String> {
    NairaAmount::from_decimal(amount).map(|amount| amount.display())
}

/// Spells out a whole number in English words using the form's conventions.
///
/// Hundreds are joined to their remainder with "and" ("One Hundred and Five"); tens and units
/// are separated by a space ("Twenty Five").
pub fn number_to_words(number: u64) -> String {
    if number == 0 {
        return "Zero".to_owned();
    }

    let mut groups = Vec::new();
    let mut rest = number;
    while rest > 0 {
        groups.push((rest % 1000) as u16);
        rest /= 1000;
    }

    let mut words: Vec<String> = Vec::new();
    for (scale, group) in groups.iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        let mut chunk = three_digits_to_words(*group);
        if let Some(suffix) = SCALES.get(scale).filter(|suffix| !suffix.is_empty()) {
            chunk.push(' ');
            chunk.push_str(suffix);
        }
        words.push(chunk);
    }
    words.join(" ")
}

fn three_digits_to_words(group: u16) -> String {
    let hundreds = usize::from(group / 100);
    let remainder = group % 100;

    let tail = two_digits_to_words(remainder);
    match (hundreds, tail.is_empty()) {
        (0, _) => tail,
        (h, true) => format!("{} Hundred", UNITS[h]),
        (h, false) => format!("{} Hundred and {}", UNITS[h], tail),
    }
}

fn two_digits_to_words(value: u16) -> String {
    let tens = usize::from(value / 10);
    let units = usize::from(value % 10);
    match tens {
        0 => UNITS[units].to_owned(),
        1 => TEENS[units].to_owned(),
        _ if units == 0 => TENS[tens].to_owned(),
        _ => format!("{} {}", TENS[tens], UNITS[units]),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Normalises a Nigerian phone number to its international `+234` form.
///
/// Every character other than digits and `+` is removed first. Local numbers with a leading `0`
/// and bare `234` numbers gain the `+234` prefix; anything else is kept as cleaned.
pub fn normalize_phone(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if let Some(local) = cleaned.strip_prefix('0') {
        format!("+234{local}")
    } else if cleaned.starts_with("234") {
        format!("+{cleaned}")
    } else {
        cleaned
    }
}

/// Formats a date the way the paper form expects it (`DD/MM/YYYY`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal")
    }

    #[test]
    fn minimum_subscription_in_words() {
        assert_eq!(
            amount_in_words(Decimal::from(MINIMUM_SUBSCRIPTION)).as_deref(),
            Some("Five Thousand Naira")
        );
    }

    #[test]
    fn maximum_subscription_in_words() {
        assert_eq!(
            amount_in_words(Decimal::from(MAXIMUM_SUBSCRIPTION)).as_deref(),
            Some("Fifty Million Naira")
        );
    }

    #[test]
    fn fractional_amount_includes_kobo() {
        assert_eq!(
            amount_in_words(dec("50000000.25")).as_deref(),
            Some("Fifty Million Naira and Twenty Five Kobo")
        );
        assert_eq!(
            amount_in_words(dec("7250.5")).as_deref(),
            Some("Seven Thousand Two Hundred and Fifty Naira and Fifty Kobo")
        );
    }

    #[test]
    fn kobo_rounds_half_away_from_zero() {
        let amount = NairaAmount::from_decimal(dec("5000.005")).expect("in range");
        assert_eq!(amount, NairaAmount { naira: 5000, kobo: 1 });
        let carried = NairaAmount::from_decimal(dec("5000.999")).expect("in range");
        assert_eq!(carried, NairaAmount { naira: 5001, kobo: 0 });
    }

    #[test]
    fn zero_groups_do_not_leave_gaps() {
        assert_eq!(number_to_words(1_005), "One Thousand Five");
        assert_eq!(number_to_words(2_000_010), "Two Million Ten");
        assert_eq!(number_to_words(115), "One Hundred and Fifteen");
        assert_eq!(number_to_words(0), "Zero");
    }

    #[test]
    fn negative_and_oversized_amounts_are_rejected() {
        assert_eq!(amount_in_words(dec("-1")), None);
        assert_eq!(amount_in_words(dec("1000000000000000")), None);
        assert!(amount_in_words(dec("999999999999999.99")).is_some());
    }

    #[test]
    fn naira_display_groups_thousands() {
        assert_eq!(format_naira(dec("5000")).as_deref(), Some("N5,000.00"));
        assert_eq!(format_naira(dec("50000000")).as_deref(), Some("N50,000,000.00"));
        assert_eq!(format_naira(dec("999.5")).as_deref(), Some("N999.50"));
    }

    #[test]
    fn phone_numbers_are_normalised() {
        assert_eq!(normalize_phone("0803 123 4567"), "+2348031234567");
        assert_eq!(normalize_phone("234-803-123-4567"), "+2348031234567");
        assert_eq!(normalize_phone("+234 (803) 123 4567"), "+2348031234567");
        assert_eq!(normalize_phone("+44 20 7946 0958"), "+442079460958");
    }

    #[test]
    fn dates_use_day_month_year() {
        let date = NaiveDate::from_ymd_opt(1985, 3, 7).expect("valid date");
        assert_eq!(format_date(date), "07/03/1985");
    }
}
