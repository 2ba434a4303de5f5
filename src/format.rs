//! Presentation helpers for the single supported locale (pt-BR, amounts in BRL).

use crate::utils::MonthKey;
use chrono::{Datelike, NaiveDate};

pub const CURRENCY_SYMBOL: &str = "R$";

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Formats an amount as Brazilian Real, e.g. `R$ 1.234,56`.
///
/// The symbol is separated by a no-break space (U+00A0), as browsers' `Intl`
/// formatter does for `pt-BR`. Negative amounts get a leading minus sign.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}\u{a0}{},{:02}",
        sign,
        CURRENCY_SYMBOL,
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Formats a date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Bucket label for the month containing `date`, e.g. `Janeiro 2024`.
pub fn month_year(date: NaiveDate) -> String {
    month_label(MonthKey::of(date))
}

pub fn month_label(key: MonthKey) -> String {
    format!("{} {}", month_name(key.month), key.year)
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Parses an amount typed in either `1234.56` or pt-BR `1.234,56` notation.
///
/// A comma is always the decimal separator; dots before it must be well-formed
/// thousands groups. Without a comma, dots that split the number into groups
/// of exactly three digits are thousands separators (`1.500` is 1500), and a
/// single dot anywhere else is a decimal point. Anything else is rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(CURRENCY_SYMBOL)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let (sign, body) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.as_str()),
    };

    let normalized = match body.split_once(',') {
        Some((integer, fraction)) => {
            let integer_ok = if integer.contains('.') {
                is_thousands_grouped(integer)
            } else {
                all_digits(integer)
            };
            if !integer_ok || !all_digits(fraction) {
                return None;
            }
            format!("{}.{}", integer.replace('.', ""), fraction)
        }
        None if is_thousands_grouped(body) => body.replace('.', ""),
        None => match body.split_once('.') {
            Some((integer, fraction)) if all_digits(integer) && all_digits(fraction) => {
                body.to_string()
            }
            Some(_) => return None,
            None if all_digits(body) => body.to_string(),
            None => return None,
        },
    };

    format!("{}{}", sign, normalized)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `1.234` or `12.345.678`: a leading group of 1-3 digits (not starting with
/// zero) followed by at least one dot-separated group of exactly three.
fn is_thousands_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let lead_ok = groups
        .next()
        .map(|g| all_digits(g) && g.len() <= 3 && !g.starts_with('0'))
        .unwrap_or(false);
    let mut rest = groups.peekable();
    lead_ok && rest.peek().is_some() && rest.all(|g| g.len() == 3 && all_digits(g))
}

fn group_thousands(mut units: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = units % 1000;
        units /= 1000;
        if units == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{:03}", group));
    }
    groups.reverse();
    groups.join(".")
}
