//! Spanish display formatting for dates, amounts and percentages.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub const MISSING_DATE: &str = "No especificado";
pub const MISSING_TIMESTAMP: &str = "N/A";

/// `19 de octubre de 2026`.
pub fn format_long_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!(
            "{} de {} de {}",
            d.day(),
            MONTHS[d.month0() as usize],
            d.year()
        ),
        None => MISSING_DATE.to_string(),
    }
}

/// `19/10/2026, 14:30`.
pub fn format_date_time(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%d/%m/%Y, %H:%M").to_string(),
        None => MISSING_TIMESTAMP.to_string(),
    }
}

/// Whole-peso amount with dot grouping, e.g. `$113.656`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{}%", value.round() as i64)
    } else {
        "0%".to_string()
    }
}

pub fn ratio_percent(part: f64, whole: f64) -> String {
    if whole == 0.0 {
        return "0%".to_string();
    }
    format_percent(part / whole * 100.0)
}
