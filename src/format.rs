use chrono::{Datelike, NaiveDate, NaiveDateTime};

const WEEKDAYS_ES: [&str; 7] = [
    "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
];

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
    "septiembre", "octubre", "noviembre", "diciembre",
];

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn date_words(d: NaiveDate) -> String {
    format!(
        "{}, {:02} de {} del {}",
        WEEKDAYS_ES[d.weekday().num_days_from_monday() as usize],
        d.day(),
        MONTHS_ES[d.month0() as usize],
        d.year()
    )
}

/// `"Martes, 15 de abril del 2014"`.
pub fn long_date_es(d: NaiveDate) -> String {
    capitalize(&date_words(d))
}

/// `"Martes, 15 de abril del 2014, 08:05"`.
pub fn long_datetime_es(dt: NaiveDateTime) -> String {
    capitalize(&format!("{}, {}", date_words(dt.date()), dt.format("%H:%M")))
}

/// Long label for a `YYYY-MM-DD` string, `None` when it does not parse.
pub fn long_date_label(s: &str) -> Option<String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .map(long_date_es)
}

/// Whole numbers without a fraction, others as-is.
pub fn plain_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Two decimals with comma thousands separators: `1234.5` → `"1,234.50"`.
pub fn fixed2_grouped(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if v < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac)
}
