//! Display-text rendering
//!
//! Structure inference reads a cell's *display text*: the string a
//! spreadsheet application would show for the value under its number format.
//! Rendering covers the formats this model reads and writes (accounting
//! currency, percent, thousands-separated integers, m/d/y dates); anything
//! else falls back to a General rendering.

use crate::cell::CellValue;
use crate::style::NumberFormat;
use chrono::{Duration, NaiveDate};

/// Render a value as its on-screen text
pub fn display_text(value: &CellValue, format: &NumberFormat) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => render_number(*n, format),
        CellValue::Formula { cached, .. } => match cached {
            Some(inner) => display_text(inner, format),
            None => String::new(),
        },
    }
}

/// Serial-date value for a calendar date (1900 date system)
pub fn date_to_serial(date: NaiveDate) -> f64 {
    match serial_epoch() {
        Some(base) => (date - base).num_days() as f64,
        None => 0.0,
    }
}

fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

fn render_number(n: f64, format: &NumberFormat) -> String {
    if format.is_date() {
        return render_date(n);
    }
    if format.is_currency() {
        return render_currency(n, format.has_cents());
    }
    if format.is_percent() {
        return render_percent(n, format.has_paren_negative());
    }
    if format.has_thousands() {
        return render_thousands(n);
    }
    render_general(n)
}

fn render_general(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn render_currency(n: f64, cents: bool) -> String {
    let decimals = if cents { 2 } else { 0 };
    let body = format!("${}", grouped_fixed(n.abs(), decimals));
    if n < 0.0 {
        format!("({})", body)
    } else {
        body
    }
}

fn render_percent(n: f64, paren_negative: bool) -> String {
    let body = format!("{:.2}%", n.abs() * 100.0);
    if n < 0.0 {
        if paren_negative {
            format!("({})", body)
        } else {
            format!("-{}", body)
        }
    } else {
        body
    }
}

fn render_thousands(n: f64) -> String {
    let body = grouped_fixed(n.abs(), 0);
    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

fn render_date(serial: f64) -> String {
    let days = serial.trunc() as i64;
    match serial_epoch().and_then(|base| base.checked_add_signed(Duration::days(days))) {
        Some(date) => date.format("%m/%d/%Y").to_string(),
        None => render_general(serial),
    }
}

/// Fixed-decimal rendering with thousands separators in the integer part
fn grouped_fixed(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = group_thousands(int_part);
    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(bytes.len() + bytes.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}
