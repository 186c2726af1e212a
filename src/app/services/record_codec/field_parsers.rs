//! Field parsing and formatting utilities
//!
//! Helpers that turn the characters of one fixed-width field (or one
//! delimited column) into a [`Value`] and back, plus record-date
//! derivation from the year/month/day fields.

use crate::error::{Error, Result};
use crate::models::{round_half_away, Value};
use crate::schema::{FieldSpec, Scale, SectionSchema, Sentinel};
use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

/// Characters `[start, start + width)` of a line, clamped to the line end.
///
/// A zero width reads to the end of the line. Short lines yield a shorter
/// (possibly empty) slice so truncated trailing fields decode as missing.
pub fn slice_field(line: &str, start: usize, width: usize) -> Result<&str> {
    let len = line.len();
    let begin = start.min(len);
    let end = if width == 0 { len } else { (start + width).min(len) };
    line.get(begin..end).ok_or_else(|| {
        Error::malformed_record(format!(
            "field at {}..{} splits a multi-byte character",
            begin, end
        ))
    })
}

/// Parse the raw characters of a positional field
pub fn parse_positional_value(
    section: &SectionSchema,
    field: &FieldSpec,
    raw: &str,
    float_values: bool,
) -> Result<Value> {
    match field.scale {
        Scale::Text => {
            let text = raw.trim_end();
            Ok(if text.is_empty() {
                Value::Missing
            } else {
                Value::Text(text.to_string())
            })
        }
        scale => {
            let text = raw.trim();
            if text.is_empty() {
                return Ok(Value::Missing);
            }
            let number = text.parse::<i64>().map_err(|_| {
                Error::malformed_record(format!(
                    "{}.{}: '{}' is not an integer",
                    section.name(),
                    field.name,
                    text
                ))
            })?;
            if field.is_sentinel_number(number) {
                return Ok(Value::Missing);
            }
            Ok(scaled_value(number, scale, float_values))
        }
    }
}

/// Parse one delimited column value for a field.
///
/// Decimal text is converted to the scaled integer before the sentinel
/// comparison, so `-99.99` with divisor 100 matches sentinel `-9999`.
pub fn parse_delimited_value(
    section: &SectionSchema,
    field: &FieldSpec,
    column: &str,
    float_values: bool,
) -> Result<Value> {
    let raw = match field.offset {
        Some(offset) => slice_field(column, offset, field.width)?,
        None if column.trim().len() > field.width => return Ok(Value::Missing),
        None => column,
    };

    let text = match field.scale {
        Scale::Text => raw.trim_end(),
        _ => raw.trim(),
    };
    if text.is_empty() || field.is_sentinel_text(text) {
        return Ok(Value::Missing);
    }

    match field.scale {
        Scale::Text => Ok(Value::Text(text.to_string())),
        scale => {
            if text.to_ascii_lowercase().contains("nan") {
                return Ok(Value::Missing);
            }
            let number = parse_scaled(text, scale.divisor()).ok_or_else(|| {
                Error::malformed_record(format!(
                    "{}.{}: '{}' is not numeric",
                    section.name(),
                    field.name,
                    text
                ))
            })?;
            if field.is_sentinel_number(number) {
                return Ok(Value::Missing);
            }
            Ok(scaled_value(number, scale, float_values))
        }
    }
}

/// Integer or decimal text as a raw fixed-point integer
fn parse_scaled(text: &str, divisor: u32) -> Option<i64> {
    if let Ok(number) = text.parse::<i64>() {
        return number.checked_mul(i64::from(divisor));
    }
    let real = text.parse::<f64>().ok()?;
    real.is_finite()
        .then(|| round_half_away(real * f64::from(divisor)))
}

fn scaled_value(raw: i64, scale: Scale, float_values: bool) -> Value {
    match scale {
        Scale::Fixed(divisor) if float_values => Value::Decimal(raw as f64 / f64::from(divisor)),
        _ => Value::Integer(raw),
    }
}

/// Format a value into exactly `field.width` characters.
///
/// Text is left-justified, numbers right-justified, missing values become
/// spaces. Variable-width fields are written as-is.
pub fn format_positional_value(section: &SectionSchema, field: &FieldSpec, value: &Value) -> Result<String> {
    let text = match (field.scale, value) {
        (_, Value::Missing) => String::new(),
        (Scale::Text, Value::Text(s)) => s.clone(),
        (Scale::Text, Value::Integer(v)) => v.to_string(),
        (scale, Value::Integer(_) | Value::Decimal(_)) if scale.is_numeric() => value
            .scaled_integer(scale.divisor())
            .map(|raw| raw.to_string())
            .unwrap_or_default(),
        (_, other) => {
            return Err(Error::malformed_record(format!(
                "{}.{}: cannot encode {:?}",
                section.name(),
                field.name,
                other
            )));
        }
    };

    if field.is_variable_width() {
        return Ok(text);
    }
    if text.len() > field.width {
        return Err(Error::field_overflow(section.name(), field.name, text, field.width));
    }

    // Widths are byte counts, matching `slice_field`.
    let padding = " ".repeat(field.width - text.len());
    Ok(match field.scale {
        Scale::Text => text + &padding,
        _ => padding + &text,
    })
}

/// Format a value as delimited column text; missing writes the sentinel
pub fn format_delimited_value(field: &FieldSpec, value: &Value) -> String {
    match (field.scale, value) {
        (_, Value::Missing) => match field.missing {
            Some(Sentinel::Text(s)) => s.to_string(),
            Some(Sentinel::Number(raw)) => format_fixed(raw, field.scale),
            None => String::new(),
        },
        (Scale::Text, Value::Text(s)) => s.clone(),
        (scale, v) => match v.scaled_integer(scale.divisor()) {
            Some(raw) => format_fixed(raw, scale),
            None => v.as_text().unwrap_or_default().to_string(),
        },
    }
}

fn format_fixed(raw: i64, scale: Scale) -> String {
    match scale {
        Scale::Fixed(divisor) => format!(
            "{:.*}",
            scale.decimals(),
            raw as f64 / f64::from(divisor)
        ),
        _ => raw.to_string(),
    }
}

/// Calendar date of a record from its year, month and day fields.
///
/// A missing day, or a day below 1, becomes the first of the month; a day
/// past the end of the month is clamped to its last day.
pub fn record_date(yr: Option<i64>, mo: Option<i64>, dy: Option<i64>) -> Result<NaiveDate> {
    let year = yr
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| Error::malformed_record("missing year"))?;
    let month = mo
        .and_then(|m| u32::try_from(m).ok())
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| Error::malformed_record(format!("{}: missing or invalid month", year)))?;

    let day = match dy {
        Some(d) if d >= 1 => u32::try_from(d).unwrap_or(u32::MAX),
        Some(d) => {
            info!("{}-{:02}: set dy {} to 1", year, month, d);
            1
        }
        None => {
            info!("{}-{:02}: set missing dy to 1", year, month);
            1
        }
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::malformed_record(format!("{}-{:02}: invalid date", year, month)))?;
    let last_day = month_end(first).day();

    if day > last_day {
        let clamped = month_end(first);
        warn!("{}: set {}-{:02}-{} to {}", clamped, year, month, day, clamped);
        return Ok(clamped);
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::malformed_record(format!("{}-{:02}-{}: invalid date", year, month, day)))
}

fn month_end(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}
