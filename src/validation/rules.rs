//! Built-in rules. Type rules (email, phone, number, date, pattern, file)
//! never fail an empty value; only `required` enforces presence.

use crate::core::RawValue;
use crate::validation::ValidationResult;
use crate::validation::messages::Messages;
use crate::validation::registry::{RegexPolicy, Rule, into_rule};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use std::sync::{Arc, LazyLock};

const BYTES_PER_MB: f64 = 1_048_576.0;
const MAX_EMAIL_LOCAL_LEN: usize = 64;
const MAX_DOMAIN_LABEL_LEN: usize = 63;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email regex"));
static PHONE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{5,15}$").expect("phone regex"));

pub fn required(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, _: Option<&str>| {
        let present = match value {
            RawValue::Text(text) => !text.trim().is_empty(),
            RawValue::Files(files) => !files.is_empty(),
        };
        ValidationResult::check(present, &messages.required)
    })
}

pub fn email(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, _: Option<&str>| {
        let text = value.text();
        ValidationResult::check(text.is_empty() || is_valid_email(text), &messages.email)
    })
}

pub fn phone(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, _: Option<&str>| {
        let text = value.text();
        ValidationResult::check(text.is_empty() || is_valid_phone(text), &messages.phone)
    })
}

pub fn min_length(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, param: Option<&str>| {
        let Some(min) = parse_length_param(param) else {
            return ValidationResult::ok();
        };
        let count = value.text().chars().count() as f64;
        ValidationResult::check(
            count >= min,
            messages.min_length_message(param.unwrap_or_default()),
        )
    })
}

pub fn max_length(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, param: Option<&str>| {
        let Some(max) = parse_length_param(param) else {
            return ValidationResult::ok();
        };
        let count = value.text().chars().count() as f64;
        ValidationResult::check(
            count <= max,
            messages.max_length_message(param.unwrap_or_default()),
        )
    })
}

pub fn number(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, param: Option<&str>| {
        let text = value.text();
        if text.is_empty() {
            return ValidationResult::ok();
        }
        let (min, max) = parse_bounds(param.unwrap_or_default());
        let Some(number) = normalize_number(text) else {
            return ValidationResult::fail(&messages.number);
        };
        if let Some(min) = min
            && number < min
        {
            return ValidationResult::fail(messages.number_min_message(min));
        }
        if let Some(max) = max
            && number > max
        {
            return ValidationResult::fail(messages.number_max_message(max));
        }
        ValidationResult::ok()
    })
}

pub fn date(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, param: Option<&str>| {
        let text = value.text();
        if text.is_empty() {
            return ValidationResult::ok();
        }
        ValidationResult::check(is_valid_date(text, param), &messages.date)
    })
}

pub fn pattern(messages: Arc<Messages>, policy: RegexPolicy) -> Rule {
    into_rule(move |value: RawValue<'_>, param: Option<&str>| {
        let text = value.text();
        if text.is_empty() {
            return ValidationResult::ok();
        }
        let compiled = param
            .ok_or_else(|| "missing pattern".to_string())
            .and_then(|param| compile_pattern(param).map_err(|err| err.to_string()));
        match compiled {
            Ok(re) => ValidationResult::check(re.is_match(text), &messages.pattern),
            Err(err) => {
                tracing::warn!(pattern = ?param, error = %err, "invalid regex pattern");
                match policy {
                    RegexPolicy::FailOpen => ValidationResult::ok(),
                    RegexPolicy::FailClosed => ValidationResult::fail(&messages.pattern),
                }
            }
        }
    })
}

pub fn file(messages: Arc<Messages>) -> Rule {
    into_rule(move |value: RawValue<'_>, param: Option<&str>| {
        let Some(first) = value.files().first() else {
            return ValidationResult::ok();
        };
        let param = param.unwrap_or_default();
        let (max_size, types) = param.split_once(',').unwrap_or((param, ""));

        if let Ok(max_mb) = max_size.trim().parse::<f64>()
            && first.size as f64 > max_mb * BYTES_PER_MB
        {
            return ValidationResult::fail(&messages.file_size);
        }
        if !types.is_empty() && !types.split('|').any(|t| t == first.mime_type) {
            return ValidationResult::fail(&messages.file_type);
        }
        ValidationResult::ok()
    })
}

pub fn is_valid_email(value: &str) -> bool {
    if !EMAIL_SHAPE.is_match(value) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    local.chars().count() <= MAX_EMAIL_LOCAL_LEN
        && domain.split('.').all(|label| {
            let len = label.chars().count();
            (1..=MAX_DOMAIN_LABEL_LEN).contains(&len)
        })
}

/// Drops whitespace, `-`, `.`, parentheses and the general and
/// supplemental punctuation blocks.
pub fn strip_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| {
            !(c.is_whitespace()
                || matches!(c, '-' | '.' | '(' | ')')
                || ('\u{2000}'..='\u{206F}').contains(c)
                || ('\u{2E00}'..='\u{2E7F}').contains(c))
        })
        .collect()
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_DIGITS.is_match(&strip_phone(value))
}

/// De-localizes a number. Whichever of `.` and `,` occurs last is the
/// decimal separator; the other is a thousands separator.
pub fn normalize_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    let candidate = match (last_dot, last_comma) {
        (Some(dot), comma) if comma.is_none_or(|comma| dot > comma) => cleaned.replace(',', ""),
        (_, Some(_)) => cleaned.replace('.', "").replacen(',', ".", 1),
        _ => cleaned,
    };
    parse_float_prefix(&candidate)
}

/// Parses the longest leading `-?digits[.digits]` run.
fn parse_float_prefix(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    text[..end].parse::<f64>().ok()
}

fn parse_bounds(param: &str) -> (Option<f64>, Option<f64>) {
    let mut parts = param.split(',');
    let mut bound = || {
        parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .and_then(|p| p.parse::<f64>().ok())
    };
    let min = bound();
    let max = bound();
    (min, max)
}

fn parse_length_param(param: Option<&str>) -> Option<f64> {
    param?.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

const DIRECT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];
const DIRECT_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Accepts a value that reads as a calendar date on its own, or one whose
/// `-`/`/` separated parts line up with a `yyyy`/`yy`/`mm`/`dd` format.
pub fn is_valid_date(value: &str, format: Option<&str>) -> bool {
    if parses_as_date(value) {
        return true;
    }
    let Some(format) = format.filter(|f| !f.is_empty()) else {
        return false;
    };

    let format_parts: Vec<&str> = format.split(['-', '/']).collect();
    let value_parts: Vec<&str> = value.split(['-', '/']).collect();
    if format_parts.len() != value_parts.len() {
        return false;
    }

    let (mut year, mut month, mut day) = (None, 1u32, 1u32);
    for (token, part) in format_parts.iter().zip(value_parts) {
        let token = token.to_ascii_lowercase();
        if !matches!(token.as_str(), "yyyy" | "yy" | "mm" | "dd") {
            continue;
        }
        let Ok(n) = part.trim().parse::<i32>() else {
            return false;
        };
        match token.as_str() {
            "yyyy" => year = Some(n),
            "yy" => year = Some(n + 2000),
            "mm" => month = n.try_into().unwrap_or(0),
            _ => day = n.try_into().unwrap_or(0),
        }
    }

    year.and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .is_some()
}

/// Direct forms: ISO dates and date-times, `yyyy/mm/dd`, US `mm/dd/yyyy`,
/// month names with or without a comma (`March 7, 2024`, `7 Mar 2024`),
/// RFC 3339, RFC 2822, and the partial forms `2024`, `2024-03` and
/// `March 2024`.
fn parses_as_date(value: &str) -> bool {
    let value = value.trim();
    DIRECT_DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DIRECT_DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || parses_as_partial_date(value)
}

fn parses_as_partial_date(value: &str) -> bool {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    let first_of_month = |text: String, fmt: &str| NaiveDate::parse_from_str(&text, fmt).is_ok();
    first_of_month(format!("{value}-01"), "%Y-%m-%d")
        || first_of_month(format!("{value}/01"), "%Y/%m/%d")
        || first_of_month(format!("1 {value}"), "%d %B %Y")
        || first_of_month(format!("1 {value}"), "%d %b %Y")
}

/// Compiles a `regex|flags` parameter. The suffix after the last `|` is
/// read as flags only when it consists of flag letters; otherwise the whole
/// parameter is the expression.
pub fn compile_pattern(param: &str) -> Result<Regex, regex::Error> {
    let (source, flags) = match param.rsplit_once('|') {
        Some((source, flags)) if flags.chars().all(|c| "gimsuy".contains(c)) => (source, flags),
        _ => (param, ""),
    };
    RegexBuilder::new(source)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
}
