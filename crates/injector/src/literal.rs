use crate::error::{InjectorError, Result};
use crate::value::ParameterValue;

/// The type vocabulary the formatter understands, read from the declaration's type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Text,
    Byte,
    Short,
    Integer,
    Long,
    Double,
    Float,
    Boolean,
    /// `java.util.Date` and friends
    Date,
    /// `java.time.LocalDate`
    LocalDate,
    /// `List<String>` and other list-shaped collections
    List,
    /// Anything else is written as a quoted string
    Other(String),
}

impl DeclaredType {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        let simple = token.rsplit('.').next().unwrap_or(token);
        let base = simple.split('<').next().unwrap_or(simple).trim();

        match base.to_ascii_lowercase().as_str() {
            "string" | "charsequence" => Self::Text,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "int" | "integer" => Self::Integer,
            "long" => Self::Long,
            "double" => Self::Double,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "localdate" => Self::LocalDate,
            lower if lower.starts_with("list") || lower.ends_with("list") => Self::List,
            _ => Self::Other(token.to_string()),
        }
    }
}

/// Render `value` as a Java literal for a field declared with `type_token`.
pub fn format_literal(name: &str, type_token: &str, value: &ParameterValue) -> Result<String> {
    if value.is_null() {
        return Ok("null".to_string());
    }

    let invalid = || InjectorError::InvalidLiteral {
        name: name.to_string(),
        declared_type: type_token.to_string(),
        value: value.to_string(),
    };

    let literal = match DeclaredType::parse(type_token) {
        DeclaredType::Text | DeclaredType::Other(_) => quote(&value.to_string()),
        DeclaredType::Byte => within(value, i8::MIN, i8::MAX).ok_or_else(invalid)?.to_string(),
        DeclaredType::Short => within(value, i16::MIN, i16::MAX).ok_or_else(invalid)?.to_string(),
        DeclaredType::Integer => within(value, i32::MIN, i32::MAX).ok_or_else(invalid)?.to_string(),
        DeclaredType::Long => format!("{}L", as_integer(value).ok_or_else(invalid)?),
        DeclaredType::Double => format!("{}d", decimal(as_float(value).ok_or_else(invalid)?)),
        DeclaredType::Float => format!("{}f", decimal(as_single(value).ok_or_else(invalid)?)),
        DeclaredType::Boolean => as_bool(value).ok_or_else(invalid)?.to_string(),
        DeclaredType::Date => format!("java.sql.Date.valueOf({})", quote(&date_text(value))),
        DeclaredType::LocalDate => format!("LocalDate.parse({})", quote(&date_text(value))),
        DeclaredType::List => format!("Arrays.asList({})", list_items(value).join(", ")),
    };
    Ok(literal)
}

/// Java string literal with the characters that would break it escaped.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn as_integer(value: &ParameterValue) -> Option<i64> {
    match value {
        ParameterValue::Integer(number) => Some(*number),
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        ParameterValue::Float(number)
            if number.fract() == 0.0 && *number >= i64::MIN as f64 && *number < i64::MAX as f64 =>
        {
            Some(*number as i64)
        }
        ParameterValue::Text(text) => {
            let text = text.trim();
            let text = text.strip_suffix(['L', 'l']).unwrap_or(text);
            text.parse::<i64>().ok()
        }
        _ => None,
    }
}

fn as_float(value: &ParameterValue) -> Option<f64> {
    let number = match value {
        ParameterValue::Integer(number) => *number as f64,
        ParameterValue::Float(number) => *number,
        ParameterValue::Text(text) => {
            let text = text.trim();
            let text = text.strip_suffix(['d', 'D', 'f', 'F']).unwrap_or(text);
            text.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn within<T: Into<i64>>(value: &ParameterValue, min: T, max: T) -> Option<i64> {
    as_integer(value).filter(|number| (min.into()..=max.into()).contains(number))
}

/// A value a Java `float` literal can hold: finite, and not a nonzero that rounds to zero.
fn as_single(value: &ParameterValue) -> Option<f64> {
    as_float(value).filter(|number| {
        let narrowed = *number as f32;
        narrowed.is_finite() && (narrowed != 0.0 || *number == 0.0)
    })
}

fn as_bool(value: &ParameterValue) -> Option<bool> {
    match value {
        ParameterValue::Bool(flag) => Some(*flag),
        ParameterValue::Integer(number) => Some(*number != 0),
        ParameterValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => Some(true),
            "false" | "no" | "n" | "0" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Always carries a decimal point so the suffix yields a floating literal.
fn decimal(number: f64) -> String {
    let text = number.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

fn date_text(value: &ParameterValue) -> String {
    match value {
        ParameterValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn list_items(value: &ParameterValue) -> Vec<String> {
    let element = |item: &ParameterValue| match item {
        ParameterValue::Null => "null".to_string(),
        other => quote(&other.to_string()),
    };

    match value {
        ParameterValue::List(items) => items.iter().map(element).collect(),
        ParameterValue::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(quote)
            .collect(),
        scalar => vec![element(scalar)],
    }
}
