use crate::error::Result;
use crate::literal::format_literal;
use crate::mask::CodeMask;
use crate::value::ParameterValue;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TYPE: &str = r"[\w.]+(?:\s*<[\w.,?\s<>]*>)?(?:\[\])*";
const MODIFIERS: &str = r"(?:(?:private|public|protected|static|final|transient|volatile)\s+)*";
const LITERAL: &str = r#"(?:"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|[^"';=\s])(?:"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|[^"';])*?"#;

/// Words that can precede `name = ...;` without being a type
const NOT_A_TYPE: &[&str] = &[
    "return", "new", "throw", "else", "case", "yield", "assert", "this", "super",
];

static ANNOTATED_ANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&annotated_pattern(r#"(?P<name>[^"\\\n]+)"#)).expect("valid annotated pattern")
});

/// A declaration found behind a `@Parameter("...")` annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub variable_name: String,
    pub declared_type: String,
    /// The literal as it is written in the source
    pub current_value: String,
}

/// Outcome of a rewrite, with the names that matched no declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionReport {
    pub source: String,
    pub applied: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Rewrite the literal of each named declaration; names that match nothing leave the text as is.
pub fn inject(text: &str, modifications: &BTreeMap<String, ParameterValue>) -> Result<String> {
    inject_with_report(text, modifications).map(|report| report.source)
}

/// Same as [`inject`], also reporting which names were applied and which were not found.
pub fn inject_with_report(
    text: &str,
    modifications: &BTreeMap<String, ParameterValue>,
) -> Result<InjectionReport> {
    let mut source = text.to_string();
    let mut applied = Vec::new();
    let mut unmatched = Vec::new();

    for (name, value) in modifications {
        match rewrite_first(&source, name, value)? {
            Some(rewritten) => {
                log::debug!("Injected `{name}` = {value}");
                source = rewritten;
                applied.push(name.clone());
            }
            None => {
                log::debug!("No declaration found for `{name}`");
                unmatched.push(name.clone());
            }
        }
    }

    Ok(InjectionReport {
        source,
        applied,
        unmatched,
    })
}

/// Annotated declarations in source order; the first declaration of a name wins.
pub fn extract_parameters(text: &str) -> BTreeMap<String, ParameterInfo> {
    let mask = CodeMask::scan(text);
    let mut params = BTreeMap::new();

    for caps in ANNOTATED_ANY.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if !mask.is_code(whole.start()) || !is_single_literal(&caps["lit"]) {
            continue;
        }
        params
            .entry(caps["name"].to_string())
            .or_insert_with(|| ParameterInfo {
                variable_name: caps["var"].to_string(),
                declared_type: normalize_type(&caps["ty"]),
                current_value: caps["lit"].trim().to_string(),
            });
    }
    params
}

/// Annotated rule first, bare declaration as fallback. Returns `None` when neither matches.
fn rewrite_first(text: &str, name: &str, value: &ParameterValue) -> Result<Option<String>> {
    let escaped = regex::escape(name);
    let annotated = compile(&annotated_pattern(&escaped));
    let bare = compile(&format!(r"\b(?P<ty>{TYPE})\s+{escaped}\s*=\s*(?P<lit>{LITERAL})\s*;"));
    let mask = CodeMask::scan(text);

    let found = first_code_match(&annotated, text, &mask, |caps| {
        is_single_literal(&caps["lit"])
    })
    .or_else(|| {
        first_code_match(&bare, text, &mask, |caps| {
            !NOT_A_TYPE.contains(&caps["ty"].trim()) && is_single_literal(&caps["lit"])
        })
    });
    let Some(caps) = found else {
        return Ok(None);
    };
    let (Some(ty), Some(lit)) = (caps.name("ty"), caps.name("lit")) else {
        return Ok(None);
    };

    let literal = format_literal(name, &normalize_type(ty.as_str()), value)?;
    let mut rewritten = String::with_capacity(text.len() + literal.len());
    rewritten.push_str(&text[..lit.start()]);
    rewritten.push_str(&literal);
    rewritten.push_str(&text[lit.end()..]);
    Ok(Some(rewritten))
}

fn annotated_pattern(name: &str) -> String {
    format!(
        r#"@Parameter\s*\(\s*(?:value\s*=\s*)?"{name}"\s*\)\s*{MODIFIERS}(?P<ty>{TYPE})\s+(?P<var>\w+)\s*=\s*(?P<lit>{LITERAL})\s*;"#
    )
}

fn compile(pattern: &str) -> Regex {
    // Every interpolated name is escaped, so the pattern is always well-formed.
    Regex::new(pattern).unwrap_or_else(|err| unreachable!("invalid injector pattern: {err}"))
}

/// First match that starts in code (not in a comment or string) and passes `accept`.
fn first_code_match<'t>(
    re: &Regex,
    text: &'t str,
    mask: &CodeMask,
    accept: impl Fn(&Captures<'t>) -> bool,
) -> Option<Captures<'t>> {
    let mut start = 0;
    while start <= text.len() {
        let caps = re.captures_at(text, start)?;
        let whole = caps.get(0)?;
        if mask.is_code(whole.start()) && accept(&caps) {
            return Some(caps);
        }
        let step = text[whole.start()..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        start = whole.start() + step;
    }
    None
}

/// False when a comma outside brackets and quotes splits the text, as in `int a = 1, b = 2;`.
fn is_single_literal(literal: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in literal.chars() {
        if let Some(open) = quote {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if ch == open => quote = None,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    true
}

fn normalize_type(token: &str) -> String {
    token.split_whitespace().collect::<Vec<_>>().join(" ")
}
