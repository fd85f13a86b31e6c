use crate::Extraction;
use artifact_protocol::{accumulate, Metadata, MetadataValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s*@(\w+):\s*(.+)").expect("directive pattern"));

static QUERY_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(?:-\s+)?sql:\s*(?:[|>][-+]?)?\s*$").expect("sql key pattern")
});

const METADATA_FIELD: &str = "metadata";
const MIN_BLOCK_INDENT: usize = 2;

pub(crate) fn extract(text: &str) -> Extraction {
    let mut metadata = directive_metadata(text);
    merge_document_metadata(text, &mut metadata);

    Extraction {
        metadata,
        query: extract_query_block(text),
        ..Extraction::default()
    }
}

fn directive_metadata(text: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in text.lines() {
        let Some(caps) = DIRECTIVE.captures(line) else {
            continue;
        };
        let value = caps[2].trim();
        if value.is_empty() {
            continue;
        }
        accumulate(&mut metadata, &caps[1], value);
    }
    metadata
}

/// Fold the document's `metadata:` mapping over the directive values; the document wins.
fn merge_document_metadata(text: &str, metadata: &mut Metadata) {
    let document: Value = match serde_yaml::from_str(text) {
        Ok(document) => document,
        Err(err) => {
            log::debug!("Structured body did not parse, keeping directives only: {err}");
            return;
        }
    };

    let Some(Value::Mapping(block)) = document.get(METADATA_FIELD).map(untag) else {
        return;
    };

    for (key, value) in block {
        let Some(key) = scalar_text(key) else {
            continue;
        };
        if let Some(value) = metadata_value(value) {
            metadata.insert(key.to_lowercase(), value);
        }
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn metadata_value(value: &Value) -> Option<MetadataValue> {
    match untag(value) {
        Value::Null => None,
        Value::Sequence(items) => Some(MetadataValue::List(
            items.iter().filter_map(scalar_text).collect(),
        )),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .ok()
            .map(|text| MetadataValue::Single(text.trim_end().to_string())),
        other => scalar_text(other).map(MetadataValue::Single),
    }
}

/// Literal block following a `sql:` key, dedented. `None` when no indented body follows.
pub fn extract_query_block(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = QUERY_KEY.captures(line) else {
            continue;
        };
        let min_indent = (caps[1].len() + 1).max(MIN_BLOCK_INDENT);

        let mut block: Vec<&str> = Vec::new();
        for next in &lines[idx + 1..] {
            if next.trim().is_empty() {
                block.push("");
                continue;
            }
            if indent_of(next) < min_indent {
                break;
            }
            block.push(next);
        }
        while block.last().is_some_and(|line| line.is_empty()) {
            block.pop();
        }

        if !block.is_empty() {
            return Some(dedent(&block));
        }
    }

    None
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn dedent(lines: &[&str]) -> String {
    let common = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(common..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit one `# @key: value` line per value; list values emit one line per element in order.
pub fn render_directives(metadata: &Metadata) -> String {
    let mut out = String::new();
    for (key, value) in metadata {
        for item in value.values() {
            out.push_str(&format!("# @{key}: {item}\n"));
        }
    }
    out
}
