use artifact_protocol::{Metadata, MetadataValue, SearchCriteria};

pub const KEYWORD_WEIGHT: f64 = 1.0;
pub const REPORT_TYPE_TEXT_WEIGHT: f64 = 2.0;
pub const REPORT_TYPE_METADATA_WEIGHT: f64 = 3.0;
pub const DOMAIN_WEIGHT: f64 = 2.0;
pub const CAPABILITY_WEIGHT: f64 = 2.0;
pub const TAG_WEIGHT: f64 = 1.0;

/// Additive, case-insensitive relevance of one artifact to `criteria`.
///
/// Not normalised by text length; empty criteria always score 0.
pub fn score(metadata: &Metadata, text: &str, criteria: &SearchCriteria) -> f64 {
    let text = text.to_lowercase();
    let mut score = 0.0;

    for keyword in &criteria.keywords {
        let keyword = keyword.to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        let spaced = keyword.replace('_', " ");
        if text.contains(&keyword) || text.contains(&spaced) {
            score += KEYWORD_WEIGHT;
        }
    }

    if let Some(report_type) = non_blank(criteria.report_type.as_deref()) {
        if text.contains(&report_type.to_lowercase()) {
            score += REPORT_TYPE_TEXT_WEIGHT;
        }
        if metadata_equals(metadata, "report_type", report_type) {
            score += REPORT_TYPE_METADATA_WEIGHT;
        }
    }

    if let Some(domain) = non_blank(criteria.domain.as_deref()) {
        if metadata_equals(metadata, "domain", domain) {
            score += DOMAIN_WEIGHT;
        }
    }

    if let Some(capability) = non_blank(criteria.capability.as_deref()) {
        if metadata_contains(metadata, "capability", capability) {
            score += CAPABILITY_WEIGHT;
        }
    }

    for tag in &criteria.tags {
        if metadata_contains(metadata, "tags", tag) {
            score += TAG_WEIGHT;
        }
    }

    score
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Exact (case-insensitive) match against a single-valued key.
fn metadata_equals(metadata: &Metadata, key: &str, expected: &str) -> bool {
    metadata
        .get(key)
        .and_then(MetadataValue::as_single)
        .is_some_and(|value| value.eq_ignore_ascii_case(expected))
}

/// Membership in a string-or-list key.
fn metadata_contains(metadata: &Metadata, key: &str, expected: &str) -> bool {
    metadata
        .get(key)
        .is_some_and(|value| value.contains_ignore_case(expected))
}
