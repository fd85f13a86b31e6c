use crate::Extraction;
use artifact_protocol::{accumulate, Metadata, MetadataValue};
use once_cell::sync::Lazy;
use regex::Regex;

static META_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@Meta(?:data)?\s*\(\s*(\w+)\s*=\s*"([^"]+)"\s*\)"#).expect("meta pattern")
});

static PACKAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpackage\s+([\w.]+)\s*;").expect("package pattern"));

static CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:public\s+)?class\s+(\w+)").expect("class pattern"));

// Lazy `.*?` lets annotations, javadoc and modifiers sit between the marker and the signature.
static TEST_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)@Test\b.*?(?:public\s+)?void\s+(\w+)\s*\(").expect("test method pattern")
});

pub(crate) const PACKAGE_KEY: &str = "package";
pub(crate) const TEST_METHODS_KEY: &str = "test_methods";

pub(crate) fn extract(text: &str) -> Extraction {
    let mut metadata = Metadata::new();
    for caps in META_ANNOTATION.captures_iter(text) {
        accumulate(&mut metadata, &caps[1], caps[2].trim());
    }

    if let Some(package) = extract_package(text) {
        metadata.insert(PACKAGE_KEY.to_string(), MetadataValue::Single(package));
    }

    let test_methods = extract_test_methods(text);
    if !test_methods.is_empty() {
        metadata.insert(
            TEST_METHODS_KEY.to_string(),
            MetadataValue::List(test_methods.clone()),
        );
    }

    Extraction {
        metadata,
        query: None,
        class_name: extract_class_name(text),
        test_methods,
    }
}

pub fn extract_package(text: &str) -> Option<String> {
    PACKAGE.captures(text).map(|caps| caps[1].to_string())
}

pub fn extract_class_name(text: &str) -> Option<String> {
    CLASS.captures(text).map(|caps| caps[1].to_string())
}

pub fn extract_test_methods(text: &str) -> Vec<String> {
    TEST_METHOD
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}
