use artifact_protocol::{ArtifactKind, MetadataValue, SearchCriteria};
use artifact_search::{ArtifactSearch, SearchConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SPOOFING_TEST: &str = r#"package com.surveillance.tests;

import org.junit.Test;

/**
 * Spoofing Detection Test
 *
 * @Meta(capability = "detect_spoofing")
 * @Meta(domain = "trade_surveillance")
 * @Meta(report_type = "spoofing")
 * @Meta(config_file = "spoofing_detection.yml")
 */
public class SpoofingDetectionTest {
    @Parameter("cancelRateThreshold")
    private double cancelRateThreshold = 0.75;

    @Test
    public void testDetectSpoofing() {
        run();
    }

    @Test
    public void testSpoofingWithHighThreshold() {}
}
"#;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn surveillance_project() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(
        root,
        "configs/spoofing_detection.yml",
        "# @report_type: spoofing\n# @domain: trade_surveillance\n# @tags: orders\n# @tags: daily\nmetadata:\n  capability: detect_spoofing\nsql: |\n  SELECT * FROM orders\n",
    );
    write(
        root,
        "config/front_running.yaml",
        "# @report_type: front_running\n# @domain: trade_surveillance\nname: front running\n",
    );
    write(root, "yml/broken.yml", "# @report_type: spoofing\nkey: [unclosed\n");
    write(root, "yml/notes.txt", "spoofing spoofing spoofing");
    write(
        root,
        "src/test/java/com/surveillance/tests/SpoofingDetectionTest.java",
        SPOOFING_TEST,
    );
    write(root, "tests/Helper.java", "class Helper { String s = \"spoofing\"; }");
    temp
}

#[test]
fn results_are_positive_and_sorted() {
    let project = surveillance_project();
    let search = ArtifactSearch::new(project.path(), SearchConfig::default()).unwrap();
    let criteria = SearchCriteria::new()
        .keywords(["spoofing", "front_running", "orders"])
        .report_type("spoofing")
        .domain("trade_surveillance")
        .capability("detect_spoofing")
        .tags(["daily"]);

    let matches = search.search(&criteria);
    assert!(matches.iter().all(|artifact| artifact.score > 0.0));
    assert!(matches.windows(2).all(|pair| pair[0].score >= pair[1].score));

    let names: Vec<&str> = matches
        .iter()
        .map(|artifact| artifact.path.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "spoofing_detection.yml",
            "SpoofingDetectionTest.java",
            "broken.yml",
            "front_running.yaml",
        ]
    );

    // keyword x2 + report type (text + metadata) + domain + capability + tag
    assert_eq!(matches[0].score, 2.0 + 2.0 + 3.0 + 2.0 + 2.0 + 1.0);
    assert_eq!(
        matches[0].metadata.get("tags"),
        Some(&MetadataValue::List(vec!["orders".into(), "daily".into()]))
    );
}

#[test]
fn unparseable_yaml_still_yields_directives() {
    let project = surveillance_project();
    let search = ArtifactSearch::new(project.path(), SearchConfig::default()).unwrap();
    let broken = search.inspect("yml/broken.yml").unwrap();

    assert_eq!(broken.kind, ArtifactKind::StructuredConfig);
    assert_eq!(broken.report_type(), Some("spoofing"));
}

#[test]
fn javadoc_annotations_and_methods_are_extracted() {
    let project = surveillance_project();
    let search = ArtifactSearch::new(project.path(), SearchConfig::default()).unwrap();
    let test = search
        .inspect("src/test/java/com/surveillance/tests/SpoofingDetectionTest.java")
        .unwrap();

    assert_eq!(test.kind, ArtifactKind::SourceTest);
    assert_eq!(test.test_method.as_deref(), Some("testDetectSpoofing"));
    assert_eq!(
        test.metadata.get("test_methods").map(MetadataValue::values),
        Some(
            &[
                "testDetectSpoofing".to_string(),
                "testSpoofingWithHighThreshold".to_string()
            ][..]
        )
    );
    assert_eq!(
        test.qualified_class_name().as_deref(),
        Some("com.surveillance.tests.SpoofingDetectionTest")
    );
}

#[test]
fn custom_roots_replace_defaults() {
    let project = surveillance_project();
    let config = SearchConfig {
        config_dirs: vec!["config".into()],
        test_dirs: vec!["missing".into()],
        ..SearchConfig::default()
    };
    let search = ArtifactSearch::new(project.path(), config).unwrap();

    let matches = search.search(&SearchCriteria::new().domain("trade_surveillance"));
    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("config/front_running.yaml"));
}
