use artifact_extractor::{extract, read_artifact, render_directives, ExtractorError};
use artifact_protocol::{ArtifactKind, MetadataValue};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

const FRONT_RUNNING: &str = r#"# Front running detection
# @report_type: front_running
# @domain: trade_surveillance
# @tags: equities
# @tags: intraday

metadata:
  domain: market_abuse
  owner: surveillance-team
  tags:
    - equities
    - broker

parameters:
  window_seconds: 60

sql: |
  SELECT o.order_id
  FROM orders o

  WHERE o.side = 'BUY'
"#;

#[test]
fn document_block_overrides_directives() {
    let extraction = extract(FRONT_RUNNING, ArtifactKind::StructuredConfig);
    let meta = &extraction.metadata;

    assert_eq!(meta.get("report_type"), Some(&"front_running".into()));
    assert_eq!(meta.get("domain"), Some(&"market_abuse".into()));
    assert_eq!(meta.get("owner"), Some(&"surveillance-team".into()));
    assert_eq!(
        meta.get("tags"),
        Some(&MetadataValue::List(vec!["equities".into(), "broker".into()]))
    );
    assert_eq!(
        extraction.query.as_deref(),
        Some("SELECT o.order_id\nFROM orders o\n\nWHERE o.side = 'BUY'")
    );
}

#[test]
fn rendered_directives_extract_to_the_same_mapping() {
    let directives_only = "# @report_type: spoofing\n# @tags: a\n# @tags: b\n# @tags: c\n# @owner: ops\n";
    let first = extract(directives_only, ArtifactKind::StructuredConfig).metadata;

    let rendered = render_directives(&first);
    let second = extract(&rendered, ArtifactKind::StructuredConfig).metadata;
    assert_eq!(second, first);
    assert_eq!(
        second.get("tags").map(MetadataValue::values),
        Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
    );
}

#[test]
fn read_artifact_picks_kind_from_extension() {
    let dir = tempdir().unwrap();
    let yaml = dir.path().join("front_running.yaml");
    let java = dir.path().join("FrontRunningTest.java");
    let other = dir.path().join("README.md");
    fs::write(&yaml, FRONT_RUNNING).unwrap();
    fs::write(&java, "public class FrontRunningTest {}").unwrap();
    fs::write(&other, "# @report_type: nope").unwrap();

    assert_eq!(read_artifact(&yaml).unwrap().0, ArtifactKind::StructuredConfig);
    assert_eq!(read_artifact(&java).unwrap().0, ArtifactKind::SourceTest);
    assert!(matches!(
        read_artifact(&other),
        Err(ExtractorError::UnsupportedKind(_))
    ));
    assert!(matches!(
        read_artifact(&dir.path().join("gone.yml")),
        Err(ExtractorError::Io { .. })
    ));
}
