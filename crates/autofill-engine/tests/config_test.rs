use autofill_common::{SemanticType, SiteId};
use autofill_engine::config::{
    AutofillConfig, ClassifierStrategy, ConfigError, ConfigLoader, MatchMode, SortPolicy,
};
use autofill_engine::dom::Document;
use autofill_engine::{Scanner, SelectorCatalog};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn defaults() {
    let config = AutofillConfig::default();
    assert_eq!(config.scanner.strategy, ClassifierStrategy::Catalog);
    assert_eq!(config.scanner.sort_policy, SortPolicy::ConfidenceFirst);
    assert_eq!(config.scanner.confidence_floor, 0.3);
    assert_eq!(config.scanner.native_type_threshold, 0.5);
    assert_eq!(config.scanner.native_type_confidence, 0.9);
    assert_eq!(config.filler.match_mode, MatchMode::ExactFirst);
    assert_eq!(config.filler.settle_delay_ms, 100);
    assert!(!config.filler.select_fires_input);
    assert!(config.session.auto_detect);
    assert_eq!(config.session.initial_scan_delay_ms, 1000);
    assert_eq!(config.session.rescan_debounce_ms, 1000);
    assert!(config.catalog.sites.is_empty());
}

#[tokio::test]
async fn partial_file_keeps_defaults() {
    let file = write_config(
        r#"
scanner:
  strategy: context
filler:
  match_mode: partial
session:
  rescan_debounce_ms: 250
"#,
    );
    let config = ConfigLoader::load_from(file.path()).await.unwrap();

    assert_eq!(config.scanner.strategy, ClassifierStrategy::Context);
    assert_eq!(config.scanner.confidence_floor, 0.3);
    assert_eq!(config.filler.match_mode, MatchMode::Partial);
    assert_eq!(config.filler.settle_delay_ms, 100);
    assert_eq!(config.session.rescan_debounce_ms, 250);
    assert_eq!(config.session.initial_scan_delay_ms, 1000);
}

#[tokio::test]
async fn empty_file_is_all_defaults() {
    let file = write_config("{}\n");
    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert_eq!(config.scanner.sort_policy, SortPolicy::ConfidenceFirst);
    assert!(config.session.auto_detect);
}

#[tokio::test]
async fn site_selectors_replace_builtin_lists() {
    let file = write_config(
        r#"
catalog:
  sites:
    lever:
      email:
        - 'input[data-qa="contact-email"]'
"#,
    );
    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    let catalog = SelectorCatalog::with_config(&config.catalog);
    assert_eq!(
        catalog.selectors_for(SiteId::Lever, SemanticType::Email),
        vec![r#"input[data-qa="contact-email"]"#.to_string()]
    );
    // Other sites and types are untouched.
    assert_eq!(
        catalog.selectors_for(SiteId::Generic, SemanticType::Email),
        SelectorCatalog::new().selectors_for(SiteId::Generic, SemanticType::Email)
    );

    let doc = Document::parse(
        r#"<form><input name="email"><input data-qa="contact-email"></form>"#,
    );
    let fields = Scanner::from_config(&config).scan(&doc, SiteId::Lever);
    let email = fields
        .iter()
        .find(|d| d.field.semantic_type == SemanticType::Email)
        .unwrap();
    assert_eq!(doc.attr(email.handle, "data-qa"), Some("contact-email"));
}

#[tokio::test]
async fn out_of_range_confidence_is_rejected() {
    let file = write_config("scanner:\n  confidence_floor: 1.5\n");
    let err = ConfigLoader::load_from(file.path()).await.unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("confidence_floor"));
}

#[tokio::test]
async fn unknown_strategy_is_a_parse_error() {
    let file = write_config("scanner:\n  strategy: psychic\n");
    let err = ConfigLoader::load_from(file.path()).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::load_from(&dir.path().join("absent.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
