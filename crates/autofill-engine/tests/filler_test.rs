use autofill_common::{ClassifiedField, FillRequest, SemanticType, SiteId};
use autofill_engine::config::{FillerConfig, ScannerConfig};
use autofill_engine::dom::{Document, ElementHandle};
use autofill_engine::{FillTarget, Filler, Scanner, SelectorCatalog};
use std::cell::RefCell;
use std::rc::Rc;

fn scan_targets(doc: &Document) -> Vec<FillTarget> {
    Scanner::new(ScannerConfig::default(), SelectorCatalog::new())
        .scan(doc, SiteId::Generic)
        .into_iter()
        .map(FillTarget::from)
        .collect()
}

fn target(ty: SemanticType, selector: &str) -> FillTarget {
    FillTarget::from_selector(ClassifiedField {
        semantic_type: ty,
        selector: selector.to_string(),
        input_type: String::new(),
        name: String::new(),
        placeholder: String::new(),
        label: None,
        confidence: 0.9,
        visible: true,
    })
}

fn get(doc: &Document, selector: &str) -> ElementHandle {
    doc.query_selector(selector).unwrap().unwrap()
}

fn kinds_for(doc: &Document, handle: ElementHandle) -> Vec<String> {
    doc.events()
        .iter()
        .filter(|e| e.target == handle)
        .map(|e| e.kind.clone())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn select_picks_option_by_text_and_fires_change() {
    let mut doc = Document::parse(
        r#"<select name="state"><option value="">Choose</option><option value="CA">California</option></select>"#,
    );
    let targets = scan_targets(&doc);
    assert_eq!(targets.len(), 1);

    let request = FillRequest::new().with(SemanticType::State, "California");
    let result = Filler::default().fill(&mut doc, &targets, &request).await;

    let select = get(&doc, "select");
    assert!(result.success);
    assert_eq!(doc.selected_index(select), Some(1));
    assert_eq!(doc.value(select), "CA");
    assert_eq!(kinds_for(&doc, select), vec!["focus", "change"]);
}

#[tokio::test(start_paused = true)]
async fn single_option_select_from_profile_value() {
    let mut doc = Document::parse(
        r#"<select name="state"><option value="CA">California</option></select>"#,
    );
    let targets = scan_targets(&doc);
    let request = FillRequest::new().with(SemanticType::State, "California");
    let result = Filler::default().fill(&mut doc, &targets, &request).await;

    let select = get(&doc, "select");
    assert_eq!(result.filled_fields.len(), 1);
    assert_eq!(doc.selected_index(select), Some(0));
    assert!(doc.events().iter().any(|e| e.kind == "change" && e.target == select));
}

#[tokio::test(start_paused = true)]
async fn unmatched_option_is_a_silent_no_op() {
    let mut doc = Document::parse(
        r#"<select name="state"><option value="NY">New York</option></select><input name="city">"#,
    );
    let targets = scan_targets(&doc);
    let request = FillRequest::new()
        .with(SemanticType::State, "Texas")
        .with(SemanticType::City, "Austin");
    let result = Filler::default().fill(&mut doc, &targets, &request).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.filled_fields.len(), 1);
    assert_eq!(result.filled_fields[0].semantic_type, SemanticType::City);
}

#[tokio::test(start_paused = true)]
async fn select_can_also_fire_input() {
    let mut doc = Document::parse(
        r#"<select name="state"><option value="CA">California</option></select>"#,
    );
    let targets = scan_targets(&doc);
    let filler = Filler::new(FillerConfig {
        select_fires_input: true,
        ..Default::default()
    });
    filler
        .fill(&mut doc, &targets, &FillRequest::new().with(SemanticType::State, "ca"))
        .await;
    let select = get(&doc, "select");
    assert_eq!(kinds_for(&doc, select), vec!["focus", "change", "input"]);
}

#[tokio::test(start_paused = true)]
async fn text_fill_sets_value_and_bubbles_events() {
    let mut doc = Document::parse(r#"<form id="f"><input name="email" value="old@x.io"></form>"#);
    let form = get(&doc, "#f");
    let seen = Rc::new(RefCell::new(Vec::new()));
    for kind in ["input", "change", "blur", "focus"] {
        let seen = Rc::clone(&seen);
        doc.add_event_listener(form, kind, move |e| seen.borrow_mut().push(e.kind.clone()));
    }

    let targets = scan_targets(&doc);
    let request = FillRequest::new().with(SemanticType::Email, "ada@example.com");
    let result = Filler::default().fill(&mut doc, &targets, &request).await;

    let input = get(&doc, "[name=email]");
    assert!(result.success);
    assert_eq!(result.filled_fields[0].confidence, Some(0.95));
    assert_eq!(doc.value(input), "ada@example.com");
    assert_eq!(doc.attr(input, "value"), Some("ada@example.com"));
    assert_eq!(doc.focused(), Some(input));
    assert_eq!(kinds_for(&doc, input), vec!["focus", "input", "change", "blur"]);
    // Focus does not bubble; the rest do.
    assert_eq!(*seen.borrow(), vec!["input", "change", "blur"]);
    assert!(
        doc.events()
            .iter()
            .filter(|e| e.kind != "focus")
            .all(|e| e.bubbles && e.cancelable)
    );
}

#[tokio::test(start_paused = true)]
async fn textarea_fill() {
    let mut doc = Document::parse(r#"<form><textarea name="summary">draft</textarea></form>"#);
    let targets = scan_targets(&doc);
    let request = FillRequest::new().with(SemanticType::Summary, "Ten years of Rust.");
    Filler::default().fill(&mut doc, &targets, &request).await;

    let textarea = get(&doc, "textarea");
    assert_eq!(doc.value(textarea), "Ten years of Rust.");
    assert!(doc.to_html().contains(">Ten years of Rust.</textarea>"));
}

#[tokio::test]
async fn checkbox_coercion() {
    let cases = [
        ("yes", true),
        ("1", true),
        ("TRUE", true),
        ("On", true),
        (" true ", false),
        (" yes ", false),
        ("1 ", false),
        ("no", false),
        ("0", false),
        ("checked", false),
    ];
    let filler = Filler::new(FillerConfig {
        settle_delay_ms: 0,
        ..Default::default()
    });

    for (value, expected) in cases {
        for initially in [false, true] {
            let html = if initially {
                r#"<input type="checkbox" id="agree" checked>"#
            } else {
                r#"<input type="checkbox" id="agree">"#
            };
            let mut doc = Document::parse(html);
            let targets = [target(SemanticType::Skills, "#agree")];
            let request = FillRequest::new().with(SemanticType::Skills, value);
            let result = filler.fill(&mut doc, &targets, &request).await;

            let checkbox = get(&doc, "#agree");
            assert_eq!(doc.checked(checkbox), expected, "value {value:?}");
            assert!(result.success);
            assert!(kinds_for(&doc, checkbox).contains(&"change".to_string()));
        }
    }
}

#[tokio::test]
async fn checking_a_radio_unchecks_its_group() {
    let mut doc = Document::parse(
        r#"<form><input type="radio" name="relocate" id="r1" checked>
           <input type="radio" name="relocate" id="r2"></form>"#,
    );
    let filler = Filler::new(FillerConfig {
        settle_delay_ms: 0,
        ..Default::default()
    });
    let targets = [target(SemanticType::Skills, "#r2")];
    filler
        .fill(&mut doc, &targets, &FillRequest::new().with(SemanticType::Skills, true))
        .await;

    assert!(!doc.checked(get(&doc, "#r1")));
    assert!(doc.checked(get(&doc, "#r2")));
}

#[tokio::test(start_paused = true)]
async fn missing_values_leave_the_field_untouched() {
    let mut doc = Document::parse(r#"<input type="email" value="keep@x.io"><input name="city">"#);
    let targets = scan_targets(&doc);
    assert_eq!(targets.len(), 2);

    let request = FillRequest::new().with(SemanticType::City, "Lisbon");
    let result = Filler::default().fill(&mut doc, &targets, &request).await;

    let email = get(&doc, "[type=email]");
    assert!(result.success);
    assert!(result.filled_fields.iter().all(|f| f.semantic_type != SemanticType::Email));
    assert!(result.errors.is_empty());
    assert_eq!(doc.value(email), "keep@x.io");
    assert!(kinds_for(&doc, email).is_empty());
}

#[tokio::test(start_paused = true)]
async fn removed_elements_are_skipped() {
    let mut doc = Document::parse(r#"<input name="email"><input name="city">"#);
    let targets = scan_targets(&doc);
    doc.remove(get(&doc, "[name=email]")).unwrap();

    let request = FillRequest::new()
        .with(SemanticType::Email, "ada@example.com")
        .with(SemanticType::City, "Lisbon");
    let result = Filler::default().fill(&mut doc, &targets, &request).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.filled_fields.len(), 1);
    assert_eq!(result.filled_fields[0].semantic_type, SemanticType::City);
}

#[tokio::test]
async fn stale_selector_without_handle_is_skipped() {
    let mut doc = Document::parse(r#"<input name="city">"#);
    let filler = Filler::new(FillerConfig {
        settle_delay_ms: 0,
        ..Default::default()
    });
    let targets = [target(SemanticType::Email, "#gone")];
    let request = FillRequest::new().with(SemanticType::Email, "ada@example.com");
    let result = filler.fill(&mut doc, &targets, &request).await;

    assert!(!result.success);
    assert!(result.filled_fields.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn resolution_and_write_failures_are_reported_per_field() {
    let mut doc = Document::parse(r#"<div id="box"></div><input id="city">"#);
    let filler = Filler::new(FillerConfig {
        settle_delay_ms: 0,
        ..Default::default()
    });
    let targets = [
        target(SemanticType::Email, "input["),
        target(SemanticType::Summary, "#box"),
        target(SemanticType::City, "#city"),
    ];
    let request = FillRequest::new()
        .with(SemanticType::Email, "ada@example.com")
        .with(SemanticType::Summary, "hello")
        .with(SemanticType::City, "Lisbon");
    let result = filler.fill(&mut doc, &targets, &request).await;

    assert!(result.success);
    assert_eq!(result.filled_fields.len(), 1);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].semantic_type, SemanticType::Email);
    assert!(result.errors[0].message.contains("Invalid selector"));
    assert_eq!(result.errors[1].semantic_type, SemanticType::Summary);
    assert_eq!(doc.value(get(&doc, "#city")), "Lisbon");
}

#[tokio::test(start_paused = true)]
async fn settle_delay_elapses_per_field() {
    let mut doc = Document::parse(r#"<input name="email"><input name="city">"#);
    let targets = scan_targets(&doc);
    let request = FillRequest::new()
        .with(SemanticType::Email, "ada@example.com")
        .with(SemanticType::City, "Lisbon");

    let start = tokio::time::Instant::now();
    Filler::default().fill(&mut doc, &targets, &request).await;
    assert!(start.elapsed() >= std::time::Duration::from_millis(200));
}
