use autofill_common::{FieldContext, SemanticType, SiteId};
use autofill_engine::catalog::SelectorCatalog;
use autofill_engine::classifier::Classification;
use autofill_engine::config::{ClassifierStrategy, ScannerConfig, SortPolicy};
use autofill_engine::dom::{Document, Rect};
use autofill_engine::Scanner;

fn scanner(strategy: ClassifierStrategy, sort_policy: SortPolicy) -> Scanner {
    let config = ScannerConfig {
        strategy,
        sort_policy,
        ..Default::default()
    };
    Scanner::new(config, SelectorCatalog::new())
}

fn types(scanner: &Scanner, doc: &Document, site: SiteId) -> Vec<SemanticType> {
    scanner
        .scan(doc, site)
        .into_iter()
        .map(|d| d.field.semantic_type)
        .collect()
}

const NAME_AND_EMAIL: &str =
    r#"<input name="first_name"><input name="last_name"><input type="email">"#;

#[test]
fn detects_names_and_email_without_a_form() {
    let doc = Document::parse(NAME_AND_EMAIL);
    let fields = Scanner::new(ScannerConfig::default(), SelectorCatalog::new())
        .scan(&doc, SiteId::Generic);

    assert_eq!(fields.len(), 3);
    let find = |ty: SemanticType| {
        fields
            .iter()
            .find(|d| d.field.semantic_type == ty)
            .map(|d| d.field.confidence)
            .unwrap()
    };
    assert!(find(SemanticType::FirstName) >= 0.9);
    assert!(find(SemanticType::LastName) >= 0.9);
    assert!(find(SemanticType::Email) >= 0.95);

    // Highest confidence first, then page order.
    assert_eq!(
        fields.iter().map(|d| d.field.semantic_type).collect::<Vec<_>>(),
        vec![
            SemanticType::Email,
            SemanticType::FirstName,
            SemanticType::LastName
        ]
    );
}

#[test]
fn context_strategy_agrees_on_types() {
    let doc = Document::parse(NAME_AND_EMAIL);
    let scanner = scanner(ClassifierStrategy::Context, SortPolicy::ConfidenceFirst);
    let fields = scanner.scan(&doc, SiteId::Generic);

    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].field.semantic_type, SemanticType::FirstName);
    assert_eq!(fields[1].field.semantic_type, SemanticType::LastName);
    // The bare email input is recognised through its native type only.
    assert_eq!(fields[2].field.semantic_type, SemanticType::Email);
    assert_eq!(fields[2].field.confidence, 0.9);
}

#[test]
fn excluded_controls_never_appear() {
    let doc = Document::parse(
        r#"<input type="hidden" name="email">
           <input name="first_name" disabled>
           <input name="last_name" readonly>
           <fieldset disabled><input name="phone"></fieldset>
           <input type="submit" name="full_name">
           <button name="name">Go</button>
           <div style="display:none"><input name="zip"></div>
           <input name="city">"#,
    );
    for strategy in [ClassifierStrategy::Catalog, ClassifierStrategy::Context] {
        let scanner = scanner(strategy, SortPolicy::ConfidenceFirst);
        assert_eq!(
            types(&scanner, &doc, SiteId::Generic),
            vec![SemanticType::City]
        );
    }
}

#[test]
fn forms_limit_the_scan() {
    let doc = Document::parse(
        r#"<input name="email" placeholder="Newsletter">
           <form><input name="phone"></form>"#,
    );
    for strategy in [ClassifierStrategy::Catalog, ClassifierStrategy::Context] {
        let scanner = scanner(strategy, SortPolicy::ConfidenceFirst);
        assert_eq!(
            types(&scanner, &doc, SiteId::Generic),
            vec![SemanticType::Phone]
        );
    }
}

#[test]
fn confidences_stay_in_range_and_above_floor() {
    let doc = Document::parse(
        r#"<form>
             <input name="q"><input name="first"><input name="about_you">
             <textarea name="summary"></textarea><select name="state"></select>
             <input name="languages"><input type="tel"><input name="misc">
           </form>"#,
    );
    for strategy in [ClassifierStrategy::Catalog, ClassifierStrategy::Context] {
        let fields = scanner(strategy, SortPolicy::ConfidenceFirst).scan(&doc, SiteId::Generic);
        assert!(!fields.is_empty());
        for d in &fields {
            assert!(d.field.confidence > 0.3 && d.field.confidence <= 1.0);
            assert_ne!(d.field.semantic_type, SemanticType::Unknown);
        }
    }
}

#[test]
fn scanning_twice_is_stable() {
    let doc = Document::parse(
        r#"<form><input name="city"><input name="state"><input name="email">
           <input name="phone"><textarea name="bio"></textarea></form>"#,
    );
    for strategy in [ClassifierStrategy::Catalog, ClassifierStrategy::Context] {
        let scanner = scanner(strategy, SortPolicy::ConfidenceFirst);
        assert_eq!(scanner.scan(&doc, SiteId::Generic), scanner.scan(&doc, SiteId::Generic));
    }
}

#[test]
fn each_element_yields_one_field() {
    // Matches both the email and the phone patterns.
    let doc = Document::parse(r#"<input name="email_phone">"#);
    for strategy in [ClassifierStrategy::Catalog, ClassifierStrategy::Context] {
        let fields = scanner(strategy, SortPolicy::ConfidenceFirst).scan(&doc, SiteId::Generic);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field.semantic_type, SemanticType::Email);
    }
}

#[test]
fn sort_policies_differ_on_invisible_fields() {
    let doc = Document::parse(
        r#"<input name="email" style="visibility:hidden"><input name="city">"#,
    );

    let confidence = scanner(ClassifierStrategy::Catalog, SortPolicy::ConfidenceFirst);
    assert_eq!(
        types(&confidence, &doc, SiteId::Generic),
        vec![SemanticType::Email, SemanticType::City]
    );

    let visibility = scanner(ClassifierStrategy::Catalog, SortPolicy::VisibilityFirst);
    let fields = visibility.scan(&doc, SiteId::Generic);
    assert_eq!(fields[0].field.semantic_type, SemanticType::City);
    assert!(fields[0].field.visible);
    assert_eq!(fields[1].field.semantic_type, SemanticType::Email);
    assert!(!fields[1].field.visible);
}

#[test]
fn equal_confidence_orders_by_vertical_position() {
    let mut doc = Document::parse(r#"<input name="city"><input name="state">"#);
    let city = doc.query_selector("[name=city]").unwrap().unwrap();
    doc.set_rect(city, Rect::new(0.0, 400.0, 200.0, 24.0));

    let fields = scanner(ClassifierStrategy::Context, SortPolicy::ConfidenceFirst)
        .scan(&doc, SiteId::Generic);
    assert_eq!(fields[0].field.semantic_type, SemanticType::State);
    assert_eq!(fields[1].field.semantic_type, SemanticType::City);
}

#[test]
fn selectors_resolve_back_to_their_element() {
    let doc = Document::parse(
        r#"<form>
             <input id="email" name="email">
             <div><input name="phone"><input name="phone"></div>
             <input name="city" id="1city">
           </form>"#,
    );
    let fields = scanner(ClassifierStrategy::Context, SortPolicy::ConfidenceFirst)
        .scan(&doc, SiteId::Generic);
    assert_eq!(fields.len(), 4);
    for d in &fields {
        let resolved = doc.query_selector_all(&d.field.selector).unwrap();
        assert_eq!(resolved, vec![d.handle], "selector {}", d.field.selector);
    }
}

#[test]
fn context_reads_labels_and_captions() {
    let doc = Document::parse(
        r#"<div><label for="fn">Given name</label><input id="fn" name="q1"></div>
           <div><label>Town <input name="q2"></label></div>
           <div><span>Phone number</span><input name="q3"></div>
           <div><input type="tel" name="q4"></div>"#,
    );
    let fields = scanner(ClassifierStrategy::Context, SortPolicy::VisibilityFirst)
        .scan(&doc, SiteId::Generic);

    let summary: Vec<_> = fields
        .iter()
        .map(|d| (d.field.name.as_str(), d.field.semantic_type, d.field.label.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("q1", SemanticType::FirstName, Some("Given name".to_string())),
            ("q2", SemanticType::City, Some("Town".to_string())),
            ("q3", SemanticType::Phone, Some("Phone number".to_string())),
            ("q4", SemanticType::Phone, None),
        ]
    );
}

#[test]
fn site_overrides_add_types() {
    let doc = Document::parse(
        r#"<form><input name="years_of_experience"><textarea name="skills"></textarea></form>"#,
    );
    let scanner = scanner(ClassifierStrategy::Catalog, SortPolicy::ConfidenceFirst);

    assert!(scanner.scan(&doc, SiteId::Generic).is_empty());
    let site = SiteId::identify("https://acme.careers-page.com/jobs/42");
    assert_eq!(
        types(&scanner, &doc, site),
        vec![SemanticType::YearsExperience, SemanticType::Skills]
    );
}

#[test]
fn workday_automation_ids() {
    let doc = Document::parse(
        r#"<form><input data-automation-id="firstName"><input data-automation-id="email"></form>"#,
    );
    let scanner = scanner(ClassifierStrategy::Catalog, SortPolicy::ConfidenceFirst);
    let site = SiteId::identify("https://acme.wd5.myworkday.com/careers");
    assert_eq!(site, SiteId::Workday);
    assert_eq!(
        types(&scanner, &doc, site),
        vec![SemanticType::Email, SemanticType::FirstName]
    );
}

#[test]
fn pluggable_scorer_replaces_keywords() {
    let doc = Document::parse(r#"<input name="anything"><input name="else">"#);
    let config = ScannerConfig {
        strategy: ClassifierStrategy::Context,
        ..Default::default()
    };
    let scanner = Scanner::with_scorer(config, SelectorCatalog::new(), |ctx: &FieldContext| {
        if ctx.element_name == "anything" {
            Classification::new(SemanticType::Skills, 0.6)
        } else {
            Classification::new(SemanticType::Summary, 0.3)
        }
    });
    // 0.3 is not above the floor.
    assert_eq!(
        types(&scanner, &doc, SiteId::Generic),
        vec![SemanticType::Skills]
    );
}

#[test]
fn invisible_nearby_text_does_not_classify() {
    let doc = Document::parse(
        r#"<div><span style="visibility:hidden">Your email</span><input name="q"></div>
           <div><span style="opacity:0">Mobile</span><input name="r"></div>"#,
    );
    let scanner = scanner(ClassifierStrategy::Context, SortPolicy::ConfidenceFirst);
    assert!(scanner.scan(&doc, SiteId::Generic).is_empty());
}
