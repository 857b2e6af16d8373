//! Page scanner: candidate enumeration, validity filtering, classification,
//! deduplication and ordering.

mod selector;

pub use selector::unique_selector;

use crate::catalog::SelectorCatalog;
use crate::classifier::{CatalogClassifier, Classification, ContextClassifier, FieldScorer};
use crate::config::{AutofillConfig, ClassifierStrategy, ScannerConfig, SortPolicy};
use crate::context::{extract_context, find_label};
use crate::dom::{Document, ElementHandle};
use autofill_common::{ClassifiedField, SiteId};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info};

const CANDIDATE_SELECTOR: &str = "input, textarea, select";
const BUTTON_TYPES: &[&str] = &["submit", "button", "reset", "image"];

/// A classified field plus the element it came from, valid for one scan-then-fill cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedField {
    pub field: ClassifiedField,
    pub handle: ElementHandle,
}

#[derive(Debug)]
pub struct Scanner {
    config: ScannerConfig,
    context: ContextClassifier,
    catalog: CatalogClassifier,
}

impl Scanner {
    pub fn new(config: ScannerConfig, catalog: SelectorCatalog) -> Self {
        let context = ContextClassifier::new(&config);
        Self {
            config,
            context,
            catalog: CatalogClassifier::new(catalog),
        }
    }

    /// Context-driven scanning through a custom scorer.
    pub fn with_scorer(
        config: ScannerConfig,
        catalog: SelectorCatalog,
        scorer: impl FieldScorer + 'static,
    ) -> Self {
        let context = ContextClassifier::with_scorer(&config, scorer);
        Self {
            config,
            context,
            catalog: CatalogClassifier::new(catalog),
        }
    }

    pub fn from_config(config: &AutofillConfig) -> Self {
        Self::new(
            config.scanner.clone(),
            SelectorCatalog::with_config(&config.catalog),
        )
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Classify every fillable control on the page. Never fails: unreadable
    /// elements and bad selectors are left out of the result.
    pub fn scan(&self, doc: &Document, site: SiteId) -> Vec<DetectedField> {
        let candidates = candidates(doc);

        let classified: Vec<(ElementHandle, Classification)> = match self.config.strategy {
            ClassifierStrategy::Context => {
                let mut seen = HashSet::new();
                candidates
                    .iter()
                    .copied()
                    .filter(|h| seen.insert(*h))
                    .filter(|h| is_valid_field(doc, *h))
                    .map(|h| (h, self.context.classify(&extract_context(doc, h))))
                    .collect()
            }
            ClassifierStrategy::Catalog => {
                let scope: HashSet<ElementHandle> = candidates.iter().copied().collect();
                self.catalog.classify_document(doc, site, |h| {
                    scope.contains(&h) && is_valid_field(doc, h)
                })
            }
        };

        let mut fields: Vec<(DetectedField, f32)> = classified
            .into_iter()
            .filter(|(_, c)| !c.is_unknown() && c.confidence > self.config.confidence_floor)
            .map(|(handle, c)| {
                let field = describe(doc, handle, c);
                debug!(
                    "Detected {} ({:.2}) at {}",
                    field.semantic_type, field.confidence, field.selector
                );
                (DetectedField { field, handle }, doc.rect(handle).y)
            })
            .collect();

        match self.config.sort_policy {
            SortPolicy::ConfidenceFirst => fields.sort_by(|(a, ay), (b, by)| {
                b.field
                    .confidence
                    .total_cmp(&a.field.confidence)
                    .then_with(|| ay.total_cmp(by))
            }),
            SortPolicy::VisibilityFirst => fields.sort_by(|(a, ay), (b, by)| {
                match (a.field.visible, b.field.visible) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => ay.total_cmp(by),
                }
            }),
        }

        info!(
            "Scan found {} field(s) among {} candidate(s) on {} page",
            fields.len(),
            candidates.len(),
            site
        );
        fields.into_iter().map(|(field, _)| field).collect()
    }
}

/// Controls inside `<form>` elements when the page has any, else every control.
pub fn candidates(doc: &Document) -> Vec<ElementHandle> {
    let forms = doc.query_selector_all("form").unwrap_or_default();
    if forms.is_empty() {
        return doc.query_selector_all(CANDIDATE_SELECTOR).unwrap_or_default();
    }
    forms
        .into_iter()
        .flat_map(|form| {
            doc.query_selector_all_within(form, CANDIDATE_SELECTOR)
                .unwrap_or_default()
        })
        .collect()
}

/// Rendered and showing: not hidden by style and occupying a non-empty box.
pub fn is_visible(doc: &Document, handle: ElementHandle) -> bool {
    doc.computed_style(handle).is_visible() && !doc.rect(handle).is_empty()
}

/// Enabled, writable, not a hidden input or button, and either visible or laid out.
pub fn is_valid_field(doc: &Document, handle: ElementHandle) -> bool {
    if doc.is_disabled(handle) || doc.is_read_only(handle) {
        return false;
    }
    let kind = doc.native_type(handle);
    if kind == "hidden" || BUTTON_TYPES.contains(&kind.as_str()) {
        return false;
    }
    is_visible(doc, handle) || !doc.rect(handle).is_empty()
}

fn describe(doc: &Document, handle: ElementHandle, c: Classification) -> ClassifiedField {
    let attr = |name: &str| doc.attr(handle, name).unwrap_or_default().to_string();
    let name = doc
        .attr(handle, "name")
        .filter(|n| !n.is_empty())
        .or_else(|| doc.attr(handle, "id"))
        .unwrap_or_default()
        .to_string();
    let label = find_label(doc, handle)
        .map(|l| doc.text_content(l).trim().to_string())
        .filter(|l| !l.is_empty());

    ClassifiedField {
        semantic_type: c.semantic_type,
        selector: unique_selector(doc, handle),
        input_type: doc.native_type(handle),
        name,
        placeholder: attr("placeholder"),
        label,
        confidence: c.confidence,
        visible: is_visible(doc, handle),
    }
}
