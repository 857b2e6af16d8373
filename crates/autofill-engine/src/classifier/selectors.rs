use super::{Classification, KeywordScorer};
use crate::catalog::SelectorCatalog;
use crate::dom::{Document, ElementHandle};
use autofill_common::{SemanticType, SiteId};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Catalog-driven strategy. For each semantic type, in catalog order, the
/// first eligible element matched by any of its selectors claims the type.
/// Confidence is the keyword table's weight for that type.
#[derive(Debug, Clone)]
pub struct CatalogClassifier {
    catalog: SelectorCatalog,
}

impl CatalogClassifier {
    pub fn new(catalog: SelectorCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SelectorCatalog {
        &self.catalog
    }

    /// Claim at most one element per type, never the same element twice.
    /// `eligible` decides which matches may be claimed.
    pub fn classify_document<F>(
        &self,
        doc: &Document,
        site: SiteId,
        mut eligible: F,
    ) -> Vec<(ElementHandle, Classification)>
    where
        F: FnMut(ElementHandle) -> bool,
    {
        let mut claimed: HashSet<ElementHandle> = HashSet::new();
        let mut found = Vec::new();

        for ty in SemanticType::ALL {
            let hit = self
                .catalog
                .selectors_for(site, ty)
                .iter()
                .find_map(|selector| match doc.query_selector_all(selector) {
                    Ok(matches) => matches
                        .into_iter()
                        .find(|h| !claimed.contains(h) && eligible(*h)),
                    Err(e) => {
                        warn!("Skipping catalog selector for {}: {}", ty, e);
                        None
                    }
                });

            if let Some(handle) = hit {
                debug!("Catalog matched {} on {:?}", ty, doc.attr(handle, "name"));
                claimed.insert(handle);
                found.push((handle, Classification::new(ty, KeywordScorer::weight(ty))));
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use std::collections::BTreeMap;

    #[test]
    fn invalid_selector_is_skipped_and_later_candidates_still_run() {
        let mut config = CatalogConfig::default();
        config.sites.insert(
            SiteId::Generic,
            BTreeMap::from([(
                SemanticType::Email,
                vec!["input[".to_string(), "#mail".to_string()],
            )]),
        );
        let classifier = CatalogClassifier::new(SelectorCatalog::with_config(&config));
        let doc = Document::parse(r#"<input id="mail">"#);

        let found = classifier.classify_document(&doc, SiteId::Generic, |_| true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.semantic_type, SemanticType::Email);
        assert_eq!(found[0].1.confidence, 0.95);
    }

    #[test]
    fn an_element_is_claimed_once() {
        // Also matches the careers-page lastName list, but firstName claims it first.
        let doc = Document::parse(r#"<input name="first_last">"#);
        let classifier = CatalogClassifier::new(SelectorCatalog::new());
        let found = classifier.classify_document(&doc, SiteId::CareersPage, |_| true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.semantic_type, SemanticType::FirstName);
    }
}
