//! Field classification.
//!
//! Two strategies share one result type. The context classifier scores one
//! control at a time through a [`FieldScorer`]; the catalog classifier walks
//! the selector catalog over the whole page.

mod keywords;
mod selectors;

pub use keywords::KeywordScorer;
pub use selectors::CatalogClassifier;

use crate::config::ScannerConfig;
use autofill_common::{FieldContext, SemanticType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub semantic_type: SemanticType,
    pub confidence: f64,
}

impl Classification {
    pub fn new(semantic_type: SemanticType, confidence: f64) -> Self {
        Self {
            semantic_type,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn unknown() -> Self {
        Self::new(SemanticType::Unknown, 0.0)
    }

    pub fn is_unknown(&self) -> bool {
        self.semantic_type == SemanticType::Unknown
    }
}

/// Scores a control's context. Swap in another implementation to change how
/// fields are recognised without touching the scanner or filler.
pub trait FieldScorer {
    fn score(&self, context: &FieldContext) -> Classification;
}

impl<F> FieldScorer for F
where
    F: Fn(&FieldContext) -> Classification,
{
    fn score(&self, context: &FieldContext) -> Classification {
        self(context)
    }
}

/// Context-driven strategy: a scorer plus the native `email`/`tel` fallback.
pub struct ContextClassifier {
    scorer: Box<dyn FieldScorer>,
    native_type_threshold: f64,
    native_type_confidence: f64,
}

impl std::fmt::Debug for ContextClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextClassifier")
            .field("native_type_threshold", &self.native_type_threshold)
            .field("native_type_confidence", &self.native_type_confidence)
            .finish_non_exhaustive()
    }
}

impl ContextClassifier {
    pub fn new(config: &ScannerConfig) -> Self {
        Self::with_scorer(config, KeywordScorer)
    }

    pub fn with_scorer(config: &ScannerConfig, scorer: impl FieldScorer + 'static) -> Self {
        Self {
            scorer: Box::new(scorer),
            native_type_threshold: config.native_type_threshold,
            native_type_confidence: config.native_type_confidence,
        }
    }

    pub fn classify(&self, context: &FieldContext) -> Classification {
        let scored = self.scorer.score(context);
        let best = Classification::new(scored.semantic_type, scored.confidence);
        if best.confidence >= self.native_type_threshold {
            return best;
        }
        match context.native_input_type.as_str() {
            "email" => Classification::new(SemanticType::Email, self.native_type_confidence),
            "tel" => Classification::new(SemanticType::Phone, self.native_type_confidence),
            _ => best,
        }
    }
}
