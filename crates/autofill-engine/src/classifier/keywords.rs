use super::{Classification, FieldScorer};
use autofill_common::{FieldContext, SemanticType};

struct PatternSet {
    semantic_type: SemanticType,
    patterns: &'static [&'static str],
    confidence: f64,
}

/// Iteration order matters: on equal confidence the earlier entry keeps the match.
const PATTERNS: &[PatternSet] = &[
    PatternSet {
        semantic_type: SemanticType::FirstName,
        patterns: &["first", "fname", "given name", "first name"],
        confidence: 0.9,
    },
    PatternSet {
        semantic_type: SemanticType::LastName,
        patterns: &["last", "lname", "surname", "family name", "last name"],
        confidence: 0.9,
    },
    PatternSet {
        semantic_type: SemanticType::FullName,
        patterns: &["name", "full name", "complete name"],
        confidence: 0.8,
    },
    PatternSet {
        semantic_type: SemanticType::Email,
        patterns: &["email", "e-mail", "mail"],
        confidence: 0.95,
    },
    PatternSet {
        semantic_type: SemanticType::Phone,
        patterns: &["phone", "mobile", "cell", "telephone", "contact"],
        confidence: 0.9,
    },
    PatternSet {
        semantic_type: SemanticType::Address,
        patterns: &["address", "street", "location"],
        confidence: 0.85,
    },
    PatternSet {
        semantic_type: SemanticType::City,
        patterns: &["city", "town", "municipality"],
        confidence: 0.9,
    },
    PatternSet {
        semantic_type: SemanticType::State,
        patterns: &["state", "province", "region"],
        confidence: 0.9,
    },
    PatternSet {
        semantic_type: SemanticType::ZipCode,
        patterns: &["zip", "postal", "zipcode", "postcode"],
        confidence: 0.9,
    },
    PatternSet {
        semantic_type: SemanticType::CurrentTitle,
        patterns: &["title", "position", "job title", "current title", "role"],
        confidence: 0.85,
    },
    PatternSet {
        semantic_type: SemanticType::Summary,
        patterns: &["summary", "bio", "about", "description", "tell us about", "describe"],
        confidence: 0.8,
    },
    PatternSet {
        semantic_type: SemanticType::YearsExperience,
        patterns: &["experience", "years", "work experience", "professional experience"],
        confidence: 0.8,
    },
    PatternSet {
        semantic_type: SemanticType::Skills,
        patterns: &["skills", "technologies", "programming", "languages", "tools"],
        confidence: 0.8,
    },
];

/// Fixed keyword table with hand-tuned weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    /// The table weight for `ty`; 0 for `Unknown`.
    pub fn weight(ty: SemanticType) -> f64 {
        PATTERNS
            .iter()
            .find(|set| set.semantic_type == ty)
            .map_or(0.0, |set| set.confidence)
    }
}

impl FieldScorer for KeywordScorer {
    fn score(&self, context: &FieldContext) -> Classification {
        let text = context.search_text();
        let mut best = Classification::unknown();
        for set in PATTERNS {
            let hit = set.patterns.iter().any(|p| text.contains(p));
            if hit && set.confidence > best.confidence {
                best = Classification::new(set.semantic_type, set.confidence);
            }
        }
        best
    }
}
