//! Selector catalog: semantic type → CSS selector candidates, in priority order.
//!
//! The generic table applies everywhere. A known site may replace the list for
//! any type, and may add types the generic table has no selectors for.

use crate::config::CatalogConfig;
use autofill_common::{SemanticType, SiteId};
use std::collections::{BTreeMap, HashMap};

type SiteTable = &'static [(SemanticType, &'static [&'static str])];

const GENERIC: SiteTable = &[
    (
        SemanticType::FirstName,
        &[
            r#"input[name*="first" i]:not([name*="last" i])"#,
            r#"input[id*="first" i]:not([id*="last" i])"#,
            r#"input[placeholder*="first name" i]"#,
            r#"input[aria-label*="first name" i]"#,
            r#"input[name="fname"]"#,
            r#"input[name="firstname"]"#,
        ],
    ),
    (
        SemanticType::LastName,
        &[
            r#"input[name*="last" i]:not([name*="first" i])"#,
            r#"input[id*="last" i]:not([id*="first" i])"#,
            r#"input[placeholder*="last name" i]"#,
            r#"input[aria-label*="last name" i]"#,
            r#"input[name="lname"]"#,
            r#"input[name="lastname"]"#,
        ],
    ),
    (
        SemanticType::FullName,
        &[
            r#"input[name*="name" i]:not([name*="first" i]):not([name*="last" i]):not([name*="company" i]):not([name*="user" i])"#,
            r#"input[id*="name" i]:not([id*="first" i]):not([id*="last" i]):not([id*="company" i])"#,
            r#"input[placeholder*="full name" i]"#,
            r#"input[placeholder*="your name" i]"#,
            r#"input[name="name"]"#,
        ],
    ),
    (
        SemanticType::Email,
        &[
            r#"input[type="email"]"#,
            r#"input[name*="email" i]"#,
            r#"input[id*="email" i]"#,
            r#"input[placeholder*="email" i]"#,
            r#"input[aria-label*="email" i]"#,
        ],
    ),
    (
        SemanticType::Phone,
        &[
            r#"input[type="tel"]"#,
            r#"input[name*="phone" i]"#,
            r#"input[id*="phone" i]"#,
            r#"input[placeholder*="phone" i]"#,
            r#"input[aria-label*="phone" i]"#,
            r#"input[name*="mobile" i]"#,
            r#"input[name*="contact" i]"#,
        ],
    ),
    (
        SemanticType::Address,
        &[
            r#"input[name*="address" i]:not([name*="email" i])"#,
            r#"input[id*="address" i]"#,
            r#"input[placeholder*="address" i]"#,
            r#"textarea[name*="address" i]"#,
        ],
    ),
    (
        SemanticType::City,
        &[
            r#"input[name*="city" i]"#,
            r#"input[id*="city" i]"#,
            r#"input[placeholder*="city" i]"#,
        ],
    ),
    (
        SemanticType::State,
        &[
            r#"input[name*="state" i]"#,
            r#"input[id*="state" i]"#,
            r#"select[name*="state" i]"#,
            r#"select[id*="state" i]"#,
        ],
    ),
    (
        SemanticType::ZipCode,
        &[
            r#"input[name*="zip" i]"#,
            r#"input[name*="postal" i]"#,
            r#"input[id*="zip" i]"#,
            r#"input[id*="postal" i]"#,
            r#"input[placeholder*="zip" i]"#,
        ],
    ),
    (
        SemanticType::CurrentTitle,
        &[
            r#"input[name*="title" i]:not([name*="job" i])"#,
            r#"input[name*="position" i]"#,
            r#"input[id*="title" i]"#,
            r#"input[placeholder*="current title" i]"#,
            r#"input[placeholder*="job title" i]"#,
        ],
    ),
    (
        SemanticType::Summary,
        &[
            r#"textarea[name*="summary" i]"#,
            r#"textarea[name*="bio" i]"#,
            r#"textarea[name*="about" i]"#,
            r#"textarea[id*="summary" i]"#,
            r#"textarea[placeholder*="tell us about" i]"#,
            r#"textarea[placeholder*="describe yourself" i]"#,
        ],
    ),
];

const LINKEDIN: SiteTable = &[
    (
        SemanticType::FirstName,
        &[
            r#"input[name="firstName"]"#,
            "#single-line-text-form-component-profileEditFormElement-FIRST_NAME-firstName input",
        ],
    ),
    (
        SemanticType::LastName,
        &[
            r#"input[name="lastName"]"#,
            "#single-line-text-form-component-profileEditFormElement-LAST_NAME-lastName input",
        ],
    ),
];

const INDEED: SiteTable = &[
    (
        SemanticType::FullName,
        &[
            r#"input[name="applicant.name"]"#,
            r#"input[data-testid="name-input"]"#,
        ],
    ),
    (
        SemanticType::Email,
        &[
            r#"input[name="applicant.emailAddress"]"#,
            r#"input[data-testid="email-input"]"#,
        ],
    ),
    (
        SemanticType::Phone,
        &[
            r#"input[name="applicant.phoneNumber"]"#,
            r#"input[data-testid="phone-input"]"#,
        ],
    ),
];

const WORKDAY: SiteTable = &[
    (
        SemanticType::FirstName,
        &[r#"input[data-automation-id="firstName"]"#],
    ),
    (
        SemanticType::LastName,
        &[r#"input[data-automation-id="lastName"]"#],
    ),
    (SemanticType::Email, &[r#"input[data-automation-id="email"]"#]),
    (SemanticType::Phone, &[r#"input[data-automation-id="phone"]"#]),
];

const CAREERS_PAGE: SiteTable = &[
    (
        SemanticType::FirstName,
        &[
            r#"input[name*="first" i]"#,
            r#"input[id*="first" i]"#,
            r#"input[placeholder*="first" i]"#,
        ],
    ),
    (
        SemanticType::LastName,
        &[
            r#"input[name*="last" i]"#,
            r#"input[id*="last" i]"#,
            r#"input[placeholder*="last" i]"#,
        ],
    ),
    (
        SemanticType::Email,
        &[
            r#"input[type="email"]"#,
            r#"input[name*="email" i]"#,
            r#"input[id*="email" i]"#,
        ],
    ),
    (
        SemanticType::Phone,
        &[
            r#"input[type="tel"]"#,
            r#"input[name*="phone" i]"#,
            r#"input[name*="mobile" i]"#,
            r#"input[id*="phone" i]"#,
        ],
    ),
    (
        SemanticType::Address,
        &[r#"input[name*="address" i]"#, r#"textarea[name*="address" i]"#],
    ),
    (
        SemanticType::City,
        &[r#"input[name*="city" i]"#, r#"select[name*="city" i]"#],
    ),
    (
        SemanticType::State,
        &[r#"input[name*="state" i]"#, r#"select[name*="state" i]"#],
    ),
    (
        SemanticType::ZipCode,
        &[r#"input[name*="zip" i]"#, r#"input[name*="postal" i]"#],
    ),
    (
        SemanticType::CurrentTitle,
        &[
            r#"input[name*="title" i]"#,
            r#"input[name*="position" i]"#,
            r#"input[placeholder*="current title" i]"#,
        ],
    ),
    (
        SemanticType::Summary,
        &[
            r#"textarea[name*="summary" i]"#,
            r#"textarea[name*="bio" i]"#,
            r#"textarea[name*="about" i]"#,
            r#"textarea[placeholder*="tell us about" i]"#,
        ],
    ),
    (
        SemanticType::YearsExperience,
        &[
            r#"input[name*="experience" i]"#,
            r#"select[name*="experience" i]"#,
            r#"input[name*="years" i]"#,
        ],
    ),
    (
        SemanticType::Skills,
        &[
            r#"textarea[name*="skills" i]"#,
            r#"input[name*="skills" i]"#,
            r#"textarea[placeholder*="skills" i]"#,
        ],
    ),
];

fn builtin_overrides(site: SiteId) -> SiteTable {
    match site {
        SiteId::Linkedin => LINKEDIN,
        SiteId::Indeed => INDEED,
        SiteId::Workday => WORKDAY,
        SiteId::CareersPage => CAREERS_PAGE,
        _ => &[],
    }
}

fn lookup(table: SiteTable, ty: SemanticType) -> Option<Vec<String>> {
    table
        .iter()
        .find(|(t, _)| *t == ty)
        .map(|(_, selectors)| selectors.iter().map(|s| s.to_string()).collect())
}

#[derive(Debug, Clone, Default)]
pub struct SelectorCatalog {
    configured: HashMap<SiteId, BTreeMap<SemanticType, Vec<String>>>,
}

impl SelectorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in tables plus configured per-site lists, which take precedence.
    pub fn with_config(config: &CatalogConfig) -> Self {
        Self {
            configured: config.sites.clone(),
        }
    }

    /// Ordered selector candidates for `ty` on `site`. Unknown types yield nothing.
    pub fn selectors_for(&self, site: SiteId, ty: SemanticType) -> Vec<String> {
        if let Some(list) = self.configured.get(&site).and_then(|m| m.get(&ty)) {
            return list.clone();
        }
        lookup(builtin_overrides(site), ty)
            .or_else(|| lookup(GENERIC, ty))
            .unwrap_or_default()
    }

    /// Types with at least one selector on `site`, in catalog iteration order.
    pub fn types_for(&self, site: SiteId) -> Vec<SemanticType> {
        SemanticType::ALL
            .into_iter()
            .filter(|ty| !self.selectors_for(site, *ty).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_has_no_experience_or_skills() {
        let catalog = SelectorCatalog::new();
        assert!(
            catalog
                .selectors_for(SiteId::Generic, SemanticType::Skills)
                .is_empty()
        );
        assert!(
            catalog
                .selectors_for(SiteId::Generic, SemanticType::Unknown)
                .is_empty()
        );
        assert_eq!(catalog.types_for(SiteId::Generic).len(), 11);
    }

    #[test]
    fn site_lists_replace_generic_per_type() {
        let catalog = SelectorCatalog::new();
        let workday = catalog.selectors_for(SiteId::Workday, SemanticType::Email);
        assert_eq!(workday, vec![r#"input[data-automation-id="email"]"#]);
        // Types the site does not override fall through to generic.
        assert_eq!(
            catalog.selectors_for(SiteId::Workday, SemanticType::City),
            catalog.selectors_for(SiteId::Generic, SemanticType::City)
        );
        assert_eq!(catalog.types_for(SiteId::CareersPage).len(), 13);
    }

    #[test]
    fn configured_lists_take_precedence() {
        let mut config = CatalogConfig::default();
        config.sites.insert(
            SiteId::Lever,
            BTreeMap::from([(SemanticType::Email, vec!["#lever-email".to_string()])]),
        );
        let catalog = SelectorCatalog::with_config(&config);
        assert_eq!(
            catalog.selectors_for(SiteId::Lever, SemanticType::Email),
            vec!["#lever-email"]
        );
        assert_eq!(
            catalog.selectors_for(SiteId::Generic, SemanticType::Email)[0],
            r#"input[type="email"]"#
        );
    }
}
