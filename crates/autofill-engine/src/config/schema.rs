use autofill_common::{SemanticType, SiteId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutofillConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub filler: FillerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// How candidate controls get their semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Walk the selector catalog type by type; first match per type wins.
    #[default]
    Catalog,
    /// Score each control's textual context against keyword patterns.
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Descending confidence, ties by vertical position.
    #[default]
    ConfidenceFirst,
    /// Visible fields first, then vertical position.
    VisibilityFirst,
}

/// How a requested value picks a `<select>` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive equality on value or text, then containment either way on text.
    #[default]
    #[serde(rename = "exact")]
    ExactFirst,
    /// First option whose value or text contains the requested value.
    Partial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub strategy: ClassifierStrategy,
    #[serde(default)]
    pub sort_policy: SortPolicy,
    /// Results at or below this confidence are dropped.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,
    /// Native `email`/`tel` inputs are forced to email/phone when the best
    /// keyword match stays below this.
    #[serde(default = "default_native_type_threshold")]
    pub native_type_threshold: f64,
    #[serde(default = "default_native_type_confidence")]
    pub native_type_confidence: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::default(),
            sort_policy: SortPolicy::default(),
            confidence_floor: default_confidence_floor(),
            native_type_threshold: default_native_type_threshold(),
            native_type_confidence: default_native_type_confidence(),
        }
    }
}

fn default_confidence_floor() -> f64 {
    0.3
}

fn default_native_type_threshold() -> f64 {
    0.5
}

fn default_native_type_confidence() -> f64 {
    0.9
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillerConfig {
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Pause after focusing a control so page scripts can react.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub select_fires_input: bool,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            settle_delay_ms: default_settle_delay_ms(),
            select_fires_input: false,
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
    #[serde(default = "default_initial_scan_delay_ms")]
    pub initial_scan_delay_ms: u64,
    #[serde(default = "default_rescan_debounce_ms")]
    pub rescan_debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_detect: default_auto_detect(),
            initial_scan_delay_ms: default_initial_scan_delay_ms(),
            rescan_debounce_ms: default_rescan_debounce_ms(),
        }
    }
}

fn default_auto_detect() -> bool {
    true
}

fn default_initial_scan_delay_ms() -> u64 {
    1000
}

fn default_rescan_debounce_ms() -> u64 {
    1000
}

/// Extra per-site selector lists. Each list replaces the built-in one for that site and type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub sites: HashMap<SiteId, BTreeMap<SemanticType, Vec<String>>>,
}
