//! Form filler: writes profile values into classified controls and fires the
//! events page frameworks listen for.

use crate::config::{FillerConfig, MatchMode};
use crate::dom::{Document, DomError, ElementHandle, EventInit, SelectOption};
use crate::scanner::DetectedField;
use autofill_common::{ClassifiedField, FillError, FillRequest, FillResult, FillValue, FilledField};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// One field to fill. `handle` is the element seen by the scan that produced
/// `field`, when there was one; otherwise the selector is re-resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FillTarget {
    pub field: ClassifiedField,
    pub handle: Option<ElementHandle>,
}

impl FillTarget {
    pub fn from_selector(field: ClassifiedField) -> Self {
        Self {
            field,
            handle: None,
        }
    }
}

impl From<DetectedField> for FillTarget {
    fn from(detected: DetectedField) -> Self {
        Self {
            field: detected.field,
            handle: Some(detected.handle),
        }
    }
}

enum Written {
    Filled,
    NoMatchingOption,
}

#[derive(Debug, Clone, Default)]
pub struct Filler {
    config: FillerConfig,
}

impl Filler {
    pub fn new(config: FillerConfig) -> Self {
        Self { config }
    }

    /// Fill `targets` in order. Stale selectors and missing values are
    /// skipped silently; resolution and write failures become `errors`.
    pub async fn fill(
        &self,
        doc: &mut Document,
        targets: &[FillTarget],
        request: &FillRequest,
    ) -> FillResult {
        let mut filled = Vec::new();
        let mut errors = Vec::new();

        for target in targets {
            let field = &target.field;
            let fail = |message: String| FillError {
                semantic_type: field.semantic_type,
                message,
            };

            let handle = match resolve(doc, target) {
                Ok(Some(handle)) => handle,
                Ok(None) => {
                    warn!("Element not found for selector: {}", field.selector);
                    continue;
                }
                Err(e) => {
                    error!("Cannot resolve {} field: {}", field.semantic_type, e);
                    errors.push(fail(e.to_string()));
                    continue;
                }
            };

            let Some(value) = request.get(field.semantic_type) else {
                debug!("No value for {}, skipping", field.semantic_type);
                continue;
            };

            match self.write(doc, handle, value).await {
                Ok(Written::Filled) => filled.push(FilledField {
                    semantic_type: field.semantic_type,
                    selector: field.selector.clone(),
                    value: value.clone(),
                    confidence: Some(field.confidence),
                }),
                Ok(Written::NoMatchingOption) => {
                    debug!("No option of {} matches {:?}", field.selector, value.as_text());
                }
                Err(e) => {
                    error!("Error filling {} field: {}", field.semantic_type, e);
                    errors.push(fail(e.to_string()));
                }
            }
        }

        let result = FillResult::new(filled, errors);
        info!(
            "Filled {} field(s), {} error(s)",
            result.filled_fields.len(),
            result.errors.len()
        );
        result
    }

    async fn write(
        &self,
        doc: &mut Document,
        handle: ElementHandle,
        value: &FillValue,
    ) -> Result<Written, DomError> {
        doc.focus(handle)?;
        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }

        let tag = doc.tag_name(handle).unwrap_or_default().to_string();
        let kind = doc.native_type(handle);
        match (tag.as_str(), kind.as_str()) {
            ("select", _) => self.write_select(doc, handle, &value.as_text()),
            ("input", "checkbox" | "radio") => write_toggle(doc, handle, value.as_checked()),
            _ => write_text(doc, handle, &value.as_text()),
        }
    }

    fn write_select(
        &self,
        doc: &mut Document,
        handle: ElementHandle,
        requested: &str,
    ) -> Result<Written, DomError> {
        let options = doc.options(handle);
        let Some(index) = match_option(&options, requested, self.config.match_mode) else {
            return Ok(Written::NoMatchingOption);
        };
        doc.set_selected_index(handle, index)?;
        doc.dispatch_event(handle, EventInit::bubbling("change"))?;
        if self.config.select_fires_input {
            doc.dispatch_event(handle, EventInit::bubbling("input"))?;
        }
        Ok(Written::Filled)
    }
}

fn resolve(doc: &Document, target: &FillTarget) -> Result<Option<ElementHandle>, DomError> {
    if let Some(handle) = target.handle.filter(|h| doc.is_attached(*h)) {
        return Ok(Some(handle));
    }
    doc.query_selector(&target.field.selector)
}

fn write_text(doc: &mut Document, handle: ElementHandle, text: &str) -> Result<Written, DomError> {
    let reflect = doc.tag_name(handle) == Some("input");
    doc.set_value(handle, "")?;
    if reflect {
        doc.set_attribute(handle, "value", "")?;
    }
    doc.set_value(handle, text)?;
    if reflect {
        doc.set_attribute(handle, "value", text)?;
    }
    for kind in ["input", "change", "blur"] {
        doc.dispatch_event(handle, EventInit::bubbling(kind))?;
    }
    Ok(Written::Filled)
}

fn write_toggle(doc: &mut Document, handle: ElementHandle, checked: bool) -> Result<Written, DomError> {
    if doc.checked(handle) != checked {
        doc.set_checked(handle, checked)?;
    }
    doc.dispatch_event(handle, EventInit::bubbling("change"))?;
    Ok(Written::Filled)
}

/// Index of the option `requested` picks, case-insensitively.
pub fn match_option(options: &[SelectOption], requested: &str, mode: MatchMode) -> Option<usize> {
    let wanted = requested.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    let lowered: Vec<(usize, String, String)> = options
        .iter()
        .map(|o| (o.index, o.value.to_lowercase(), o.text.to_lowercase()))
        .collect();

    match mode {
        MatchMode::ExactFirst => lowered
            .iter()
            .find(|(_, value, text)| *value == wanted || *text == wanted)
            .or_else(|| {
                lowered.iter().find(|(_, _, text)| {
                    !text.is_empty() && (text.contains(&wanted) || wanted.contains(text.as_str()))
                })
            })
            .map(|(index, _, _)| *index),
        MatchMode::Partial => lowered
            .iter()
            .find(|(_, value, text)| value.contains(&wanted) || text.contains(&wanted))
            .map(|(index, _, _)| *index),
    }
}
