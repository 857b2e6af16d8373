use crate::field::{ClassifiedField, SemanticType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A value to write into one control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Flag(bool),
    Text(String),
}

impl FillValue {
    /// Text written into text-like controls and matched against select options.
    pub fn as_text(&self) -> String {
        match self {
            FillValue::Flag(flag) => flag.to_string(),
            FillValue::Text(text) => text.clone(),
        }
    }

    /// Checkbox/radio coercion: exactly `true`, `1`, `yes` or `on` (any case) check;
    /// anything else, padded variants included, unchecks.
    pub fn as_checked(&self) -> bool {
        match self {
            FillValue::Flag(flag) => *flag,
            FillValue::Text(text) => {
                matches!(text.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
            }
        }
    }
}

impl From<&str> for FillValue {
    fn from(value: &str) -> Self {
        FillValue::Text(value.to_string())
    }
}

impl From<String> for FillValue {
    fn from(value: String) -> Self {
        FillValue::Text(value)
    }
}

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        FillValue::Flag(value)
    }
}

/// Values keyed by semantic type.
///
/// Profile records routinely carry keys that are not semantic types (`country`,
/// `linkedin`) and numeric values; deserialization drops the former and stringifies
/// the latter. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FillRequest(BTreeMap<SemanticType, FillValue>);

impl FillRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ty: SemanticType, value: impl Into<FillValue>) -> Self {
        self.insert(ty, value);
        self
    }

    pub fn insert(&mut self, ty: SemanticType, value: impl Into<FillValue>) {
        let value = value.into();
        if matches!(&value, FillValue::Text(text) if text.is_empty()) {
            self.0.remove(&ty);
            return;
        }
        self.0.insert(ty, value);
    }

    pub fn get(&self, ty: SemanticType) -> Option<&FillValue> {
        self.0.get(&ty)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SemanticType, &FillValue)> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for FillRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        let mut request = FillRequest::new();
        for (key, value) in raw {
            let Some(ty) = SemanticType::from_name(&key) else {
                continue;
            };
            match value {
                serde_json::Value::String(text) => request.insert(ty, text),
                serde_json::Value::Bool(flag) => request.insert(ty, flag),
                serde_json::Value::Number(number) => request.insert(ty, number.to_string()),
                _ => {}
            }
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledField {
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    pub selector: String,
    pub value: FillValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillError {
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    #[serde(rename = "error")]
    pub message: String,
}

/// Outcome of one fill pass. Partial success is success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResult {
    pub success: bool,
    pub filled_fields: Vec<FilledField>,
    pub errors: Vec<FillError>,
}

impl FillResult {
    pub fn new(filled_fields: Vec<FilledField>, errors: Vec<FillError>) -> Self {
        Self {
            success: !filled_fields.is_empty(),
            filled_fields,
            errors,
        }
    }
}

/// What a fill would write into one detected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillPreview {
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    pub selector: String,
    pub label: String,
    pub confidence: f64,
    pub value: Option<FillValue>,
}

/// Pair each field with the value a fill would use, without touching any page.
pub fn preview_fill(fields: &[ClassifiedField], request: &FillRequest) -> Vec<FillPreview> {
    fields
        .iter()
        .map(|field| {
            let label = [
                field.label.as_deref().unwrap_or_default(),
                field.placeholder.as_str(),
                field.name.as_str(),
            ]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("No label")
            .to_string();
            FillPreview {
                semantic_type: field.semantic_type,
                selector: field.selector.clone(),
                label,
                confidence: field.confidence,
                value: request.get(field.semantic_type).cloned(),
            }
        })
        .collect()
}
