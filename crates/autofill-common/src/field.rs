use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain meaning of a form control, independent of its widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticType {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    CurrentTitle,
    Summary,
    YearsExperience,
    Skills,
    Unknown,
}

impl SemanticType {
    /// Every classifiable type, in catalog iteration order. `Unknown` is excluded.
    pub const ALL: [SemanticType; 13] = [
        SemanticType::FirstName,
        SemanticType::LastName,
        SemanticType::FullName,
        SemanticType::Email,
        SemanticType::Phone,
        SemanticType::Address,
        SemanticType::City,
        SemanticType::State,
        SemanticType::ZipCode,
        SemanticType::CurrentTitle,
        SemanticType::Summary,
        SemanticType::YearsExperience,
        SemanticType::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::FirstName => "firstName",
            SemanticType::LastName => "lastName",
            SemanticType::FullName => "fullName",
            SemanticType::Email => "email",
            SemanticType::Phone => "phone",
            SemanticType::Address => "address",
            SemanticType::City => "city",
            SemanticType::State => "state",
            SemanticType::ZipCode => "zipCode",
            SemanticType::CurrentTitle => "currentTitle",
            SemanticType::Summary => "summary",
            SemanticType::YearsExperience => "yearsExperience",
            SemanticType::Skills => "skills",
            SemanticType::Unknown => "unknown",
        }
    }

    /// Parse the camelCase wire name. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .chain(std::iter::once(SemanticType::Unknown))
            .find(|ty| ty.as_str() == name)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Textual surroundings of one control, gathered before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    pub element_name: String,
    pub element_id: String,
    pub placeholder: String,
    pub native_input_type: String,
    pub label_text: String,
    pub nearby_text: String,
    pub aria_label: String,
    pub aria_described_by: String,
    pub tag_name: String,
}

impl FieldContext {
    /// Lowercased blob the keyword scorer matches against.
    pub fn search_text(&self) -> String {
        [
            self.element_name.as_str(),
            self.element_id.as_str(),
            self.placeholder.as_str(),
            self.label_text.as_str(),
            self.nearby_text.as_str(),
            self.aria_label.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// One detected control, as reported to callers and sent across the message boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedField {
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    pub selector: String,
    #[serde(default)]
    pub input_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub visible: bool,
}
