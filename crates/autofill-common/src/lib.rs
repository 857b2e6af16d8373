pub mod field;
pub mod fill;
pub mod protocol;
pub mod site;

pub use field::{ClassifiedField, FieldContext, SemanticType};
pub use fill::{FillError, FillPreview, FillRequest, FillResult, FillValue, FilledField, preview_fill};
pub use site::SiteId;
