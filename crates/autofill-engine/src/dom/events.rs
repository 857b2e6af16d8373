use super::ElementHandle;

/// A dispatched event, as recorded in the document's event log.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub kind: String,
    pub target: ElementHandle,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventInit {
    pub kind: String,
    pub bubbles: bool,
    pub cancelable: bool,
}

impl EventInit {
    /// `{ bubbles: true, cancelable: true }`, what page frameworks listen for.
    pub fn bubbling(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            bubbles: true,
            cancelable: true,
        }
    }

    pub fn plain(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            bubbles: false,
            cancelable: false,
        }
    }
}
