use async_trait::async_trait;
use formfill_common::error::PageError;
use serde::{Deserialize, Serialize};

/// Kind of element a selector resolved to, as reported by the live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Select,
    TextInput,
    TextArea,
    ContentEditable,
    Other,
}

/// DOM events the executor dispatches after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomEvent {
    Input,
    Change,
    Blur,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::Blur => "blur",
        }
    }
}

/// The live-page seam. Every host surface that can reach a form (a browser
/// tab, a driver session) implements this; the executor contains the
/// type-specific write strategies and talks to the page only through these
/// primitives.
#[async_trait]
pub trait FormPage: Send + Sync {
    /// Resolve a selector to the kind of element it matches. `Ok(None)`
    /// means the selector matched nothing.
    async fn resolve(&mut self, selector: &str) -> Result<Option<ElementKind>, PageError>;

    /// Set a `<select>`'s value.
    async fn set_select_value(&mut self, selector: &str, value: &str) -> Result<(), PageError>;

    /// Write into a text-like control through the element's native value
    /// setter, so framework-patched setters do not swallow the change.
    async fn set_native_value(&mut self, selector: &str, value: &str) -> Result<(), PageError>;

    /// Replace the text content of a content-editable element.
    async fn set_text_content(&mut self, _selector: &str, _value: &str) -> Result<(), PageError> {
        Err(PageError::NotFillable("content_editable".into()))
    }

    /// Dispatch DOM events on the element, in order.
    async fn dispatch(&mut self, selector: &str, events: &[DomEvent]) -> Result<(), PageError>;
}
