//! # Renderers
//!
//! Tree-wide passes that turn a finished [`crate::tree::Root`] into HTML,
//! LaTeX or a JSON structural dump. Renderers only read the tree; internal
//! links are resolved (and memoized) on first use.

pub mod html;
pub mod json;
pub mod latex;

pub use html::{HtmlOptions, to_html};
pub use json::{JsonDocument, JsonNode, reload, to_json};
pub use latex::{LatexOptions, to_latex};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
