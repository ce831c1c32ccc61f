pub mod io;
pub mod parsing;
pub mod render;
pub mod tree;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::{BranchReport, Composition, IoError, compose, parse_directory, parse_file, parse_file_list};
pub use parsing::{Diagnostic, DiagnosticKind, DocParser, ParsedDocument, parse_document};
pub use render::{HtmlOptions, LatexOptions, RenderError, to_html, to_json, to_latex};
pub use tree::{NodeId, NodeKind, Root};
