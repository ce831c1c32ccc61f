//! # Inline Parsing
//!
//! Resolves emphasis, link targets and bracket links within one line of
//! text, then turns the result into tree nodes.
//!
//! ## Pipeline
//!
//! 1. [`matchers::collect_candidates`] proposes at most one candidate per
//!    start position.
//! 2. [`parser::select`] keeps the leftmost, widest, non-crossing ones.
//! 3. Inner text of accepted non-raw spans is parsed again on its own slice.
//! 4. [`ParseSession::resolve_inline`] emits Text, Markup, Target, Link,
//!    InternalLink and Image nodes in source order.

pub mod cursor;
pub mod kinds;
pub mod matchers;
pub mod parser;
pub mod types;

use std::path::{Path, PathBuf};

use relative_path::RelativePath;

use crate::io::is_image;
use crate::tree::{NodeId, NodeKind, SourceSpan, Span};

pub use parser::parse_inline;
pub use types::Inline;

use self::kinds::BracketLink;
use super::ParseSession;

/// Slice of `text` for an absolute column span, where `text` starts at `base`.
fn cols(text: &str, base: usize, sp: Span) -> &str {
    &text[sp.start - base..sp.end - base]
}

impl ParseSession<'_> {
    /// Parses `text` (starting at column `col` of `line`) and appends the
    /// resulting nodes to `parent`.
    pub(crate) fn resolve_inline(&mut self, parent: NodeId, line: usize, text: &str, col: usize) {
        let items = parse_inline(text, col);
        self.emit_inline(parent, line, text, col, &items);
    }

    fn emit_inline(&mut self, parent: NodeId, line: usize, text: &str, base: usize, items: &[Inline]) {
        for item in items {
            match item {
                Inline::Text(sp) => {
                    let kind = NodeKind::Text {
                        text: cols(text, base, *sp).to_string(),
                    };
                    self.root.push(parent, kind, SourceSpan::within(line, *sp));
                }
                Inline::Markup {
                    style,
                    full,
                    inner,
                    children,
                } => {
                    let kind = NodeKind::Markup {
                        style: *style,
                        text: cols(text, base, *inner).to_string(),
                    };
                    let id = self.root.push(parent, kind, SourceSpan::within(line, *full));
                    self.emit_inline(id, line, text, base, children);
                }
                Inline::Target {
                    full,
                    inner,
                    children,
                } => {
                    let name = cols(text, base, *inner);
                    let kind = NodeKind::Target {
                        name: name.to_string(),
                    };
                    let id = self.root.push(parent, kind, SourceSpan::within(line, *full));
                    self.root.register_target(id, name);
                    self.emit_inline(id, line, text, base, children);
                }
                Inline::Link {
                    full,
                    target,
                    description,
                } => {
                    let kind = self.link_kind(
                        cols(text, base, *target),
                        description.map(|d| cols(text, base, d)),
                    );
                    self.root.push(parent, kind, SourceSpan::within(line, *full));
                }
            }
        }
    }

    /// External URL, local image, or internal link, in that order.
    fn link_kind(&self, target: &str, description: Option<&str>) -> NodeKind {
        let description = description.map(str::to_string);
        if target.contains(BracketLink::EXTERNAL) {
            return NodeKind::Link {
                target: target.to_string(),
                description,
            };
        }
        let path_text = target.strip_prefix(BracketLink::FILE_PREFIX).unwrap_or(target);
        if is_image(Path::new(path_text)) {
            let path = self.local_path(path_text);
            if path.is_file() {
                return NodeKind::Image {
                    path: path.display().to_string(),
                    alt: description,
                };
            }
            log::debug!("image link '{target}' has no file at {}", path.display());
        }
        NodeKind::internal_link(target, description)
    }

    fn local_path(&self, path_text: &str) -> PathBuf {
        let path = Path::new(path_text);
        match self.base_dir {
            Some(dir) if path.is_relative() => RelativePath::new(path_text).to_logical_path(dir),
            _ => path.to_path_buf(),
        }
    }
}
