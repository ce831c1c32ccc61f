//! # Document Parsing
//!
//! Turns one source unit into a Branch of the shared [`Root`].
//!
//! ## Stages
//!
//! 1. **Lines**: the text is loaded into a rope and split into lines with
//!    their byte spans ([`source`]).
//! 2. **Classify**: every line is matched once against the construct
//!    patterns ([`classify`]).
//! 3. **Pre-scan**: leading file properties and keywords are read into the
//!    branch metadata.
//! 4. **Structure**: sections are split on headings, then each range is
//!    dispatched to the table, list, block and paragraph builders
//!    ([`blocks`]).
//! 5. **Inline**: every run of prose is resolved into inline objects
//!    ([`inline`]).
//!
//! Parsing never fails. Problems are reported as [`Diagnostic`]s and the
//! affected lines fall back to plain text.

pub mod blocks;
pub mod classify;
pub mod context;
pub mod diagnostics;
pub mod inline;
pub mod source;

use std::path::{Path, PathBuf};

use crate::tree::{NodeId, NodeKind, Root};

use self::classify::{LineClass, OrgLineClassifier};
use self::source::SourceBuffer;

pub use diagnostics::{Diagnostic, DiagnosticKind};

/// Parser for a single source unit.
pub struct DocParser {
    source: String,
    buffer: SourceBuffer,
    classes: Vec<LineClass>,
    base_dir: Option<PathBuf>,
    diagnostics: Vec<Diagnostic>,
    branch: Option<NodeId>,
}

impl DocParser {
    /// `source` names the unit in diagnostics and in the branch metadata.
    pub fn new(text: &str, source: impl Into<String>) -> Self {
        let buffer = SourceBuffer::new(text);
        let classifier = OrgLineClassifier;
        let classes = buffer.lines().iter().map(|l| classifier.classify(l)).collect();
        Self {
            source: source.into(),
            buffer,
            classes,
            base_dir: None,
            diagnostics: vec![],
            branch: None,
        }
    }

    /// Directory relative image links are resolved against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Parses into a new branch of `root` and returns its id.
    pub fn parse(&mut self, root: &mut Root) -> NodeId {
        self.diagnostics.clear();
        log::debug!("parsing {} ({} lines)", self.source, self.buffer.len());
        let mut session = ParseSession {
            source: &self.source,
            buffer: &self.buffer,
            classes: &self.classes,
            base_dir: self.base_dir.as_deref(),
            root,
            diagnostics: &mut self.diagnostics,
        };
        let branch = session.parse_branch();
        self.branch = Some(branch);
        branch
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn branch(&self) -> Option<NodeId> {
        self.branch
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The `#+TITLE` of the parsed branch, if it had one.
    pub fn title<'r>(&self, root: &'r Root) -> Option<&'r str> {
        match root.kind(self.branch?) {
            NodeKind::Branch(meta) => meta.title.as_deref(),
            _ => None,
        }
    }

    /// File-level properties of the parsed branch.
    pub fn properties<'r>(&self, root: &'r Root) -> &'r [(String, String)] {
        match self.branch.map(|b| root.kind(b)) {
            Some(NodeKind::Branch(meta)) => &meta.properties,
            _ => &[],
        }
    }
}

/// State shared by the builders while one branch is parsed.
pub(crate) struct ParseSession<'a> {
    pub(crate) source: &'a str,
    pub(crate) buffer: &'a SourceBuffer,
    pub(crate) classes: &'a [LineClass],
    pub(crate) base_dir: Option<&'a Path>,
    pub(crate) root: &'a mut Root,
    pub(crate) diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> ParseSession<'a> {
    pub(crate) fn line(&self, i: usize) -> &'a str {
        self.buffer.line(i)
    }

    pub(crate) fn class(&self, i: usize) -> &'a LineClass {
        &self.classes[i]
    }

    pub(crate) fn line_count(&self) -> usize {
        self.classes.len()
    }

    /// Records a diagnostic once per kind and line.
    pub(crate) fn diag(&mut self, kind: DiagnosticKind, line: usize, message: impl Into<String>) {
        if self
            .diagnostics
            .iter()
            .any(|d| d.kind == kind && d.line == line)
        {
            return;
        }
        let diagnostic = Diagnostic::new(kind, self.source, line, message);
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// A parsed standalone document.
#[derive(Debug)]
pub struct ParsedDocument {
    pub root: Root,
    pub branch: NodeId,
    /// Parse diagnostics followed by unresolved-link diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses `text` as the only branch of a fresh root.
pub fn parse_document(text: &str, source: &str) -> ParsedDocument {
    let mut root = Root::new();
    let mut parser = DocParser::new(text, source);
    let branch = parser.parse(&mut root);
    let mut diagnostics = parser.diagnostics().to_vec();
    diagnostics.extend(root.link_diagnostics());
    ParsedDocument {
        root,
        branch,
        diagnostics,
    }
}
