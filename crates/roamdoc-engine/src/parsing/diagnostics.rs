use std::fmt;

use serde::Serialize;

/// Recoverable problems found while parsing. None of these stop the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// A `:PROPERTIES:` drawer without `:END:`, or a stray line inside one.
    MalformedDrawer,
    /// A list line whose bullet family differs from its list's family.
    InconsistentListItem,
    /// Item indentation that is not a whole multiple of the list's ratio.
    UnalignedIndent,
    /// An item deeper than its predecessor allows; it was shifted left.
    SkippedListLevel,
    /// `#+BEGIN_X` without a matching `#+END_X` in its range.
    UnterminatedBlock,
    /// An internal link no registered target or heading answers to.
    UnresolvedLink,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedDrawer => "malformed drawer",
            DiagnosticKind::InconsistentListItem => "inconsistent list item",
            DiagnosticKind::UnalignedIndent => "unaligned indent",
            DiagnosticKind::SkippedListLevel => "skipped list level",
            DiagnosticKind::UnterminatedBlock => "unterminated block",
            DiagnosticKind::UnresolvedLink => "unresolved link",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub source: String,
    /// Zero-based line index.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        source: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.source,
            self.line + 1,
            self.kind,
            self.message
        )
    }
}
