use crate::tree::{MarkupStyle, Span};

/// One resolved inline object. Spans are absolute columns on the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text between objects.
    Text(Span),
    Markup {
        style: MarkupStyle,
        /// Span including the markers.
        full: Span,
        /// Span between the markers.
        inner: Span,
        /// Objects found inside `inner`; empty when it is plain text.
        children: Vec<Inline>,
    },
    Target {
        full: Span,
        inner: Span,
        children: Vec<Inline>,
    },
    Link {
        full: Span,
        target: Span,
        description: Option<Span>,
    },
}

impl Inline {
    pub fn full(&self) -> Span {
        match self {
            Inline::Text(sp) => *sp,
            Inline::Markup { full, .. } | Inline::Target { full, .. } | Inline::Link { full, .. } => {
                *full
            }
        }
    }
}

/// What a candidate span would become if accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Emphasis(MarkupStyle),
    Target,
    Link,
}

/// A possible inline object found by a matcher, before overlap resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub full: Span,
    pub inner: Span,
    /// Description part of a `[[target][description]]` link.
    pub description: Option<Span>,
}
