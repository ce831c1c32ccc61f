//! # Block Builders
//!
//! The generic dispatch loop shared by section bodies, quote and center
//! interiors and list item bodies: find the next element in a line range,
//! hand any stretch before it to the paragraph segmenter, build the element,
//! continue after it.
//!
//! Ranges are half-open line indices `[start, end)`.

pub mod list;
pub mod paragraph;
pub mod properties;
pub mod section;
pub mod table;
pub mod wrapped;

use crate::parsing::classify::{BlockBegin, HeadingMatch, WrappedKind};
use crate::parsing::context::ParseContext;
use crate::parsing::{DiagnosticKind, ParseSession};
use crate::tree::NodeId;

/// A construct the dispatcher knows how to build.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Element<'a> {
    Heading(&'a HeadingMatch),
    Table,
    List,
    Wrapped { begin: &'a BlockBegin, close: usize },
}

impl<'a> ParseSession<'a> {
    /// Builds everything in `[start, end)` into `ctx.container`.
    pub(crate) fn parse_range(&mut self, ctx: ParseContext, start: usize, end: usize) {
        let mut pos = start;
        while pos < end {
            match self.next_element(pos, end) {
                Some((at, element)) => {
                    if at > pos {
                        self.build_paragraphs(ctx, pos, at);
                    }
                    pos = self.build_element(ctx, at, end, element);
                }
                None => {
                    self.build_paragraphs(ctx, pos, end);
                    break;
                }
            }
        }
    }

    /// The first line at or after `from` that opens an element, by priority
    /// heading, table, list, then wrapped block.
    pub(crate) fn next_element(&mut self, from: usize, end: usize) -> Option<(usize, Element<'a>)> {
        for i in from..end {
            let class = self.class(i);
            if class.is_blank {
                continue;
            }
            if let Some(h) = &class.heading {
                return Some((i, Element::Heading(h)));
            }
            if class.is_table_row() {
                return Some((i, Element::Table));
            }
            if class.item.is_some() {
                return Some((i, Element::List));
            }
            if let Some(begin) = &class.begin {
                match self.find_block_end(begin.kind, i + 1, end) {
                    Some(close) => return Some((i, Element::Wrapped { begin, close })),
                    None => self.diag(
                        DiagnosticKind::UnterminatedBlock,
                        i,
                        format!("#+BEGIN_{0} has no matching #+END_{0}", begin.kind.name()),
                    ),
                }
            }
        }
        None
    }

    /// Builds `element` found at line `at` and returns the line after it.
    fn build_element(&mut self, ctx: ParseContext, at: usize, end: usize, element: Element<'a>) -> usize {
        match element {
            Element::Heading(hm) => {
                let section_end = self.section_end(at, end, hm.level);
                if hm.level <= ctx.section_level {
                    log::debug!(
                        "level {} heading at line {} inside a level {} section",
                        hm.level,
                        at + 1,
                        ctx.section_level
                    );
                }
                self.build_section(ctx, at, section_end, hm);
                section_end
            }
            Element::Table => self.build_table(ctx, at, end),
            Element::List => self.build_list(ctx, at, end),
            Element::Wrapped { begin, close } => {
                self.build_wrapped(ctx, at, close, begin);
                close + 1
            }
        }
    }

    /// Line after the last line of a section headed at `at`: the next heading
    /// of the same or shallower level, or `end`.
    pub(crate) fn section_end(&self, at: usize, end: usize, level: usize) -> usize {
        ((at + 1)..end)
            .find(|&i| {
                self.class(i)
                    .heading
                    .as_ref()
                    .is_some_and(|h| h.level <= level)
            })
            .unwrap_or(end)
    }

    /// Line of the `#+END_` matching `kind` in `[from, end)`.
    pub(crate) fn find_block_end(&self, kind: WrappedKind, from: usize, end: usize) -> Option<usize> {
        (from..end).find(|&i| self.class(i).end == Some(kind))
    }

    /// Registers `node` under the `#+NAME:` on the line before `at`, if any.
    pub(crate) fn register_name(&mut self, node: NodeId, at: usize) {
        let Some(prev) = at.checked_sub(1) else {
            return;
        };
        if let Some(kw) = &self.class(prev).keyword
            && kw.is("NAME")
            && !kw.value.is_empty()
        {
            self.root.register_target(node, kw.value.clone());
        }
    }
}
